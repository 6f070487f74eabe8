use crate::neighborhood::Neighborhood;
use bitflags::bitflags;
use std::f32::consts::{PI, TAU};
use vek::{Vec2, Vec3};

bitflags! {
    /// Which fields [`Geometry::neighborhood_info`] should refresh.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct InfoFields: u32 {
        const LOCATION = 0b0001;
        const PARTIALS = 0b0010;
        const NORMAL   = 0b0100;
    }
}

/// The surface a neighborhood was sampled from.
///
/// Nodes that need authoritative geometry at a parameter position other than
/// the one they were handed (for example the centre of a tile) ask the
/// owning surface through this trait instead of extrapolating.
pub trait Geometry: Send + Sync {
    fn name(&self) -> &str;

    /// Fills the requested fields of `n` for the surface point at `n.uv`.
    fn neighborhood_info(&self, n: &mut Neighborhood, fields: InfoFields);
}

/// A parallelogram spanned by two edges, parametrized over [0, 1]^2.
#[derive(Clone, Debug)]
pub struct Plane {
    pub origin: Vec3<f32>,
    pub edge_u: Vec3<f32>,
    pub edge_v: Vec3<f32>,
}

impl Default for Plane {
    fn default() -> Self {
        Self::unit()
    }
}

impl Plane {
    /// The unit square in the z = 0 plane.
    pub fn unit() -> Self {
        Self {
            origin: Vec3::zero(),
            edge_u: Vec3::unit_x(),
            edge_v: Vec3::unit_y(),
        }
    }

    pub fn new(origin: Vec3<f32>, edge_u: Vec3<f32>, edge_v: Vec3<f32>) -> Self {
        Self {
            origin,
            edge_u,
            edge_v,
        }
    }

    pub fn point(&self, uv: Vec2<f32>) -> Vec3<f32> {
        self.origin + self.edge_u * uv.x + self.edge_v * uv.y
    }

    pub fn normal(&self) -> Vec3<f32> {
        self.edge_u.cross(self.edge_v).normalized()
    }
}

impl Geometry for Plane {
    fn name(&self) -> &str {
        "plane"
    }

    fn neighborhood_info(&self, n: &mut Neighborhood, fields: InfoFields) {
        if fields.contains(InfoFields::LOCATION) {
            n.location = self.point(n.uv);
        }
        if fields.contains(InfoFields::PARTIALS) {
            n.dpdu = self.edge_u;
            n.dpdv = self.edge_v;
            n.invalidate_jacobian();
        }
        if fields.contains(InfoFields::NORMAL) {
            let normal = self.normal();
            n.surface_normal = normal;
            n.facet_normal = normal;
            n.shade_normal = normal;
        }
    }
}

/// A sphere with u running around the z axis and v from the south pole
/// (v = 0) to the north pole (v = 1).
#[derive(Clone, Debug)]
pub struct Sphere {
    pub center: Vec3<f32>,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3<f32>, radius: f32) -> Self {
        Self { center, radius }
    }

    fn angles(uv: Vec2<f32>) -> (f32, f32) {
        (uv.x * TAU, PI * (1.0 - uv.y))
    }

    pub fn point(&self, uv: Vec2<f32>) -> Vec3<f32> {
        let (phi, theta) = Self::angles(uv);
        self.center
            + Vec3::new(
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos(),
            ) * self.radius
    }
}

impl Geometry for Sphere {
    fn name(&self) -> &str {
        "sphere"
    }

    fn neighborhood_info(&self, n: &mut Neighborhood, fields: InfoFields) {
        let (phi, theta) = Self::angles(n.uv);
        let location = self.point(n.uv);

        if fields.contains(InfoFields::LOCATION) {
            n.location = location;
        }
        if fields.contains(InfoFields::PARTIALS) {
            let r = self.radius;
            n.dpdu = Vec3::new(-phi.sin(), phi.cos(), 0.0) * (TAU * r * theta.sin());
            n.dpdv = Vec3::new(
                theta.cos() * phi.cos(),
                theta.cos() * phi.sin(),
                -theta.sin(),
            ) * (-PI * r);
            n.invalidate_jacobian();
        }
        if fields.contains(InfoFields::NORMAL) {
            let normal = (location - self.center).normalized();
            n.surface_normal = normal;
            n.facet_normal = normal;
            n.shade_normal = normal;
        }
    }
}
