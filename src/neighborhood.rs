use crate::color::{BLACK, Rgb};
use crate::geometry::Geometry;
use std::fmt;
use std::sync::Arc;
use vek::{Vec2, Vec3};

/// Screen-space to UV-space derivatives: how far (u, v) moves per pixel
/// step in x and y.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UvJacobian {
    pub du_dx: f32,
    pub du_dy: f32,
    pub dv_dx: f32,
    pub dv_dy: f32,
}

impl UvJacobian {
    /// Maps a screen-space offset (in pixels) to a (u, v) offset.
    #[inline]
    pub fn apply(&self, screen: Vec2<f32>) -> Vec2<f32> {
        Vec2::new(
            self.du_dx * screen.x + self.du_dy * screen.y,
            self.dv_dx * screen.x + self.dv_dy * screen.y,
        )
    }
}

/// Local shading context handed through a node graph.
///
/// Created once per shading sample by the renderer and copied into every node
/// by `propagate`, so a node may freely edit its copy.
#[derive(Clone)]
pub struct Neighborhood {
    /// World-space hit location
    pub location: Vec3<f32>,
    /// Texture parametrization
    pub st: Vec2<f32>,
    /// Surface parametrization
    pub uv: Vec2<f32>,
    /// Raster position in [0, 1]², y up.
    pub screen: Vec2<f32>,

    pub dpdu: Vec3<f32>,
    pub dpdv: Vec3<f32>,

    /// World-space increment of one pixel step in screen x and y.
    pub dpdx: Vec3<f32>,
    pub dpdy: Vec3<f32>,

    /// Interpolated normal.
    pub surface_normal: Vec3<f32>,
    /// Flat per-primitive normal.
    pub facet_normal: Vec3<f32>,
    /// The normal used for lighting; faces against `ray_direction` once
    /// [`Neighborhood::face_forward`] ran.
    pub shade_normal: Vec3<f32>,

    pub ray_direction: Vec3<f32>,
    pub barycentric: Vec3<f32>,
    /// Index of the primitive that was hit.
    pub primitive: u32,

    /// Accumulated, unclamped colour.
    pub color: Rgb,

    pub geometry: Option<Arc<dyn Geometry>>,

    uv_jacobian: Option<UvJacobian>,
}

impl Default for Neighborhood {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Neighborhood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neighborhood")
            .field("location", &self.location)
            .field("st", &self.st)
            .field("uv", &self.uv)
            .field("shade_normal", &self.shade_normal)
            .field("ray_direction", &self.ray_direction)
            .field("color", &self.color)
            .field("geometry", &self.geometry.as_ref().map(|g| g.name()))
            .finish()
    }
}

impl Neighborhood {
    /// A sample on the z = 0 plane looking down -z.
    pub fn new() -> Self {
        Self {
            location: Vec3::zero(),
            st: Vec2::zero(),
            uv: Vec2::zero(),
            screen: Vec2::zero(),
            dpdu: Vec3::unit_x(),
            dpdv: Vec3::unit_y(),
            dpdx: Vec3::zero(),
            dpdy: Vec3::zero(),
            surface_normal: Vec3::unit_z(),
            facet_normal: Vec3::unit_z(),
            shade_normal: Vec3::unit_z(),
            ray_direction: -Vec3::unit_z(),
            barycentric: Vec3::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0),
            primitive: 0,
            color: BLACK,
            geometry: None,
            uv_jacobian: None,
        }
    }

    /// Sets both parametrizations at once; most geometry uses s,t == u,v.
    pub fn with_st(mut self, st: Vec2<f32>) -> Self {
        self.st = st;
        self.uv = st;
        self
    }

    /// Sets the screen footprint and drops any cached Jacobian.
    pub fn with_footprint(mut self, dpdx: Vec3<f32>, dpdy: Vec3<f32>) -> Self {
        self.dpdx = dpdx;
        self.dpdy = dpdy;
        self.uv_jacobian = None;
        self
    }

    pub fn with_geometry(mut self, geometry: Arc<dyn Geometry>) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Flips `shade_normal` so that it faces against the incident ray.
    pub fn face_forward(&mut self) {
        self.shade_normal = facing(self.shade_normal, self.ray_direction);
    }

    /// True when the ray hits the side `surface_normal` points away from.
    pub fn is_backfacing(&self) -> bool {
        self.surface_normal.dot(self.ray_direction) > 0.0
    }

    /// Largest world-space distance covered by one pixel step.
    #[inline]
    pub fn max_footprint(&self) -> f32 {
        self.dpdx.magnitude().max(self.dpdy.magnitude())
    }

    /// Smallest world-space distance covered by one pixel step.
    #[inline]
    pub fn min_footprint(&self) -> f32 {
        self.dpdx.magnitude().min(self.dpdy.magnitude())
    }

    /// Must be called whenever partials or footprint are edited in place.
    #[inline]
    pub fn invalidate_jacobian(&mut self) {
        self.uv_jacobian = None;
    }

    /// The cached Jacobian, if it has been computed since the last change.
    #[inline]
    pub fn cached_jacobian(&self) -> Option<UvJacobian> {
        self.uv_jacobian
    }

    /// Returns the screen to UV Jacobian, computing it first when needed.
    pub fn uv_jacobian(&mut self) -> UvJacobian {
        if let Some(j) = self.uv_jacobian {
            return j;
        }
        let j = self.compute_uv_jacobian();
        self.uv_jacobian = Some(j);
        j
    }

    /// Least-squares fit of `dpdx`/`dpdy` onto the tangent frame.
    fn compute_uv_jacobian(&self) -> UvJacobian {
        let a = self.dpdu.dot(self.dpdu);
        let b = self.dpdu.dot(self.dpdv);
        let c = self.dpdv.dot(self.dpdv);
        let det = a * c - b * b;
        if det.abs() < 1e-12 {
            return UvJacobian::default();
        }
        let inv = 1.0 / det;

        let solve = |d: Vec3<f32>| -> (f32, f32) {
            let r1 = self.dpdu.dot(d);
            let r2 = self.dpdv.dot(d);
            ((c * r1 - b * r2) * inv, (a * r2 - b * r1) * inv)
        };

        let (du_dx, dv_dx) = solve(self.dpdx);
        let (du_dy, dv_dy) = solve(self.dpdy);
        UvJacobian {
            du_dx,
            du_dy,
            dv_dx,
            dv_dy,
        }
    }
}

/// Returns `n` or `-n`, whichever faces against `ray`.
#[inline]
pub fn facing(n: Vec3<f32>, ray: Vec3<f32>) -> Vec3<f32> {
    if n.dot(ray) > 0.0 { -n } else { n }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_forward() {
        let mut n = Neighborhood::new();
        n.shade_normal = Vec3::new(0.0, 0.0, -1.0);
        n.ray_direction = Vec3::new(0.3, 0.0, -1.0).normalized();
        n.face_forward();
        assert!(n.shade_normal.dot(n.ray_direction) <= 0.0);
        assert_eq!(n.shade_normal, Vec3::unit_z());

        // Already facing the viewer: untouched.
        n.face_forward();
        assert_eq!(n.shade_normal, Vec3::unit_z());
    }

    #[test]
    fn test_jacobian_is_lazy_and_invalidated() {
        let mut n = Neighborhood::new().with_footprint(
            Vec3::new(0.01, 0.0, 0.0),
            Vec3::new(0.0, 0.02, 0.0),
        );
        n.dpdu = Vec3::new(2.0, 0.0, 0.0);
        n.dpdv = Vec3::new(0.0, 4.0, 0.0);
        n.invalidate_jacobian();
        assert!(n.cached_jacobian().is_none());

        let j = n.uv_jacobian();
        assert!((j.du_dx - 0.005).abs() < 1e-7);
        assert!((j.dv_dy - 0.005).abs() < 1e-7);
        assert!(j.du_dy.abs() < 1e-7 && j.dv_dx.abs() < 1e-7);
        assert_eq!(n.cached_jacobian(), Some(j));

        n = n.with_footprint(Vec3::new(0.02, 0.0, 0.0), Vec3::zero());
        assert!(n.cached_jacobian().is_none());
        assert!((n.uv_jacobian().du_dx - 0.01).abs() < 1e-7);
    }

    #[test]
    fn test_degenerate_tangents_give_zero_jacobian() {
        let mut n = Neighborhood::new().with_footprint(Vec3::unit_x(), Vec3::unit_y());
        n.dpdu = Vec3::unit_x();
        n.dpdv = Vec3::unit_x();
        assert_eq!(n.uv_jacobian(), UvJacobian::default());
    }
}
