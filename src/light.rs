use crate::color::Rgb;
use crate::neighborhood::Neighborhood;
use crate::smoothstep;
use crate::value::ValueContainer;
use std::sync::Arc;
use vek::Vec3;

/// Offset along the shade normal for shadow rays, avoids self shadowing.
const SHADOW_BIAS: f32 = 1e-3;

/// Answers shadow queries for the lights.
pub trait Occluder: Send + Sync {
    /// True if anything blocks the segment `origin + dir * [0, max_distance)`.
    fn occluded(&self, origin: Vec3<f32>, dir: Vec3<f32>, max_distance: f32) -> bool;
}

/// A light as seen by the lighting shader.
pub trait Light: Send + Sync {
    fn is_on(&self) -> bool;

    /// Unit direction from the shading point to the light and the distance
    /// to it (`f32::INFINITY` for lights at infinity).
    fn direction(&self, n: &Neighborhood) -> (Vec3<f32>, f32);

    /// Whether this light wants shadow queries at all.
    fn shadow_seeking(&self) -> bool;

    /// Shadow test: true if the light reaches the shading point.
    fn visible(&self, n: &Neighborhood, dir: Vec3<f32>, distance: f32) -> bool;

    /// Colour arriving at the shading point, before any cosine term.
    fn intensity(&self, n: &Neighborhood, dir: Vec3<f32>) -> Rgb;
}

/// State common to all built-in lights.
#[derive(Clone)]
pub struct LightCommon {
    pub on: bool,
    pub color: Rgb,
    pub intensity: f32,
    pub shadows: bool,
    pub occluder: Option<Arc<dyn Occluder>>,
}

impl Default for LightCommon {
    fn default() -> Self {
        Self {
            on: true,
            color: Vec3::one(),
            intensity: 1.0,
            shadows: false,
            occluder: None,
        }
    }
}

impl LightCommon {
    pub fn from_params(params: &ValueContainer) -> Self {
        Self {
            on: params.get_bool_default("on", true),
            color: params.get_vec3_default("color", Vec3::one()),
            intensity: params.get_float_default("intensity", 1.0),
            shadows: params.get_bool_default("shadows", false),
            occluder: None,
        }
    }

    fn visible(&self, n: &Neighborhood, dir: Vec3<f32>, distance: f32) -> bool {
        match &self.occluder {
            Some(occluder) => {
                let origin = n.location + n.shade_normal * SHADOW_BIAS;
                !occluder.occluded(origin, dir, distance - SHADOW_BIAS)
            }
            None => true,
        }
    }
}

/// Point light with a smooth falloff between two distances.
#[derive(Clone)]
pub struct PointLight {
    pub common: LightCommon,
    pub position: Vec3<f32>,
    pub start_distance: f32,
    pub end_distance: f32,
}

impl PointLight {
    pub fn new(position: Vec3<f32>) -> Self {
        Self {
            common: LightCommon::default(),
            position,
            start_distance: f32::INFINITY,
            end_distance: f32::INFINITY,
        }
    }

    pub fn from_params(params: &ValueContainer) -> Self {
        Self {
            common: LightCommon::from_params(params),
            position: params.get_vec3_default("position", Vec3::zero()),
            start_distance: params.get_float_default("start_distance", f32::INFINITY),
            end_distance: params.get_float_default("end_distance", f32::INFINITY),
        }
    }

    pub fn with_occluder(mut self, occluder: Arc<dyn Occluder>) -> Self {
        self.common.occluder = Some(occluder);
        self.common.shadows = true;
        self
    }
}

impl Light for PointLight {
    fn is_on(&self) -> bool {
        self.common.on
    }

    fn direction(&self, n: &Neighborhood) -> (Vec3<f32>, f32) {
        let to_light = self.position - n.location;
        let distance = to_light.magnitude();
        if distance <= f32::EPSILON {
            return (n.shade_normal, 0.0);
        }
        (to_light / distance, distance)
    }

    fn shadow_seeking(&self) -> bool {
        self.common.shadows
    }

    fn visible(&self, n: &Neighborhood, dir: Vec3<f32>, distance: f32) -> bool {
        self.common.visible(n, dir, distance)
    }

    fn intensity(&self, n: &Neighborhood, _dir: Vec3<f32>) -> Rgb {
        let distance = (self.position - n.location).magnitude();
        let attenuation = if distance <= self.start_distance {
            1.0
        } else if distance >= self.end_distance {
            0.0
        } else {
            smoothstep(self.end_distance, self.start_distance, distance)
        };
        self.common.color * (self.common.intensity * attenuation)
    }
}

/// Light at infinity shining along `direction`.
#[derive(Clone)]
pub struct DirectionalLight {
    pub common: LightCommon,
    /// Direction the light travels in.
    pub direction: Vec3<f32>,
}

impl DirectionalLight {
    pub fn new(direction: Vec3<f32>) -> Self {
        Self {
            common: LightCommon::default(),
            direction: direction.normalized(),
        }
    }

    pub fn from_params(params: &ValueContainer) -> Self {
        Self {
            common: LightCommon::from_params(params),
            direction: params
                .get_vec3_default("direction", -Vec3::unit_z())
                .normalized(),
        }
    }

    pub fn with_occluder(mut self, occluder: Arc<dyn Occluder>) -> Self {
        self.common.occluder = Some(occluder);
        self.common.shadows = true;
        self
    }
}

impl Light for DirectionalLight {
    fn is_on(&self) -> bool {
        self.common.on
    }

    fn direction(&self, _n: &Neighborhood) -> (Vec3<f32>, f32) {
        (-self.direction, f32::INFINITY)
    }

    fn shadow_seeking(&self) -> bool {
        self.common.shadows
    }

    fn visible(&self, n: &Neighborhood, dir: Vec3<f32>, distance: f32) -> bool {
        self.common.visible(n, dir, distance)
    }

    fn intensity(&self, _n: &Neighborhood, _dir: Vec3<f32>) -> Rgb {
        self.common.color * self.common.intensity
    }
}

/// A set of spheres that block light.
#[derive(Clone, Debug, Default)]
pub struct SphereOccluder {
    pub spheres: Vec<(Vec3<f32>, f32)>,
}

impl SphereOccluder {
    pub fn new(spheres: Vec<(Vec3<f32>, f32)>) -> Self {
        Self { spheres }
    }
}

impl Occluder for SphereOccluder {
    fn occluded(&self, origin: Vec3<f32>, dir: Vec3<f32>, max_distance: f32) -> bool {
        self.spheres.iter().any(|(center, radius)| {
            let oc = origin - *center;
            let b = oc.dot(dir);
            let c = oc.dot(oc) - radius * radius;
            let disc = b * b - c;
            if disc < 0.0 {
                return false;
            }
            let sq = disc.sqrt();
            let t0 = -b - sq;
            let t1 = -b + sq;
            let t = if t0 > 0.0 { t0 } else { t1 };
            t > 0.0 && t < max_distance
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_light_direction_and_falloff() {
        let mut light = PointLight::new(Vec3::new(0.0, 0.0, 4.0));
        light.start_distance = 2.0;
        light.end_distance = 6.0;
        let n = Neighborhood::new();
        let (dir, dist) = light.direction(&n);
        assert_eq!(dir, Vec3::unit_z());
        assert_eq!(dist, 4.0);
        let c = light.intensity(&n, dir);
        assert!((c.x - 0.5).abs() < 1e-5);

        light.position = Vec3::new(0.0, 0.0, 10.0);
        assert_eq!(light.intensity(&n, dir), Vec3::zero());
    }

    #[test]
    fn test_sphere_occluder_blocks_between_only() {
        let occluder = SphereOccluder::new(vec![(Vec3::new(0.0, 0.0, 2.0), 0.5)]);
        assert!(occluder.occluded(Vec3::zero(), Vec3::unit_z(), 10.0));
        assert!(!occluder.occluded(Vec3::zero(), Vec3::unit_z(), 1.0));
        assert!(!occluder.occluded(Vec3::zero(), Vec3::unit_x(), 10.0));
    }

    #[test]
    fn test_shadow_seeking_light_visibility() {
        let occluder: Arc<dyn Occluder> =
            Arc::new(SphereOccluder::new(vec![(Vec3::new(0.0, 0.0, 2.0), 0.5)]));
        let light = PointLight::new(Vec3::new(0.0, 0.0, 5.0)).with_occluder(occluder);
        assert!(light.shadow_seeking());

        let mut n = Neighborhood::new();
        let (dir, dist) = light.direction(&n);
        assert!(!light.visible(&n, dir, dist));

        n.location = Vec3::new(3.0, 0.0, 0.0);
        let (dir, dist) = light.direction(&n);
        assert!(light.visible(&n, dir, dist));
    }
}
