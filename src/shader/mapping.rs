//! Shaders that compute new (s, t) for their child.

use crate::color::Rgb;
use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ShaderNode, propagate_child, shade_child};
use crate::texture::RepeatMode;
use crate::tiling::{TileGrid, frequency_or_one};
use crate::value::ValueContainer;
use std::f32::consts::{PI, TAU};
use vek::{Vec2, Vec3};

fn required(child: &Option<Box<dyn ShaderNode>>) -> Vec<&'static str> {
    if child.is_none() { vec!["shader"] } else { vec![] }
}

/// Shades `child` at a copy of `n` moved to `st`.
fn shade_at_st(child: &mut Option<Box<dyn ShaderNode>>, n: &Neighborhood, st: Vec2<f32>) -> Rgb {
    let mut n = n.clone();
    n.st = st;
    n.invalidate_jacobian();
    shade_child(child, &n)
}

/// Angle around the origin in turns, in [0, 1).
#[inline]
fn turns(y: f32, x: f32) -> f32 {
    (y.atan2(x) / TAU).rem_euclid(1.0)
}

/// Snaps (s, t) to the centre of its tile, turning any child into a mosaic.
#[derive(Clone, Default)]
pub struct QuantizeStShader {
    n: Neighborhood,
    child: Option<Box<dyn ShaderNode>>,
    pub grid: TileGrid,
}

impl ShaderNode for QuantizeStShader {
    fn kind(&self) -> &'static str {
        "quantizest"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.child = registry.resolve_shader(params, "shader");
        self.grid = TileGrid::new(
            params.get_float_default("sfreq", 1.0),
            params.get_float_default("tfreq", 1.0),
        );
    }

    fn missing_children(&self) -> Vec<&'static str> {
        required(&self.child)
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        propagate_child(&mut self.child, n);
    }

    fn compute(&mut self) -> Rgb {
        let tile = self.grid.locate(self.n.st);
        let center = self.grid.center(tile.col, tile.row);
        shade_at_st(&mut self.child, &self.n, center)
    }

    crate::shader_node_state!();
}

/// Orthonormal pair perpendicular to `axis`. For the z axis this is (x, y).
fn frame(axis: Vec3<f32>) -> (Vec3<f32>, Vec3<f32>) {
    let helper = if axis.x.abs() < 0.9 {
        Vec3::unit_x()
    } else {
        Vec3::unit_y()
    };
    let e1 = (helper - axis * helper.dot(axis)).normalized();
    (e1, axis.cross(e1))
}

/// Cylindrical projection: s is the angle around `axis`, t the height along
/// it divided by `height`.
#[derive(Clone)]
pub struct CylindricalShader {
    n: Neighborhood,
    child: Option<Box<dyn ShaderNode>>,
    pub center: Vec3<f32>,
    pub axis: Vec3<f32>,
    pub height: f32,
}

impl Default for CylindricalShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            child: None,
            center: Vec3::zero(),
            axis: Vec3::unit_z(),
            height: 1.0,
        }
    }
}

impl CylindricalShader {
    pub fn project(&self, p: Vec3<f32>) -> Vec2<f32> {
        let (e1, e2) = frame(self.axis);
        let d = p - self.center;
        let h = d.dot(self.axis);
        let r = d - self.axis * h;
        Vec2::new(turns(r.dot(e2), r.dot(e1)), h / self.height)
    }
}

impl ShaderNode for CylindricalShader {
    fn kind(&self) -> &'static str {
        "cylindrical"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.child = registry.resolve_shader(params, params.first_key(&["shader", "theColor"]));
        self.center = params.get_vec3_default("center", Vec3::zero());
        let axis = params.get_vec3_default("axis", Vec3::unit_z());
        self.axis = if axis.magnitude_squared() > 0.0 {
            axis.normalized()
        } else {
            Vec3::unit_z()
        };
        let height = params.get_float_default("height", 1.0);
        self.height = if height.abs() > f32::EPSILON { height } else { 1.0 };
    }

    fn missing_children(&self) -> Vec<&'static str> {
        required(&self.child)
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        propagate_child(&mut self.child, n);
    }

    fn compute(&mut self) -> Rgb {
        let st = self.project(self.n.location);
        shade_at_st(&mut self.child, &self.n, st)
    }

    crate::shader_node_state!();
}

/// Spherical projection: s is longitude in turns, t runs from 0 at the
/// south pole to 1 at the north pole.
#[derive(Clone, Default)]
pub struct SphericalShader {
    n: Neighborhood,
    child: Option<Box<dyn ShaderNode>>,
    pub center: Vec3<f32>,
}

impl SphericalShader {
    pub fn project(&self, p: Vec3<f32>) -> Vec2<f32> {
        let d = p - self.center;
        let r = d.magnitude();
        if r <= f32::EPSILON {
            return Vec2::broadcast(0.5);
        }
        let latitude = (d.z / r).clamp(-1.0, 1.0).asin();
        Vec2::new(turns(d.y, d.x), 0.5 + latitude / PI)
    }
}

impl ShaderNode for SphericalShader {
    fn kind(&self) -> &'static str {
        "spherical"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.child = registry.resolve_shader(params, params.first_key(&["shader", "theColor"]));
        self.center = params.get_vec3_default("center", Vec3::zero());
    }

    fn missing_children(&self) -> Vec<&'static str> {
        required(&self.child)
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        propagate_child(&mut self.child, n);
    }

    fn compute(&mut self) -> Rgb {
        let st = self.project(self.n.location);
        shade_at_st(&mut self.child, &self.n, st)
    }

    crate::shader_node_state!();
}

/// Affine (s, t) remap followed by an optional wrap back into [0, 1].
#[derive(Clone)]
pub struct TransformStShader {
    n: Neighborhood,
    child: Option<Box<dyn ShaderNode>>,
    pub transform: [f32; 6],
    pub wrap: Option<RepeatMode>,
}

impl Default for TransformStShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            child: None,
            transform: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            wrap: Some(RepeatMode::RepeatXY),
        }
    }
}

impl TransformStShader {
    pub fn apply(&self, st: Vec2<f32>) -> Vec2<f32> {
        let [a, b, c, d, e, f] = self.transform;
        let out = Vec2::new(a * st.x + b * st.y + c, d * st.x + e * st.y + f);
        match self.wrap {
            Some(mode) => out.map(|v| mode.wrap(v)),
            None => out,
        }
    }
}

impl ShaderNode for TransformStShader {
    fn kind(&self) -> &'static str {
        "transformst"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.child = registry.resolve_shader(params, "shader");
        self.transform = params
            .get_transform("transform")
            .unwrap_or([1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        self.wrap = match params.get_str_default("wrap", "repeat") {
            "none" => None,
            mode => Some(mode.parse().unwrap_or(RepeatMode::RepeatXY)),
        };
    }

    fn missing_children(&self) -> Vec<&'static str> {
        required(&self.child)
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        propagate_child(&mut self.child, n);
    }

    fn compute(&mut self) -> Rgb {
        let st = self.apply(self.n.st);
        shade_at_st(&mut self.child, &self.n, st)
    }

    crate::shader_node_state!();
}

/// Repeats the child `sfreq x tfreq` times: `st' = fract(st * freq)`.
/// Zero, negative or non-finite frequencies count as one.
#[derive(Clone)]
pub struct ModStShader {
    n: Neighborhood,
    child: Option<Box<dyn ShaderNode>>,
    pub frequency: Vec2<f32>,
}

impl Default for ModStShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            child: None,
            frequency: Vec2::one(),
        }
    }
}

impl ShaderNode for ModStShader {
    fn kind(&self) -> &'static str {
        "modst"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.child = registry.resolve_shader(params, "shader");
        self.frequency = Vec2::new(
            frequency_or_one(params.get_float_default(params.first_key(&["sfreq", "theSFreq"]), 1.0)),
            frequency_or_one(params.get_float_default(params.first_key(&["tfreq", "theTFreq"]), 1.0)),
        );
    }

    fn missing_children(&self) -> Vec<&'static str> {
        required(&self.child)
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        propagate_child(&mut self.child, n);
    }

    fn compute(&mut self) -> Rgb {
        let st = (self.n.st * self.frequency).map(|v| v.rem_euclid(1.0));
        shade_at_st(&mut self.child, &self.n, st)
    }

    crate::shader_node_state!();
}

/// Shades the child with (s, t) set to the sample's raster position, so
/// it stays fixed to the image rather than the surface.
#[derive(Clone, Default)]
pub struct BackgroundShader {
    n: Neighborhood,
    child: Option<Box<dyn ShaderNode>>,
}

impl ShaderNode for BackgroundShader {
    fn kind(&self) -> &'static str {
        "background"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.child = registry.resolve_shader(params, params.first_key(&["shader", "theColor"]));
    }

    fn missing_children(&self) -> Vec<&'static str> {
        required(&self.child)
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        propagate_child(&mut self.child, n);
    }

    fn compute(&mut self) -> Rgb {
        shade_at_st(&mut self.child, &self.n, self.n.screen)
    }

    crate::shader_node_state!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::testing::RecordingShader;
    use crate::shader::configured;
    use crate::value::Value;

    fn with_recorder() -> (NodeRegistry, std::sync::Arc<std::sync::Mutex<Vec<Vec2<f32>>>>) {
        let (recorder, seen) = RecordingShader::new();
        let mut registry = NodeRegistry::new();
        registry.insert_shader("recorder", Box::new(recorder));
        (registry, seen)
    }

    fn recorder_params() -> ValueContainer {
        ValueContainer::new().with("shader", Value::Shader("recorder".into()))
    }

    fn close(a: Vec2<f32>, b: Vec2<f32>) -> bool {
        (a - b).magnitude() < 1e-5
    }

    #[test]
    fn test_quantize_st_snaps_to_centers() {
        let (registry, seen) = with_recorder();
        let params = recorder_params()
            .with("sfreq", Value::Float(4.0))
            .with("tfreq", Value::Float(2.0));
        let mut shader: QuantizeStShader = configured(&params, &registry);
        shader.propagate(&Neighborhood::new().with_st(Vec2::new(0.3, 0.9)));
        let c = shader.shade();
        assert!(close(Vec2::new(c.x, c.y), Vec2::new(0.375, 0.75)));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_cylindrical_projection() {
        let registry = NodeRegistry::new();
        let params = ValueContainer::new().with("height", Value::Float(2.0));
        let shader: CylindricalShader = configured(&params, &registry);
        assert!(close(shader.project(Vec3::new(1.0, 0.0, 1.0)), Vec2::new(0.0, 0.5)));
        assert!(close(shader.project(Vec3::new(0.0, 1.0, 0.0)), Vec2::new(0.25, 0.0)));
        assert!(close(shader.project(Vec3::new(-1.0, 0.0, -2.0)), Vec2::new(0.5, -1.0)));
    }

    #[test]
    fn test_spherical_projection() {
        let shader = SphericalShader::default();
        assert!(close(shader.project(Vec3::new(0.0, 0.0, 3.0)), Vec2::new(0.0, 1.0)));
        assert!(close(shader.project(Vec3::new(0.0, -2.0, 0.0)), Vec2::new(0.75, 0.5)));
        assert!(close(shader.project(Vec3::zero()), Vec2::new(0.5, 0.5)));
    }

    #[test]
    fn test_transform_st_and_wrap_modes() {
        let registry = NodeRegistry::new();
        let scale = Value::Transform([2.0, 0.0, 0.25, 0.0, -1.0, 0.0]);

        let repeat: TransformStShader =
            configured(&ValueContainer::new().with("transform", scale.clone()), &registry);
        assert!(close(repeat.apply(Vec2::new(0.5, 0.25)), Vec2::new(0.25, 0.75)));

        let none: TransformStShader = configured(
            &ValueContainer::new()
                .with("transform", scale)
                .with("wrap", Value::Str("none".into())),
            &registry,
        );
        assert!(close(none.apply(Vec2::new(0.5, 0.25)), Vec2::new(1.25, -0.25)));
    }

    #[test]
    fn test_remap_does_not_touch_caller() {
        let (registry, seen) = with_recorder();
        let params = recorder_params().with("transform", Value::Transform([1.0, 0.0, 0.5, 0.0, 1.0, 0.0]));
        let mut shader: TransformStShader = configured(&params, &registry);
        let n = Neighborhood::new().with_st(Vec2::new(0.1, 0.2));
        shader.propagate(&n);
        shader.shade();
        assert_eq!(n.st, Vec2::new(0.1, 0.2));
        assert!(close(seen.lock().unwrap()[0], Vec2::new(0.6, 0.2)));
    }

    #[test]
    fn test_repeated_shading_does_not_compound() {
        let (registry, seen) = with_recorder();
        let params = recorder_params().with("transform", Value::Transform([1.0, 0.0, 0.5, 0.0, 1.0, 0.0]));
        let mut shader: TransformStShader = configured(&params, &registry);
        shader.propagate(&Neighborhood::new().with_st(Vec2::new(0.1, 0.2)));
        shader.shade();
        shader.shade();
        let seen = seen.lock().unwrap();
        assert!(close(seen[0], Vec2::new(0.6, 0.2)));
        assert!(close(seen[1], Vec2::new(0.6, 0.2)));
    }

    #[test]
    fn test_mod_st_repeats_child() {
        let (registry, seen) = with_recorder();
        let params = recorder_params()
            .with("theSFreq", Value::Float(3.0))
            .with("tfreq", Value::Float(0.0));
        let mut shader: ModStShader = configured(&params, &registry);
        assert_eq!(shader.frequency, Vec2::new(3.0, 1.0));
        shader.propagate(&Neighborhood::new().with_st(Vec2::new(0.5, 0.25)));
        shader.shade();
        assert!(close(seen.lock().unwrap()[0], Vec2::new(0.5, 0.25)));

        shader.propagate(&Neighborhood::new().with_st(Vec2::new(0.9, 0.75)));
        shader.shade();
        assert!(close(seen.lock().unwrap()[1], Vec2::new(0.7, 0.75)));
    }

    #[test]
    fn test_background_uses_raster_position() {
        let (registry, seen) = with_recorder();
        let params = ValueContainer::new().with("theColor", Value::Shader("recorder".into()));
        let mut shader: BackgroundShader = configured(&params, &registry);
        let mut n = Neighborhood::new().with_st(Vec2::new(0.1, 0.2));
        n.screen = Vec2::new(0.75, 0.5);
        shader.propagate(&n);
        shader.shade();
        assert_eq!(seen.lock().unwrap()[0], Vec2::new(0.75, 0.5));
    }

    #[test]
    fn test_missing_shader_reported() {
        let registry = NodeRegistry::new();
        let shader: SphericalShader = configured(&ValueContainer::new(), &registry);
        assert_eq!(shader.missing_children(), vec!["shader"]);
    }
}
