//! Distortions of the parameter plane.

use crate::color::Rgb;
use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ScalarInput, ScalarNode, ShaderNode, propagate_child, shade_child};
use crate::value::ValueContainer;
use std::f32::consts::TAU;
use vek::{Vec2, Vec3};

/// Barrel (`strength > 0`) or pincushion (`strength < 0`) distortion around
/// `center`: `r' = r * (1 + strength * r^2)`.
#[derive(Clone)]
pub struct RadialShader {
    n: Neighborhood,
    child: Option<Box<dyn ShaderNode>>,
    pub center: Vec2<f32>,
    pub strength: f32,
}

impl Default for RadialShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            child: None,
            center: Vec2::broadcast(0.5),
            strength: 0.0,
        }
    }
}

impl RadialShader {
    pub fn distort(&self, st: Vec2<f32>) -> Vec2<f32> {
        let d = st - self.center;
        self.center + d * (1.0 + self.strength * d.magnitude_squared())
    }
}

impl ShaderNode for RadialShader {
    fn kind(&self) -> &'static str {
        "radial"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.child = registry.resolve_shader(params, "shader");
        let c = params.get_vec3_default("center", Vec3::new(0.5, 0.5, 0.0));
        self.center = Vec2::new(c.x, c.y);
        self.strength = params.get_float_default("strength", 0.0);
    }

    fn missing_children(&self) -> Vec<&'static str> {
        if self.child.is_none() { vec!["shader"] } else { vec![] }
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        propagate_child(&mut self.child, n);
    }

    fn compute(&mut self) -> Rgb {
        let mut n = self.n.clone();
        n.st = self.distort(n.st);
        n.invalidate_jacobian();
        shade_child(&mut self.child, &n)
    }

    crate::shader_node_state!();
}

/// Funhouse-mirror wobble defined in screen space.
///
/// The pixel offset `(amplitude * sin(2π f t), amplitude * sin(2π f s))` is
/// pulled back into parameter space through the neighborhood's UV Jacobian,
/// so the wobble keeps its on-screen size regardless of distance or surface
/// orientation.
#[derive(Clone)]
pub struct FunhouseShader {
    n: Neighborhood,
    child: Option<Box<dyn ShaderNode>>,
    /// In pixels.
    pub amplitude: f32,
    pub frequency: f32,
}

impl Default for FunhouseShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            child: None,
            amplitude: 0.0,
            frequency: 1.0,
        }
    }
}

impl ShaderNode for FunhouseShader {
    fn kind(&self) -> &'static str {
        "funhouse"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.child = registry.resolve_shader(params, "shader");
        self.amplitude = params.get_float_default("amplitude", 0.0);
        self.frequency = params.get_float_default("frequency", 1.0);
    }

    fn missing_children(&self) -> Vec<&'static str> {
        if self.child.is_none() { vec!["shader"] } else { vec![] }
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        propagate_child(&mut self.child, n);
    }

    fn compute(&mut self) -> Rgb {
        let st = self.n.st;
        let screen = Vec2::new(
            self.amplitude * (TAU * self.frequency * st.y).sin(),
            self.amplitude * (TAU * self.frequency * st.x).sin(),
        );
        let delta = self.n.uv_jacobian().apply(screen);
        let mut n = self.n.clone();
        n.st += delta;
        n.uv += delta;
        shade_child(&mut self.child, &n)
    }

    crate::shader_node_state!();
}

/// Offsets (s, t) by a scalar field read at two shifted copies of the
/// location: `s += scalar(p + soffset) * attenuation`, likewise for t. The
/// result wraps into [0, 1) by default and is clamped when `wrap` is off.
#[derive(Clone)]
pub struct WiggleStShader {
    n: Neighborhood,
    child: Option<Box<dyn ShaderNode>>,
    scalar: Option<Box<dyn ScalarNode>>,
    attenuation: ScalarInput,
    pub s_offset: Vec3<f32>,
    pub t_offset: Vec3<f32>,
    pub wrap: bool,
}

impl Default for WiggleStShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            child: None,
            scalar: None,
            attenuation: ScalarInput::Constant(1.0),
            s_offset: Vec3::new(1.7, 3.9, 3.1),
            t_offset: Vec3::new(5.3, 7.5, 5.7),
            wrap: true,
        }
    }
}

impl WiggleStShader {
    fn sample(&mut self, offset: Vec3<f32>) -> f32 {
        let Some(scalar) = self.scalar.as_mut() else {
            return 0.0;
        };
        let mut p = self.n.clone();
        p.location += offset;
        scalar.propagate(&p);
        scalar.evaluate()
    }

    /// The displaced (s, t) at the working sample.
    pub fn wiggled(&mut self) -> Vec2<f32> {
        let ds = self.sample(self.s_offset);
        let dt = self.sample(self.t_offset);
        let st = self.n.st + Vec2::new(ds, dt) * self.attenuation.value();
        if self.wrap {
            st.map(|v| v.rem_euclid(1.0))
        } else {
            st.map(|v| v.clamp(0.0, 1.0))
        }
    }
}

fn offset_param(params: &ValueContainer, keys: [[&str; 2]; 3], def: Vec3<f32>) -> Vec3<f32> {
    let mut offset = def;
    for (axis, names) in keys.iter().enumerate() {
        offset[axis] = params.get_float_default(params.first_key(names), def[axis]);
    }
    offset
}

impl ShaderNode for WiggleStShader {
    fn kind(&self) -> &'static str {
        "wigglest"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        let defaults = Self::default();
        self.child = registry.resolve_shader(params, "shader");
        self.scalar = registry.resolve_scalar(params, params.first_key(&["scalar", "theScalar"]));
        self.attenuation = ScalarInput::from_params(
            params,
            params.first_key(&["attenuation", "theAttenuation"]),
            1.0,
            registry,
        );
        self.s_offset = offset_param(
            params,
            [["sx", "theSX"], ["sy", "theSY"], ["sz", "theSZ"]],
            defaults.s_offset,
        );
        self.t_offset = offset_param(
            params,
            [["tx", "theTX"], ["ty", "theTY"], ["tz", "theTZ"]],
            defaults.t_offset,
        );
        self.wrap = params.get_bool_default(params.first_key(&["wrap", "doMod"]), true);
    }

    fn missing_children(&self) -> Vec<&'static str> {
        let mut missing = vec![];
        if self.scalar.is_none() {
            missing.push("scalar");
        }
        if self.child.is_none() {
            missing.push("shader");
        }
        missing
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        self.attenuation.propagate(n);
        propagate_child(&mut self.child, n);
    }

    fn compute(&mut self) -> Rgb {
        let mut n = self.n.clone();
        n.st = self.wiggled();
        n.invalidate_jacobian();
        shade_child(&mut self.child, &n)
    }

    crate::shader_node_state!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::testing::{LocationScalar, RecordingShader, plane_sample};
    use crate::scalar::ConstantScalar;
    use crate::shader::configured;
    use crate::value::Value;

    #[test]
    fn test_radial_identity_and_barrel() {
        let registry = NodeRegistry::new();
        let identity: RadialShader = configured(&ValueContainer::new(), &registry);
        let same = identity.distort(Vec2::new(0.9, 0.1));
        assert!((same - Vec2::new(0.9, 0.1)).magnitude() < 1e-6);

        let params = ValueContainer::new().with("strength", Value::Float(1.0));
        let barrel: RadialShader = configured(&params, &registry);
        let out = barrel.distort(Vec2::new(1.0, 0.5));
        assert!((out.x - 1.125).abs() < 1e-6);
        assert!((out.y - 0.5).abs() < 1e-6);
        assert_eq!(barrel.distort(Vec2::broadcast(0.5)), Vec2::broadcast(0.5));
    }

    #[test]
    fn test_funhouse_offsets_in_pixels() {
        let (recorder, seen) = RecordingShader::new();
        let mut registry = NodeRegistry::new();
        registry.insert_shader("recorder", Box::new(recorder));
        let params = ValueContainer::new()
            .with("shader", Value::Shader("recorder".into()))
            .with("amplitude", Value::Float(2.0));
        let mut shader: FunhouseShader = configured(&params, &registry);

        // One pixel covers 0.01 of the unit plane.
        shader.propagate(&plane_sample(0.0, 0.25, 0.01));
        shader.shade();
        let st = seen.lock().unwrap()[0];
        assert!((st.x - 0.02).abs() < 1e-5);
        assert!((st.y - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_funhouse_without_footprint_is_identity() {
        let (recorder, seen) = RecordingShader::new();
        let mut registry = NodeRegistry::new();
        registry.insert_shader("recorder", Box::new(recorder));
        let params = ValueContainer::new()
            .with("shader", Value::Shader("recorder".into()))
            .with("amplitude", Value::Float(5.0));
        let mut shader: FunhouseShader = configured(&params, &registry);
        shader.propagate(&plane_sample(0.3, 0.1, 0.0));
        shader.shade();
        assert_eq!(seen.lock().unwrap()[0], Vec2::new(0.3, 0.1));
    }

    fn wiggle(scalar: Box<dyn ScalarNode>, params: ValueContainer) -> WiggleStShader {
        let mut registry = NodeRegistry::new();
        registry.insert_scalar("field", scalar);
        let params = params.with("theScalar", Value::Scalar("field".into()));
        configured(&params, &registry)
    }

    #[test]
    fn test_wiggle_wraps_by_default() {
        let mut shader = wiggle(
            Box::new(ConstantScalar::new(0.25)),
            ValueContainer::new().with("theAttenuation", Value::Float(0.5)),
        );
        shader.propagate(&Neighborhood::new().with_st(Vec2::new(0.2, 0.9)));
        let st = shader.wiggled();
        assert!((st - Vec2::new(0.325, 0.025)).magnitude() < 1e-5);

        let mut clamped = wiggle(
            Box::new(ConstantScalar::new(0.25)),
            ValueContainer::new()
                .with("attenuation", Value::Float(0.5))
                .with("doMod", Value::Str("no".into())),
        );
        clamped.propagate(&Neighborhood::new().with_st(Vec2::new(0.2, 0.9)));
        assert!((clamped.wiggled() - Vec2::new(0.325, 1.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_wiggle_samples_shifted_locations() {
        // Location zero: the field reads x + 10 y + 100 z at each offset.
        let mut shader = wiggle(
            Box::new(LocationScalar::default()),
            ValueContainer::new().with("attenuation", Value::Float(0.001)),
        );
        shader.propagate(&Neighborhood::new());
        let st = shader.wiggled();
        assert!((st.x - 0.3507).abs() < 1e-4);
        assert!((st.y - 0.6503).abs() < 1e-4);

        let mut moved = wiggle(
            Box::new(LocationScalar::default()),
            ValueContainer::new()
                .with("attenuation", Value::Float(0.001))
                .with("theSY", Value::Float(0.0))
                .with("sz", Value::Float(0.0)),
        );
        moved.propagate(&Neighborhood::new());
        assert!((moved.wiggled().x - 0.0017).abs() < 1e-4);
    }

    #[test]
    fn test_wiggle_shades_child_at_new_st() {
        let (recorder, seen) = RecordingShader::new();
        let mut registry = NodeRegistry::new();
        registry.insert_shader("recorder", Box::new(recorder));
        registry.insert_scalar("field", Box::new(ConstantScalar::new(0.5)));
        let params = ValueContainer::new()
            .with("shader", Value::Shader("recorder".into()))
            .with("scalar", Value::Scalar("field".into()))
            .with("attenuation", Value::Float(0.5));
        let mut shader: WiggleStShader = configured(&params, &registry);
        assert!(shader.missing_children().is_empty());
        shader.propagate(&Neighborhood::new().with_st(Vec2::new(0.1, 0.1)));
        shader.shade();
        shader.shade();
        let seen = seen.lock().unwrap();
        assert!((seen[0] - Vec2::new(0.35, 0.35)).magnitude() < 1e-5);
        assert!((seen[1] - Vec2::new(0.35, 0.35)).magnitude() < 1e-5);
    }
}
