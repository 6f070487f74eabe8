//! Analytic scalar fields without children.

use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ScalarNode};
use crate::noise::GradientNoise;
use crate::value::ValueContainer;
use std::f32::consts::{PI, TAU};
use std::str::FromStr;
use vek::Vec3;

/// Always returns `value`.
#[derive(Clone)]
pub struct ConstantScalar {
    n: Neighborhood,
    pub value: f32,
}

impl Default for ConstantScalar {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl ConstantScalar {
    pub fn new(value: f32) -> Self {
        Self {
            n: Neighborhood::new(),
            value,
        }
    }
}

impl ScalarNode for ConstantScalar {
    fn kind(&self) -> &'static str {
        "constant"
    }

    fn set(&mut self, params: &ValueContainer, _registry: &NodeRegistry) {
        self.value = params.get_float_default("value", 0.5);
    }

    fn evaluate(&mut self) -> f32 {
        self.value
    }

    crate::scalar_node_state!();
}

/// Gradient noise of the world-space location, in [0, 1], sampled at
/// `location * frequency + origin`.
#[derive(Clone)]
pub struct NoiseScalar {
    n: Neighborhood,
    pub frequency: f32,
    pub origin: Vec3<f32>,
    noise: GradientNoise,
}

impl Default for NoiseScalar {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            frequency: 1.0,
            origin: Vec3::zero(),
            noise: GradientNoise::new(0),
        }
    }
}

impl NoiseScalar {
    pub fn new(frequency: f32, origin: Vec3<f32>) -> Self {
        Self {
            frequency,
            origin,
            ..Default::default()
        }
    }
}

impl ScalarNode for NoiseScalar {
    fn kind(&self) -> &'static str {
        "noise"
    }

    fn set(&mut self, params: &ValueContainer, _registry: &NodeRegistry) {
        self.frequency = params.get_float_default("frequency", 1.0);
        self.origin = params.get_vec3_default("origin", Vec3::zero());
        self.noise = GradientNoise::new(params.get_float_default("seed", 0.0) as u64);
    }

    fn evaluate(&mut self) -> f32 {
        self.noise
            .unsigned(self.n.location * self.frequency + self.origin)
    }

    crate::scalar_node_state!();
}

/// The coordinate a periodic field runs along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    S,
    T,
    X,
    Y,
    Z,
}

impl FromStr for Axis {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" => Ok(Axis::S),
            "t" => Ok(Axis::T),
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(()),
        }
    }
}

impl Axis {
    pub fn coordinate(self, n: &Neighborhood) -> f32 {
        match self {
            Axis::S => n.st.x,
            Axis::T => n.st.y,
            Axis::X => n.location.x,
            Axis::Y => n.location.y,
            Axis::Z => n.location.z,
        }
    }
}

/// `0.5 + 0.5 * sin(2π (frequency * c + phase))` along one axis.
#[derive(Clone)]
pub struct SineScalar {
    n: Neighborhood,
    pub axis: Axis,
    pub frequency: f32,
    pub phase: f32,
}

impl Default for SineScalar {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            axis: Axis::S,
            frequency: 1.0,
            phase: 0.0,
        }
    }
}

impl ScalarNode for SineScalar {
    fn kind(&self) -> &'static str {
        "sine"
    }

    fn set(&mut self, params: &ValueContainer, _registry: &NodeRegistry) {
        self.axis = params
            .get_str("axis")
            .and_then(|a| a.parse().ok())
            .unwrap_or_default();
        self.frequency = params.get_float_default("frequency", 1.0);
        self.phase = params.get_float_default("phase", 0.0);
    }

    fn evaluate(&mut self) -> f32 {
        let c = self.axis.coordinate(&self.n);
        (0.5 + 0.5 * (TAU * (self.frequency * c + self.phase)).sin()).clamp(0.0, 1.0)
    }

    crate::scalar_node_state!();
}

/// Product of a sine wave along s and one along t. Each axis contributes
/// `(sin(2π f c + phase π) + 1) / 2` when enabled and 1 otherwise.
#[derive(Clone)]
pub struct SinusoidScalar {
    n: Neighborhood,
    pub use_s: bool,
    pub use_t: bool,
    pub frequency: [f32; 2],
    pub phase: [f32; 2],
}

impl Default for SinusoidScalar {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            use_s: true,
            use_t: true,
            frequency: [1.0; 2],
            phase: [0.0; 2],
        }
    }
}

impl SinusoidScalar {
    #[inline]
    fn wave(c: f32, frequency: f32, phase: f32) -> f32 {
        ((TAU * frequency * c + phase * PI).sin() + 1.0) * 0.5
    }
}

impl ScalarNode for SinusoidScalar {
    fn kind(&self) -> &'static str {
        "sinusoid"
    }

    fn set(&mut self, params: &ValueContainer, _registry: &NodeRegistry) {
        self.use_s = params.get_bool_default(params.first_key(&["s", "theS"]), true);
        self.use_t = params.get_bool_default(params.first_key(&["t", "theT"]), true);
        self.frequency = [
            params.get_float_default(params.first_key(&["sfreq", "theSFreq"]), 1.0),
            params.get_float_default(params.first_key(&["tfreq", "theTFreq"]), 1.0),
        ];
        self.phase = [
            params.get_float_default(params.first_key(&["sphase", "theSPhase"]), 0.0),
            params.get_float_default(params.first_key(&["tphase", "theTPhase"]), 0.0),
        ];
    }

    fn evaluate(&mut self) -> f32 {
        let mut value = 1.0;
        if self.use_s {
            value *= Self::wave(self.n.st.x, self.frequency[0], self.phase[0]);
        }
        if self.use_t {
            value *= Self::wave(self.n.st.y, self.frequency[1], self.phase[1]);
        }
        value.clamp(0.0, 1.0)
    }

    crate::scalar_node_state!();
}

/// The s parameter of the sample.
#[derive(Clone, Default)]
pub struct SScalar {
    n: Neighborhood,
}

impl ScalarNode for SScalar {
    fn kind(&self) -> &'static str {
        "s"
    }

    fn set(&mut self, _params: &ValueContainer, _registry: &NodeRegistry) {}

    fn evaluate(&mut self) -> f32 {
        self.n.st.x
    }

    crate::scalar_node_state!();
}

/// The t parameter of the sample.
#[derive(Clone, Default)]
pub struct TScalar {
    n: Neighborhood,
}

impl ScalarNode for TScalar {
    fn kind(&self) -> &'static str {
        "t"
    }

    fn set(&mut self, _params: &ValueContainer, _registry: &NodeRegistry) {}

    fn evaluate(&mut self) -> f32 {
        self.n.st.y
    }

    crate::scalar_node_state!();
}

/// Hard-edged diagonal stripes: 1 where `fract(t * frequency + tilt * s + phase)`
/// exceeds one half, 0 elsewhere.
#[derive(Clone)]
pub struct CandyCaneScalar {
    n: Neighborhood,
    pub frequency: f32,
    pub tilt: f32,
    pub phase: f32,
}

impl Default for CandyCaneScalar {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            frequency: 1.0,
            tilt: 0.0,
            phase: 0.0,
        }
    }
}

impl ScalarNode for CandyCaneScalar {
    fn kind(&self) -> &'static str {
        "candycane"
    }

    fn set(&mut self, params: &ValueContainer, _registry: &NodeRegistry) {
        self.frequency = params.get_float_default("frequency", 1.0);
        self.tilt = params.get_float_default("tilt", 0.0);
        self.phase = params.get_float_default("phase", 0.0);
    }

    fn evaluate(&mut self) -> f32 {
        let st = self.n.st;
        let m = (st.y * self.frequency + self.tilt * st.x + self.phase).rem_euclid(1.0);
        if m > 0.5 { 1.0 } else { 0.0 }
    }

    crate::scalar_node_state!();
}

#[inline]
fn hash(mut x: u32) -> u32 {
    x = x.wrapping_mul(0x45d9f3b);
    x ^= x >> 16;
    x = x.wrapping_mul(0x45d9f3b);
    x ^= x >> 16;
    x
}

/// A field that is constant per primitive: the primitive index ramped over
/// `count` steps, a hashed value per primitive, or the index parity.
#[derive(Clone)]
pub struct TriangleScalar {
    n: Neighborhood,
    pub count: u32,
    pub random: bool,
    pub odd_even: bool,
    pub seed: u32,
}

impl Default for TriangleScalar {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            count: 16,
            random: false,
            odd_even: false,
            seed: 0,
        }
    }
}

impl ScalarNode for TriangleScalar {
    fn kind(&self) -> &'static str {
        "triangle"
    }

    fn set(&mut self, params: &ValueContainer, _registry: &NodeRegistry) {
        self.count = params.get_float_default("count", 16.0).max(1.0) as u32;
        self.random = params.get_bool_default("random", false);
        self.odd_even = params.get_bool_default(params.first_key(&["oddeven", "doOddEven"]), false);
        self.seed = params.get_float_default("seed", 0.0) as u32;
    }

    fn evaluate(&mut self) -> f32 {
        if self.odd_even {
            return (self.n.primitive % 2) as f32;
        }
        if self.random {
            return hash(self.n.primitive ^ hash(self.seed)) as f32 / u32::MAX as f32;
        }
        if self.count <= 1 {
            return 0.0;
        }
        (self.n.primitive % self.count) as f32 / (self.count - 1) as f32
    }

    crate::scalar_node_state!();
}
