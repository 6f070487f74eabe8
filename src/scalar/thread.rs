//! Band-limited turbulence.
//!
//! The sampling footprint decides how much detail a pixel can carry. The
//! Nyquist frequency is taken as twice the larger world-space pixel step;
//! any octave whose frequency exceeds `1 / nyquist` would alias and is
//! skipped. When even the base frequency aliases, the child is evaluated
//! once at `location / nyquist` instead, which yields a smooth average.
//!
//! Every octave value is shaped as `gain(bias(|raw| * attenuation, bias), gain)`
//! before it is combined by product, or by minimum in darken mode.
//!
//! Without a `scalar` child the node samples its own gradient noise, placed
//! by `scale` and `origin`.

use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ScalarNode};
use crate::noise::{bias, gain};
use crate::scalar::NoiseScalar;
use crate::tiling::frequency_or_one;
use crate::value::ValueContainer;
use log::trace;
use vek::Vec3;

#[derive(Clone)]
pub struct ThreadScalar {
    n: Neighborhood,
    child: Box<dyn ScalarNode>,
    pub frequency: f32,
    pub octaves: u32,
    pub bias: f32,
    pub gain: f32,
    pub attenuation: f32,
    pub darken: bool,
}

impl Default for ThreadScalar {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            child: Box::new(NoiseScalar::default()),
            frequency: 1.0,
            octaves: 3,
            bias: 0.5,
            gain: 0.5,
            attenuation: 0.3,
            darken: false,
        }
    }
}

impl ThreadScalar {
    pub fn new(child: Box<dyn ScalarNode>) -> Self {
        Self {
            child,
            ..Default::default()
        }
    }

    /// Twice the larger world-space pixel step, zero when no footprint is known.
    pub fn nyquist(&self) -> f32 {
        let f = 2.0 * self.n.max_footprint();
        if f.is_finite() && f > 0.0 { f } else { 0.0 }
    }

    #[inline]
    fn aliases(frequency: f32, nyquist: f32) -> bool {
        nyquist > 0.0 && frequency * nyquist > 1.0
    }

    #[inline]
    fn shape(&self, raw: f32) -> f32 {
        gain(bias(raw.abs() * self.attenuation, self.bias), self.gain)
    }

    /// Child value at `location * scale`.
    fn sample(&mut self, scale: f32) -> f32 {
        let mut scaled = self.n.clone();
        scaled.location = self.n.location * scale;
        self.child.propagate(&scaled);
        self.child.evaluate()
    }
}

impl ScalarNode for ThreadScalar {
    fn kind(&self) -> &'static str {
        "thread"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.child = registry.resolve_scalar(params, "scalar").unwrap_or_else(|| {
            Box::new(NoiseScalar::new(
                params.get_float_default("scale", 1.0),
                params.get_vec3_default("origin", Vec3::zero()),
            ))
        });
        self.frequency = frequency_or_one(params.get_float_default("frequency", 1.0));
        self.octaves = params.get_float_default("octaves", 3.0).max(0.0) as u32;
        self.bias = params.get_float_default("bias", 0.5);
        self.gain = params.get_float_default("gain", 0.5);
        self.attenuation =
            params.get_float_default(params.first_key(&["attenuation", "abs_attenuation"]), 0.3);
        self.darken = params.get_bool_default(params.first_key(&["darken", "doDarken"]), false);
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        self.child.propagate(n);
    }

    fn evaluate(&mut self) -> f32 {
        let nyquist = self.nyquist();
        let base = frequency_or_one(self.frequency);

        if Self::aliases(base, nyquist) {
            trace!("thread: band-limited at nyquist {nyquist}");
            let raw = self.sample(1.0 / nyquist);
            return self.shape(raw).clamp(0.0, 1.0);
        }

        let mut value = 1.0f32;
        let mut frequency = base;
        for _ in 0..self.octaves {
            if Self::aliases(frequency, nyquist) {
                break;
            }
            let raw = self.sample(frequency);
            let shaped = self.shape(raw);
            value = if self.darken {
                value.min(shaped)
            } else {
                value * shaped
            };
            frequency *= 2.0;
        }
        value.clamp(0.0, 1.0)
    }

    crate::scalar_node_state!();
}
