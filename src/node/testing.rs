//! Instrumented nodes for tests.

use crate::color::Rgb;
use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ScalarNode, ShaderNode};
use crate::value::ValueContainer;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vek::{Vec2, Vec3};

/// Returns a fixed value and counts its evaluations. Clones share the counter.
#[derive(Clone)]
pub struct CountingScalar {
    n: Neighborhood,
    pub value: f32,
    pub calls: Arc<AtomicUsize>,
}

impl CountingScalar {
    pub fn new(value: f32) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                n: Neighborhood::new(),
                value,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl ScalarNode for CountingScalar {
    fn kind(&self) -> &'static str {
        "counting"
    }

    fn set(&mut self, params: &ValueContainer, _registry: &NodeRegistry) {
        self.value = params.get_float_default("value", self.value);
    }

    fn evaluate(&mut self) -> f32 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.value
    }

    crate::scalar_node_state!();
}

/// Returns `location.x + 10 * location.y + 100 * location.z`.
#[derive(Clone, Default)]
pub struct LocationScalar {
    n: Neighborhood,
}

impl LocationScalar {
    pub fn encode(p: Vec3<f32>) -> f32 {
        p.x + 10.0 * p.y + 100.0 * p.z
    }
}

impl ScalarNode for LocationScalar {
    fn kind(&self) -> &'static str {
        "location"
    }

    fn set(&mut self, _params: &ValueContainer, _registry: &NodeRegistry) {}

    fn evaluate(&mut self) -> f32 {
        Self::encode(self.n.location)
    }

    crate::scalar_node_state!();
}

/// A fresh random value on every call.
#[derive(Clone, Default)]
pub struct StochasticScalar {
    n: Neighborhood,
}

impl ScalarNode for StochasticScalar {
    fn kind(&self) -> &'static str {
        "stochastic"
    }

    fn set(&mut self, _params: &ValueContainer, _registry: &NodeRegistry) {}

    fn evaluate(&mut self) -> f32 {
        rand::rng().random::<f32>()
    }

    crate::scalar_node_state!();
}

/// Records every (s, t) it is shaded at and returns its s,t as colour.
#[derive(Clone)]
pub struct RecordingShader {
    n: Neighborhood,
    pub seen: Arc<Mutex<Vec<Vec2<f32>>>>,
}

impl RecordingShader {
    pub fn new() -> (Self, Arc<Mutex<Vec<Vec2<f32>>>>) {
        let seen = Arc::new(Mutex::new(vec![]));
        (
            Self {
                n: Neighborhood::new(),
                seen: seen.clone(),
            },
            seen,
        )
    }
}

impl ShaderNode for RecordingShader {
    fn kind(&self) -> &'static str {
        "recorder"
    }

    fn set(&mut self, _params: &ValueContainer, _registry: &NodeRegistry) {}

    fn compute(&mut self) -> Rgb {
        self.seen.lock().unwrap().push(self.n.st);
        Vec3::new(self.n.st.x, self.n.st.y, 0.0)
    }

    crate::shader_node_state!();
}

/// Returns the shade normal it sees, unmodified.
#[derive(Clone, Default)]
pub struct NormalShader {
    n: Neighborhood,
}

impl ShaderNode for NormalShader {
    fn kind(&self) -> &'static str {
        "normal"
    }

    fn set(&mut self, _params: &ValueContainer, _registry: &NodeRegistry) {}

    fn compute(&mut self) -> Rgb {
        self.n.shade_normal
    }

    crate::shader_node_state!();
}

/// A neighborhood on the unit plane at (s, t) with a one-pixel footprint of
/// `footprint` world units.
pub fn plane_sample(s: f32, t: f32, footprint: f32) -> Neighborhood {
    let mut n = Neighborhood::new()
        .with_st(Vec2::new(s, t))
        .with_footprint(Vec3::unit_x() * footprint, Vec3::unit_y() * footprint)
        .with_geometry(Arc::new(crate::geometry::Plane::unit()));
    n.location = Vec3::new(s, t, 0.0);
    n
}
