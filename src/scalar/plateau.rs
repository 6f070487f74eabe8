use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ScalarNode};
use crate::value::ValueContainer;

/// Terraces a child scalar into `levels` flat steps:
/// `floor(value * levels) / levels`. Levels below one, or invalid, give a
/// single step.
#[derive(Clone)]
pub struct PlateauScalar {
    n: Neighborhood,
    child: Option<Box<dyn ScalarNode>>,
    pub levels: f32,
}

impl Default for PlateauScalar {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            child: None,
            levels: 1.0,
        }
    }
}

impl PlateauScalar {
    pub fn terrace(&self, value: f32) -> f32 {
        (value * self.levels).floor() / self.levels
    }
}

impl ScalarNode for PlateauScalar {
    fn kind(&self) -> &'static str {
        "plateau"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.child = registry.resolve_scalar(params, "scalar");
        let levels = params.get_float_default("levels", 1.0);
        self.levels = if levels.is_finite() && levels >= 1.0 {
            levels
        } else {
            1.0
        };
    }

    fn missing_children(&self) -> Vec<&'static str> {
        if self.child.is_none() { vec!["scalar"] } else { vec![] }
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        if let Some(child) = self.child.as_mut() {
            child.propagate(n);
        }
    }

    fn evaluate(&mut self) -> f32 {
        match self.child.as_mut() {
            Some(child) => {
                let value = child.evaluate();
                self.terrace(value)
            }
            None => 0.0,
        }
    }

    fn evaluate_tile(&mut self, col: usize, row: usize) -> f32 {
        match self.child.as_mut() {
            Some(child) => {
                let value = child.evaluate_tile(col, row);
                self.terrace(value)
            }
            None => 0.0,
        }
    }

    crate::scalar_node_state!();
}
