//! # Node evaluation protocol
//!
//! Every node keeps a private working copy of the [`Neighborhood`]. A sample
//! is evaluated in two steps:
//!
//! 1. `propagate(n)` stores a copy of `n` and forwards it to every child the
//!    node owns, so the whole subgraph sees the same local shading state.
//! 2. `evaluate()` (scalars) or `shade()` (shaders) computes the result from
//!    the working copy and the node's configuration. A node may edit its own
//!    copy (remapping s,t for example) and re-propagate the edited copy to a
//!    child before asking it for a value; the caller's neighborhood is never
//!    touched.
//!
//! Nodes are configured once through `set` from a permissive
//! [`ValueContainer`]: unknown keys are ignored and missing keys fall back to
//! per-node defaults. Child references are resolved by name through the
//! [`NodeRegistry`], which hands out private clones, so a node exclusively
//! owns its children and `Clone` yields a fully independent subgraph.
//!
//! Instances are not re-entrant. Concurrent evaluation paths must each use
//! their own clone.

pub mod registry;

#[cfg(test)]
pub mod testing;

pub use registry::NodeRegistry;

use crate::color::Rgb;
use crate::neighborhood::Neighborhood;
use crate::value::{Value, ValueContainer};

/// A node producing a scalar, usually in [0, 1].
pub trait ScalarNode: Send + Sync {
    /// The registered kind name.
    fn kind(&self) -> &'static str;

    /// Configures the node. Resets any state derived from a previous
    /// configuration.
    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry);

    /// Keys of required children that could not be resolved by `set`.
    fn missing_children(&self) -> Vec<&'static str> {
        vec![]
    }

    fn neighborhood(&self) -> &Neighborhood;

    fn neighborhood_mut(&mut self) -> &mut Neighborhood;

    /// Stores a working copy of `n`. Nodes with children must override this
    /// and forward `n` to each of them.
    fn propagate(&mut self, n: &Neighborhood) {
        *self.neighborhood_mut() = n.clone();
    }

    fn evaluate(&mut self) -> f32;

    /// Value at an explicit tile address. Only tile based nodes distinguish
    /// this from [`ScalarNode::evaluate`].
    fn evaluate_tile(&mut self, _col: usize, _row: usize) -> f32 {
        self.evaluate()
    }

    fn box_clone(&self) -> Box<dyn ScalarNode>;
}

impl Clone for Box<dyn ScalarNode> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// A node producing a colour.
pub trait ShaderNode: Send + Sync {
    fn kind(&self) -> &'static str;

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry);

    fn missing_children(&self) -> Vec<&'static str> {
        vec![]
    }

    fn neighborhood(&self) -> &Neighborhood;

    fn neighborhood_mut(&mut self) -> &mut Neighborhood;

    fn propagate(&mut self, n: &Neighborhood) {
        *self.neighborhood_mut() = n.clone();
    }

    /// Computes this node's colour from its working neighborhood.
    fn compute(&mut self) -> Rgb;

    /// Computes the colour and records it in the working neighborhood.
    fn shade(&mut self) -> Rgb {
        let color = self.compute();
        self.neighborhood_mut().color = color;
        color
    }

    fn box_clone(&self) -> Box<dyn ShaderNode>;
}

impl Clone for Box<dyn ShaderNode> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Implements the state accessors and `box_clone` for a scalar node whose
/// working neighborhood lives in the field `n`.
#[macro_export]
macro_rules! scalar_node_state {
    () => {
        fn neighborhood(&self) -> &$crate::neighborhood::Neighborhood {
            &self.n
        }

        fn neighborhood_mut(&mut self) -> &mut $crate::neighborhood::Neighborhood {
            &mut self.n
        }

        fn box_clone(&self) -> Box<dyn $crate::node::ScalarNode> {
            Box::new(self.clone())
        }
    };
}

/// Shader counterpart of [`scalar_node_state`].
#[macro_export]
macro_rules! shader_node_state {
    () => {
        fn neighborhood(&self) -> &$crate::neighborhood::Neighborhood {
            &self.n
        }

        fn neighborhood_mut(&mut self) -> &mut $crate::neighborhood::Neighborhood {
            &mut self.n
        }

        fn box_clone(&self) -> Box<dyn $crate::node::ShaderNode> {
            Box::new(self.clone())
        }
    };
}

/// A parameter that is either a constant or a scalar node.
#[derive(Clone)]
pub enum ScalarInput {
    Constant(f32),
    Node(Box<dyn ScalarNode>),
}

impl Default for ScalarInput {
    fn default() -> Self {
        ScalarInput::Constant(0.0)
    }
}

impl ScalarInput {
    /// Reads `key` as a scalar reference or a float, falling back to `def`.
    pub fn from_params(
        params: &ValueContainer,
        key: &str,
        def: f32,
        registry: &NodeRegistry,
    ) -> Self {
        match params.get(key) {
            Some(Value::Float(v)) => ScalarInput::Constant(*v),
            Some(Value::Scalar(_)) => match registry.resolve_scalar(params, key) {
                Some(node) => ScalarInput::Node(node),
                None => ScalarInput::Constant(def),
            },
            _ => ScalarInput::Constant(def),
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, ScalarInput::Node(_))
    }

    pub fn propagate(&mut self, n: &Neighborhood) {
        if let ScalarInput::Node(node) = self {
            node.propagate(n);
        }
    }

    pub fn value(&mut self) -> f32 {
        match self {
            ScalarInput::Constant(v) => *v,
            ScalarInput::Node(node) => node.evaluate(),
        }
    }

    /// Propagates `n` and evaluates in one go.
    pub fn value_at(&mut self, n: &Neighborhood) -> f32 {
        self.propagate(n);
        self.value()
    }
}

/// A parameter that is either a constant colour or a shader node.
#[derive(Clone)]
pub enum ShaderInput {
    Color(Rgb),
    Node(Box<dyn ShaderNode>),
}

impl Default for ShaderInput {
    fn default() -> Self {
        ShaderInput::Color(crate::color::BLACK)
    }
}

impl ShaderInput {
    /// Reads `key` as a shader reference or a colour, falling back to `def`.
    pub fn from_params(
        params: &ValueContainer,
        key: &str,
        def: Rgb,
        registry: &NodeRegistry,
    ) -> Self {
        match params.get(key) {
            Some(Value::Shader(_)) => match registry.resolve_shader(params, key) {
                Some(node) => ShaderInput::Node(node),
                None => ShaderInput::Color(def),
            },
            _ => ShaderInput::Color(params.get_vec3_default(key, def)),
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, ShaderInput::Node(_))
    }

    pub fn propagate(&mut self, n: &Neighborhood) {
        if let ShaderInput::Node(node) = self {
            node.propagate(n);
        }
    }

    pub fn shade(&mut self) -> Rgb {
        match self {
            ShaderInput::Color(c) => *c,
            ShaderInput::Node(node) => node.shade(),
        }
    }

    pub fn shade_at(&mut self, n: &Neighborhood) -> Rgb {
        self.propagate(n);
        self.shade()
    }
}

/// Shades an optional child with `n`, or returns `n.color` untouched.
pub fn shade_child(child: &mut Option<Box<dyn ShaderNode>>, n: &Neighborhood) -> Rgb {
    match child {
        Some(child) => {
            child.propagate(n);
            child.shade()
        }
        None => n.color,
    }
}

/// Forwards `n` to an optional child shader.
pub fn propagate_child(child: &mut Option<Box<dyn ShaderNode>>, n: &Neighborhood) {
    if let Some(child) = child {
        child.propagate(n);
    }
}
