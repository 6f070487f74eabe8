//! # Scalar nodes
//!
//! | Kind | Node |
//! |------|------|
//! | `constant` | [`ConstantScalar`] |
//! | `noise` | [`NoiseScalar`] |
//! | `sine` | [`SineScalar`] |
//! | `sinusoid` | [`SinusoidScalar`] |
//! | `s` | [`SScalar`] |
//! | `t` | [`TScalar`] |
//! | `candycane` | [`CandyCaneScalar`] |
//! | `triangle` | [`TriangleScalar`] |
//! | `check` | [`CheckScalar`] |
//! | `barycentric` | [`BarycentricScalar`] |
//! | `gridlines` | [`GridLinesScalar`] |
//! | `quantized` | [`QuantizedScalar`] |
//! | `thread` | [`ThreadScalar`] |
//! | `plateau` | [`PlateauScalar`] |

pub mod check;
pub mod fields;
pub mod lines;
pub mod plateau;
pub mod quantized;
pub mod thread;

pub use check::CheckScalar;
pub use fields::{
    CandyCaneScalar, ConstantScalar, NoiseScalar, SScalar, SineScalar, SinusoidScalar, TScalar,
    TriangleScalar,
};
pub use lines::{BarycentricScalar, GridLinesScalar};
pub use plateau::PlateauScalar;
pub use quantized::QuantizedScalar;
pub use thread::ThreadScalar;

use crate::node::{NodeRegistry, ScalarNode};

pub fn register_builtins(registry: &mut NodeRegistry) {
    registry.register_scalar_kind("constant", make::<ConstantScalar>);
    registry.register_scalar_kind("noise", make::<NoiseScalar>);
    registry.register_scalar_kind("sine", make::<SineScalar>);
    registry.register_scalar_kind("sinusoid", make::<SinusoidScalar>);
    registry.register_scalar_kind("s", make::<SScalar>);
    registry.register_scalar_kind("t", make::<TScalar>);
    registry.register_scalar_kind("candycane", make::<CandyCaneScalar>);
    registry.register_scalar_kind("triangle", make::<TriangleScalar>);
    registry.register_scalar_kind("check", make::<CheckScalar>);
    registry.register_scalar_kind("barycentric", make::<BarycentricScalar>);
    registry.register_scalar_kind("gridlines", make::<GridLinesScalar>);
    registry.register_scalar_kind("quantized", make::<QuantizedScalar>);
    registry.register_scalar_kind("thread", make::<ThreadScalar>);
    registry.register_scalar_kind("plateau", make::<PlateauScalar>);
}

fn make<N: ScalarNode + Default + 'static>() -> Box<dyn ScalarNode> {
    Box::new(N::default())
}

/// Convenience for tests and embedding code: a configured scalar without a
/// registry entry.
pub fn configured<N: ScalarNode + Default>(
    params: &crate::value::ValueContainer,
    registry: &NodeRegistry,
) -> N {
    let mut node = N::default();
    node.set(params, registry);
    node
}
