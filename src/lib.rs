//! Procedural scalar-field and shader nodes for an offline ray tracer.
//!
//! Nodes are small polymorphic units. Given a [`Neighborhood`] (location,
//! surface parameters, partials, normals, ray) a [`ScalarNode`] computes a
//! scalar field value and a [`ShaderNode`] a colour. Nodes reference each
//! other by name through a [`NodeRegistry`] and form a DAG that is evaluated
//! once per shading sample.

pub mod color;
pub mod error;
pub mod geometry;
pub mod light;
pub mod neighborhood;
pub mod node;
pub mod noise;
pub mod render;
pub mod scalar;
pub mod scenefile;
pub mod shader;
pub mod texture;
pub mod tiling;
pub mod value;

/// Hermite interpolation between two edges; `edge0 > edge1` gives a falling
/// curve.
#[inline(always)]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

// Re-exports
pub use crate::{
    color::Rgb,
    error::NodeError,
    geometry::{Geometry, InfoFields, Plane, Sphere},
    light::{DirectionalLight, Light, Occluder, PointLight, SphereOccluder},
    neighborhood::{Neighborhood, UvJacobian},
    node::{NodeRegistry, ScalarInput, ScalarNode, ShaderInput, ShaderNode},
    scenefile::SceneFile,
    texture::{RepeatMode, SampleMode, Texture},
    tiling::{TileCoord, TileGrid},
    value::{Value, ValueContainer},
};

// Prelude
pub mod prelude {
    pub use crate::render::{RenderSettings, render_plane};
    pub use crate::smoothstep;
    pub use crate::{Geometry, InfoFields, Neighborhood, Plane, Sphere, UvJacobian};
    pub use crate::{Light, Occluder, PointLight, DirectionalLight, SphereOccluder};
    pub use crate::{NodeError, NodeRegistry, SceneFile, Value, ValueContainer};
    pub use crate::{RepeatMode, Rgb, SampleMode, Texture};
    pub use crate::{ScalarInput, ScalarNode, ShaderInput, ShaderNode};
}
