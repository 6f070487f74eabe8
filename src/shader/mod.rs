//! # Shader nodes
//!
//! | Kind | Node |
//! |------|------|
//! | `color` | [`ColorShader`] |
//! | `scalarcolor` | [`ScalarColorShader`] |
//! | `debug` | [`DebugShader`] |
//! | `quantizest` | [`QuantizeStShader`] |
//! | `cylindrical` | [`CylindricalShader`] |
//! | `spherical` | [`SphericalShader`] |
//! | `transformst` | [`TransformStShader`] |
//! | `modst` | [`ModStShader`] |
//! | `background` | [`BackgroundShader`] |
//! | `radial` | [`RadialShader`] |
//! | `funhouse` | [`FunhouseShader`] |
//! | `wigglest` | [`WiggleStShader`] |
//! | `dots` | [`DotsShader`] |
//! | `dotdeluxe` | [`DotDeluxeShader`] |
//! | `stweave` | [`StWeaveShader`] |
//! | `checkshader` | [`CheckShader`] |
//! | `select` | [`SelectShader`] |
//! | `mix` | [`MixShader`] |
//! | `inout` | [`InOutShader`] |
//! | `lighting` | [`LightingShader`] |
//! | `shadow` | [`ShadowShader`] |
//! | `lightcontribution` | [`LightContributionShader`] |
//! | `colorspace` | [`ColorSpaceShader`] |
//! | `solarize` | [`SolarizeShader`] |
//! | `rgb2lab` | [`LabShader`] |
//! | `lookup` | [`LookupShader`] |
//! | `image` | [`ImageShader`] |
//! | `bump` | [`BumpShader`] |
//! | `facet` | [`FacetShader`] |
//!
//! Shaders that remap the surface parameters edit their own working copy of
//! the neighborhood and propagate the edited copy to their child right before
//! shading it.

pub mod basic;
pub mod bump;
pub mod check;
pub mod colorxform;
pub mod distort;
pub mod dots;
pub mod lighting;
pub mod mapping;
pub mod select;
pub mod weave;

pub use basic::{ColorShader, DebugMode, DebugShader, ScalarColorShader};
pub use bump::{BumpShader, FacetShader};
pub use check::CheckShader;
pub use colorxform::{
    ColorSpaceShader, ImageShader, LabShader, LookupShader, SolarizeShader,
};
pub use distort::{FunhouseShader, RadialShader, WiggleStShader};
pub use dots::{DotDeluxeShader, DotsShader};
pub use lighting::{LightContributionShader, LightingShader, ShadowShader};
pub use mapping::{
    BackgroundShader, CylindricalShader, ModStShader, QuantizeStShader, SphericalShader,
    TransformStShader,
};
pub use select::{InOutShader, MixShader, Palette, SelectShader};
pub use weave::StWeaveShader;

use crate::node::{NodeRegistry, ShaderNode};

pub fn register_builtins(registry: &mut NodeRegistry) {
    registry.register_shader_kind("color", make::<ColorShader>);
    registry.register_shader_kind("scalarcolor", make::<ScalarColorShader>);
    registry.register_shader_kind("debug", make::<DebugShader>);
    registry.register_shader_kind("quantizest", make::<QuantizeStShader>);
    registry.register_shader_kind("cylindrical", make::<CylindricalShader>);
    registry.register_shader_kind("spherical", make::<SphericalShader>);
    registry.register_shader_kind("transformst", make::<TransformStShader>);
    registry.register_shader_kind("modst", make::<ModStShader>);
    registry.register_shader_kind("background", make::<BackgroundShader>);
    registry.register_shader_kind("radial", make::<RadialShader>);
    registry.register_shader_kind("funhouse", make::<FunhouseShader>);
    registry.register_shader_kind("wigglest", make::<WiggleStShader>);
    registry.register_shader_kind("dots", make::<DotsShader>);
    registry.register_shader_kind("dotdeluxe", make::<DotDeluxeShader>);
    registry.register_shader_kind("stweave", make::<StWeaveShader>);
    registry.register_shader_kind("checkshader", make::<CheckShader>);
    registry.register_shader_kind("select", make::<SelectShader>);
    registry.register_shader_kind("mix", make::<MixShader>);
    registry.register_shader_kind("inout", make::<InOutShader>);
    registry.register_shader_kind("lighting", make::<LightingShader>);
    registry.register_shader_kind("shadow", make::<ShadowShader>);
    registry.register_shader_kind("lightcontribution", make::<LightContributionShader>);
    registry.register_shader_kind("colorspace", make::<ColorSpaceShader>);
    registry.register_shader_kind("solarize", make::<SolarizeShader>);
    registry.register_shader_kind("rgb2lab", make::<LabShader>);
    registry.register_shader_kind("lookup", make::<LookupShader>);
    registry.register_shader_kind("image", make::<ImageShader>);
    registry.register_shader_kind("bump", make::<BumpShader>);
    registry.register_shader_kind("facet", make::<FacetShader>);
}

fn make<N: ShaderNode + Default + 'static>() -> Box<dyn ShaderNode> {
    Box::new(N::default())
}

/// A configured shader without a registry entry.
pub fn configured<N: ShaderNode + Default>(
    params: &crate::value::ValueContainer,
    registry: &NodeRegistry,
) -> N {
    let mut node = N::default();
    node.set(params, registry);
    node
}
