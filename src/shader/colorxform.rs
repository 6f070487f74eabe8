//! Colour transforms and texture access.

use crate::color::{Rgb, hsv_to_rgb, lab_to_rgb, luminance, rgb_to_hsv, rgb_to_lab};
use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ShaderNode, propagate_child, shade_child};
use crate::texture::{RepeatMode, SampleMode, Texture};
use crate::value::ValueContainer;
use std::str::FromStr;
use std::sync::Arc;
use vek::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    RgbToHsv,
    HsvToRgb,
    #[default]
    Adjust,
}

impl FromStr for ColorSpaceMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rgb2hsv" => Ok(ColorSpaceMode::RgbToHsv),
            "hsv2rgb" => Ok(ColorSpaceMode::HsvToRgb),
            "adjust" => Ok(ColorSpaceMode::Adjust),
            _ => Err(()),
        }
    }
}

/// Converts its child's colour between RGB and HSV, or adjusts it in HSV:
/// hue is shifted by `hue` turns, saturation and value are scaled.
#[derive(Clone)]
pub struct ColorSpaceShader {
    n: Neighborhood,
    child: Option<Box<dyn ShaderNode>>,
    pub mode: ColorSpaceMode,
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

impl Default for ColorSpaceShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            child: None,
            mode: ColorSpaceMode::Adjust,
            hue: 0.0,
            saturation: 1.0,
            value: 1.0,
        }
    }
}

impl ColorSpaceShader {
    pub fn transform(&self, c: Rgb) -> Rgb {
        match self.mode {
            ColorSpaceMode::RgbToHsv => rgb_to_hsv(c),
            ColorSpaceMode::HsvToRgb => hsv_to_rgb(c),
            ColorSpaceMode::Adjust => {
                let hsv = rgb_to_hsv(c);
                hsv_to_rgb(Vec3::new(
                    hsv.x + self.hue,
                    (hsv.y * self.saturation).clamp(0.0, 1.0),
                    hsv.z * self.value,
                ))
            }
        }
    }
}

impl ShaderNode for ColorSpaceShader {
    fn kind(&self) -> &'static str {
        "colorspace"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.child = registry.resolve_shader(params, "shader");
        self.mode = params
            .get_str("mode")
            .and_then(|m| m.parse().ok())
            .unwrap_or_default();
        self.hue = params.get_float_default("hue", 0.0);
        self.saturation = params.get_float_default("saturation", 1.0);
        self.value = params.get_float_default("value", 1.0);
    }

    fn missing_children(&self) -> Vec<&'static str> {
        if self.child.is_none() { vec!["shader"] } else { vec![] }
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        propagate_child(&mut self.child, n);
    }

    fn compute(&mut self) -> Rgb {
        let c = shade_child(&mut self.child, &self.n);
        self.transform(c)
    }

    crate::shader_node_state!();
}

/// Inverts every channel of its child's colour that lies below one half.
#[derive(Clone, Default)]
pub struct SolarizeShader {
    n: Neighborhood,
    child: Option<Box<dyn ShaderNode>>,
}

impl SolarizeShader {
    pub fn solarize(c: Rgb) -> Rgb {
        c.map(|v| if v < 0.5 { 1.0 - v } else { v })
    }
}

impl ShaderNode for SolarizeShader {
    fn kind(&self) -> &'static str {
        "solarize"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.child = registry.resolve_shader(params, params.first_key(&["shader", "sh"]));
    }

    fn missing_children(&self) -> Vec<&'static str> {
        if self.child.is_none() { vec!["shader"] } else { vec![] }
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        propagate_child(&mut self.child, n);
    }

    fn compute(&mut self) -> Rgb {
        Self::solarize(shade_child(&mut self.child, &self.n))
    }

    crate::shader_node_state!();
}

/// Scales the CIE L*a*b* lightness of its child's colour by `lightness`,
/// keeping the chromatic components.
#[derive(Clone)]
pub struct LabShader {
    n: Neighborhood,
    child: Option<Box<dyn ShaderNode>>,
    pub lightness: f32,
}

impl Default for LabShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            child: None,
            lightness: 0.75,
        }
    }
}

impl ShaderNode for LabShader {
    fn kind(&self) -> &'static str {
        "rgb2lab"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.child = registry.resolve_shader(params, params.first_key(&["shader", "sh"]));
        self.lightness = params.get_float_default("lightness", 0.75);
    }

    fn missing_children(&self) -> Vec<&'static str> {
        if self.child.is_none() { vec!["shader"] } else { vec![] }
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        propagate_child(&mut self.child, n);
    }

    fn compute(&mut self) -> Rgb {
        let mut lab = rgb_to_lab(shade_child(&mut self.child, &self.n));
        lab.x *= self.lightness;
        lab_to_rgb(lab)
    }

    crate::shader_node_state!();
}

/// Remaps its child's colour through the middle row of a texture used as a
/// 1D lookup table, either per channel or by luminance.
#[derive(Clone, Default)]
pub struct LookupShader {
    n: Neighborhood,
    child: Option<Box<dyn ShaderNode>>,
    texture: Option<Arc<Texture>>,
    pub channels: bool,
}

impl LookupShader {
    pub fn lookup(&self, c: Rgb) -> Rgb {
        let Some(texture) = &self.texture else {
            return c;
        };
        let at = |x: f32| texture.sample(x, 0.5, SampleMode::Linear, RepeatMode::ClampXY);
        if self.channels {
            Vec3::new(at(c.x).x, at(c.y).y, at(c.z).z)
        } else {
            at(luminance(c))
        }
    }
}

impl ShaderNode for LookupShader {
    fn kind(&self) -> &'static str {
        "lookup"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.child = registry.resolve_shader(params, "shader");
        self.texture = registry.resolve_texture(params, "texture");
        self.channels = params.get_bool_default("channels", true);
    }

    fn missing_children(&self) -> Vec<&'static str> {
        let mut missing = vec![];
        if self.child.is_none() {
            missing.push("shader");
        }
        if self.texture.is_none() {
            missing.push("texture");
        }
        missing
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        propagate_child(&mut self.child, n);
    }

    fn compute(&mut self) -> Rgb {
        let c = shade_child(&mut self.child, &self.n);
        self.lookup(c)
    }

    crate::shader_node_state!();
}

/// A texture mapped over (s, t), with t = 0 at the bottom of the image.
#[derive(Clone)]
pub struct ImageShader {
    n: Neighborhood,
    texture: Option<Arc<Texture>>,
    pub repeat: RepeatMode,
    pub filter: SampleMode,
}

impl Default for ImageShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            texture: None,
            repeat: RepeatMode::RepeatXY,
            filter: SampleMode::Linear,
        }
    }
}

impl ShaderNode for ImageShader {
    fn kind(&self) -> &'static str {
        "image"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.texture = registry.resolve_texture(params, "texture");
        self.repeat = params
            .get_str("repeat")
            .and_then(|r| r.parse().ok())
            .unwrap_or(RepeatMode::RepeatXY);
        self.filter = params
            .get_str("filter")
            .and_then(|f| f.parse().ok())
            .unwrap_or(SampleMode::Linear);
    }

    fn missing_children(&self) -> Vec<&'static str> {
        if self.texture.is_none() { vec!["texture"] } else { vec![] }
    }

    fn compute(&mut self) -> Rgb {
        match &self.texture {
            Some(texture) => {
                texture.sample(self.n.st.x, 1.0 - self.n.st.y, self.filter, self.repeat)
            }
            None => self.n.color,
        }
    }

    crate::shader_node_state!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{ColorShader, configured};
    use crate::value::Value;
    use vek::Vec2;

    fn close(a: Rgb, b: Rgb) -> bool {
        (a - b).magnitude() < 1e-2
    }

    fn registry_with_color(c: Rgb) -> NodeRegistry {
        let mut registry = NodeRegistry::new();
        registry.insert_shader("src", Box::new(ColorShader::new(c)));
        registry
    }

    #[test]
    fn test_colorspace_adjust_hue() {
        let registry = registry_with_color(Vec3::new(1.0, 0.0, 0.0));
        let params = ValueContainer::new()
            .with("shader", Value::Shader("src".into()))
            .with("hue", Value::Float(1.0 / 3.0));
        let mut shader: ColorSpaceShader = configured(&params, &registry);
        shader.propagate(&Neighborhood::new());
        assert!(close(shader.shade(), Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_colorspace_conversions() {
        let registry = registry_with_color(Vec3::new(0.0, 0.0, 0.5));
        let params = ValueContainer::new()
            .with("shader", Value::Shader("src".into()))
            .with("mode", Value::Str("rgb2hsv".into()));
        let mut shader: ColorSpaceShader = configured(&params, &registry);
        shader.propagate(&Neighborhood::new());
        let hsv = shader.shade();
        assert!(close(hsv, Vec3::new(2.0 / 3.0, 1.0, 0.5)));

        shader.mode = ColorSpaceMode::HsvToRgb;
        assert!(close(shader.transform(hsv), Vec3::new(0.0, 0.0, 0.5)));
    }

    #[test]
    fn test_solarize_flips_dark_channels() {
        let registry = registry_with_color(Vec3::new(0.2, 0.5, 0.9));
        let params = ValueContainer::new().with("sh", Value::Shader("src".into()));
        let mut shader: SolarizeShader = configured(&params, &registry);
        assert!(shader.missing_children().is_empty());
        shader.propagate(&Neighborhood::new());
        assert!(close(shader.shade(), Vec3::new(0.8, 0.5, 0.9)));
    }

    #[test]
    fn test_lab_lightness_scale() {
        let c = Vec3::new(0.6, 0.3, 0.2);
        let registry = registry_with_color(c);
        let params = ValueContainer::new()
            .with("shader", Value::Shader("src".into()))
            .with("lightness", Value::Float(1.0));
        let mut identity: LabShader = configured(&params, &registry);
        identity.propagate(&Neighborhood::new());
        assert!(close(identity.shade(), c));

        let params = ValueContainer::new().with("sh", Value::Shader("src".into()));
        let mut darker: LabShader = configured(&params, &registry);
        assert_eq!(darker.lightness, 0.75);
        darker.propagate(&Neighborhood::new());
        let d = darker.shade();
        assert!(luminance(d) < luminance(c));
        assert!((rgb_to_lab(d).x - 0.75 * rgb_to_lab(c).x).abs() < 0.1);
    }

    #[test]
    fn test_lookup_per_channel_and_luminance() {
        let mut registry = registry_with_color(Vec3::new(0.0, 1.0, 0.5));
        registry.add_texture("invert", Texture::ramp(&[Vec3::one(), Vec3::zero()]));
        let params = ValueContainer::new()
            .with("shader", Value::Shader("src".into()))
            .with("texture", Value::Texture("invert".into()));
        let mut shader: LookupShader = configured(&params, &registry);
        assert!(shader.missing_children().is_empty());
        shader.propagate(&Neighborhood::new());
        assert!(close(shader.shade(), Vec3::new(1.0, 0.0, 0.5)));

        shader.channels = false;
        let grey = shader.lookup(Vec3::zero());
        assert!(close(grey, Vec3::one()));
    }

    #[test]
    fn test_image_orientation() {
        let mut registry = NodeRegistry::new();
        // Top row red, bottom row blue.
        let data = [[255, 0, 0, 255], [0, 0, 255, 255]].concat();
        registry.add_texture("img", Texture::new(data, 1, 2).unwrap());
        let params = ValueContainer::new()
            .with("texture", Value::Texture("img".into()))
            .with("filter", Value::Str("nearest".into()));
        let mut shader: ImageShader = configured(&params, &registry);

        shader.propagate(&Neighborhood::new().with_st(Vec2::new(0.5, 0.9)));
        assert_eq!(shader.shade(), Vec3::new(1.0, 0.0, 0.0));
        shader.propagate(&Neighborhood::new().with_st(Vec2::new(0.5, 0.1)));
        assert_eq!(shader.shade(), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_missing_texture() {
        let registry = NodeRegistry::new();
        let params = ValueContainer::new().with("texture", Value::Texture("nope".into()));
        let shader: ImageShader = configured(&params, &registry);
        assert_eq!(shader.missing_children(), vec!["texture"]);
    }
}
