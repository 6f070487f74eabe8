//! Shaders that pick or combine other shaders.

use crate::color::{BLACK, Rgb, WHITE, blend, catmull_rom, clamp01};
use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ScalarInput, ScalarNode, ShaderInput, ShaderNode};
use crate::value::{Value, ValueContainer};
use log::warn;

/// The entries a [`SelectShader`] chooses from.
#[derive(Clone)]
pub enum Palette {
    Colors(Vec<Rgb>),
    Shaders(Vec<Box<dyn ShaderNode>>),
}

impl Default for Palette {
    fn default() -> Self {
        Palette::Colors(vec![])
    }
}

impl Palette {
    pub fn len(&self) -> usize {
        match self {
            Palette::Colors(c) => c.len(),
            Palette::Shaders(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shaders listed under `key`, or else the colours listed there.
    pub fn from_params(params: &ValueContainer, key: &str, registry: &NodeRegistry) -> Self {
        let shaders = registry.resolve_shader_list(params, key);
        if !shaders.is_empty() {
            return Palette::Shaders(shaders);
        }
        Palette::Colors(
            params
                .get_list(key)
                .into_iter()
                .filter_map(|v| match v {
                    Value::Vec3(c) => Some((*c).into()),
                    _ => None,
                })
                .collect(),
        )
    }

    pub fn propagate(&mut self, n: &Neighborhood) {
        if let Palette::Shaders(shaders) = self {
            for shader in shaders {
                shader.propagate(n);
            }
        }
    }

    /// Entry `index` wrapped around the palette. Shaders are evaluated with
    /// their already propagated neighborhood.
    pub(crate) fn entry(&mut self, index: isize) -> Rgb {
        let i = index.rem_euclid(self.len() as isize) as usize;
        match self {
            Palette::Colors(c) => c[i],
            Palette::Shaders(s) => s[i].shade(),
        }
    }
}

/// Selects from a palette of colours or shaders by a scalar in [0, 1).
///
/// The selector is scaled by the palette size N and truncated to pick an
/// entry. In spline mode with more than four entries the result is instead a
/// Catmull-Rom segment through the cyclic neighbours `i-1, i, i+1, i+2`,
/// parameterized by the fractional part, so that a selector exactly on a
/// knot reproduces that entry.
#[derive(Clone, Default)]
pub struct SelectShader {
    n: Neighborhood,
    selector: Option<Box<dyn ScalarNode>>,
    pub palette: Palette,
    pub spline: bool,
}

impl SelectShader {
    /// Entry index and fractional position for a selector value. Selectors
    /// at or above one land on the last entry with no fractional part.
    pub fn knot(&self, selector: f32) -> (usize, f32) {
        let count = self.palette.len();
        if count == 0 {
            return (0, 0.0);
        }
        let s = if selector.is_finite() { selector.clamp(0.0, 1.0) } else { 0.0 };
        let x = s * count as f32;
        let index = x.floor() as usize;
        if index >= count {
            return (count - 1, 0.0);
        }
        (index, (x - index as f32).clamp(0.0, 1.0))
    }
}

impl ShaderNode for SelectShader {
    fn kind(&self) -> &'static str {
        "select"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.selector = registry.resolve_scalar(params, "selector");
        self.spline = params.get_bool_default("spline", false);

        let shaders = registry.resolve_shader_list(params, "shader");
        self.palette = if !shaders.is_empty() {
            if params.contains("color") {
                warn!("select: both colours and shaders given, using the shaders");
            }
            Palette::Shaders(shaders)
        } else {
            Palette::from_params(params, "color", registry)
        };
    }

    fn missing_children(&self) -> Vec<&'static str> {
        let mut missing = vec![];
        if self.selector.is_none() {
            missing.push("selector");
        }
        if self.palette.is_empty() {
            missing.push("color");
        }
        missing
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        if let Some(selector) = self.selector.as_mut() {
            selector.propagate(n);
        }
        self.palette.propagate(n);
    }

    fn compute(&mut self) -> Rgb {
        if self.palette.is_empty() {
            return self.n.color;
        }
        let value = self.selector.as_mut().map_or(0.0, |s| s.evaluate());
        let (index, frac) = self.knot(value);
        let i = index as isize;

        if self.spline && self.palette.len() > 4 {
            let p0 = self.palette.entry(i - 1);
            let p1 = self.palette.entry(i);
            let p2 = self.palette.entry(i + 1);
            let p3 = self.palette.entry(i + 2);
            clamp01(catmull_rom(p0, p1, p2, p3, frac))
        } else {
            self.palette.entry(i)
        }
    }

    crate::shader_node_state!();
}

/// Linear blend `a + (b - a) * amount`.
#[derive(Clone)]
pub struct MixShader {
    n: Neighborhood,
    a: ShaderInput,
    b: ShaderInput,
    amount: ScalarInput,
}

impl Default for MixShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            a: ShaderInput::Color(BLACK),
            b: ShaderInput::Color(WHITE),
            amount: ScalarInput::Constant(0.5),
        }
    }
}

impl ShaderNode for MixShader {
    fn kind(&self) -> &'static str {
        "mix"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.a = ShaderInput::from_params(params, "a", BLACK, registry);
        self.b = ShaderInput::from_params(params, "b", WHITE, registry);
        self.amount = ScalarInput::from_params(params, "amount", 0.5, registry);
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        self.a.propagate(n);
        self.b.propagate(n);
        self.amount.propagate(n);
    }

    fn compute(&mut self) -> Rgb {
        let t = self.amount.value().clamp(0.0, 1.0);
        blend(self.a.shade(), self.b.shade(), t)
    }

    crate::shader_node_state!();
}

/// `out` on the side the surface normal points to, `in` on the other.
#[derive(Clone)]
pub struct InOutShader {
    n: Neighborhood,
    inside: ShaderInput,
    outside: ShaderInput,
}

impl Default for InOutShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            inside: ShaderInput::Color(BLACK),
            outside: ShaderInput::Color(WHITE),
        }
    }
}

impl ShaderNode for InOutShader {
    fn kind(&self) -> &'static str {
        "inout"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        let inside = params.first_key(&["in", "theInside"]);
        let outside = params.first_key(&["out", "theOutside"]);
        self.inside = ShaderInput::from_params(params, inside, BLACK, registry);
        self.outside = ShaderInput::from_params(params, outside, WHITE, registry);
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        self.inside.propagate(n);
        self.outside.propagate(n);
    }

    fn compute(&mut self) -> Rgb {
        if self.n.is_backfacing() {
            self.inside.shade()
        } else {
            self.outside.shade()
        }
    }

    crate::shader_node_state!();
}
