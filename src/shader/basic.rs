use crate::color::{Rgb, WHITE, blend};
use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ScalarInput, ShaderNode};
use crate::value::ValueContainer;
use std::str::FromStr;
use vek::Vec3;

/// A constant colour.
#[derive(Clone)]
pub struct ColorShader {
    n: Neighborhood,
    pub color: Rgb,
}

impl Default for ColorShader {
    fn default() -> Self {
        Self::new(WHITE)
    }
}

impl ColorShader {
    pub fn new(color: Rgb) -> Self {
        Self {
            n: Neighborhood::new(),
            color,
        }
    }
}

impl ShaderNode for ColorShader {
    fn kind(&self) -> &'static str {
        "color"
    }

    fn set(&mut self, params: &ValueContainer, _registry: &NodeRegistry) {
        self.color = params.get_vec3_default("color", WHITE);
    }

    fn compute(&mut self) -> Rgb {
        self.color
    }

    crate::shader_node_state!();
}

/// Maps a scalar onto the `low..high` colour ramp.
#[derive(Clone)]
pub struct ScalarColorShader {
    n: Neighborhood,
    scalar: ScalarInput,
    pub low: Rgb,
    pub high: Rgb,
}

impl Default for ScalarColorShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            scalar: ScalarInput::Constant(0.0),
            low: Vec3::zero(),
            high: WHITE,
        }
    }
}

impl ShaderNode for ScalarColorShader {
    fn kind(&self) -> &'static str {
        "scalarcolor"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.scalar = ScalarInput::from_params(params, "scalar", 0.0, registry);
        self.low = params.get_vec3_default("low", Vec3::zero());
        self.high = params.get_vec3_default("high", WHITE);
    }

    fn missing_children(&self) -> Vec<&'static str> {
        if self.scalar.is_node() {
            vec![]
        } else {
            vec!["scalar"]
        }
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        self.scalar.propagate(n);
    }

    fn compute(&mut self) -> Rgb {
        let t = self.scalar.value().clamp(0.0, 1.0);
        blend(self.low, self.high, t)
    }

    crate::shader_node_state!();
}

/// What the debug shader visualizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DebugMode {
    #[default]
    Normal,
    Facet,
    Surface,
    St,
    Uv,
    Barycentric,
    Location,
    Facing,
    Jacobian,
}

impl FromStr for DebugMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(DebugMode::Normal),
            "facet" => Ok(DebugMode::Facet),
            "surface" => Ok(DebugMode::Surface),
            "st" => Ok(DebugMode::St),
            "uv" => Ok(DebugMode::Uv),
            "barycentric" => Ok(DebugMode::Barycentric),
            "location" => Ok(DebugMode::Location),
            "facing" => Ok(DebugMode::Facing),
            "jacobian" => Ok(DebugMode::Jacobian),
            _ => Err(()),
        }
    }
}

/// Renders one neighborhood field as a colour.
#[derive(Clone, Default)]
pub struct DebugShader {
    n: Neighborhood,
    pub mode: DebugMode,
}

#[inline]
fn signed_to_color(v: Vec3<f32>) -> Rgb {
    v * 0.5 + 0.5
}

impl ShaderNode for DebugShader {
    fn kind(&self) -> &'static str {
        "debug"
    }

    fn set(&mut self, params: &ValueContainer, _registry: &NodeRegistry) {
        self.mode = params
            .get_str("mode")
            .and_then(|m| m.parse().ok())
            .unwrap_or_default();
    }

    fn compute(&mut self) -> Rgb {
        let n = &mut self.n;
        match self.mode {
            DebugMode::Normal => signed_to_color(n.shade_normal),
            DebugMode::Facet => signed_to_color(n.facet_normal),
            DebugMode::Surface => signed_to_color(n.surface_normal),
            DebugMode::St => Vec3::new(n.st.x, n.st.y, 0.0),
            DebugMode::Uv => Vec3::new(n.uv.x, n.uv.y, 0.0),
            DebugMode::Barycentric => n.barycentric,
            DebugMode::Location => n.location.map(|c| c - c.floor()),
            DebugMode::Facing => {
                if n.is_backfacing() {
                    Vec3::new(1.0, 0.0, 0.0)
                } else {
                    Vec3::new(0.0, 1.0, 0.0)
                }
            }
            DebugMode::Jacobian => {
                let j = n.uv_jacobian();
                let scale = n.max_footprint().max(f32::EPSILON);
                // Pixel steps in uv, normalized by the world footprint.
                Vec3::new(
                    (j.du_dx.abs() + j.du_dy.abs()) / scale,
                    (j.dv_dx.abs() + j.dv_dy.abs()) / scale,
                    0.0,
                ) * 0.5
            }
        }
    }

    crate::shader_node_state!();
}
