use crate::color::{BLACK, Rgb, WHITE, clamp01};
use crate::light::Light;
use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ShaderInput, ShaderNode};
use crate::value::ValueContainer;
use std::sync::Arc;
use vek::Vec3;

/// Direction towards `light` and its cosine with the shade normal, when the
/// light is on, in front of the surface and not shadowed.
fn reaching(light: &dyn Light, n: &Neighborhood) -> Option<(Vec3<f32>, f32)> {
    if !light.is_on() {
        return None;
    }
    let (dir, distance) = light.direction(n);
    let ndotl = n.shade_normal.dot(dir);
    if ndotl < 0.0 {
        return None;
    }
    if light.shadow_seeking() && !light.visible(n, dir, distance) {
        return None;
    }
    Some((dir, ndotl))
}

/// Summed intensity of the lights reaching `n`, without any cosine term.
pub fn incident_light(lights: &[Arc<dyn Light>], n: &Neighborhood) -> Rgb {
    lights
        .iter()
        .filter_map(|light| reaching(light.as_ref(), n).map(|(dir, _)| light.intensity(n, dir)))
        .fold(BLACK, |sum, intensity| sum + intensity)
}

/// Ambient, Lambert diffuse and Blinn specular lighting of a surface colour
/// over the scene's lights, clamped to [0, 1].
///
/// The shade normal is turned towards the viewer first. Lights that are off,
/// lie behind the surface, or fail their shadow query contribute nothing.
#[derive(Clone)]
pub struct LightingShader {
    n: Neighborhood,
    surface: ShaderInput,
    lights: Vec<Arc<dyn Light>>,
    pub ambient: Rgb,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl Default for LightingShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            surface: ShaderInput::Color(WHITE),
            lights: vec![],
            ambient: Vec3::broadcast(0.1),
            diffuse: 1.0,
            specular: 0.0,
            shininess: 20.0,
        }
    }
}

impl LightingShader {
    pub fn with_lights(mut self, lights: Vec<Arc<dyn Light>>) -> Self {
        self.lights = lights;
        self
    }
}

impl ShaderNode for LightingShader {
    fn kind(&self) -> &'static str {
        "lighting"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.surface = if params.get_shader_ref("shader").is_some() {
            ShaderInput::from_params(params, "shader", WHITE, registry)
        } else {
            ShaderInput::from_params(params, "color", WHITE, registry)
        };
        self.lights = registry.lights().to_vec();
        self.ambient = match params.get_float("ambient") {
            Some(a) => Vec3::broadcast(a),
            None => params.get_vec3_default("ambient", Vec3::broadcast(0.1)),
        };
        self.diffuse = params.get_float_default("diffuse", 1.0);
        self.specular = params.get_float_default("specular", 0.0);
        self.shininess = params.get_float_default("shininess", 20.0);
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        self.surface.propagate(n);
    }

    fn compute(&mut self) -> Rgb {
        let base = self.surface.shade();
        let mut n = self.n.clone();
        n.face_forward();
        let n = &n;
        let normal = n.shade_normal;

        let mut color = base * self.ambient;
        for light in &self.lights {
            let Some((dir, ndotl)) = reaching(light.as_ref(), n) else {
                continue;
            };
            let intensity = light.intensity(n, dir);
            color += base * intensity * (self.diffuse * ndotl);

            if self.specular > 0.0 {
                let half = (dir - n.ray_direction).normalized();
                let ndoth = normal.dot(half).max(0.0);
                color += intensity * (self.specular * ndoth.powf(self.shininess));
            }
        }
        clamp01(color)
    }

    crate::shader_node_state!();
}

fn faced(n: &Neighborhood) -> Neighborhood {
    let mut n = n.clone();
    n.face_forward();
    n
}

/// Blends from `shadow` to `light` by the clamped sum of the light arriving
/// at the surface. With the default black and white inputs the result is the
/// light intensity itself.
#[derive(Clone)]
pub struct ShadowShader {
    n: Neighborhood,
    lit: ShaderInput,
    shadow: ShaderInput,
    lights: Vec<Arc<dyn Light>>,
}

impl Default for ShadowShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            lit: ShaderInput::Color(WHITE),
            shadow: ShaderInput::Color(BLACK),
            lights: vec![],
        }
    }
}

impl ShaderNode for ShadowShader {
    fn kind(&self) -> &'static str {
        "shadow"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.lit = ShaderInput::from_params(params, "light", WHITE, registry);
        self.shadow = ShaderInput::from_params(params, "shadow", BLACK, registry);
        self.lights = registry.lights().to_vec();
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        self.lit.propagate(n);
        self.shadow.propagate(n);
    }

    fn compute(&mut self) -> Rgb {
        let amount = clamp01(incident_light(&self.lights, &faced(&self.n)));
        let lit = self.lit.shade();
        let shadow = self.shadow.shade();
        shadow + (lit - shadow) * amount
    }

    crate::shader_node_state!();
}

/// The light arriving at the surface averaged over every light in the scene,
/// including those that are off or blocked. Black without lights.
#[derive(Clone, Default)]
pub struct LightContributionShader {
    n: Neighborhood,
    lights: Vec<Arc<dyn Light>>,
}

impl ShaderNode for LightContributionShader {
    fn kind(&self) -> &'static str {
        "lightcontribution"
    }

    fn set(&mut self, _params: &ValueContainer, registry: &NodeRegistry) {
        self.lights = registry.lights().to_vec();
    }

    fn compute(&mut self) -> Rgb {
        if self.lights.is_empty() {
            return BLACK;
        }
        let sum = incident_light(&self.lights, &faced(&self.n));
        clamp01(sum / self.lights.len() as f32)
    }

    crate::shader_node_state!();
}
