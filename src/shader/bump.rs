use crate::color::Rgb;
use crate::neighborhood::{Neighborhood, facing};
use crate::node::{NodeRegistry, ScalarInput, ScalarNode, ShaderNode, propagate_child, shade_child};
use crate::value::ValueContainer;
use vek::{Vec2, Vec3};

/// Sampling distance used when the neighborhood carries no screen footprint.
const FALLBACK_STEP: f32 = 1e-3;

/// Bump mapping from a scalar height field.
///
/// The height is sampled at `location ± step * tangent` along both surface
/// tangents, with `step` half the smaller world-space pixel step. The two
/// finite-difference tangents `Tu = 2 step tu + N (h+ - h-)` (and `Tv`) span
/// the perturbed surface. Their unit cross product `P` becomes the new
/// surface normal `normalize(Ns + amplitude * P)`, the shade normal is that
/// normal turned against the ray, and the child is shaded with both.
#[derive(Clone)]
pub struct BumpShader {
    n: Neighborhood,
    height: Option<Box<dyn ScalarNode>>,
    amplitude: ScalarInput,
    child: Option<Box<dyn ShaderNode>>,
}

impl Default for BumpShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            height: None,
            amplitude: ScalarInput::Constant(1.0),
            child: None,
        }
    }
}

impl BumpShader {
    /// Height at the working sample moved by `offset` along the tangent
    /// frame (`offset` in world units along `tu` and `tv`).
    fn height_at(&mut self, tu: Vec3<f32>, tv: Vec3<f32>, offset: Vec2<f32>) -> f32 {
        let Some(height) = self.height.as_mut() else {
            return 0.0;
        };
        let mut p = self.n.clone();
        p.location += tu * offset.x + tv * offset.y;
        let du = offset.x / self.n.dpdu.magnitude().max(f32::EPSILON);
        let dv = offset.y / self.n.dpdv.magnitude().max(f32::EPSILON);
        p.st += Vec2::new(du, dv);
        p.uv += Vec2::new(du, dv);
        height.propagate(&p);
        height.evaluate()
    }

    /// The perturbed surface normal at the working sample.
    pub fn perturbed_normal(&mut self) -> Vec3<f32> {
        let surface = self.n.surface_normal.normalized();
        let normal = self.n.shade_normal.normalized();
        if self.height.is_none() {
            return surface;
        }

        let mut step = 0.5 * self.n.min_footprint();
        if !(step.is_finite() && step > 0.0) {
            step = FALLBACK_STEP;
        }
        let tu = self.n.dpdu.normalized();
        let tv = self.n.dpdv.normalized();

        let hu1 = self.height_at(tu, tv, Vec2::new(step, 0.0));
        let hu0 = self.height_at(tu, tv, Vec2::new(-step, 0.0));
        let hv1 = self.height_at(tu, tv, Vec2::new(0.0, step));
        let hv0 = self.height_at(tu, tv, Vec2::new(0.0, -step));

        let du = tu * (2.0 * step) + normal * (hu1 - hu0);
        let dv = tv * (2.0 * step) + normal * (hv1 - hv0);
        let mut perturbed = du.cross(dv).normalized();
        if perturbed.dot(surface) < 0.0 {
            perturbed = -perturbed;
        }

        let bumped = surface + perturbed * self.amplitude.value();
        if bumped.magnitude_squared() <= f32::EPSILON {
            return surface;
        }
        bumped.normalized()
    }
}

impl ShaderNode for BumpShader {
    fn kind(&self) -> &'static str {
        "bump"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.height = registry.resolve_scalar(params, params.first_key(&["height", "scalar"]));
        self.amplitude = ScalarInput::from_params(params, "amplitude", 1.0, registry);
        self.child = registry.resolve_shader(params, "shader");
    }

    fn missing_children(&self) -> Vec<&'static str> {
        if self.height.is_none() { vec!["height"] } else { vec![] }
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        if let Some(height) = self.height.as_mut() {
            height.propagate(n);
        }
        self.amplitude.propagate(n);
        propagate_child(&mut self.child, n);
    }

    fn compute(&mut self) -> Rgb {
        let mut n = self.n.clone();
        n.surface_normal = self.perturbed_normal();
        n.shade_normal = facing(n.surface_normal, n.ray_direction);
        shade_child(&mut self.child, &n)
    }

    crate::shader_node_state!();
}

/// Shades the child with the facet normal in place of the interpolated one.
#[derive(Clone)]
pub struct FacetShader {
    n: Neighborhood,
    child: Option<Box<dyn ShaderNode>>,
}

impl Default for FacetShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            child: None,
        }
    }
}

impl ShaderNode for FacetShader {
    fn kind(&self) -> &'static str {
        "facet"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.child = registry.resolve_shader(params, "shader");
    }

    fn missing_children(&self) -> Vec<&'static str> {
        if self.child.is_none() { vec!["shader"] } else { vec![] }
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        propagate_child(&mut self.child, n);
    }

    fn compute(&mut self) -> Rgb {
        let mut n = self.n.clone();
        n.surface_normal = n.facet_normal;
        n.shade_normal = facing(n.facet_normal, n.ray_direction);
        shade_child(&mut self.child, &n)
    }

    crate::shader_node_state!();
}
