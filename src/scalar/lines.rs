use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ScalarNode};
use crate::smoothstep;
use crate::tiling::TileGrid;
use crate::value::ValueContainer;

/// Soft 0..1 mask of the band along a value's edge: 1 below `edge - fuzz`,
/// 0 above `edge + fuzz`.
#[inline]
fn edge_mask(d: f32, edge: f32, fuzz: f32) -> f32 {
    1.0 - smoothstep(edge - fuzz, edge + fuzz, d)
}

/// Wireframe mask: 1 near the edges of the hit triangle.
#[derive(Clone)]
pub struct BarycentricScalar {
    n: Neighborhood,
    pub width: f32,
    pub fuzz: f32,
}

impl Default for BarycentricScalar {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            width: 0.05,
            fuzz: 0.01,
        }
    }
}

impl ScalarNode for BarycentricScalar {
    fn kind(&self) -> &'static str {
        "barycentric"
    }

    fn set(&mut self, params: &ValueContainer, _registry: &NodeRegistry) {
        self.width = params.get_float_default(params.first_key(&["width", "theTolerance"]), 0.05);
        self.fuzz = params
            .get_float_default(params.first_key(&["fuzz", "theFuzz"]), 0.01)
            .max(0.0);
    }

    fn evaluate(&mut self) -> f32 {
        let b = self.n.barycentric;
        let m = b.x.min(b.y).min(b.z);
        edge_mask(m, self.width, self.fuzz)
    }

    crate::scalar_node_state!();
}

/// Lines of a parametric grid: 1 on the lines, 0 between them. `width` is
/// the line width as a fraction of a cell.
#[derive(Clone)]
pub struct GridLinesScalar {
    n: Neighborhood,
    pub grid: TileGrid,
    pub width: f32,
    pub fuzz: f32,
}

impl Default for GridLinesScalar {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            grid: TileGrid::new(10.0, 10.0),
            width: 0.05,
            fuzz: 0.0,
        }
    }
}

impl ScalarNode for GridLinesScalar {
    fn kind(&self) -> &'static str {
        "gridlines"
    }

    fn set(&mut self, params: &ValueContainer, _registry: &NodeRegistry) {
        self.grid = TileGrid::new(
            params.get_float_default(params.first_key(&["sfreq", "theUfreq"]), 10.0),
            params.get_float_default(params.first_key(&["tfreq", "theVfreq"]), 10.0),
        );
        self.width = params
            .get_float_default(params.first_key(&["width", "theTolerance"]), 0.05)
            .max(0.0);
        self.fuzz = params.get_float_default("fuzz", 0.0).max(0.0);
    }

    fn evaluate(&mut self) -> f32 {
        let local = self.grid.locate(self.n.st).local;
        let dx = local.x.min(1.0 - local.x);
        let dy = local.y.min(1.0 - local.y);
        let half = self.width * 0.5;
        edge_mask(dx, half, self.fuzz).max(edge_mask(dy, half, self.fuzz))
    }

    crate::scalar_node_state!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::configured;
    use crate::value::Value;
    use vek::{Vec2, Vec3};

    #[test]
    fn test_barycentric_edges() {
        let registry = NodeRegistry::new();
        let mut bary: BarycentricScalar = configured(&ValueContainer::new(), &registry);

        let mut n = Neighborhood::new();
        n.barycentric = Vec3::new(0.01, 0.49, 0.5);
        bary.propagate(&n);
        assert_eq!(bary.evaluate(), 1.0);

        n.barycentric = Vec3::new(0.3, 0.3, 0.4);
        bary.propagate(&n);
        assert_eq!(bary.evaluate(), 0.0);
    }

    #[test]
    fn test_grid_lines() {
        let registry = NodeRegistry::new();
        let params = ValueContainer::new()
            .with("sfreq", Value::Float(4.0))
            .with("tfreq", Value::Float(4.0))
            .with("width", Value::Float(0.1));
        let mut lines: GridLinesScalar = configured(&params, &registry);

        lines.propagate(&Neighborhood::new().with_st(Vec2::new(0.251, 0.6)));
        assert_eq!(lines.evaluate(), 1.0);
        lines.propagate(&Neighborhood::new().with_st(Vec2::new(0.375, 0.625)));
        assert_eq!(lines.evaluate(), 0.0);
    }

    #[test]
    fn test_original_keys() {
        let registry = NodeRegistry::new();
        let params = ValueContainer::new()
            .with("theTolerance", Value::Float(0.2))
            .with("theFuzz", Value::Float(0.0));
        let bary: BarycentricScalar = configured(&params, &registry);
        assert_eq!((bary.width, bary.fuzz), (0.2, 0.0));

        let params = params
            .with("theUfreq", Value::Float(3.0))
            .with("theVfreq", Value::Float(5.0));
        let lines: GridLinesScalar = configured(&params, &registry);
        assert_eq!(lines.grid, TileGrid::new(3.0, 5.0));
        assert_eq!(lines.width, 0.2);
    }
}
