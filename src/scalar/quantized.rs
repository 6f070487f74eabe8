//! Tile quantization of a child scalar.
//!
//! The (s, t) plane is cut into `floor(sfreq) x floor(tfreq)` tiles. On first
//! use the child is sampled once at every tile centre, with geometry queried
//! from the owning surface at that centre, and the results are cached for
//! the node's lifetime. Optionally a permutation table built at configuration
//! time redirects each tile to a random cache slot; collisions are allowed,
//! so neighbouring tiles may repeat values.

use crate::geometry::InfoFields;
use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ScalarNode};
use crate::tiling::TileGrid;
use crate::value::ValueContainer;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vek::Vec3;

/// Lazily built per-tile values. Cloning yields an empty cache, so a cloned
/// node samples its child again instead of sharing the original's values.
#[derive(Default)]
struct TileCache {
    values: Option<Vec<f32>>,
}

impl Clone for TileCache {
    fn clone(&self) -> Self {
        Self { values: None }
    }
}

#[derive(Clone)]
pub struct QuantizedScalar {
    n: Neighborhood,
    pub grid: TileGrid,
    /// Displacement added to each tile centre's location before sampling.
    pub offset: Vec3<f32>,
    child: Option<Box<dyn ScalarNode>>,
    permutation: Option<Vec<usize>>,
    cache: TileCache,
}

impl Default for QuantizedScalar {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            grid: TileGrid::default(),
            offset: Vec3::zero(),
            child: None,
            permutation: None,
            cache: TileCache::default(),
        }
    }
}

impl QuantizedScalar {
    pub fn new(child: Box<dyn ScalarNode>, sfreq: f32, tfreq: f32) -> Self {
        Self {
            grid: TileGrid::new(sfreq, tfreq),
            child: Some(child),
            ..Default::default()
        }
    }

    /// Builds the slot permutation with the given generator.
    pub fn randomize(&mut self, rng: &mut impl Rng) {
        let count = self.grid.len();
        self.permutation = Some((0..count).map(|_| rng.random_range(0..count)).collect());
    }

    pub fn is_randomized(&self) -> bool {
        self.permutation.is_some()
    }

    /// Whether the tile cache has been built.
    pub fn is_built(&self) -> bool {
        self.cache.values.is_some()
    }

    /// Cache slot serving the given tile.
    pub fn slot(&self, col: usize, row: usize) -> usize {
        let index = self.grid.index(col, row);
        match &self.permutation {
            Some(perm) => perm[index],
            None => index,
        }
    }

    fn build(&mut self) -> Vec<f32> {
        let mut values = Vec::with_capacity(self.grid.len());
        let Some(child) = self.child.as_mut() else {
            return vec![0.0; self.grid.len()];
        };

        for row in 0..self.grid.rows {
            for col in 0..self.grid.cols {
                let mut tile = self.n.clone();
                let center = self.grid.center(col, row);
                tile.st = center;
                tile.uv = center;
                tile.invalidate_jacobian();
                if let Some(geometry) = tile.geometry.clone() {
                    geometry.neighborhood_info(&mut tile, InfoFields::all());
                }
                tile.location += self.offset;
                child.propagate(&tile);
                values.push(child.evaluate());
            }
        }
        debug!(
            "quantized: built {}x{} tile cache",
            self.grid.cols, self.grid.rows
        );
        values
    }
}

impl ScalarNode for QuantizedScalar {
    fn kind(&self) -> &'static str {
        "quantized"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.grid = TileGrid::new(
            params.get_float_default("sfreq", 1.0),
            params.get_float_default("tfreq", 1.0),
        );
        let mut offset = params.get_vec3_default("offset", Vec3::zero());
        for (axis, key) in ["xoffset", "yoffset", "zoffset"].into_iter().enumerate() {
            if let Some(value) = params.get_float(key) {
                offset[axis] = value;
            }
        }
        self.offset = offset;
        self.child = registry.resolve_scalar(params, "scalar");
        self.cache = TileCache::default();
        self.permutation = None;

        if params.get_bool_default("randomize", false) {
            let mut rng = match params.get_float("seed") {
                Some(seed) => StdRng::seed_from_u64(seed as u64),
                None => StdRng::seed_from_u64(rand::rng().random()),
            };
            self.randomize(&mut rng);
        }
    }

    fn missing_children(&self) -> Vec<&'static str> {
        if self.child.is_none() {
            vec!["scalar"]
        } else {
            vec![]
        }
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        if let Some(child) = self.child.as_mut() {
            child.propagate(n);
        }
    }

    fn evaluate(&mut self) -> f32 {
        let tile = self.grid.locate(self.n.st);
        self.evaluate_tile(tile.col, tile.row)
    }

    fn evaluate_tile(&mut self, col: usize, row: usize) -> f32 {
        if self.cache.values.is_none() {
            let values = self.build();
            self.cache.values = Some(values);
        }
        let slot = self.slot(col, row);
        self.cache
            .values
            .as_ref()
            .and_then(|values| values.get(slot))
            .copied()
            .unwrap_or(0.0)
    }

    crate::scalar_node_state!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::testing::{
        CountingScalar, LocationScalar, StochasticScalar, plane_sample,
    };
    use crate::value::Value;
    use std::sync::atomic::Ordering;

    fn registry_with(name: &str, node: Box<dyn ScalarNode>) -> NodeRegistry {
        let mut registry = NodeRegistry::new();
        registry.insert_scalar(name, node);
        registry
    }

    fn quantized(registry: &NodeRegistry, params: ValueContainer) -> QuantizedScalar {
        let mut q = QuantizedScalar::default();
        q.set(&params.with("scalar", Value::Scalar("child".into())), registry);
        q
    }

    #[test]
    fn test_samples_child_once_per_tile() {
        let (counter, calls) = CountingScalar::new(0.7);
        let registry = registry_with("child", Box::new(counter));
        let mut q = quantized(
            &registry,
            ValueContainer::new()
                .with("sfreq", Value::Float(4.0))
                .with("tfreq", Value::Float(3.0)),
        );

        q.propagate(&plane_sample(0.5, 0.5, 0.0));
        assert!(!q.is_built());
        assert_eq!(q.evaluate(), 0.7);
        assert!(q.is_built());
        assert_eq!(calls.load(Ordering::SeqCst), 12);

        for row in 0..3 {
            for col in 0..4 {
                q.evaluate_tile(col, row);
            }
        }
        assert_eq!(calls.load(Ordering::SeqCst), 12);
    }

    #[test]
    fn test_cache_is_idempotent_with_stochastic_child() {
        let registry = registry_with("child", Box::new(StochasticScalar::default()));
        let mut q = quantized(
            &registry,
            ValueContainer::new()
                .with("sfreq", Value::Float(5.0))
                .with("tfreq", Value::Float(5.0)),
        );
        q.propagate(&plane_sample(0.0, 0.0, 0.0));
        let first: Vec<f32> = (0..25).map(|i| q.evaluate_tile(i % 5, i / 5)).collect();
        let second: Vec<f32> = (0..25).map(|i| q.evaluate_tile(i % 5, i / 5)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_tile_value_is_child_at_center_plus_offset() {
        let registry = registry_with("child", Box::new(LocationScalar::default()));
        let offset = Vec3::new(0.0, 0.0, 0.5);
        let mut q = quantized(
            &registry,
            ValueContainer::new()
                .with("sfreq", Value::Float(4.0))
                .with("tfreq", Value::Float(2.0))
                .with("offset", Value::Vec3([0.0, 0.0, 0.5])),
        );
        // The sample point itself is irrelevant: tile geometry comes from
        // the plane, not from the calling neighborhood.
        q.propagate(&plane_sample(0.9, 0.1, 0.0));

        for row in 0..2 {
            for col in 0..4 {
                let center = q.grid.center(col, row);
                let expected =
                    LocationScalar::encode(Vec3::new(center.x, center.y, 0.0) + offset);
                assert!((q.evaluate_tile(col, row) - expected).abs() < 1e-5);
            }
        }

        // The continuous path agrees with the explicit tile address.
        q.propagate(&plane_sample(0.6, 0.7, 0.0));
        assert_eq!(q.evaluate(), q.evaluate_tile(2, 1));
    }

    #[test]
    fn test_per_axis_offsets_override_vector() {
        let registry = registry_with("child", Box::new(LocationScalar::default()));
        let q = quantized(
            &registry,
            ValueContainer::new()
                .with("offset", Value::Vec3([1.0, 2.0, 3.0]))
                .with("yoffset", Value::Float(0.5))
                .with("zoffset", Value::Float(-1.0)),
        );
        assert_eq!(q.offset, Vec3::new(1.0, 0.5, -1.0));

        let q = quantized(&registry, ValueContainer::new().with("xoffset", Value::Float(0.25)));
        assert_eq!(q.offset, Vec3::new(0.25, 0.0, 0.0));
    }

    #[test]
    fn test_randomized_permutation_shape() {
        let registry = registry_with("child", Box::new(LocationScalar::default()));
        let mut q = quantized(
            &registry,
            ValueContainer::new()
                .with("sfreq", Value::Float(3.7))
                .with("tfreq", Value::Float(2.2))
                .with("randomize", Value::Str("yes".into()))
                .with("seed", Value::Float(11.0)),
        );
        assert!(q.is_randomized());
        assert_eq!(q.grid.len(), 6);
        q.propagate(&plane_sample(0.0, 0.0, 0.0));

        for row in 0..2 {
            for col in 0..3 {
                let slot = q.slot(col, row);
                assert!(slot < 6);
                let center = q.grid.center(slot % 3, slot / 3);
                let expected = LocationScalar::encode(Vec3::new(center.x, center.y, 0.0));
                assert!((q.evaluate_tile(col, row) - expected).abs() < 1e-5);
            }
        }

        // Same seed, same table.
        let r = quantized(
            &registry,
            ValueContainer::new()
                .with("sfreq", Value::Float(3.0))
                .with("tfreq", Value::Float(2.0))
                .with("randomize", Value::Bool(true))
                .with("seed", Value::Float(11.0)),
        );
        for i in 0..6 {
            assert_eq!(q.slot(i % 3, i / 3), r.slot(i % 3, i / 3));
        }
    }

    #[test]
    fn test_reset_rebuilds_and_clone_gets_own_cache() {
        let (counter, calls) = CountingScalar::new(0.2);
        let registry = registry_with("child", Box::new(counter));
        let params = ValueContainer::new().with("sfreq", Value::Float(2.0));
        let mut q = quantized(&registry, params.clone());
        q.propagate(&plane_sample(0.0, 0.0, 0.0));
        q.evaluate();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let mut copy = q.clone();
        assert!(!copy.is_built());
        copy.propagate(&plane_sample(0.0, 0.0, 0.0));
        copy.evaluate();
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        q.set(&params.with("scalar", Value::Scalar("child".into())), &registry);
        assert!(!q.is_built());
        q.propagate(&plane_sample(0.0, 0.0, 0.0));
        q.evaluate();
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }
}
