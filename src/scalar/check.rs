use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ScalarNode};
use crate::tiling::TileGrid;
use crate::value::ValueContainer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{PI, SQRT_2, TAU};
use vek::Vec2;

/// Checkerboard over (s, t): 0 on tiles with even `col + row`, 1 on odd.
///
/// With `random` each tile instead carries its own random value, drawn once
/// at configuration time. With `polar` the grid is laid over
/// (radius, angle) around the centre of the unit square: the radius is
/// scaled so the corners reach one and the angle runs over [0, 1].
#[derive(Clone)]
pub struct CheckScalar {
    n: Neighborhood,
    pub grid: TileGrid,
    pub polar: bool,
    values: Option<Vec<f32>>,
}

impl Default for CheckScalar {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            grid: TileGrid::default(),
            polar: false,
            values: None,
        }
    }
}

impl CheckScalar {
    /// `st` mapped to polar coordinates.
    pub fn polar_coords(st: Vec2<f32>) -> Vec2<f32> {
        let a = (st.x - 0.5) * 2.0;
        let b = (st.y - 0.5) * 2.0;
        let radius = (a * a + b * b).sqrt() / SQRT_2;
        Vec2::new(radius, (a.atan2(b) + PI) / TAU)
    }
}

impl ScalarNode for CheckScalar {
    fn kind(&self) -> &'static str {
        "check"
    }

    fn set(&mut self, params: &ValueContainer, _registry: &NodeRegistry) {
        self.grid = TileGrid::new(
            params.get_float_default(params.first_key(&["sfreq", "theSFreq"]), 1.0),
            params.get_float_default(params.first_key(&["tfreq", "theTFreq"]), 1.0),
        );
        self.polar = params.get_bool_default(params.first_key(&["polar", "doPolar"]), false);
        self.values = if params.get_bool_default(params.first_key(&["random", "doRandom"]), false) {
            let mut rng = match params.get_float("seed") {
                Some(seed) => StdRng::seed_from_u64(seed as u64),
                None => StdRng::seed_from_u64(rand::rng().random()),
            };
            Some((0..self.grid.len()).map(|_| rng.random::<f32>()).collect())
        } else {
            None
        };
    }

    fn evaluate(&mut self) -> f32 {
        let st = if self.polar {
            Self::polar_coords(self.n.st)
        } else {
            self.n.st
        };
        let tile = self.grid.locate(st);
        self.evaluate_tile(tile.col, tile.row)
    }

    fn evaluate_tile(&mut self, col: usize, row: usize) -> f32 {
        match &self.values {
            Some(values) => values[self.grid.index(col, row)],
            None => ((col + row) % 2) as f32,
        }
    }

    crate::scalar_node_state!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::configured;
    use crate::value::Value;

    #[test]
    fn test_parity() {
        let registry = NodeRegistry::new();
        let params = ValueContainer::new()
            .with("sfreq", Value::Float(4.0))
            .with("tfreq", Value::Float(4.0));
        let mut check: CheckScalar = configured(&params, &registry);

        let mut at = |s: f32, t: f32| {
            check.propagate(&Neighborhood::new().with_st(Vec2::new(s, t)));
            check.evaluate()
        };
        assert_eq!(at(0.1, 0.1), 0.0);
        assert_eq!(at(0.3, 0.1), 1.0);
        assert_eq!(at(0.3, 0.3), 0.0);
        assert_eq!(at(1.1, 0.1), 0.0);
    }

    #[test]
    fn test_zero_frequency_is_single_tile() {
        let registry = NodeRegistry::new();
        let params = ValueContainer::new().with("sfreq", Value::Float(0.0));
        let check: CheckScalar = configured(&params, &registry);
        assert_eq!(check.grid.cols, 1);
    }

    #[test]
    fn test_original_keys_and_defaults() {
        let registry = NodeRegistry::new();
        let check: CheckScalar = configured(&ValueContainer::new(), &registry);
        assert_eq!(check.grid, TileGrid::new(1.0, 1.0));

        let params = ValueContainer::new()
            .with("theSFreq", Value::Float(3.0))
            .with("theTFreq", Value::Float(2.0));
        let check: CheckScalar = configured(&params, &registry);
        assert_eq!(check.grid, TileGrid::new(3.0, 2.0));
    }

    #[test]
    fn test_polar_rings() {
        let registry = NodeRegistry::new();
        let params = ValueContainer::new()
            .with("doPolar", Value::Str("yes".into()))
            .with("sfreq", Value::Float(2.0));
        let mut check: CheckScalar = configured(&params, &registry);

        assert!(CheckScalar::polar_coords(Vec2::new(0.5, 0.5)).x.abs() < 1e-6);
        assert!((CheckScalar::polar_coords(Vec2::new(1.0, 1.0)).x - 1.0).abs() < 1e-6);

        // Near the centre the radius is below one half: the even ring.
        check.propagate(&Neighborhood::new().with_st(Vec2::new(0.55, 0.5)));
        assert_eq!(check.evaluate(), 0.0);
        // Near a corner it is above one half: the odd ring.
        check.propagate(&Neighborhood::new().with_st(Vec2::new(0.95, 0.95)));
        assert_eq!(check.evaluate(), 1.0);
    }

    #[test]
    fn test_random_values_per_tile() {
        let registry = NodeRegistry::new();
        let params = ValueContainer::new()
            .with("doRandom", Value::Str("yes".into()))
            .with("sfreq", Value::Float(3.0))
            .with("tfreq", Value::Float(3.0))
            .with("seed", Value::Float(4.0));
        let mut check: CheckScalar = configured(&params, &registry);
        let mut again: CheckScalar = configured(&params, &registry);

        let values: Vec<f32> = (0..9).map(|i| check.evaluate_tile(i % 3, i / 3)).collect();
        assert!(values.iter().all(|v| (0.0..1.0).contains(v)));
        assert!(values.iter().any(|v| *v != values[0]));
        for (i, v) in values.iter().enumerate() {
            assert_eq!(again.evaluate_tile(i % 3, i / 3), *v);
        }

        let center = check.grid.center(2, 1);
        check.propagate(&Neighborhood::new().with_st(center));
        assert_eq!(check.evaluate(), values[5]);
    }
}
