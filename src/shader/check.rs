use crate::color::Rgb;
use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ShaderNode};
use crate::tiling::TileGrid;
use crate::value::ValueContainer;

/// Checkerboard of shaders.
///
/// Tile `(col, row)` is shaded by entry `(row * cols + col) % len` of the
/// shader list, so with `sfreq = 3, tfreq = 2` entries 0..=2 cover the bottom
/// row from left to right and 3..=5 the top row. Each child sees (s, t) local
/// to its tile unless `tilecoords` is turned off.
#[derive(Clone)]
pub struct CheckShader {
    n: Neighborhood,
    shaders: Vec<Box<dyn ShaderNode>>,
    pub grid: TileGrid,
    pub tile_coords: bool,
}

impl Default for CheckShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            shaders: vec![],
            grid: TileGrid::default(),
            tile_coords: true,
        }
    }
}

impl CheckShader {
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}

impl ShaderNode for CheckShader {
    fn kind(&self) -> &'static str {
        "checkshader"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.shaders = registry.resolve_shader_list(params, params.first_key(&["shader", "theColor"]));
        self.grid = TileGrid::new(
            params.get_float_default(params.first_key(&["sfreq", "theSFreq"]), 1.0),
            params.get_float_default(params.first_key(&["tfreq", "theTFreq"]), 1.0),
        );
        self.tile_coords = params.get_bool_default("tilecoords", true);
    }

    fn missing_children(&self) -> Vec<&'static str> {
        if self.shaders.is_empty() { vec!["shader"] } else { vec![] }
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        for shader in &mut self.shaders {
            shader.propagate(n);
        }
    }

    fn compute(&mut self) -> Rgb {
        if self.shaders.is_empty() {
            return self.n.color;
        }
        let tile = self.grid.locate(self.n.st);
        let index = self.grid.index(tile.col, tile.row) % self.shaders.len();
        let shader = &mut self.shaders[index];
        if self.tile_coords {
            let mut n = self.n.clone();
            n.st = tile.local;
            n.invalidate_jacobian();
            shader.propagate(&n);
        }
        shader.shade()
    }

    crate::shader_node_state!();
}
