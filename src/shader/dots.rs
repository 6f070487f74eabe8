use crate::color::{BLACK, Rgb, WHITE, blend};
use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ScalarNode, ShaderInput, ShaderNode};
use crate::shader::Palette;
use crate::smoothstep;
use crate::tiling::{TileGrid, frequency_or_one};
use crate::value::ValueContainer;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vek::{Vec2, Vec3};

/// One soft dot per tile over a background.
///
/// Dot centres sit in the middle of their tile unless `xoffset`/`yoffset`
/// scalars are given. Those are queried per tile through
/// [`ScalarNode::evaluate_tile`] (a quantized scalar is the usual choice),
/// and shift the centre by `jitter * (offset - 0.5)` tile widths. A shifted
/// dot may reach into the neighbouring tiles, so the eight tiles around the
/// sample are tested as well as its own.
#[derive(Clone)]
pub struct DotsShader {
    n: Neighborhood,
    dot: ShaderInput,
    background: ShaderInput,
    xoffset: Option<Box<dyn ScalarNode>>,
    yoffset: Option<Box<dyn ScalarNode>>,
    pub grid: TileGrid,
    pub radius: f32,
    pub fuzz: f32,
    pub jitter: f32,
}

impl Default for DotsShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            dot: ShaderInput::Color(WHITE),
            background: ShaderInput::Color(Vec3::zero()),
            xoffset: None,
            yoffset: None,
            grid: TileGrid::default(),
            radius: 0.35,
            fuzz: 0.025,
            jitter: 0.5,
        }
    }
}

impl DotsShader {
    /// Dot centre inside tile `(col, row)`, in tile-local coordinates.
    fn center(&mut self, col: usize, row: usize) -> Vec2<f32> {
        let offset = |scalar: &mut Option<Box<dyn ScalarNode>>| match scalar {
            Some(s) => self.jitter * (s.evaluate_tile(col, row) - 0.5),
            None => 0.0,
        };
        let dx = offset(&mut self.xoffset);
        let dy = offset(&mut self.yoffset);
        Vec2::new(0.5 + dx, 0.5 + dy)
    }

    /// Coverage of the dots at the working (s, t), in [0, 1]. Each dot is
    /// opaque inside `radius - fuzz` and clear beyond `radius`; overlapping
    /// dots combine as `1 - Π(1 - coverage)`.
    pub fn mask(&mut self) -> f32 {
        let tile = self.grid.locate(self.n.st);
        let cols = self.grid.cols as isize;
        let rows = self.grid.rows as isize;

        let mut clear = 1.0;
        for dr in -1isize..=1 {
            for dc in -1isize..=1 {
                let col = (tile.col as isize + dc).rem_euclid(cols) as usize;
                let row = (tile.row as isize + dr).rem_euclid(rows) as usize;
                let center = self.center(col, row) + Vec2::new(dc as f32, dr as f32);
                let dist = tile.local.distance(center);
                clear *= smoothstep(self.radius - self.fuzz, self.radius, dist);
                if clear <= 0.0 {
                    return 1.0;
                }
            }
        }
        1.0 - clear
    }
}

impl ShaderNode for DotsShader {
    fn kind(&self) -> &'static str {
        "dots"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.dot = ShaderInput::from_params(params, params.first_key(&["dot", "shader"]), WHITE, registry);
        self.background = ShaderInput::from_params(params, "background", Vec3::zero(), registry);
        self.xoffset = registry.resolve_scalar(params, params.first_key(&["xoffset", "sOffset"]));
        self.yoffset = registry.resolve_scalar(params, params.first_key(&["yoffset", "tOffset"]));
        self.grid = TileGrid::new(
            params.get_float_default("sfreq", 1.0),
            params.get_float_default("tfreq", 1.0),
        );
        self.radius = params.get_float_default("radius", 0.35);
        self.fuzz = params.get_float_default("fuzz", 0.025).max(0.0);
        self.jitter = params.get_float_default("jitter", 0.5);
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        self.dot.propagate(n);
        self.background.propagate(n);
        for scalar in [&mut self.xoffset, &mut self.yoffset].into_iter().flatten() {
            scalar.propagate(n);
        }
    }

    fn compute(&mut self) -> Rgb {
        let mask = self.mask();
        if mask >= 1.0 {
            return self.dot.shade();
        }
        if mask <= 0.0 {
            return self.background.shade();
        }
        let background = self.background.shade();
        let dot = self.dot.shade();
        blend(background, dot, mask)
    }

    crate::shader_node_state!();
}

/// Disks of randomly chosen colours, layered over a background.
///
/// Every tile owns one disk centred on the tile centre plus the per-tile
/// `sOffset`/`tOffset` values, in (s, t) units. Each tile draws a palette
/// entry once at configuration time; without a palette the `shader` input
/// colours all disks. Disks are composited in tile order, each with opacity
/// `(1 - smoothstep(radius - fuzz, radius, d)) * opacity`. Distances are
/// measured after stretching s by the aspect ratio when it exceeds one, or
/// shrinking t by it otherwise.
#[derive(Clone)]
pub struct DotDeluxeShader {
    n: Neighborhood,
    palette: Palette,
    indices: Vec<usize>,
    disk: ShaderInput,
    background: ShaderInput,
    s_offset: Option<Box<dyn ScalarNode>>,
    t_offset: Option<Box<dyn ScalarNode>>,
    pub grid: TileGrid,
    pub radius: f32,
    pub fuzz: f32,
    pub opacity: f32,
    pub aspect: f32,
}

impl Default for DotDeluxeShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            palette: Palette::default(),
            indices: vec![],
            disk: ShaderInput::Color(WHITE),
            background: ShaderInput::Color(BLACK),
            s_offset: None,
            t_offset: None,
            grid: TileGrid::default(),
            radius: 0.35,
            fuzz: 0.025,
            opacity: 1.0,
            aspect: 1.0,
        }
    }
}

impl DotDeluxeShader {
    /// Palette entry drawn for tile `(col, row)`.
    pub fn palette_index(&self, col: usize, row: usize) -> Option<usize> {
        self.indices.get(self.grid.index(col, row)).copied()
    }

    fn stretch(&self, p: Vec2<f32>) -> Vec2<f32> {
        if self.aspect > 1.0 {
            Vec2::new(p.x * self.aspect, p.y)
        } else {
            Vec2::new(p.x, p.y / self.aspect)
        }
    }

    fn disk_center(&mut self, col: usize, row: usize) -> Vec2<f32> {
        let mut center = self.grid.center(col, row);
        if let Some(s) = self.s_offset.as_mut() {
            center.x += s.evaluate_tile(col, row);
        }
        if let Some(t) = self.t_offset.as_mut() {
            center.y += t.evaluate_tile(col, row);
        }
        center
    }

    fn disk_color(&mut self, col: usize, row: usize) -> Rgb {
        match self.palette_index(col, row) {
            Some(index) => self.palette.entry(index as isize),
            None => self.disk.shade(),
        }
    }
}

impl ShaderNode for DotDeluxeShader {
    fn kind(&self) -> &'static str {
        "dotdeluxe"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.palette = Palette::from_params(params, "color", registry);
        self.disk = ShaderInput::from_params(params, "shader", WHITE, registry);
        self.background = ShaderInput::from_params(params, "background", BLACK, registry);
        self.s_offset = registry.resolve_scalar(params, params.first_key(&["soffset", "sOffset"]));
        self.t_offset = registry.resolve_scalar(params, params.first_key(&["toffset", "tOffset"]));
        self.grid = TileGrid::new(
            params.get_float_default("sfreq", 1.0),
            params.get_float_default("tfreq", 1.0),
        );
        self.radius = params.get_float_default("radius", 0.35);
        self.fuzz = params.get_float_default("fuzz", 0.025).max(0.0);
        self.opacity = params.get_float_default("opacity", 1.0).clamp(0.0, 1.0);
        self.aspect =
            frequency_or_one(params.get_float_default(params.first_key(&["aspect", "aspectRatio"]), 1.0));

        self.indices = if self.palette.is_empty() {
            vec![]
        } else {
            let mut rng = match params.get_float("seed") {
                Some(seed) => StdRng::seed_from_u64(seed as u64),
                None => StdRng::seed_from_u64(rand::rng().random()),
            };
            let count = self.palette.len();
            (0..self.grid.len()).map(|_| rng.random_range(0..count)).collect()
        };
        debug!(
            "dotdeluxe: {}x{} disks over {} palette entries",
            self.grid.cols,
            self.grid.rows,
            self.palette.len()
        );
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        self.palette.propagate(n);
        self.disk.propagate(n);
        self.background.propagate(n);
        for scalar in [&mut self.s_offset, &mut self.t_offset].into_iter().flatten() {
            scalar.propagate(n);
        }
    }

    fn compute(&mut self) -> Rgb {
        let here = self.stretch(self.n.st);
        let mut color = self.background.shade();
        for row in 0..self.grid.rows {
            for col in 0..self.grid.cols {
                let center = self.disk_center(col, row);
                let dist = here.distance(self.stretch(center));
                let coverage =
                    (1.0 - smoothstep(self.radius - self.fuzz, self.radius, dist)) * self.opacity;
                if coverage <= 0.0 {
                    continue;
                }
                let disk = self.disk_color(col, row);
                color = blend(color, disk, coverage);
            }
        }
        color
    }

    crate::shader_node_state!();
}
