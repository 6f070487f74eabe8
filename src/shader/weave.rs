use crate::color::{BLACK, Rgb, WHITE};
use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ShaderInput, ShaderNode};
use crate::tiling::TileGrid;
use crate::value::ValueContainer;
use vek::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Thread {
    /// Vertical bar, running along t.
    Warp,
    /// Horizontal bar, running along s.
    Weft,
    Gap,
}

/// Plain over/under weave over (s, t).
///
/// Each tile holds one vertical warp bar and one horizontal weft bar of
/// relative `width`. Where they cross, the warp lies on top in tiles with
/// even `col + row` and the weft on top in odd ones. A bar is darkened
/// towards its edges with a round cross-section profile, applied equally to
/// all three channels.
#[derive(Clone)]
pub struct StWeaveShader {
    n: Neighborhood,
    warp: ShaderInput,
    weft: ShaderInput,
    gap: ShaderInput,
    pub grid: TileGrid,
    pub width: f32,
}

impl Default for StWeaveShader {
    fn default() -> Self {
        Self {
            n: Neighborhood::new(),
            warp: ShaderInput::Color(WHITE),
            weft: ShaderInput::Color(Vec3::new(0.5, 0.5, 0.5)),
            gap: ShaderInput::Color(BLACK),
            grid: TileGrid::new(8.0, 8.0),
            width: 0.8,
        }
    }
}

impl StWeaveShader {
    /// Which thread is visible at the working (s, t), and the brightness of
    /// its cross-section there.
    pub fn thread(&self) -> (Thread, f32) {
        let tile = self.grid.locate(self.n.st);
        let half = self.width * 0.5;
        if half <= 0.0 {
            return (Thread::Gap, 1.0);
        }
        let across_warp = (tile.local.x - 0.5).abs() / half;
        let across_weft = (tile.local.y - 0.5).abs() / half;
        let in_warp = across_warp < 1.0;
        let in_weft = across_weft < 1.0;

        let profile = |d: f32| (1.0 - d * d).max(0.0).sqrt();
        match (in_warp, in_weft) {
            (true, true) if (tile.col + tile.row) % 2 == 0 => (Thread::Warp, profile(across_warp)),
            (true, true) => (Thread::Weft, profile(across_weft)),
            (true, false) => (Thread::Warp, profile(across_warp)),
            (false, true) => (Thread::Weft, profile(across_weft)),
            (false, false) => (Thread::Gap, 1.0),
        }
    }
}

impl ShaderNode for StWeaveShader {
    fn kind(&self) -> &'static str {
        "stweave"
    }

    fn set(&mut self, params: &ValueContainer, registry: &NodeRegistry) {
        self.warp = ShaderInput::from_params(params, "warp", WHITE, registry);
        self.weft = ShaderInput::from_params(params, "weft", Vec3::new(0.5, 0.5, 0.5), registry);
        self.gap = ShaderInput::from_params(params, "gap", BLACK, registry);
        self.grid = TileGrid::new(
            params.get_float_default("sfreq", 8.0),
            params.get_float_default("tfreq", 8.0),
        );
        self.width = params.get_float_default("width", 0.8).clamp(0.0, 1.0);
    }

    fn propagate(&mut self, n: &Neighborhood) {
        self.n = n.clone();
        self.warp.propagate(n);
        self.weft.propagate(n);
        self.gap.propagate(n);
    }

    fn compute(&mut self) -> Rgb {
        let (thread, shade) = self.thread();
        match thread {
            Thread::Warp => self.warp.shade() * shade,
            Thread::Weft => self.weft.shade() * shade,
            Thread::Gap => self.gap.shade(),
        }
    }

    crate::shader_node_state!();
}
