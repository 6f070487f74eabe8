//! Renders a shader over a surface seen head-on, one sample per pixel.

use crate::color::to_pixel;
use crate::error::NodeError;
use crate::geometry::{Geometry, InfoFields, Plane};
use crate::neighborhood::Neighborhood;
use crate::node::{NodeRegistry, ShaderNode};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use vek::Vec2;

#[cfg(not(feature = "single_thread"))]
use rayon::prelude::*;

/// Output parameters, the `[output]` table of a scene file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RenderSettings {
    /// Name of the shader to render.
    pub shader: String,
    pub width: usize,
    pub height: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            shader: "main".into(),
            width: 256,
            height: 256,
        }
    }
}

impl RenderSettings {
    pub fn new(shader: &str, width: usize, height: usize) -> Self {
        Self {
            shader: shader.into(),
            width,
            height,
        }
    }
}

/// The neighborhood of pixel `(x, y)` (y = 0 at the top) on `geometry`.
///
/// The surface parameters run over [0, 1]^2 across the image with t = 0 at
/// the bottom row; screen derivatives are one pixel step in u and v.
pub fn pixel_neighborhood(
    geometry: &Arc<dyn Geometry>,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> Neighborhood {
    let st = Vec2::new(
        (x as f32 + 0.5) / width as f32,
        1.0 - (y as f32 + 0.5) / height as f32,
    );
    let mut n = Neighborhood::new().with_st(st).with_geometry(geometry.clone());
    n.screen = st;
    geometry.neighborhood_info(&mut n, InfoFields::all());
    n.dpdx = n.dpdu / width as f32;
    n.dpdy = -n.dpdv / height as f32;
    n.invalidate_jacobian();
    n.ray_direction = -n.surface_normal;
    n
}

fn shade_row(
    shader: &mut dyn ShaderNode,
    geometry: &Arc<dyn Geometry>,
    y: usize,
    width: usize,
    height: usize,
    line: &mut [u8],
) {
    for (x, pixel) in line.chunks_exact_mut(4).enumerate() {
        let n = pixel_neighborhood(geometry, x, y, width, height);
        shader.propagate(&n);
        pixel.copy_from_slice(&to_pixel(shader.shade()));
    }
}

/// Renders the shader named `settings.shader` into an RGBA8 buffer, rows
/// from top to bottom.
///
/// Each worker shades with its own clone of the shader graph. The surface is
/// the registry's geometry, or the unit plane.
pub fn render_plane(
    registry: &NodeRegistry,
    settings: &RenderSettings,
) -> Result<Vec<u8>, NodeError> {
    let shader = registry
        .shader(&settings.shader)
        .ok_or_else(|| NodeError::UnknownNode {
            name: settings.shader.clone(),
        })?;
    let geometry: Arc<dyn Geometry> = registry
        .geometry()
        .unwrap_or_else(|| Arc::new(Plane::unit()));

    let width = settings.width.max(1);
    let height = settings.height.max(1);
    let mut buffer = vec![0u8; width * height * 4];
    let start = Instant::now();

    #[cfg(not(feature = "single_thread"))]
    buffer
        .par_chunks_exact_mut(width * 4)
        .enumerate()
        .for_each_init(
            || shader.clone(),
            |shader, (y, line)| shade_row(shader.as_mut(), &geometry, y, width, height, line),
        );

    #[cfg(feature = "single_thread")]
    {
        let mut shader = shader;
        for (y, line) in buffer.chunks_exact_mut(width * 4).enumerate() {
            shade_row(shader.as_mut(), &geometry, y, width, height, line);
        }
    }

    debug!(
        "render: '{}' {}x{} in {:?}",
        settings.shader,
        width,
        height,
        start.elapsed()
    );
    Ok(buffer)
}
