use crate::color::Rgb;
use crate::error::NodeError;
use std::path::Path;
use std::str::FromStr;
use vek::Vec3;

/// Sample mode for texture sampling.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum SampleMode {
    /// Nearest-neighbor sampling
    Nearest,
    /// Linear interpolation sampling
    Linear,
}

impl FromStr for SampleMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nearest" => Ok(SampleMode::Nearest),
            "linear" => Ok(SampleMode::Linear),
            _ => Err(()),
        }
    }
}

/// The repeat mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RepeatMode {
    /// Clamps UVs to [0, 1]
    ClampXY,
    /// Repeats texture in both X and Y
    RepeatXY,
    /// Repeats, flipping every other copy
    MirrorXY,
}

impl FromStr for RepeatMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clamp" => Ok(RepeatMode::ClampXY),
            "repeat" => Ok(RepeatMode::RepeatXY),
            "mirror" => Ok(RepeatMode::MirrorXY),
            _ => Err(()),
        }
    }
}

impl RepeatMode {
    #[inline(always)]
    pub fn wrap(self, c: f32) -> f32 {
        match self {
            RepeatMode::ClampXY => c.clamp(0.0, 1.0),
            RepeatMode::RepeatXY => c - c.floor(),
            RepeatMode::MirrorXY => {
                let m = c.rem_euclid(2.0);
                if m > 1.0 { 2.0 - m } else { m }
            }
        }
    }
}

/// Textures contain RGBA [u8;4] pixels, row 0 at the top.
#[derive(PartialEq, Clone, Debug)]
pub struct Texture {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Default for Texture {
    fn default() -> Self {
        Self::from_color([255, 255, 255, 255])
    }
}

impl Texture {
    /// Creates a new texture with the given width, height and RGBA data.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> Result<Self, NodeError> {
        if width == 0 || height == 0 || data.len() != width * height * 4 {
            return Err(NodeError::Image(format!(
                "texture data of {} bytes does not match {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Texture {
            data,
            width,
            height,
        })
    }

    /// Creates a texture filled with a single color (1x1 texture)
    pub fn from_color(color: [u8; 4]) -> Self {
        Texture {
            data: color.to_vec(),
            width: 1,
            height: 1,
        }
    }

    /// A one row texture holding the given colours left to right, the usual
    /// shape of a colour lookup table.
    pub fn ramp(colors: &[Rgb]) -> Self {
        if colors.is_empty() {
            return Self::default();
        }
        let mut data = Vec::with_capacity(colors.len() * 4);
        for c in colors {
            data.extend_from_slice(&crate::color::to_pixel(*c));
        }
        Texture {
            data,
            width: colors.len(),
            height: 1,
        }
    }

    /// Creates a black and white checkerboard texture
    pub fn checkerboard(size: usize, square_size: usize) -> Self {
        let size = size.max(1);
        let square_size = square_size.max(1);
        let mut data = vec![0; size * size * 4];

        for y in 0..size {
            for x in 0..size {
                let is_white = ((x / square_size) + (y / square_size)) % 2 == 0;
                let color = if is_white {
                    [255, 255, 255, 255]
                } else {
                    [0, 0, 0, 255]
                };

                let idx = (y * size + x) * 4;
                data[idx..idx + 4].copy_from_slice(&color);
            }
        }

        Texture {
            data,
            width: size,
            height: size,
        }
    }

    /// Loads a texture from an image file.
    pub fn from_image(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|err| NodeError::Image(format!("{}: {}", path.display(), err)))?;

        // Convert to RGBA8 format
        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        Texture::new(rgba_img.into_raw(), width as usize, height as usize)
    }

    /// Samples the texture using the specified sampling and repeat mode.
    #[inline]
    pub fn sample(&self, u: f32, v: f32, sample_mode: SampleMode, repeat_mode: RepeatMode) -> Rgb {
        let u = repeat_mode.wrap(if u.is_finite() { u } else { 0.0 });
        let v = repeat_mode.wrap(if v.is_finite() { v } else { 0.0 });
        match sample_mode {
            SampleMode::Nearest => self.sample_nearest(u, v),
            SampleMode::Linear => self.sample_linear(u, v),
        }
    }

    #[inline(always)]
    fn texel(&self, x: usize, y: usize) -> Rgb {
        let idx = (y * self.width + x) * 4;
        Vec3::new(
            self.data[idx] as f32 / 255.0,
            self.data[idx + 1] as f32 / 255.0,
            self.data[idx + 2] as f32 / 255.0,
        )
    }

    #[inline(always)]
    pub fn sample_nearest(&self, u: f32, v: f32) -> Rgb {
        let tx = ((u * self.width as f32).floor() as usize).min(self.width - 1);
        let ty = ((v * self.height as f32).floor() as usize).min(self.height - 1);
        self.texel(tx, ty)
    }

    /// Bilinear sample with texel centres at `(i + 0.5) / width`.
    pub fn sample_linear(&self, u: f32, v: f32) -> Rgb {
        let x = (u * self.width as f32 - 0.5).clamp(0.0, (self.width - 1) as f32);
        let y = (v * self.height as f32 - 0.5).clamp(0.0, (self.height - 1) as f32);

        let x0 = x.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y0 = y.floor() as usize;
        let y1 = (y0 + 1).min(self.height - 1);

        let dx = x - x.floor();
        let dy = y - y.floor();

        let c0 = self.texel(x0, y0) + (self.texel(x1, y0) - self.texel(x0, y0)) * dx;
        let c1 = self.texel(x0, y1) + (self.texel(x1, y1) - self.texel(x0, y1)) * dx;
        c0 + (c1 - c0) * dy
    }
}
