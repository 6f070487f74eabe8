//! Gradient noise and the bias/gain shaping curves.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use vek::Vec3;

#[inline(always)]
fn noise_interpolate(x: f32) -> f32 {
    // u = x^3 * (x * (6x - 15) + 10)
    let x2 = x * x;
    x2 * x * (x * (x * 6.0 - 15.0) + 10.0)
}

#[inline(always)]
fn mixf(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline(always)]
fn grad(hash: u8, x: f32, y: f32, z: f32) -> f32 {
    // 12 cube-edge gradients, padded to 16
    match hash & 15 {
        0 | 12 => x + y,
        1 | 14 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x + z,
        5 => -x + z,
        6 => x - z,
        7 => -x - z,
        8 => y + z,
        9 | 13 => -y + z,
        10 => y - z,
        _ => -y - z,
    }
}

/// 3D gradient noise over a shuffled 256 entry permutation.
#[derive(Clone)]
pub struct GradientNoise {
    perm: [u8; 512],
}

impl Default for GradientNoise {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GradientNoise {
    pub fn new(seed: u64) -> Self {
        let mut base: Vec<u8> = (0..=255).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        base.shuffle(&mut rng);

        let mut perm = [0u8; 512];
        for i in 0..512 {
            perm[i] = base[i & 255];
        }
        Self { perm }
    }

    #[inline(always)]
    fn hash(&self, x: i32, y: i32, z: i32) -> u8 {
        let p = &self.perm;
        let a = p[(x & 255) as usize] as usize;
        let b = p[(a + (y & 255) as usize) & 511] as usize;
        p[(b + (z & 255) as usize) & 511]
    }

    /// Signed noise in roughly [-1, 1], zero at every lattice point.
    pub fn signed(&self, p: Vec3<f32>) -> f32 {
        let pf = p.map(|c| c.floor());
        let xi = pf.x as i32;
        let yi = pf.y as i32;
        let zi = pf.z as i32;

        let fx = p.x - pf.x;
        let fy = p.y - pf.y;
        let fz = p.z - pf.z;

        let u = noise_interpolate(fx);
        let v = noise_interpolate(fy);
        let w = noise_interpolate(fz);

        let g = |dx: i32, dy: i32, dz: i32| -> f32 {
            grad(
                self.hash(xi + dx, yi + dy, zi + dz),
                fx - dx as f32,
                fy - dy as f32,
                fz - dz as f32,
            )
        };

        let x00 = mixf(g(0, 0, 0), g(1, 0, 0), u);
        let x10 = mixf(g(0, 1, 0), g(1, 1, 0), u);
        let x01 = mixf(g(0, 0, 1), g(1, 0, 1), u);
        let x11 = mixf(g(0, 1, 1), g(1, 1, 1), u);

        let y0 = mixf(x00, x10, v);
        let y1 = mixf(x01, x11, v);

        mixf(y0, y1, w).clamp(-1.0, 1.0)
    }

    /// Noise remapped to [0, 1].
    #[inline]
    pub fn unsigned(&self, p: Vec3<f32>) -> f32 {
        (self.signed(p) * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

const SHAPE_EPS: f32 = 1e-4;

/// Perlin's bias curve: `bias(0.5, b) == b`, monotonic on [0, 1].
#[inline]
pub fn bias(x: f32, b: f32) -> f32 {
    let b = b.clamp(SHAPE_EPS, 1.0 - SHAPE_EPS);
    if x <= 0.0 {
        return 0.0;
    }
    x.powf(b.ln() / 0.5f32.ln())
}

/// Perlin's gain curve: an S-curve around 0.5, identity at `g == 0.5`.
#[inline]
pub fn gain(x: f32, g: f32) -> f32 {
    if x < 0.5 {
        bias(2.0 * x, 1.0 - g) * 0.5
    } else {
        1.0 - bias(2.0 - 2.0 * x, 1.0 - g) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_zero_on_lattice() {
        let noise = GradientNoise::new(7);
        for i in -3..3 {
            let v = noise.signed(Vec3::new(i as f32, 2.0, -1.0));
            assert!(v.abs() < 1e-6);
        }
    }

    #[test]
    fn test_noise_range_and_determinism() {
        let a = GradientNoise::new(3);
        let b = GradientNoise::new(3);
        for i in 0..500 {
            let p = Vec3::new(i as f32 * 0.173, i as f32 * 0.071, i as f32 * 0.031);
            let v = a.unsigned(p);
            assert!((0.0..=1.0).contains(&v));
            assert_eq!(v, b.unsigned(p));
        }
    }

    #[test]
    fn test_bias_gain_fixed_points() {
        assert!((bias(0.5, 0.3) - 0.3).abs() < 1e-5);
        assert!((gain(0.5, 0.8) - 0.5).abs() < 1e-5);
        assert!((gain(0.25, 0.5) - 0.25).abs() < 1e-5);
        assert_eq!(bias(0.0, 0.7), 0.0);
        assert!((bias(1.0, 0.7) - 1.0).abs() < 1e-6);
    }
}
