//! Colour helpers shared by the shader nodes.
//!
//! Colours are linear RGB triples stored in a `Vec3<f32>`. Nothing in here
//! clamps implicitly; accumulated colours may leave [0, 1] until a node's
//! explicit clamp step.

use vek::Vec3;

pub type Rgb = Vec3<f32>;

pub const BLACK: Rgb = Vec3::new(0.0, 0.0, 0.0);
pub const WHITE: Rgb = Vec3::new(1.0, 1.0, 1.0);

#[inline(always)]
pub fn clamp01(c: Rgb) -> Rgb {
    c.map(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) })
}

#[inline(always)]
pub fn blend(a: Rgb, b: Rgb, t: f32) -> Rgb {
    a + (b - a) * t
}

#[inline(always)]
pub fn luminance(c: Rgb) -> f32 {
    0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z
}

/// Uniform Catmull-Rom segment between `p1` (t = 0) and `p2` (t = 1).
///
/// At `t == 0` the result is exactly `p1`.
#[inline]
pub fn catmull_rom(p0: Rgb, p1: Rgb, p2: Rgb, p3: Rgb, t: f32) -> Rgb {
    let t2 = t * t;
    let t3 = t2 * t;
    (p1 * 2.0
        + (p2 - p0) * t
        + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2
        + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * t3)
        * 0.5
}

/// Converts RGB to HSV. Hue is returned in [0, 1).
pub fn rgb_to_hsv(c: Rgb) -> Vec3<f32> {
    let max = c.x.max(c.y).max(c.z);
    let min = c.x.min(c.y).min(c.z);
    let delta = max - min;

    let mut h = if delta <= f32::EPSILON {
        0.0
    } else if max == c.x {
        ((c.y - c.z) / delta).rem_euclid(6.0)
    } else if max == c.y {
        (c.z - c.x) / delta + 2.0
    } else {
        (c.x - c.y) / delta + 4.0
    };
    h /= 6.0;

    let s = if max <= f32::EPSILON { 0.0 } else { delta / max };
    Vec3::new(h.rem_euclid(1.0), s, max)
}

/// Converts HSV (hue in turns) back to RGB.
pub fn hsv_to_rgb(hsv: Vec3<f32>) -> Rgb {
    let h = hsv.x.rem_euclid(1.0) * 6.0;
    let s = hsv.y;
    let v = hsv.z;

    let c = v * s;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Vec3::new(r + m, g + m, b + m)
}

// D65 reference white and the CIE constants for the Lab transfer function.
const WHITE_X: f32 = 0.950456;
const WHITE_Z: f32 = 1.088754;
const LAB_EPSILON: f32 = 0.008856;
const LAB_KAPPA: f32 = 903.3;

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

#[inline]
fn lab_f_inv(f: f32) -> f32 {
    let t = f * f * f;
    if t > LAB_EPSILON {
        t
    } else {
        (f - 16.0 / 116.0) / 7.787
    }
}

/// Linear RGB to CIE L*a*b*, L in [0, 100].
pub fn rgb_to_lab(c: Rgb) -> Vec3<f32> {
    let x = (0.412453 * c.x + 0.357580 * c.y + 0.180423 * c.z) / WHITE_X;
    let y = 0.212671 * c.x + 0.715160 * c.y + 0.072169 * c.z;
    let z = (0.019334 * c.x + 0.119193 * c.y + 0.950227 * c.z) / WHITE_Z;

    let fy = lab_f(y);
    let l = if y > LAB_EPSILON {
        116.0 * fy - 16.0
    } else {
        LAB_KAPPA * y
    };
    Vec3::new(l, 500.0 * (lab_f(x) - fy), 200.0 * (fy - lab_f(z)))
}

/// CIE L*a*b* back to linear RGB, unclamped.
pub fn lab_to_rgb(lab: Vec3<f32>) -> Rgb {
    let fy = (lab.x + 16.0) / 116.0;
    let y = if lab.x > LAB_KAPPA * LAB_EPSILON {
        fy * fy * fy
    } else {
        lab.x / LAB_KAPPA
    };
    let x = lab_f_inv(lab.y / 500.0 + fy) * WHITE_X;
    let z = lab_f_inv(fy - lab.z / 200.0) * WHITE_Z;

    Vec3::new(
        3.240479 * x - 1.537150 * y - 0.498535 * z,
        -0.969256 * x + 1.875992 * y + 0.041556 * z,
        0.055648 * x - 0.204043 * y + 1.057311 * z,
    )
}

/// Converts a colour to an RGBA8 pixel after clamping.
#[inline(always)]
pub fn to_pixel(c: Rgb) -> [u8; 4] {
    let c = clamp01(c);
    [
        (c.x * 255.0 + 0.5) as u8,
        (c.y * 255.0 + 0.5) as u8,
        (c.z * 255.0 + 0.5) as u8,
        255,
    ]
}
