//! RGB ↔ HSV conversion used by the block color enhancement.

use crate::types::round_half_up;

/// A color in the HSV color space with every component in `0.0..=1.0`.
///
/// The hue is a fraction of a full turn, not degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    /// Hue as a fraction of a full turn.
    pub h: f64,
    /// Saturation.
    pub s: f64,
    /// Value (brightness).
    pub v: f64,
}

impl Hsv {
    /// Creates a new [`Hsv`] color.
    #[must_use]
    pub const fn new(h: f64, s: f64, v: f64) -> Self {
        Self { h, s, v }
    }

    /// Scales the saturation by `factor`, capping it at `1.0`.
    #[must_use]
    pub fn saturate(self, factor: f64) -> Self {
        Self { s: (self.s * factor).min(1.0), ..self }
    }

    /// Scales the value by `factor`, capping it at `1.0`.
    #[must_use]
    pub fn brighten(self, factor: f64) -> Self {
        Self { v: (self.v * factor).min(1.0), ..self }
    }
}

/// Converts 8-bit RGB into HSV.
///
/// Gray colors (`max == min`) get a hue of `0`, and black gets a saturation of `0`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> Hsv {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;

    let s = if max == 0.0 { 0.0 } else { d / max };

    let h = if d == 0.0 {
        0.0
    } else if max == r {
        ((g - b) / d + if g < b { 6.0 } else { 0.0 }) / 6.0
    } else if max == g {
        ((b - r) / d + 2.0) / 6.0
    } else {
        ((r - g) / d + 4.0) / 6.0
    };

    Hsv { h, s, v: max }
}

/// Converts HSV back into 8-bit RGB, rounding each channel half up.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn hsv_to_rgb(Hsv { h, s, v }: Hsv) -> [u8; 3] {
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    [r, g, b].map(|c| round_half_up(c * 255.0).clamp(0.0, 255.0) as u8)
}
