//! Contains the Floyd–Steinberg palette reducer.
//!
//! Pixels are visited in strict row-major order. Each pixel is replaced by its nearest
//! palette color and the difference is spread over the pixels that have not been visited yet:
//!
//! ```text
//!              *    7/16
//!   3/16     5/16   1/16
//! ```
//!
//! The error is accumulated into a scratch copy of the source, while the chosen colors go
//! into a separate output raster.

use crate::{types::round_half_up, RasterBuffer, RasterError, CHANNELS};
use log::debug;
use palette::Srgb;
use std::time::Instant;

/// Floyd–Steinberg dithering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloydSteinberg(f64);

impl FloydSteinberg {
    /// The default error diffusion factor.
    pub const DEFAULT_ERROR_DIFFUSION: f64 = 1.0;

    /// Creates a new [`FloydSteinberg`] with the default error diffusion factor.
    #[must_use]
    pub const fn new() -> Self {
        Self(Self::DEFAULT_ERROR_DIFFUSION)
    }

    /// Creates a new [`FloydSteinberg`] with the given error diffusion factor.
    ///
    /// For example, a factor of `1.0` diffuses all of the error to the neighboring pixels,
    /// and a factor of `0.0` maps each pixel to its nearest palette color independently.
    ///
    /// This will return `None` if `error_diffusion` is not in the range `0.0..=1.0`.
    #[must_use]
    pub fn with_error_diffusion(error_diffusion: f64) -> Option<Self> {
        if (0.0..=1.0).contains(&error_diffusion) {
            Some(Self(error_diffusion))
        } else {
            None
        }
    }

    /// Gets the error diffusion factor for this [`FloydSteinberg`].
    #[must_use]
    pub const fn error_diffusion(&self) -> f64 {
        self.0
    }
}

impl Default for FloydSteinberg {
    fn default() -> Self {
        Self::new()
    }
}

/// Squared euclidean distance between two RGB colors.
#[inline]
#[must_use]
pub fn squared_distance(x: [u8; 3], y: Srgb<u8>) -> u32 {
    let y = [y.red, y.green, y.blue];
    x.into_iter()
        .zip(y)
        .map(|(a, b)| {
            let d = u32::from(a.abs_diff(b));
            d * d
        })
        .sum()
}

/// Returns the nearest palette color and its index.
///
/// Ties go to the color that comes first in `palette`.
/// Returns `None` if `palette` is empty.
#[must_use]
pub fn nearest_color(palette: &[Srgb<u8>], rgb: [u8; 3]) -> Option<(usize, Srgb<u8>)> {
    palette
        .iter()
        .copied()
        .enumerate()
        .min_by_key(|&(_, color)| squared_distance(rgb, color))
}

/// Adds `weight` times `error` to the RGB channels at `offset`, rounding half up
/// and clamping to `0..=255`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn diffuse(working: &mut [u8], offset: usize, error: [f64; 3], weight: f64) {
    for (c, e) in working[offset..offset + 3].iter_mut().zip(error) {
        *c = round_half_up(f64::from(*c) + e * weight).clamp(0.0, 255.0) as u8;
    }
}

impl FloydSteinberg {
    /// Reduces `source` to the colors in `palette`.
    ///
    /// The output has the same dimensions as `source` and keeps its alpha channel.
    ///
    /// # Errors
    /// Returns [`RasterError::InvalidParameter`] if `palette` is empty.
    pub fn dither(
        &self,
        source: &RasterBuffer,
        palette: &[Srgb<u8>],
    ) -> Result<RasterBuffer, RasterError> {
        if palette.is_empty() {
            return Err(RasterError::InvalidParameter { name: "palette", value: 0 });
        }

        let time = Instant::now();
        let &FloydSteinberg(diffusion) = self;
        let (w, h) = (source.w(), source.h());

        let mut working = source.as_raw().to_vec();
        let mut output = source.clone();
        let data = output.as_raw_mut();

        for y in 0..h {
            for x in 0..w {
                let i = (y * w + x) * CHANNELS;
                let old = [working[i], working[i + 1], working[i + 2]];

                #[allow(clippy::expect_used)]
                let (_, new) = nearest_color(palette, old).expect("palette is not empty");
                let new = [new.red, new.green, new.blue];
                data[i..i + 3].copy_from_slice(&new);

                let error: [f64; 3] =
                    std::array::from_fn(|c| (f64::from(old[c]) - f64::from(new[c])) * diffusion);

                if x + 1 < w {
                    diffuse(&mut working, i + CHANNELS, error, 7.0 / 16.0);
                }
                if y + 1 < h {
                    let below = i + w * CHANNELS;
                    if x > 0 {
                        diffuse(&mut working, below - CHANNELS, error, 3.0 / 16.0);
                    }
                    diffuse(&mut working, below, error, 5.0 / 16.0);
                    if x + 1 < w {
                        diffuse(&mut working, below + CHANNELS, error, 1.0 / 16.0);
                    }
                }
            }
        }

        debug!(
            "dithered {}x{} to {} colors in {}ms",
            source.width(),
            source.height(),
            palette.len(),
            time.elapsed().as_millis()
        );

        Ok(output)
    }
}

/// Reduces `source` to the colors in `palette` using [`FloydSteinberg`] with full error diffusion.
///
/// # Errors
/// Returns [`RasterError::InvalidParameter`] if `palette` is empty.
///
/// # Examples
/// ```
/// # use pixelette::{dither_to_palette, RasterBuffer, RasterError};
/// # use palette::Srgb;
/// # fn main() -> Result<(), RasterError> {
/// let source = RasterBuffer::filled(2, 2, [30, 30, 30, 255])?;
/// let palette = [Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)];
/// let output = dither_to_palette(&source, &palette)?;
/// assert_eq!(output.dimensions(), (2, 2));
/// # Ok(())
/// # }
/// ```
pub fn dither_to_palette(
    source: &RasterBuffer,
    palette: &[Srgb<u8>],
) -> Result<RasterBuffer, RasterError> {
    FloydSteinberg::new().dither(source, palette)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    const BLACK: Srgb<u8> = Srgb::new(0, 0, 0);
    const WHITE: Srgb<u8> = Srgb::new(255, 255, 255);

    #[test]
    fn diffusion_factor_range() {
        assert!(FloydSteinberg::with_error_diffusion(-0.1).is_none());
        assert!(FloydSteinberg::with_error_diffusion(1.1).is_none());
        assert!(FloydSteinberg::with_error_diffusion(f64::NAN).is_none());
        assert_eq!(FloydSteinberg::with_error_diffusion(1.0), Some(FloydSteinberg::new()));
        assert!((FloydSteinberg::default().error_diffusion() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ties_go_to_the_first_color() {
        let gray = Srgb::new(100, 100, 100);
        let light = Srgb::new(200, 200, 200);
        assert_eq!(nearest_color(&[gray, light], [150, 150, 150]), Some((0, gray)));
        assert_eq!(nearest_color(&[light, gray], [150, 150, 150]), Some((0, light)));
        assert_eq!(nearest_color(&[BLACK, BLACK], [9, 9, 9]), Some((0, BLACK)));
        assert_eq!(nearest_color(&[], [9, 9, 9]), None);
    }

    #[test]
    fn mid_gray_against_black_and_white() {
        // 128 is one step closer to 255 than to 0
        assert_eq!(squared_distance([128, 128, 128], BLACK), 3 * 128 * 128);
        assert_eq!(squared_distance([128, 128, 128], WHITE), 3 * 127 * 127);

        let source = RasterBuffer::filled(1, 1, [128, 128, 128, 255]).unwrap();
        let output = dither_to_palette(&source, &[BLACK, WHITE]).unwrap();
        assert_eq!(output.rgba(0, 0), [255, 255, 255, 255]);

        let source = RasterBuffer::filled(1, 1, [127, 128, 127, 255]).unwrap();
        let output = dither_to_palette(&source, &[BLACK, WHITE]).unwrap();
        assert_eq!(output.rgba(0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn empty_palette_is_rejected() {
        let source = RasterBuffer::filled(2, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(
            dither_to_palette(&source, &[]),
            Err(RasterError::InvalidParameter { name: "palette", value: 0 })
        );
    }

    #[test]
    fn exact_match_image_unaffected() {
        let source = noise_raster(17, 11, 3);
        let mut palette = source
            .pixels()
            .iter()
            .map(|p| Srgb::new(p.red, p.green, p.blue))
            .collect::<Vec<_>>();
        palette.sort_by_key(|c| (c.red, c.green, c.blue));
        palette.dedup();

        let output = dither_to_palette(&source, &palette).unwrap();
        assert_eq!(output, source);
    }

    #[test]
    fn error_spreads_to_the_right() {
        let source = RasterBuffer::filled(2, 1, [100, 100, 100, 255]).unwrap();

        // the first pixel maps to black, leaving 100 + 100 * 7/16 = 143.75 -> 144 for the second
        let output = dither_to_palette(&source, &[BLACK, WHITE]).unwrap();
        assert_eq!(output.as_raw(), &[0, 0, 0, 255, 255, 255, 255, 255]);

        // without diffusion both pixels map to black
        let output = FloydSteinberg::with_error_diffusion(0.0)
            .unwrap()
            .dither(&source, &[BLACK, WHITE])
            .unwrap();
        assert_eq!(output.as_raw(), &[0, 0, 0, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn error_spreads_below() {
        // a single column only diffuses straight down, with weight 5/16
        let source = RasterBuffer::filled(1, 2, [100, 100, 100, 255]).unwrap();
        let output = dither_to_palette(&source, &[BLACK, WHITE]).unwrap();
        // 100 + 100 * 5/16 = 131.25 -> 131, which is closer to white
        assert_eq!(output.rgba(0, 1), [255, 255, 255, 255]);

        let source = RasterBuffer::filled(1, 2, [60, 60, 60, 255]).unwrap();
        let output = dither_to_palette(&source, &[BLACK, WHITE]).unwrap();
        // 60 + 60 * 5/16 = 78.75 -> 79
        assert_eq!(output.rgba(0, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn output_uses_palette_and_keeps_alpha() {
        let source = noise_raster(31, 19, 11);
        let palette = [BLACK, WHITE, Srgb::new(255, 0, 0), Srgb::new(0, 0, 255)];
        let output = dither_to_palette(&source, &palette).unwrap();

        assert_eq!(output.dimensions(), source.dimensions());
        for (out, src) in output.pixels().iter().zip(source.pixels()) {
            assert!(palette.contains(&Srgb::new(out.red, out.green, out.blue)));
            assert_eq!(out.alpha, src.alpha);
        }
    }

    #[test]
    fn dithering_is_deterministic() {
        let source = noise_raster(23, 23, 8);
        let palette = [BLACK, WHITE, Srgb::new(120, 60, 30)];
        assert_eq!(
            dither_to_palette(&source, &palette).unwrap(),
            dither_to_palette(&source, &palette).unwrap()
        );
    }
}
