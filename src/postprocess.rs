//! Stylization filters applied in place after block pixelation.
//!
//! The filters run in a fixed order, see [`apply`].
//! The contrast stretch needs the luma range of the whole image,
//! so nothing here can start before every block has been painted.

use crate::{
    clamp_store, luma, pixelate::MID_GRAY, types::round_half_up, PixelMode, PixelSize,
    RasterBuffer, CHANNELS,
};
use log::{debug, trace};

/// The factor block boundary pixels are multiplied by in [`darken_block_edges`].
pub const EDGE_DARKEN_FACTOR: f64 = 0.92;

/// The contrast factor of [`stretch_contrast`].
pub const CONTRAST_FACTOR: f64 = 1.2;

/// [`stretch_contrast`] does nothing if the luma range is smaller than this.
pub const MIN_LUMA_RANGE: f64 = 30.0;

/// Isolated block smoothing is skipped for pixel sizes below this.
pub const MIN_SMOOTHING_PIXEL_SIZE: u32 = 4;

/// Runs every filter that applies to `mode`, in order:
/// 1. [`darken_block_edges`] (color only)
/// 2. [`stretch_contrast`]
/// 3. [`warm_tone`] (color only)
/// 4. [`smooth_isolated_blocks`] (monochrome only)
pub fn apply(raster: &mut RasterBuffer, pixel_size: PixelSize, mode: PixelMode) {
    if mode == PixelMode::Color {
        darken_block_edges(raster, pixel_size);
    }

    let stretched = stretch_contrast(raster);
    if !stretched {
        debug!("skipped contrast stretch: luma range below {MIN_LUMA_RANGE}");
    }

    match mode {
        PixelMode::Color => warm_tone(raster),
        PixelMode::Monochrome => {
            let repainted = smooth_isolated_blocks(raster, pixel_size);
            debug!("repainted {repainted} isolated blocks");
        }
    }
}

/// Darkens every pixel on a block boundary (`x` or `y` a multiple of `pixel_size`),
/// except for the outer one pixel frame of the image.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn darken_block_edges(raster: &mut RasterBuffer, pixel_size: PixelSize) {
    let (w, h) = (raster.w(), raster.h());
    let p = pixel_size.as_usize();
    let data = raster.as_raw_mut();

    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            if x % p != 0 && y % p != 0 {
                continue;
            }
            let i = (y * w + x) * CHANNELS;
            for c in &mut data[i..i + 3] {
                *c = (f64::from(*c) * EDGE_DARKEN_FACTOR).floor() as u8;
            }
        }
    }
}

/// Returns the smallest and largest luma in the raster.
#[must_use]
pub fn luma_range(raster: &RasterBuffer) -> (f64, f64) {
    raster
        .as_raw()
        .chunks_exact(CHANNELS)
        .map(|p| luma(p[0], p[1], p[2]))
        .fold((255.0, 0.0), |(min, max), l| (f64::min(min, l), f64::max(max, l)))
}

/// Scales every channel away from mid gray by [`CONTRAST_FACTOR`].
///
/// Returns `false` (leaving the raster untouched) when the luma range is below
/// [`MIN_LUMA_RANGE`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn stretch_contrast(raster: &mut RasterBuffer) -> bool {
    let (min, max) = luma_range(raster);
    trace!("luma range {min}..={max}");
    if max - min < MIN_LUMA_RANGE {
        return false;
    }

    for pixel in raster.as_raw_mut().chunks_exact_mut(CHANNELS) {
        for c in &mut pixel[..3] {
            let value = (f64::from(*c) - MID_GRAY) * CONTRAST_FACTOR + MID_GRAY;
            *c = round_half_up(value).clamp(0.0, 255.0) as u8;
        }
    }

    true
}

/// Pushes colors towards a warm, slightly crushed palette.
///
/// Red and green are raised a little and blue is lowered, then bright channels (`> 180`)
/// get brighter and dark channels (`< 80`) get darker.
pub fn warm_tone(raster: &mut RasterBuffer) {
    for pixel in raster.as_raw_mut().chunks_exact_mut(CHANNELS) {
        pixel[0] = clamp_store(f64::from(pixel[0]) * 1.05);
        pixel[1] = clamp_store(f64::from(pixel[1]) * 1.02);
        pixel[2] = clamp_store(f64::from(pixel[2]) * 0.95);

        for c in &mut pixel[..3] {
            if *c > 180 {
                *c = clamp_store(f64::from(*c) * 1.05);
            } else if *c < 80 {
                *c = clamp_store(f64::from(*c) * 0.95);
            }
        }
    }
}

/// Repaints monochrome blocks that disagree strongly with their neighbors.
///
/// Each block from the second row and column on is compared against the blocks one
/// step up, left, down, and right (when inside the image). With at least three
/// neighbors, a black block whose neighbors average above 200 or a white block whose
/// neighbors average below 50 takes on the neighbors' majority value.
///
/// Blocks are visited in row-major order and see earlier repaints.
/// Returns the number of repainted blocks.
pub fn smooth_isolated_blocks(raster: &mut RasterBuffer, pixel_size: PixelSize) -> usize {
    if pixel_size.get() < MIN_SMOOTHING_PIXEL_SIZE {
        return 0;
    }

    let (w, h) = (raster.w(), raster.h());
    let p = pixel_size.as_usize();
    let mut repainted = 0;

    for y in (p..h).step_by(p) {
        for x in (p..w).step_by(p) {
            let value = |x: usize, y: usize| raster.as_raw()[(y * w + x) * CHANNELS];
            let current = value(x, y);

            let neighbors = [
                Some((x, y - p)),
                (y + p < h).then_some((x, y + p)),
                Some((x - p, y)),
                (x + p < w).then_some((x + p, y)),
            ];

            let (count, sum) = neighbors
                .into_iter()
                .flatten()
                .fold((0u32, 0u32), |(count, sum), (nx, ny)| {
                    (count + 1, sum + u32::from(value(nx, ny)))
                });

            if count < 3 {
                continue;
            }

            let average = f64::from(sum) / f64::from(count);
            let isolated =
                (current == 0 && average > 200.0) || (current == u8::MAX && average < 50.0);
            if !isolated {
                continue;
            }

            let fill = if average > 128.0 { u8::MAX } else { 0 };
            let data = raster.as_raw_mut();
            for by in y..(y + p).min(h) {
                for bx in x..(x + p).min(w) {
                    let i = (by * w + bx) * CHANNELS;
                    data[i..i + 3].fill(fill);
                }
            }
            repainted += 1;
        }
    }

    repainted
}
