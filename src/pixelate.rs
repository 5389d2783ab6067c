//! Contains the block pixelation pass.
//!
//! The image is tiled into `pixel_size × pixel_size` blocks (clipped at the right and bottom edges),
//! and every pixel of a block is painted with one representative color:
//! - In [`PixelMode::Color`], the block's mean color is saturated in HSV
//!   (more so for blocks with salient features) and then quantized to 6 levels per channel.
//! - In [`PixelMode::Monochrome`], the block's mean intensity minus its mean edge strength
//!   is compared against a threshold that adapts to the block's light/dark balance.
//!
//! Blocks only read the shared source and its feature or edge map, so block rows can be
//! painted in any order (and in parallel) with identical results.

use crate::{
    clamp_store,
    colorspace::{hsv_to_rgb, rgb_to_hsv},
    edges::{detect_edges, EdgeMap},
    features::{detect_features, FeatureMap},
    luma, postprocess,
    types::round_half_up,
    PixelSize, RasterBuffer, CHANNELS,
};
use log::debug;
#[cfg(feature = "threads")]
use rayon::prelude::*;
use std::time::Instant;

/// The number of levels per channel that block colors are quantized to.
pub const QUANTIZE_LEVELS: u8 = 6;

/// The contrast factor applied around mid gray when converting to monochrome.
pub const MONOCHROME_CONTRAST: f64 = 1.2;

/// The mid gray around which contrast is adjusted.
pub const MID_GRAY: f64 = 128.0;

/// How strongly the mean edge value darkens a monochrome block.
pub const EDGE_INFLUENCE: f64 = 1.0;

/// Selects how blocks are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelMode {
    /// Keep (enhanced and quantized) colors.
    #[default]
    Color,
    /// Threshold every block to black or white.
    Monochrome,
}

/// A grid-aligned rectangle of the image that maps to one output color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    /// The x coordinate of the top left pixel.
    pub x: usize,
    /// The y coordinate of the top left pixel.
    pub y: usize,
    /// The number of columns, `min(pixel_size, width - x)`.
    pub width: usize,
    /// The number of rows, `min(pixel_size, height - y)`.
    pub height: usize,
}

impl Block {
    /// The number of pixels in the block.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.width * self.height
    }

    /// Whether the block contains no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The linear pixel indices covered by the block, row by row.
    pub fn indices(self, image_width: usize) -> impl Iterator<Item = usize> {
        (self.y..self.y + self.height).flat_map(move |y| {
            (self.x..self.x + self.width).map(move |x| y * image_width + x)
        })
    }
}

/// Iterates over the blocks of a `width × height` image in row-major order.
pub fn blocks(width: usize, height: usize, pixel_size: PixelSize) -> impl Iterator<Item = Block> {
    let p = pixel_size.as_usize();
    (0..height).step_by(p).flat_map(move |y| {
        (0..width).step_by(p).map(move |x| Block {
            x,
            y,
            width: p.min(width - x),
            height: p.min(height - y),
        })
    })
}

/// Quantizes one channel to [`QUANTIZE_LEVELS`] evenly spaced values.
///
/// Quantizing an already quantized value returns it unchanged.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn quantize_channel(value: u8) -> u8 {
    let steps = f64::from(QUANTIZE_LEVELS - 1);
    let level = round_half_up(f64::from(value) * steps / 255.0);
    round_half_up(level * 255.0 / steps) as u8
}

/// Quantizes each channel of an RGB color with [`quantize_channel`].
#[must_use]
pub fn quantize_color(rgb: [u8; 3]) -> [u8; 3] {
    rgb.map(quantize_channel)
}

/// Saturates (and for salient blocks, brightens) a block's mean color.
///
/// `feature` is `None` when no pixel of the block had a positive feature weight,
/// otherwise it is the normalized feature weight in `0.0..=1.0`.
#[must_use]
pub fn enhance_color(rgb: [u8; 3], feature: Option<f64>) -> [u8; 3] {
    let hsv = rgb_to_hsv(rgb);
    let hsv = match feature {
        Some(weight) => hsv
            .saturate(1.2 + weight * 0.4)
            .brighten(1.0 + weight * 0.2),
        None => hsv.saturate(1.2),
    };
    hsv_to_rgb(hsv)
}

/// Picks the monochrome threshold from the number of light and dark pixels in a block.
#[must_use]
pub fn adaptive_threshold(light: usize, dark: usize) -> f64 {
    if light > 2 * dark {
        140.0
    } else if dark > 2 * light {
        110.0
    } else {
        100.0
    }
}

/// Converts a raster into its contrast-adjusted grayscale version.
///
/// Each of R, G, and B becomes `(luma - 128) * 1.2 + 128`; alpha is kept.
#[must_use]
pub fn monochrome_preprocess(source: &RasterBuffer) -> RasterBuffer {
    let mut gray = source.clone();
    for pixel in gray.as_raw_mut().chunks_exact_mut(CHANNELS) {
        let luma = luma(pixel[0], pixel[1], pixel[2]);
        let value = clamp_store((luma - MID_GRAY) * MONOCHROME_CONTRAST + MID_GRAY);
        pixel[..3].fill(value);
    }
    gray
}

/// The per-image data blocks are computed from.
enum Analysis<'a> {
    /// The source colors and their saliency.
    Color {
        /// The original raster.
        source: &'a RasterBuffer,
        /// Feature weights of `source`.
        features: FeatureMap,
    },
    /// Grayscale intensities and their edges.
    Monochrome {
        /// The contrast adjusted grayscale raster.
        gray: RasterBuffer,
        /// Edges of `gray`.
        edges: EdgeMap,
    },
}

impl<'a> Analysis<'a> {
    fn new(source: &'a RasterBuffer, mode: PixelMode) -> Self {
        let time = Instant::now();
        let analysis = match mode {
            PixelMode::Color => {
                let edges = detect_edges(source);
                let features = detect_features(source, &edges);
                Analysis::Color { source, features }
            }
            PixelMode::Monochrome => {
                let gray = monochrome_preprocess(source);
                let edges = detect_edges(&gray);
                Analysis::Monochrome { gray, edges }
            }
        };
        debug!("{mode:?} analysis took {}ms", time.elapsed().as_millis());
        analysis
    }

    fn block_rgb(&self, block: Block) -> [u8; 3] {
        match self {
            Analysis::Color { source, features } => color_block(source, features, block),
            Analysis::Monochrome { gray, edges } => [monochrome_block(gray, edges, block); 3],
        }
    }

    /// Paints one row of blocks.
    ///
    /// `rows` holds the output channels of the image rows `y..y + rows.len() / (width * 4)`.
    fn paint_block_row(&self, y: usize, rows: &mut [u8], width: usize, pixel_size: PixelSize) {
        let p = pixel_size.as_usize();
        let row_len = width * CHANNELS;
        let height = rows.len() / row_len;

        for x in (0..width).step_by(p) {
            let block = Block {
                x,
                y,
                width: p.min(width - x),
                height,
            };
            let [r, g, b] = self.block_rgb(block);
            let rgba = [r, g, b, u8::MAX];

            let span = x * CHANNELS..(x + block.width) * CHANNELS;
            for row in rows.chunks_exact_mut(row_len) {
                for pixel in row[span.clone()].chunks_exact_mut(CHANNELS) {
                    pixel.copy_from_slice(&rgba);
                }
            }
        }
    }
}

/// The per-channel means of `count` values.
///
/// Sums are kept in `u64`, which holds any block of a raster that fits in memory.
#[allow(clippy::cast_precision_loss)]
fn channel_means<const N: usize>(
    values: impl Iterator<Item = [u8; N]>,
    count: usize,
) -> [f64; N] {
    let mut sum = [0u64; N];
    for value in values {
        for (s, v) in sum.iter_mut().zip(value) {
            *s += u64::from(v);
        }
    }
    let count = count as f64;
    sum.map(|s| s as f64 / count)
}

/// Computes the enhanced and quantized color of a block in color mode.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn color_block(source: &RasterBuffer, features: &FeatureMap, block: Block) -> [u8; 3] {
    let data = source.as_raw();
    let width = source.w();

    let pixels = block
        .indices(width)
        .map(|i| [data[i * CHANNELS], data[i * CHANNELS + 1], data[i * CHANNELS + 2]]);
    let mean = channel_means(pixels, block.len()).map(|m| round_half_up(m) as u8);

    let (has_feature, feature_weight) = block
        .indices(width)
        .map(|i| features.weight(i))
        .filter(|&weight| weight > 0.0)
        .fold((false, 0.0), |(_, sum), weight| (true, sum + weight));

    let count = block.len() as f64;
    let feature = has_feature.then(|| (feature_weight / (count * 3.0)).min(1.0));
    quantize_color(enhance_color(mean, feature))
}

/// Computes the black (`0`) or white (`255`) value of a block in monochrome mode.
#[must_use]
pub fn monochrome_block(gray: &RasterBuffer, edges: &EdgeMap, block: Block) -> u8 {
    let data = gray.as_raw();
    let width = gray.w();

    let values = block
        .indices(width)
        .map(|i| [data[i * CHANNELS], edges.scalar(i)]);
    let [intensity, edge] = channel_means(values, block.len());

    let light = block
        .indices(width)
        .filter(|&i| f64::from(data[i * CHANNELS]) > MID_GRAY)
        .count();
    let dark = block.len() - light;

    let combined = intensity - edge * EDGE_INFLUENCE;
    if combined < adaptive_threshold(light, dark) {
        0
    } else {
        u8::MAX
    }
}

/// Paints every block of `source`, without any post-processing.
#[must_use]
pub fn pixelate_blocks(
    source: &RasterBuffer,
    pixel_size: PixelSize,
    mode: PixelMode,
) -> RasterBuffer {
    let analysis = Analysis::new(source, mode);
    let width = source.w();
    let mut output = source.zeroed_like();

    let time = Instant::now();
    let rows_per_chunk = width * CHANNELS * pixel_size.as_usize();
    for (row, rows) in output.as_raw_mut().chunks_mut(rows_per_chunk).enumerate() {
        analysis.paint_block_row(row * pixel_size.as_usize(), rows, width, pixel_size);
    }
    debug!("block painting took {}ms", time.elapsed().as_millis());

    output
}

/// Paints every block of `source` in parallel, without any post-processing.
#[cfg(feature = "threads")]
#[must_use]
pub fn pixelate_blocks_par(
    source: &RasterBuffer,
    pixel_size: PixelSize,
    mode: PixelMode,
) -> RasterBuffer {
    let analysis = Analysis::new(source, mode);
    let width = source.w();
    let mut output = source.zeroed_like();

    let time = Instant::now();
    let rows_per_chunk = width * CHANNELS * pixel_size.as_usize();
    output
        .as_raw_mut()
        .par_chunks_mut(rows_per_chunk)
        .enumerate()
        .for_each(|(row, rows)| {
            analysis.paint_block_row(row * pixel_size.as_usize(), rows, width, pixel_size);
        });
    debug!("parallel block painting took {}ms", time.elapsed().as_millis());

    output
}

/// Converts `source` into pixel art.
///
/// This runs the full pipeline: feature or edge analysis, block painting, then the
/// post-processing filters for `mode`. The result has the same dimensions as `source`.
#[must_use]
pub fn pixelate(source: &RasterBuffer, pixel_size: PixelSize, mode: PixelMode) -> RasterBuffer {
    debug!(
        "pixelate start w={} h={} pixel_size={pixel_size} mode={mode:?}",
        source.width(),
        source.height()
    );
    let mut output = pixelate_blocks(source, pixel_size, mode);
    postprocess::apply(&mut output, pixel_size, mode);
    output
}

/// Converts `source` into pixel art, painting block rows in parallel.
///
/// The output is identical to [`pixelate`].
#[cfg(feature = "threads")]
#[must_use]
pub fn pixelate_par(
    source: &RasterBuffer,
    pixel_size: PixelSize,
    mode: PixelMode,
) -> RasterBuffer {
    debug!(
        "pixelate_par start w={} h={} pixel_size={pixel_size} mode={mode:?}",
        source.width(),
        source.height()
    );
    let mut output = pixelate_blocks_par(source, pixel_size, mode);
    postprocess::apply(&mut output, pixel_size, mode);
    output
}
