//! Heuristic per-pixel saliency used to bias block colors towards faces and outlines.
//!
//! Each cue is an independent scoring function, and [`combine`] adds them up
//! into one weight. None of this is a trained detector: it only nudges how
//! strongly a block gets enhanced.

use crate::{edges::EdgeMap, RasterBuffer, CHANNELS};

/// How much the mean edge magnitude contributes to the weight.
pub const EDGE_WEIGHT: f64 = 0.3;

/// The weight added for skin-toned pixels.
pub const SKIN_WEIGHT: f64 = 0.5;

/// The weight added for dark, high contrast pixels.
pub const EYE_WEIGHT: f64 = 0.8;

/// How much the normalized local contrast contributes to the weight.
pub const CONTRAST_WEIGHT: f64 = 0.3;

/// A per-pixel, non-negative importance weight.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMap {
    /// The width of the source raster.
    width: u32,
    /// The height of the source raster.
    height: u32,
    /// Weights indexed by `y * width + x`.
    weights: Vec<f64>,
}

impl FeatureMap {
    /// The width of the map in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The height of the map in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// All weights, indexed by `y * width + x`.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// The weight at linear pixel index `i`.
    #[inline]
    #[must_use]
    pub fn weight(&self, i: usize) -> f64 {
        self.weights[i]
    }

    /// Creates a map with the given weights.
    #[cfg(test)]
    pub(crate) fn from_weights(width: u32, height: u32, weights: Vec<f64>) -> Self {
        assert_eq!(weights.len(), width as usize * height as usize);
        Self { width, height, weights }
    }
}

/// A rough skin tone test on raw RGB.
#[must_use]
pub fn is_skin([r, g, b]: [u8; 3]) -> bool {
    r > 95 && g > 40 && b > 20 && r > g && r > b && r.abs_diff(g) > 15
}

/// The mean, over the 8-connected neighborhood, of the largest per-channel difference
/// between the center and each neighbor.
///
/// `(x, y)` must be an interior pixel.
#[must_use]
pub fn local_contrast(source: &RasterBuffer, x: usize, y: usize) -> f64 {
    let data = source.as_raw();
    let w = source.w();
    let i = (y * w + x) * CHANNELS;

    let mut contrast = 0u32;
    for ny in (y - 1)..=(y + 1) {
        for nx in (x - 1)..=(x + 1) {
            if nx == x && ny == y {
                continue;
            }
            let j = (ny * w + nx) * CHANNELS;
            let diff = (0..3)
                .map(|c| data[i + c].abs_diff(data[j + c]))
                .max()
                .unwrap_or(0);
            contrast += u32::from(diff);
        }
    }

    f64::from(contrast) / 8.0
}

/// Dark pixels surrounded by strong contrast tend to be pupils.
#[must_use]
pub fn eye_score([r, g, b]: [u8; 3], contrast: f64) -> f64 {
    if r < 100 && g < 100 && b < 100 && contrast > 50.0 {
        EYE_WEIGHT
    } else {
        0.0
    }
}

/// Combines the individual cues into the final weight.
#[must_use]
pub fn combine(edge_strength: f64, skin: bool, eye: f64, contrast: f64) -> f64 {
    let skin = if skin { SKIN_WEIGHT } else { 0.0 };
    edge_strength * EDGE_WEIGHT + skin + eye + (contrast / 255.0) * CONTRAST_WEIGHT
}

/// Computes the feature map of `source` given its edge map.
///
/// The one pixel frame has weight zero.
#[must_use]
pub fn detect_features(source: &RasterBuffer, edges: &EdgeMap) -> FeatureMap {
    let (w, h) = (source.w(), source.h());
    let mut weights = vec![0.0; source.num_pixels()];

    if w >= 3 && h >= 3 {
        let data = source.as_raw();
        for y in 1..(h - 1) {
            for x in 1..(w - 1) {
                let i = y * w + x;
                let rgb = [data[i * CHANNELS], data[i * CHANNELS + 1], data[i * CHANNELS + 2]];
                let contrast = local_contrast(source, x, y);

                weights[i] = combine(
                    edges.mean(i),
                    is_skin(rgb),
                    eye_score(rgb, contrast),
                    contrast,
                );
            }
        }
    }

    FeatureMap {
        width: source.width(),
        height: source.height(),
        weights,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{edges::detect_edges, tests::*};

    #[test]
    fn skin_heuristic() {
        assert!(is_skin([200, 150, 120]));
        assert!(!is_skin([200, 190, 120])); // r - g too small
        assert!(!is_skin([90, 50, 30])); // too dark
        assert!(!is_skin([200, 150, 210])); // blue dominates
        assert!(!is_skin([200, 30, 25])); // not enough green
    }

    #[test]
    fn eye_heuristic() {
        assert!((eye_score([20, 30, 40], 60.0) - EYE_WEIGHT).abs() < f64::EPSILON);
        assert!(eye_score([20, 30, 40], 50.0).abs() < f64::EPSILON);
        assert!(eye_score([120, 30, 40], 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn combine_is_a_weighted_sum() {
        let weight = combine(10.0, true, EYE_WEIGHT, 255.0);
        assert!((weight - (3.0 + 0.5 + 0.8 + 0.3)).abs() < 1e-12);
        assert!(combine(0.0, false, 0.0, 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn contrast_of_isolated_dark_pixel() {
        let mut raster = RasterBuffer::filled(3, 3, [200, 200, 200, 255]).unwrap();
        raster.set_rgba(1, 1, [0, 10, 20, 255]);
        assert!((local_contrast(&raster, 1, 1) - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn flat_gray_has_no_features() {
        let raster = RasterBuffer::filled(6, 6, [128, 128, 128, 255]).unwrap();
        let features = detect_features(&raster, &detect_edges(&raster));
        assert!(features.weights().iter().all(|&w| w.abs() < f64::EPSILON));
    }

    #[test]
    fn flat_skin_is_only_skin() {
        let raster = RasterBuffer::filled(5, 4, [210, 160, 130, 255]).unwrap();
        let features = detect_features(&raster, &detect_edges(&raster));
        for y in 0..4 {
            for x in 0..5 {
                let weight = features.weight(y * 5 + x);
                if x == 0 || y == 0 || x == 4 || y == 3 {
                    assert!(weight.abs() < f64::EPSILON);
                } else {
                    assert!((weight - SKIN_WEIGHT).abs() < f64::EPSILON);
                }
            }
        }
    }

    #[test]
    fn weights_are_non_negative() {
        let raster = noise_raster(12, 9, 7);
        let features = detect_features(&raster, &detect_edges(&raster));
        assert!(features.weights().iter().all(|&w| w >= 0.0));
        assert_eq!(features.weights().len(), 12 * 9);
    }
}
