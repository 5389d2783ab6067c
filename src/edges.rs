//! Sobel edge magnitudes per color channel.
//!
//! - Smooths the input with [`BLUR_KERNEL`](crate::convolve::BLUR_KERNEL) first.
//! - Convolves the Sobel `X` and `Y` kernels with each of R, G, and B separately.
//! - Halves weak responses (`<= 20`) to suppress noise, then clamps to `0..=255`.
//!
//! The one pixel frame of the map is never computed and holds zero.

use crate::{clamp_store, convolve::smooth, Kernel3, RasterBuffer, CHANNELS};

/// Horizontal Sobel kernel.
pub const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];

/// Vertical Sobel kernel.
pub const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Gradient magnitudes at or below this value are considered noise.
pub const NOISE_THRESHOLD: f64 = 20.0;

/// Per-pixel, per-channel edge magnitudes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMap {
    /// The width of the source raster.
    width: u32,
    /// The height of the source raster.
    height: u32,
    /// Edge magnitudes for R, G, and B, indexed by `y * width + x`.
    magnitudes: Vec<[u8; 3]>,
}

impl EdgeMap {
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

    /// All magnitudes, indexed by `y * width + x`.
    #[must_use]
    pub fn magnitudes(&self) -> &[[u8; 3]] {
        &self.magnitudes
    }

    /// The R, G, and B magnitudes at linear pixel index `i`.
    #[inline]
    #[must_use]
    pub fn at(&self, i: usize) -> [u8; 3] {
        self.magnitudes[i]
    }

    /// The mean of the three channel magnitudes at linear pixel index `i`.
    #[inline]
    #[must_use]
    pub fn mean(&self, i: usize) -> f64 {
        let [r, g, b] = self.magnitudes[i];
        (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0
    }

    /// The single edge value of a grayscale source at linear pixel index `i`.
    ///
    /// For grayscale rasters all three channels carry the same magnitude,
    /// so the red one stands in for all of them.
    #[inline]
    #[must_use]
    pub fn scalar(&self, i: usize) -> u8 {
        self.magnitudes[i][0]
    }
}

/// Applies the noise floor to a raw gradient magnitude.
#[inline]
#[must_use]
pub fn suppress_noise(magnitude: f64) -> f64 {
    if magnitude > NOISE_THRESHOLD {
        magnitude
    } else {
        magnitude * 0.5
    }
}

/// Computes the edge map of `source` after smoothing it.
#[must_use]
pub fn detect_edges(source: &RasterBuffer) -> EdgeMap {
    sobel(&smooth(source))
}

/// Computes the edge map of `source` as is, without smoothing.
#[must_use]
pub fn sobel(source: &RasterBuffer) -> EdgeMap {
    let (w, h) = (source.w(), source.h());
    let mut magnitudes = vec![[0; 3]; source.num_pixels()];

    if w >= 3 && h >= 3 {
        let data = source.as_raw();
        for y in 1..(h - 1) {
            for x in 1..(w - 1) {
                let pixel = &mut magnitudes[y * w + x];
                for (c, out) in pixel.iter_mut().enumerate() {
                    let mut gx = 0.0;
                    let mut gy = 0.0;
                    for ky in 0..3 {
                        for kx in 0..3 {
                            let j = ((y + ky - 1) * w + (x + kx - 1)) * CHANNELS + c;
                            let value = f64::from(data[j]);
                            gx += value * SOBEL_KERNEL_X[ky][kx];
                            gy += value * SOBEL_KERNEL_Y[ky][kx];
                        }
                    }

                    let magnitude = (gx * gx + gy * gy).sqrt();
                    *out = clamp_store(suppress_noise(magnitude).min(255.0));
                }
            }
        }
    }

    EdgeMap {
        width: source.width(),
        height: source.height(),
        magnitudes,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn flat_image_has_no_edges() {
        let raster = RasterBuffer::filled(8, 6, [37, 180, 99, 255]).unwrap();
        let edges = detect_edges(&raster);
        assert!(edges.magnitudes().iter().all(|&m| m == [0, 0, 0]));
    }

    #[test]
    fn border_is_left_at_zero() {
        let raster = noise_raster(7, 5, 42);
        let edges = sobel(&raster);
        for y in 0..5 {
            for x in 0..7 {
                if x == 0 || y == 0 || x == 6 || y == 4 {
                    assert_eq!(edges.at(y * 7 + x), [0, 0, 0]);
                }
            }
        }
    }

    #[test]
    fn vertical_step_edge() {
        // columns 0..=1 are black, 2..=3 are white
        let mut raster = RasterBuffer::filled(4, 3, [0, 0, 0, 255]).unwrap();
        for y in 0..3 {
            for x in 2..4 {
                raster.set_rgba(x, y, [255, 255, 255, 255]);
            }
        }

        let edges = sobel(&raster);
        // gx = 255 * (1 + 2 + 1) = 1020, gy = 0
        assert_eq!(edges.at(4 + 1), [255, 255, 255]);
        assert_eq!(edges.at(4 + 2), [255, 255, 255]);
    }

    #[test]
    fn weak_gradients_are_halved() {
        // a step of 4 gives gx = 16, which is below the noise floor
        let mut raster = RasterBuffer::filled(3, 3, [100, 100, 100, 255]).unwrap();
        for y in 0..3 {
            raster.set_rgba(2, y, [104, 100, 100, 255]);
        }

        let edges = sobel(&raster);
        assert_eq!(edges.at(4), [8, 0, 0]);
        assert!((edges.mean(4) - 8.0 / 3.0).abs() < 1e-12);
        assert_eq!(edges.scalar(4), 8);
    }

    #[test]
    fn noise_floor_boundary() {
        assert!((suppress_noise(20.0) - 10.0).abs() < f64::EPSILON);
        assert!((suppress_noise(20.5) - 20.5).abs() < f64::EPSILON);
    }
}
