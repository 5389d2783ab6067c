//! Generic 3×3 kernel convolution over RGBA rasters.
//!
//! Only the interior is convolved: the one pixel frame around the raster is copied
//! unchanged from the input, so the kernel never reads out of bounds.
//! The alpha channel is always copied, never convolved.

use crate::{clamp_store, RasterBuffer, CHANNELS};

/// A 3×3 convolution kernel in row-major order.
pub type Kernel3 = [[f64; 3]; 3];

/// The light discrete Gaussian approximation used to smooth rasters before edge detection.
pub const BLUR_KERNEL: Kernel3 = [
    [0.075, 0.125, 0.075],
    [0.125, 0.2, 0.125],
    [0.075, 0.125, 0.075],
];

/// Applies `kernel` to the red, green, and blue channel of every interior pixel.
///
/// Each convolved channel is stored with [`clamp_store`].
/// Rasters narrower or shorter than 3 pixels have no interior and are returned as a copy.
#[must_use]
pub fn convolve(source: &RasterBuffer, kernel: &Kernel3) -> RasterBuffer {
    let mut output = source.clone();
    let (w, h) = (source.w(), source.h());
    if w < 3 || h < 3 {
        return output;
    }

    let input = source.as_raw();
    let data = output.as_raw_mut();

    for y in 1..(h - 1) {
        for x in 1..(w - 1) {
            let i = (y * w + x) * CHANNELS;
            for c in 0..3 {
                let mut sum = 0.0;
                for (ky, row) in kernel.iter().enumerate() {
                    for (kx, &weight) in row.iter().enumerate() {
                        let j = ((y + ky - 1) * w + (x + kx - 1)) * CHANNELS + c;
                        sum += f64::from(input[j]) * weight;
                    }
                }
                data[i + c] = clamp_store(sum);
            }
        }
    }

    output
}

/// Smooths a raster with [`BLUR_KERNEL`].
#[must_use]
pub fn smooth(source: &RasterBuffer) -> RasterBuffer {
    convolve(source, &BLUR_KERNEL)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    const IDENTITY: Kernel3 = [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]];

    #[test]
    fn identity_kernel_is_identity() {
        let raster = noise_raster(9, 7, 3);
        assert_eq!(convolve(&raster, &IDENTITY), raster);
    }

    #[test]
    fn border_and_alpha_are_copied() {
        let raster = noise_raster(6, 5, 11);
        let kernel = [[1.0; 3]; 3];
        let output = convolve(&raster, &kernel);

        for y in 0..5 {
            for x in 0..6 {
                let (a, b) = (raster.rgba(x, y), output.rgba(x, y));
                assert_eq!(a[3], b[3]);
                if x == 0 || y == 0 || x == 5 || y == 4 {
                    assert_eq!(a, b);
                }
            }
        }
    }

    #[test]
    fn tiny_rasters_have_no_interior() {
        let raster = noise_raster(2, 9, 5);
        assert_eq!(convolve(&raster, &[[1.0; 3]; 3]), raster);
    }

    #[test]
    fn blur_of_flat_image_is_flat() {
        // the blur weights sum to 1
        let raster = RasterBuffer::filled(5, 5, [90, 140, 200, 255]).unwrap();
        assert_eq!(smooth(&raster), raster);
    }

    #[test]
    fn interior_sums_are_clamped() {
        let raster = RasterBuffer::filled(3, 3, [200, 10, 0, 255]).unwrap();
        let output = convolve(&raster, &[[1.0; 3]; 3]);
        assert_eq!(output.rgba(1, 1), [255, 90, 0, 255]);
    }
}
