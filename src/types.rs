//! Contains various types needed across the crate.

use palette::{
    cast::{ComponentsAs, ComponentsAsMut},
    Srgba,
};
use std::{
    error::Error,
    fmt::Display,
    num::NonZeroU32,
};
#[cfg(feature = "image")]
use image::RgbaImage;

/// The number of channels stored per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// An error type for malformed rasters or out of range parameters.
///
/// The transforms in this crate are only defined for well-formed input,
/// so they fail fast with one of these instead of trying to recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterError {
    /// The width or height was zero, or the buffer length was not `width * height * 4`.
    InvalidDimensions {
        /// The given width.
        width: u32,
        /// The given height.
        height: u32,
        /// The length of the given channel buffer.
        len: usize,
    },
    /// A parameter was outside of its supported range.
    InvalidParameter {
        /// The name of the parameter.
        name: &'static str,
        /// The rejected value.
        value: i64,
    },
}

impl Display for RasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            RasterError::InvalidDimensions { width, height, len } => write!(
                f,
                "invalid raster dimensions {width}x{height} for a buffer of length {len}"
            ),
            RasterError::InvalidParameter { name, value } => {
                write!(f, "invalid value {value} for parameter `{name}`")
            }
        }
    }
}

impl Error for RasterError {}

/// The edge length, in source pixels, of each square block of the pixelated image.
///
/// This is a simple new type wrapper around [`NonZeroU32`].
///
/// # Examples
/// ```
/// # use pixelette::{PixelSize, RasterError};
/// # fn main() -> Result<(), RasterError> {
/// let size = PixelSize::try_from(4)?;
/// assert_eq!(size.get(), 4);
/// assert!(PixelSize::try_from(0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PixelSize(NonZeroU32);

impl PixelSize {
    /// The pixel size used by the editor when nothing else is chosen.
    pub const DEFAULT: Self = match NonZeroU32::new(4) {
        Some(size) => Self(size),
        None => unreachable!(),
    };

    /// Creates a new [`PixelSize`], returning `None` if `size` is zero.
    #[must_use]
    pub const fn new(size: u32) -> Option<Self> {
        match NonZeroU32::new(size) {
            Some(size) => Some(Self(size)),
            None => None,
        }
    }

    /// Gets the inner value as a `u32`.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Gets the inner value as a `usize` for indexing.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0.get() as usize
    }
}

impl Default for PixelSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<NonZeroU32> for PixelSize {
    fn from(value: NonZeroU32) -> Self {
        Self(value)
    }
}

impl TryFrom<u32> for PixelSize {
    type Error = RasterError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(RasterError::InvalidParameter {
            name: "pixel_size",
            value: value.into(),
        })
    }
}

impl Display for PixelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// An owned RGBA raster with 8-bit channels, stored row-major.
///
/// The pixel at `(x, y)` lives at linear index `y * width + x`,
/// and its channels at `4 * (y * width + x)..4 * (y * width + x) + 4`.
/// The buffer length is always `width * height * 4`, and both dimensions are non-zero.
///
/// # Examples
/// ```
/// # use pixelette::{RasterBuffer, RasterError};
/// # fn main() -> Result<(), RasterError> {
/// let raster = RasterBuffer::new(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255])?;
/// assert_eq!(raster.rgba(1, 0), [0, 0, 255, 255]);
/// assert!(RasterBuffer::new(2, 2, vec![0; 4]).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RasterBuffer {
    /// The number of pixels in each row.
    width: u32,
    /// The number of rows.
    height: u32,
    /// The interleaved channel data.
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Creates a new [`RasterBuffer`] from interleaved RGBA channel data.
    ///
    /// # Errors
    /// Returns [`RasterError::InvalidDimensions`] if either dimension is zero
    /// or `data.len()` is not `width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, RasterError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(CHANNELS));

        if width == 0 || height == 0 || expected != Some(data.len()) {
            Err(RasterError::InvalidDimensions { width, height, len: data.len() })
        } else {
            Ok(Self { width, height, data })
        }
    }

    /// Creates a new [`RasterBuffer`] where every pixel is `color`.
    ///
    /// # Errors
    /// Returns [`RasterError::InvalidDimensions`] if either dimension is zero.
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Result<Self, RasterError> {
        let pixels = (width as usize) * (height as usize);
        Self::new(width, height, color.repeat(pixels))
    }

    /// Creates a zeroed (transparent black) buffer with the same dimensions as `self`.
    #[must_use]
    pub(crate) fn zeroed_like(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: vec![0; self.data.len()],
        }
    }

    /// The width of the raster in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The height of the raster in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The dimensions of the raster as `(width, height)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The width of the raster as a `usize`.
    #[must_use]
    pub(crate) const fn w(&self) -> usize {
        self.width as usize
    }

    /// The height of the raster as a `usize`.
    #[must_use]
    pub(crate) const fn h(&self) -> usize {
        self.height as usize
    }

    /// The number of pixels in the raster.
    #[must_use]
    pub const fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// The raw interleaved channel data.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// The raw interleaved channel data, mutably.
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the raster, returning the raw channel data.
    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// The raster as a slice of [`Srgba<u8>`] pixels.
    #[must_use]
    pub fn pixels(&self) -> &[Srgba<u8>] {
        self.data.components_as()
    }

    /// The raster as a mutable slice of [`Srgba<u8>`] pixels.
    pub fn pixels_mut(&mut self) -> &mut [Srgba<u8>] {
        self.data.components_as_mut()
    }

    /// Returns the channel offset of the pixel at `(x, y)`.
    #[inline]
    pub(crate) const fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width as usize + x) * CHANNELS
    }

    /// Returns the RGBA channels of the pixel at `(x, y)`.
    ///
    /// # Panics
    /// Panics if `(x, y)` is out of bounds.
    #[must_use]
    pub fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x as usize, y as usize);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Sets the RGBA channels of the pixel at `(x, y)`.
    ///
    /// # Panics
    /// Panics if `(x, y)` is out of bounds.
    pub fn set_rgba(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.offset(x as usize, y as usize);
        self.data[i..i + CHANNELS].copy_from_slice(&rgba);
    }

    /// Whether `(x, y)` lies inside the raster.
    #[must_use]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        (0..i64::from(self.width)).contains(&x) && (0..i64::from(self.height)).contains(&y)
    }

    /// Converts the raster into an [`RgbaImage`].
    #[cfg(feature = "image")]
    #[must_use]
    pub fn into_rgbaimage(self) -> RgbaImage {
        let Self { width, height, data } = self;

        #[allow(clippy::unwrap_used)]
        {
            // data.len() is width * height * 4 by construction,
            // so the buffer is always large enough
            RgbaImage::from_raw(width, height, data).unwrap()
        }
    }
}

impl AsRef<[u8]> for RasterBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(feature = "image")]
impl TryFrom<&RgbaImage> for RasterBuffer {
    type Error = RasterError;

    fn try_from(image: &RgbaImage) -> Result<Self, Self::Error> {
        Self::new(image.width(), image.height(), image.as_raw().clone())
    }
}

#[cfg(feature = "image")]
impl TryFrom<RgbaImage> for RasterBuffer {
    type Error = RasterError;

    fn try_from(image: RgbaImage) -> Result<Self, Self::Error> {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }
}

#[cfg(feature = "image")]
impl From<RasterBuffer> for RgbaImage {
    fn from(raster: RasterBuffer) -> Self {
        raster.into_rgbaimage()
    }
}

/// Clamps `value` to `0..=255` and rounds half to even, mapping NaN to `0`.
///
/// This is how a real value lands in an 8-bit raster channel.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_store(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

/// Rounds half up (towards positive infinity).
#[inline]
#[must_use]
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// The weighted grayscale brightness of an RGB color.
#[inline]
#[must_use]
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
}
