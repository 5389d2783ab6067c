//! Contains the [`PixelArtPipeline`] builder struct for the high level API.

use crate::{pixelate::pixelate, PixelMode, PixelSize, RasterBuffer};
#[cfg(feature = "image")]
use image::RgbaImage;

/// A builder struct to specify options for turning a raster into pixel art.
///
/// # Examples
/// Create a [`PixelArtPipeline`] from a [`RasterBuffer`], then change the options you need:
/// ```
/// # use pixelette::{PixelArtPipeline, PixelMode, PixelSize, RasterBuffer, RasterError};
/// # fn main() -> Result<(), RasterError> {
/// let raster = RasterBuffer::filled(16, 12, [200, 120, 80, 255])?;
/// let output = PixelArtPipeline::new(&raster)
///     .pixel_size(PixelSize::try_from(3)?)
///     .mode(PixelMode::Monochrome)
///     .pixelated();
///
/// assert_eq!(output.dimensions(), (16, 12));
/// # Ok(())
/// # }
/// ```
///
/// Or, with block rows painted in parallel (needs the `threads` feature):
/// ```
/// # use pixelette::{PixelArtPipeline, RasterBuffer, RasterError};
/// # fn main() -> Result<(), RasterError> {
/// # let raster = RasterBuffer::filled(16, 12, [200, 120, 80, 255])?;
/// # #[cfg(feature = "threads")]
/// # {
/// let output = PixelArtPipeline::new(&raster).pixelated_par();
/// assert_eq!(output, PixelArtPipeline::new(&raster).pixelated());
/// # }
/// # Ok(())
/// # }
/// ```
///
/// With the `image` feature, decoded images can go straight through the pipeline:
/// ```no_run
/// # use pixelette::{PixelArtPipeline, RasterBuffer};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let raster = RasterBuffer::try_from(image::open("some image")?.into_rgba8())?;
/// let image = PixelArtPipeline::new(&raster).pixelated_rgbaimage();
/// image.save("pixel art.png")?;
/// # Ok(())
/// # }
/// ```
#[must_use]
#[derive(Debug, Clone, Copy)]
pub struct PixelArtPipeline<'a> {
    /// The source raster.
    pub(crate) source: &'a RasterBuffer,
    /// The side length of each block.
    pub(crate) pixel_size: PixelSize,
    /// How blocks are colored.
    pub(crate) mode: PixelMode,
}

impl<'a> PixelArtPipeline<'a> {
    /// Creates a new [`PixelArtPipeline`] with default options.
    pub fn new(source: &'a RasterBuffer) -> Self {
        Self {
            source,
            pixel_size: PixelSize::default(),
            mode: PixelMode::default(),
        }
    }

    /// Sets the side length of each block in source pixels.
    ///
    /// The default pixel size is [`PixelSize::DEFAULT`].
    pub fn pixel_size(&mut self, pixel_size: impl Into<PixelSize>) -> &mut Self {
        self.pixel_size = pixel_size.into();
        self
    }

    /// Sets whether blocks keep their (enhanced) color or are thresholded to black and white.
    ///
    /// The default mode is [`PixelMode::Color`].
    pub fn mode(&mut self, mode: PixelMode) -> &mut Self {
        self.mode = mode;
        self
    }

    /// Runs the pipeline and returns the pixelated raster.
    #[must_use]
    pub fn pixelated(&self) -> RasterBuffer {
        let &Self { source, pixel_size, mode } = self;
        pixelate(source, pixel_size, mode)
    }
}

impl<'a> From<&'a RasterBuffer> for PixelArtPipeline<'a> {
    fn from(source: &'a RasterBuffer) -> Self {
        Self::new(source)
    }
}

#[cfg(feature = "threads")]
impl<'a> PixelArtPipeline<'a> {
    /// Runs the pipeline, painting block rows in parallel, and returns the pixelated raster.
    ///
    /// The result is identical to [`PixelArtPipeline::pixelated`].
    #[must_use]
    pub fn pixelated_par(&self) -> RasterBuffer {
        let &Self { source, pixel_size, mode } = self;
        crate::pixelate::pixelate_par(source, pixel_size, mode)
    }
}

#[cfg(feature = "image")]
impl<'a> PixelArtPipeline<'a> {
    /// Runs the pipeline and returns the pixelated image.
    #[must_use]
    pub fn pixelated_rgbaimage(&self) -> RgbaImage {
        self.pixelated().into_rgbaimage()
    }
}

#[cfg(all(feature = "threads", feature = "image"))]
impl<'a> PixelArtPipeline<'a> {
    /// Runs the pipeline in parallel and returns the pixelated image.
    #[must_use]
    pub fn pixelated_rgbaimage_par(&self) -> RgbaImage {
        self.pixelated_par().into_rgbaimage()
    }
}
