//! A library for turning photographs into stylized, low resolution pixel art.
//!
//! `pixelette` tiles an image into square blocks and paints each block with a single color.
//! Block colors are biased towards salient features (edges, skin tones, and dark high-contrast
//! spots), saturated, and quantized to a small set of levels. A monochrome mode thresholds
//! each block to black or white instead. Afterwards, a few stylization filters run over the
//! whole image (see the [`postprocess`] module).
//!
//! Independently of pixelation, any raster can be reduced to a fixed palette with
//! Floyd–Steinberg dithering (see [`dither_to_palette`]). The [`edit`] and [`History`] items
//! provide grid-aware painting and undo/redo for interactive editors.
//!
//! # Features
//! To reduce dependencies and compile times, `pixelette` has several `cargo` features
//! that can be turned off or on:
//! - `pipelines`: exposes the [`PixelArtPipeline`] builder struct as the high-level API.
//! - `threads`: exposes parallel versions of the pixelation pass via [`rayon`].
//! - `image`: enables integration with the [`image`] crate.
//!
//! # High-Level API
//! ```no_run
//! # use pixelette::{PixelArtPipeline, PixelMode, PixelSize, RasterBuffer};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("some image")?.into_rgba8();
//! let raster = RasterBuffer::try_from(img)?;
//!
//! let pixel_art = PixelArtPipeline::new(&raster)
//!     .pixel_size(PixelSize::try_from(6)?) // 6x6 source pixels per block
//!     .mode(PixelMode::Color)
//!     .pixelated_rgbaimage_par(); // paint block rows in parallel
//! # Ok(())
//! # }
//! ```
//!
//! Note that some of the options and functions above require certain features to be enabled.
//!
//! # Logging
//! Pipeline stages report their timings and skipped steps through the [`log`] facade
//! at the `debug` and `trace` levels. No logger is installed by the library.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod dither;
mod history;
mod types;

#[cfg(feature = "pipelines")]
mod api;

pub mod colorspace;
pub mod convolve;
pub mod edges;
pub mod edit;
pub mod features;
pub mod pixelate;
pub mod postprocess;

pub use convolve::Kernel3;
pub use dither::{dither_to_palette, nearest_color, squared_distance, FloydSteinberg};
pub use edges::EdgeMap;
pub use edit::Brush;
pub use features::FeatureMap;
pub use history::History;
pub use pixelate::{pixelate, Block, PixelMode};
pub use types::*;

#[cfg(feature = "threads")]
pub use pixelate::pixelate_par;

#[cfg(feature = "pipelines")]
pub use api::*;
