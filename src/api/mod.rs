//! Contains the types and functions for the high level pipeline builder API.

mod pixel_pipeline;

pub use pixel_pipeline::PixelArtPipeline;
