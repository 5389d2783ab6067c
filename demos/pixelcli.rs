#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::{fmt::Display, path::PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};
use palette::Srgb;
use pixelette::{FloydSteinberg, PixelArtPipeline, PixelMode, PixelSize, RasterBuffer};

#[derive(Copy, Clone, ValueEnum)]
enum CliPixelMode {
    Color,
    Monochrome,
}

impl From<CliPixelMode> for PixelMode {
    fn from(value: CliPixelMode) -> Self {
        match value {
            CliPixelMode::Color => PixelMode::Color,
            CliPixelMode::Monochrome => PixelMode::Monochrome,
        }
    }
}

impl Display for CliPixelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CliPixelMode::Color => "color",
                CliPixelMode::Monochrome => "monochrome",
            }
        )
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum CliPalette {
    /// Black and white.
    Bw,
    /// The four greens of the original Game Boy.
    Gameboy,
    /// The 16 color PICO-8 palette.
    Pico8,
}

impl CliPalette {
    fn colors(self) -> Vec<Srgb<u8>> {
        let hex: &[u32] = match self {
            CliPalette::Bw => &[0x000000, 0xffffff],
            CliPalette::Gameboy => &[0x0f380f, 0x306230, 0x8bac0f, 0x9bbc0f],
            CliPalette::Pico8 => &[
                0x000000, 0x1d2b53, 0x7e2553, 0x008751, 0xab5236, 0x5f574f, 0xc2c3c7, 0xfff1e8,
                0xff004d, 0xffa300, 0xffec27, 0x00e436, 0x29adff, 0x83769c, 0xff77a8, 0xffccaa,
            ],
        };
        hex.iter()
            .map(|&c| Srgb::new((c >> 16) as u8, (c >> 8) as u8, c as u8))
            .collect()
    }
}

impl Display for CliPalette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CliPalette::Bw => "bw",
                CliPalette::Gameboy => "gameboy",
                CliPalette::Pico8 => "pico8",
            }
        )
    }
}

#[derive(Subcommand)]
enum Transform {
    /// Converts the image into block pixel art.
    Pixelate {
        #[arg(short, long, default_value_t = PixelSize::default(), value_parser = parse_pixel_size)]
        pixel_size: PixelSize,

        #[arg(short, long, default_value_t = CliPixelMode::Color)]
        mode: CliPixelMode,

        #[arg(short, long, default_value_t = 0)]
        threads: u8,
    },
    /// Reduces the image to a fixed palette with Floyd–Steinberg dithering.
    Dither {
        #[arg(short, long, default_value_t = CliPalette::Pico8)]
        palette: CliPalette,

        #[arg(long, default_value = "1.0", value_parser = parse_error_diffusion)]
        error_diffusion: FloydSteinberg,
    },
}

#[derive(Parser)]
pub struct Options {
    #[arg(long)]
    verbose: bool,

    input: PathBuf,

    output: PathBuf,

    #[command(subcommand)]
    transform: Transform,
}

fn parse_pixel_size(s: &str) -> Result<PixelSize, String> {
    let value: u32 = s.parse().map_err(|e| format!("{e}"))?;
    value.try_into().map_err(|e| format!("{e}"))
}

fn parse_error_diffusion(s: &str) -> Result<FloydSteinberg, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    FloydSteinberg::with_error_diffusion(value)
        .ok_or_else(|| format!("error diffusion must be in 0..=1, got {value}"))
}

fn main() {
    let Options { verbose, input, output, transform } = Options::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .init();

    macro_rules! timed {
        ($name: literal, $val: expr) => {{
            let time = std::time::Instant::now();
            let value = $val;
            info!("{} took {}ms", $name, time.elapsed().as_millis());
            value
        }};
    }

    let image = timed!("read image", image::open(input).unwrap().into_rgba8());
    let raster = RasterBuffer::try_from(image).unwrap();

    let raster = match transform {
        Transform::Pixelate { pixel_size, mode, threads } => {
            let mut pipeline = PixelArtPipeline::new(&raster);
            pipeline.pixel_size(pixel_size).mode(mode.into());

            timed!(
                "pixelation",
                match threads {
                    0 => pipeline.pixelated_par(),
                    1 => pipeline.pixelated(),
                    t => {
                        let pool = rayon::ThreadPoolBuilder::new()
                            .num_threads(t.into())
                            .build()
                            .unwrap();

                        pool.install(|| pipeline.pixelated_par())
                    }
                }
            )
        }
        Transform::Dither { palette, error_diffusion } => {
            timed!("dithering", error_diffusion.dither(&raster, &palette.colors()).unwrap())
        }
    };

    timed!("write image", raster.into_rgbaimage().save(output).unwrap());
}
