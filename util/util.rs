#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use pixelette::RasterBuffer;

pub fn load_images(images: &[PathBuf]) -> Vec<(String, RasterBuffer)> {
    images
        .iter()
        .map(|path| {
            image::open(path).map(|image| {
                (
                    path.file_name().unwrap().to_owned().into_string().unwrap(),
                    RasterBuffer::try_from(image.into_rgba8()).unwrap(),
                )
            })
        })
        .collect::<Result<_, _>>()
        .expect("loaded each image")
}

pub fn load_image_dir(dir: impl AsRef<Path>) -> Vec<(String, RasterBuffer)> {
    let mut paths = std::fs::read_dir(dir)
        .expect("read img directory")
        .collect::<Result<Vec<_>, _>>()
        .expect("read each file")
        .iter()
        .map(std::fs::DirEntry::path)
        .collect::<Vec<_>>();

    paths.sort();

    load_images(&paths)
}

pub const BENCH_DIR: &str = "img/bench";

pub fn root_dir() -> PathBuf {
    // assume current exe path is something like: target/build/deps/current_exe
    let exe = std::env::current_exe().unwrap();
    exe.parent()
        .and_then(Path::parent)
        .and_then(Path::parent)
        .and_then(Path::parent)
        .unwrap()
        .to_path_buf()
}

/// A smooth RGB gradient with a few hard edged rectangles on top.
pub fn synthetic_raster(width: u32, height: u32) -> RasterBuffer {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let edge = (x / 64 + y / 48) % 3 == 0;
            let r = (x * 255 / width) as u8;
            let g = (y * 255 / height) as u8;
            let b = if edge { 40 } else { 200 };
            data.extend_from_slice(&[r, g, b, 255]);
        }
    }
    RasterBuffer::new(width, height, data).unwrap()
}

pub fn synthetic_rasters() -> Vec<(String, RasterBuffer)> {
    [(320, 240), (1280, 720), (1920, 1080)]
        .into_iter()
        .map(|(w, h)| (format!("synthetic_{w}x{h}"), synthetic_raster(w, h)))
        .collect()
}

static BENCH_RASTERS: OnceLock<Vec<(String, RasterBuffer)>> = OnceLock::new();

/// The images under [`BENCH_DIR`] if that directory exists, otherwise [`synthetic_rasters`].
pub fn benchmark_rasters() -> &'static [(String, RasterBuffer)] {
    BENCH_RASTERS.get_or_init(|| {
        let dir = root_dir().join(BENCH_DIR);
        if dir.is_dir() {
            load_image_dir(dir)
        } else {
            synthetic_rasters()
        }
    })
}
