#[path = "../util/util.rs"]
mod util;

use util::benchmark_rasters;

use std::time::Duration;

use criterion::{
    criterion_group, criterion_main, measurement::WallTime, Bencher, BenchmarkId, Criterion,
    SamplingMode,
};
use palette::Srgb;
use pixelette::{FloydSteinberg, RasterBuffer};

fn palettes() -> Vec<(&'static str, Vec<Srgb<u8>>)> {
    let gray = |v: u8| Srgb::new(v, v, v);
    let levels = (0..=5u8).map(|i| i * 51).collect::<Vec<_>>();
    let cube = levels
        .iter()
        .flat_map(|&r| {
            levels
                .iter()
                .flat_map(move |&g| levels.iter().map(move |&b| Srgb::new(r, g, b)))
        })
        .collect();

    vec![
        ("bw", vec![gray(0), gray(255)]),
        ("gray16", (0..16u8).map(|i| gray(i * 17)).collect()),
        ("cube216", cube),
    ]
}

fn bench(
    c: &mut Criterion,
    group: &str,
    rasters: &[(String, RasterBuffer)],
    mut f: impl FnMut(&mut Bencher<WallTime>, &(&[Srgb<u8>], &RasterBuffer)),
) {
    let mut group = c.benchmark_group(group);
    group
        .sample_size(30)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_secs(2));

    for (name, palette) in palettes() {
        for (path, raster) in rasters {
            group.bench_with_input(
                BenchmarkId::new(name, path),
                &(palette.as_slice(), raster),
                &mut f,
            );
        }
    }
}

fn dither_full_diffusion(c: &mut Criterion) {
    bench(c, "dither_full_diffusion", benchmark_rasters(), |b, &(palette, raster)| {
        b.iter(|| FloydSteinberg::new().dither(raster, palette).unwrap());
    });
}

fn dither_no_diffusion(c: &mut Criterion) {
    let ditherer = FloydSteinberg::with_error_diffusion(0.0).unwrap();
    bench(c, "dither_no_diffusion", benchmark_rasters(), |b, &(palette, raster)| {
        b.iter(|| ditherer.dither(raster, palette).unwrap());
    });
}

criterion_group!(benches, dither_full_diffusion, dither_no_diffusion);
criterion_main!(benches);
