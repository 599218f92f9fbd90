// Run with:  cargo bench --bench encode_pixel

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;
use ws2811_drawbuffer::encoder::{ColorOrder, PixelEncoder};
use ws2811_drawbuffer::fixed::InterpolationWeights;
use ws2811_drawbuffer::gamma::GammaTable;
use ws2811_drawbuffer::{Color, UNIT};

const PIXELS: usize = 512;

fn encode_pixel(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_pixel");
    group.throughput(Throughput::Elements(PIXELS as u64));

    let gamma = GammaTable::from_fn(|channel, index| {
        let x = index as f64 / 256.0;
        let scale = if channel == 0 { 0.9 } else { 1.0 };
        (x.powf(2.2) * scale * 65535.0 + 0.5) as u16
    });
    let prev: Vec<Color> = (0..PIXELS)
        .map(|i| Color::new(i as u8, (i >> 1) as u8, (i >> 2) as u8))
        .collect();
    let next: Vec<Color> = prev.iter().rev().copied().collect();

    for (name, dithering) in [("dithered", true), ("truncated", false)] {
        group.bench_function(name, |b| {
            let encoder = PixelEncoder::new(&gamma, ColorOrder::Grb).with_dithering(dithering);
            let weights = InterpolationWeights::from_coefficient(UNIT / 3);
            let mut residuals = vec![[0u8; 3]; PIXELS];

            b.iter(|| {
                for ((p, n), residual) in prev.iter().zip(&next).zip(residuals.iter_mut()) {
                    black_box(encoder.encode(
                        black_box(weights),
                        black_box(*p),
                        black_box(*n),
                        residual,
                    ));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, encode_pixel);
criterion_main!(benches);
