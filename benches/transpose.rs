// Run with:  cargo bench --bench transpose

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;
use ws2811_drawbuffer::transpose::BitPlaneTransposer;
use ws2811_drawbuffer::StripMap;

const GROUPS: usize = 256;

fn transpose_strips<const STRIPS: usize>(c: &mut Criterion, label: &str, map: StripMap) {
    let mut group = c.benchmark_group("transpose");
    group.throughput(Throughput::Elements((GROUPS * STRIPS) as u64));

    let transposer = BitPlaneTransposer::<STRIPS>::new(map);
    let mut seed = 0x1234_5678u32;
    let inputs: Vec<[u32; STRIPS]> = (0..GROUPS)
        .map(|_| {
            core::array::from_fn(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                seed & 0x00FF_FFFF
            })
        })
        .collect();

    group.bench_function(format!("strips_{STRIPS}_{label}"), |b| {
        b.iter(|| {
            for colors in &inputs {
                black_box(transposer.transpose(black_box(colors)));
            }
        });
    });

    group.finish();
}

fn transpose(c: &mut Criterion) {
    transpose_strips::<1>(c, "identity", StripMap::IDENTITY);
    transpose_strips::<4>(c, "identity", StripMap::IDENTITY);
    transpose_strips::<8>(c, "identity", StripMap::IDENTITY);
    if let Ok(map) = StripMap::new([7, 6, 5, 4, 3, 2, 1, 0]) {
        transpose_strips::<8>(c, "reversed", map);
    }
}

criterion_group!(benches, transpose);
criterion_main!(benches);
