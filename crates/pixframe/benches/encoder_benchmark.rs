use criterion::{criterion_group, criterion_main, Criterion};
use pixframe::{encode_bytes_to_png, encode_frame, rasterize, EncodeOptions};
use std::hint::black_box;

fn generate_text(len: usize) -> Vec<u8> {
    b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

fn generate_noise(len: usize) -> Vec<u8> {
    let mut state = 0x2545_f491u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

fn bench_encode_text(c: &mut Criterion) {
    let payload = generate_text(64 * 1024);
    let opts = EncodeOptions::default();

    c.bench_function("encode_png_text_64k", |b| {
        b.iter(|| {
            let result = encode_bytes_to_png(black_box(&payload), &opts);
            assert!(result.is_ok());
            result
        })
    });
}

fn bench_encode_noise_raw(c: &mut Criterion) {
    let payload = generate_noise(64 * 1024);
    let opts = EncodeOptions::with_compression(false);

    c.bench_function("encode_png_noise_64k_raw", |b| {
        b.iter(|| {
            let result = encode_bytes_to_png(black_box(&payload), &opts);
            assert!(result.is_ok());
            result
        })
    });
}

fn bench_rasterize(c: &mut Criterion) {
    let framed = encode_frame(&generate_noise(1024 * 1024), false).expect("frame");
    let opts = EncodeOptions::default();

    c.bench_function("rasterize_1m", |b| {
        b.iter(|| rasterize(black_box(&framed), &opts))
    });
}

criterion_group!(
    benches,
    bench_encode_text,
    bench_encode_noise_raw,
    bench_rasterize
);
criterion_main!(benches);
