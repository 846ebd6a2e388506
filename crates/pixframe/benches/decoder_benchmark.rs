use criterion::{criterion_group, criterion_main, Criterion};
use pixframe::{
    decode_bytes_from_png, decode_frame, derasterize, encode_bytes_to_png, encode_frame,
    rasterize, EncodeOptions,
};
use std::hint::black_box;

fn generate_text(len: usize) -> Vec<u8> {
    b"The quick brown fox jumps over the lazy dog. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

fn bench_decode_png(c: &mut Criterion) {
    let png = encode_bytes_to_png(&generate_text(64 * 1024), &EncodeOptions::default())
        .expect("encode");

    c.bench_function("decode_png_text_64k", |b| {
        b.iter(|| {
            let result = decode_bytes_from_png(black_box(&png));
            assert!(result.is_ok());
            result
        })
    });
}

fn bench_derasterize(c: &mut Criterion) {
    let framed = encode_frame(&generate_text(1024 * 1024), false).expect("frame");
    let image = rasterize(&framed, &EncodeOptions::default()).expect("rasterize");

    c.bench_function("derasterize_rgba_1m", |b| {
        b.iter(|| derasterize(black_box(&image)))
    });
}

fn bench_decode_frame(c: &mut Criterion) {
    let raw = encode_frame(&generate_text(1024 * 1024), false).expect("frame");
    let packed = encode_frame(&generate_text(1024 * 1024), true).expect("frame");

    c.bench_function("decode_frame_raw_1m", |b| {
        b.iter(|| decode_frame(black_box(&raw)))
    });
    c.bench_function("decode_frame_gzip_1m", |b| {
        b.iter(|| decode_frame(black_box(&packed)))
    });
}

criterion_group!(benches, bench_decode_png, bench_derasterize, bench_decode_frame);
criterion_main!(benches);
