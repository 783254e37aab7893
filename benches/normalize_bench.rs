use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use textwriter_client::{normalize_color, Error, ImageCache, RenderBackend, RenderRequest};

struct EchoBackend;

impl RenderBackend for EchoBackend {
    fn render(&self, encoded: &[u8]) -> Result<Vec<u8>, Error> {
        Ok(encoded.to_vec())
    }
}

fn sample_request() -> RenderRequest {
    RenderRequest {
        font: "DejaVu Sans".into(),
        size: 14,
        bold: false,
        italic: true,
        background: "white".into(),
        foreground: "hsla(50%,50%,50%,0.8)".into(),
        text: "the quick brown fox\njumps over the lazy dog".into(),
    }
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_named", |b| {
        b.iter(|| normalize_color(black_box("cornflowerblue")))
    });
    c.bench_function("normalize_scheme", |b| {
        b.iter(|| normalize_color(black_box("hsla(50%,50%,50%,0.8)")))
    });
    c.bench_function("normalize_hex", |b| {
        b.iter(|| normalize_color(black_box("00ff7f80")))
    });
}

fn bench_encode(c: &mut Criterion) {
    let request = sample_request();
    c.bench_function("encode_request", |b| b.iter(|| black_box(&request).encode()));
}

fn bench_cache(c: &mut Criterion) {
    let cache = ImageCache::new(EchoBackend);
    let request = sample_request();
    let key = cache.get_image_key(&request).unwrap();

    c.bench_function("cache_hot_key", |b| {
        b.iter(|| cache.get_image_key(black_box(&request)))
    });
    c.bench_function("cache_by_key", |b| {
        b.iter(|| cache.get_image_by_key(black_box(&key)))
    });
}

criterion_group!(benches, bench_normalize, bench_encode, bench_cache);
criterion_main!(benches);
