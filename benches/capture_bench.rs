use criterion::{criterion_group, criterion_main, Criterion};
use ogshot::{CaptureOptions, ObjectUrlRegistry, RasterEngine, RenderedRegion};
use std::sync::Arc;

fn bench_render_region(c: &mut Criterion) {
    let engine = RasterEngine::new(Arc::new(ObjectUrlRegistry::new()));
    let region = RenderedRegion {
        title: "Benchmark post".to_string(),
        content_html: "<p>Lorem ipsum dolor sit amet, consectetur adipiscing elit.</p><p>Second paragraph.</p>"
            .to_string(),
        image: None,
        width: 1200,
        height: 630,
    };

    let mut group = c.benchmark_group("capture");
    group.sample_size(10);
    for scale in [1.0f32, 2.0] {
        let opts = CaptureOptions { scale, ..Default::default() };
        group.bench_function(format!("render_region_x{}", scale), |b| {
            b.iter(|| engine.render(&region, &opts).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_render_region);
criterion_main!(benches);
