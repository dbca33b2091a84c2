use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};

use nimbus_geom::{Aabb, Vec3};
use nimbus_march::{
    CloudParams, CloudScene, FrameSpec, Raymarcher, VolumeTexture, WeatherTexture, render_frame,
};
use nimbus_volume::{VolumeRecipe, bake};

fn region() -> Aabb {
    Aabb::new(Vec3::new(-5.0, 0.0, -5.0), Vec3::new(5.0, 1.0, 5.0))
}

fn bench_bake_small(c: &mut Criterion) {
    let mut group = c.benchmark_group("bake");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);
    group.bench_function("detail_16", |b| {
        b.iter(|| black_box(bake(&VolumeRecipe::detail(16, 3000)).unwrap()))
    });
    group.finish();
}

fn bench_density_and_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("march");
    let volume = Arc::new(bake(&VolumeRecipe::detail(16, 3000)).unwrap());
    let scene = CloudScene::new(
        region(),
        WeatherTexture::procedural(64, 7),
        VolumeTexture::new(volume),
        CloudParams::default(),
    );
    group.bench_function("density_1k_points", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for i in 0..1000 {
                let t = i as f32 / 1000.0;
                acc += scene.density(Vec3::new(8.0 * t - 4.0, t, 4.0 - 8.0 * t));
            }
            black_box(acc)
        })
    });
    let spec = FrameSpec {
        width: 64,
        height: 36,
        camera: Vec3::new(0.0, 0.5, 2.0),
    };
    let marcher = Raymarcher::default();
    group.sample_size(20);
    group.bench_function("frame_64x36", |b| {
        b.iter(|| black_box(render_frame(&spec, region(), &scene, &marcher)))
    });
    group.finish();
}

criterion_group!(benches, bench_bake_small, bench_density_and_frame);
criterion_main!(benches);
