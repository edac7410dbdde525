use criterion::{black_box, criterion_group, Criterion};
use orrery::entities::celestials::{
    builder::{CelestialBuilder, SolarSystemConfig},
    scene_graph::SceneGraph,
};

/// The default system plus a belt of small bodies, each with a moon
fn get_crowded_scene() -> SceneGraph {
    let mut bodies = SolarSystemConfig::default().bodies;
    for i in 0..200 {
        let name = format!("rock {}", i);
        bodies.push(
            CelestialBuilder::new(&name)
                .radius(0.3)
                .orbit(70.0 + i as f32 * 0.05, 0.05 + i as f32 * 0.001)
                .spin_y(1.0)
                .build(),
        );
        bodies.push(
            CelestialBuilder::new(&format!("{} moon", name))
                .radius(0.1)
                .orbit(1.0, 0.5)
                .satellite_of(&name)
                .build(),
        );
    }
    SceneGraph::compose(bodies).unwrap()
}

fn bench_update(c: &mut Criterion) {
    let mut scene = get_crowded_scene();
    let mut time = 0.0;
    c.bench_function("scene_graph_update", |b| {
        b.iter(|| {
            time += 1.0 / 60.0;
            scene.update(black_box(time), black_box(1.0 / 60.0));
        })
    });
}

fn bench_compose(c: &mut Criterion) {
    let bodies = SolarSystemConfig::default().bodies;
    c.bench_function("scene_graph_compose", |b| {
        b.iter(|| SceneGraph::compose(black_box(bodies.clone())).unwrap())
    });
}

criterion_group!(benches, bench_update, bench_compose);
