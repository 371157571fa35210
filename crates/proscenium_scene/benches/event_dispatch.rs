//! Event dispatch benchmark: fire through a deep ascendant chain with
//! capture and normal listeners on every level.

use criterion::{criterion_group, criterion_main, Criterion};

use proscenium_scene::{Event, FnListener, Stage};

fn build_chain(depth: usize) -> (Stage, proscenium_scene::ActorId) {
    let mut stage = Stage::new(1000.0, 1000.0);
    let mut parent = stage.root();
    for _ in 0..depth {
        let child = stage.new_actor();
        stage.add_child(parent, child).expect("attach");
        stage
            .add_capture_listener(child, FnListener(|_: &mut Stage, _: &mut Event| Ok(false)))
            .expect("capture listener");
        stage
            .add_listener(child, FnListener(|_: &mut Stage, _: &mut Event| Ok(true)))
            .expect("listener");
        parent = child;
    }
    (stage, parent)
}

fn bench_fire(c: &mut Criterion) {
    let (mut stage, leaf) = build_chain(16);
    c.bench_function("fire_depth_16", |b| {
        b.iter(|| {
            let mut event = Event::change();
            stage.fire(leaf, &mut event).expect("fire");
            std::hint::black_box(event.is_handled())
        });
    });
}

criterion_group!(benches, bench_fire);
criterion_main!(benches);
