use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ironclad_core::{GameConfig, GameMode, Joystick, Services, World};

fn bench_tick(c: &mut Criterion) {
    // Default population: 20 boxes, 3 enemies
    let mut world = World::new(GameConfig::default(), 42, Services::in_memory()).unwrap();

    c.bench_function("tick", |b| {
        b.iter(|| {
            world.step(black_box(16), Joystick::new(45.0, 1.0));
            world.drain_events().for_each(drop);
        })
    });
}

fn bench_tick_firing(c: &mut Criterion) {
    // Rescue mode with a shot every tick keeps the pool and timers busy
    let mut world = World::new(
        GameConfig::with_mode(GameMode::Rescue),
        7,
        Services::in_memory(),
    )
    .unwrap();
    let mut angle = 0.0_f32;

    c.bench_function("tick_firing", |b| {
        b.iter(|| {
            angle = (angle + 7.0) % 360.0;
            world.fire();
            world.step(black_box(16), Joystick::new(angle, 0.5));
            world.drain_events().for_each(drop);
        })
    });
}

fn bench_reconcile_from_empty(c: &mut Criterion) {
    // Construction runs both reconciliation passes from an empty arena
    c.bench_function("world_new", |b| {
        b.iter(|| {
            black_box(World::new(GameConfig::default(), black_box(9), Services::in_memory()).unwrap())
        })
    });
}

criterion_group!(benches, bench_tick, bench_tick_firing, bench_reconcile_from_empty);
criterion_main!(benches);
