use criterion::{black_box, criterion_group, criterion_main, Criterion};
use physics2d::{
    Body, BroadphaseStrategy, Circle, CollisionType, Edge, PhysicsConfig, PhysicsWorld, Shape,
    Vec2,
};

// --- Helpers ---

fn world_with_ground(strategy: BroadphaseStrategy) -> PhysicsWorld {
    let config = PhysicsConfig {
        broadphase_strategy: strategy,
        // gravity pulls down the screen
        acc: Vec2::new(0.0, 10.0),
        ..PhysicsConfig::default()
    };
    let mut world = PhysicsWorld::new(config);
    world.add_body(Body::at(
        Vec2::new(0.0, 1.0),
        Shape::Edge(Edge::new(Vec2::new(-200.0, 0.0), Vec2::new(200.0, 0.0))),
        CollisionType::Fixed,
    ));
    world
}

fn run_circle_stack(world: &mut PhysicsWorld, num_circles: usize) {
    let radius = 0.5;
    for i in 0..num_circles {
        let y = -(radius + i as f64 * (radius * 2.1)); // stack with slight gap
        let body = Body::at(
            Vec2::new(0.0, y),
            Shape::Circle(Circle::new(radius)),
            CollisionType::Active,
        );
        world.add_body(body);
    }

    // Simulate for a fixed number of steps
    let dt = 1.0 / 60.0;
    let steps = 30;
    for _ in 0..steps {
        world.step(black_box(dt));
    }
}

// Benchmark for a stack of circles falling under gravity
fn bench_circle_stack(c: &mut Criterion) {
    let mut group = c.benchmark_group("circle_stack");

    for num_circles in [10, 100, 500].iter() {
        group.bench_with_input(
            criterion::BenchmarkId::from_parameter(num_circles),
            num_circles,
            |b, &n| {
                b.iter(|| {
                    let mut world = world_with_ground(BroadphaseStrategy::DynamicAabbTree);
                    run_circle_stack(&mut world, black_box(n));
                });
            },
        );
    }
    group.finish();
}

// Same scene through both broadphase strategies
fn bench_broadphase_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadphase_strategy");

    for (name, strategy) in [
        ("dynamic_tree", BroadphaseStrategy::DynamicAabbTree),
        ("naive", BroadphaseStrategy::Naive),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut world = world_with_ground(strategy);
                run_circle_stack(&mut world, black_box(200));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_circle_stack, bench_broadphase_strategies);
criterion_main!(benches);
