/*
 * Flocking behavior integration tests
 *
 * These tests exercise the simulation through its public API: speed
 * clamping, rule convergence behavior, boundary re-seeding, and the
 * identity behavior when all rules are disabled.
 */

use glam::{vec3, Vec3};

use boids3d::{Boid, FlockConfig, FlockSimulation, RuleModules};

fn base_config() -> FlockConfig {
    FlockConfig {
        seed: Some(1337),
        ..FlockConfig::default()
    }
}

fn angle_between(a: Vec3, b: Vec3) -> f32 {
    let denom = a.length() * b.length();
    assert!(denom > 0.0, "angle undefined for zero-length velocity");
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

#[test]
fn speed_never_exceeds_the_cap_on_any_path() {
    for (grid, parallel) in [(false, false), (false, true), (true, false), (true, true)] {
        let mut config = base_config();
        config.num_boids = 200;
        config.enable_spatial_grid = grid;
        config.enable_parallel = parallel;
        config.attractor_strength = 10.0;
        let speed_factor = config.speed_factor;

        let mut sim = FlockSimulation::new(config).unwrap();
        sim.set_attractor(Some(vec3(100.0, 0.0, 0.0)));
        for _ in 0..50 {
            sim.tick();
            for boid in sim.boids() {
                assert!(
                    boid.velocity.length() <= speed_factor + 1e-4,
                    "speed {} exceeds cap {} (grid={}, parallel={})",
                    boid.velocity.length(),
                    speed_factor,
                    grid,
                    parallel
                );
            }
        }
    }
}

#[test]
fn isolated_boid_receives_no_steering() {
    let config = base_config();
    let velocity = vec3(1.0, 0.5, -0.25);
    let start = vec3(10.0, 20.0, 30.0);
    let mut sim =
        FlockSimulation::with_boids(config, vec![Boid::new(start, velocity)]).unwrap();

    sim.tick();
    let boid = &sim.boids()[0];
    assert_eq!(boid.velocity, velocity);
    assert_eq!(boid.position, start + velocity);
}

#[test]
fn alignment_converges_headings() {
    let mut config = base_config();
    config.modules = RuleModules::only_alignment();
    config.alignment_radius = 10.0;
    config.speed_factor = 0.1;
    let boids = vec![
        Boid::new(vec3(0.0, 0.0, 0.0), vec3(0.1, 0.0, 0.0)),
        Boid::new(vec3(1.0, 0.0, 0.0), vec3(0.0, 0.1, 0.0)),
    ];
    let mut sim = FlockSimulation::with_boids(config, boids).unwrap();

    let mut previous = angle_between(sim.boids()[0].velocity, sim.boids()[1].velocity);
    assert!(previous > 1.0); // starts near a right angle
    for _ in 0..20 {
        sim.tick();
        let angle = angle_between(sim.boids()[0].velocity, sim.boids()[1].velocity);
        assert!(angle <= previous + 1e-5, "angle grew: {angle} > {previous}");
        previous = angle;
    }
    assert!(previous < 1e-2, "headings never converged: {previous}");
}

#[test]
fn cohesion_contracts_toward_the_centroid() {
    let mut config = base_config();
    config.modules = RuleModules::only_cohesion();
    config.cohesion_radius = 5.0;
    config.speed_factor = 0.05;
    let boids = vec![
        Boid::new(vec3(1.0, 0.0, 0.0), Vec3::ZERO),
        Boid::new(vec3(-0.5, 0.866, 0.0), Vec3::ZERO),
        Boid::new(vec3(-0.5, -0.866, 0.0), Vec3::ZERO),
    ];
    let mut sim = FlockSimulation::with_boids(config, boids).unwrap();

    let spread = |sim: &FlockSimulation| {
        let centroid = sim.centroid();
        sim.boids()
            .iter()
            .map(|b| b.position.distance(centroid))
            .sum::<f32>()
            / sim.len() as f32
    };

    let initial = spread(&sim);
    for _ in 0..100 {
        sim.tick();
        assert!(spread(&sim) < 2.0 * initial, "flock diverged");
    }
    assert!(
        spread(&sim) < 0.2 * initial,
        "flock failed to contract: {} vs initial {}",
        spread(&sim),
        initial
    );
}

#[test]
fn separation_pushes_closer_pairs_harder() {
    let run_pair = |gap: f32| {
        let mut config = base_config();
        config.modules = RuleModules::only_separation();
        config.separation_radius = 0.1;
        config.speed_factor = 1000.0; // no clamp, expose the raw repulsion
        let boids = vec![
            Boid::new(Vec3::ZERO, Vec3::ZERO),
            Boid::new(vec3(gap, 0.0, 0.0), Vec3::ZERO),
        ];
        let mut sim = FlockSimulation::with_boids(config, boids).unwrap();
        sim.tick();
        sim.boids()[0].velocity.length()
    };

    let push_near = run_pair(0.02);
    let push_far = run_pair(0.04);
    assert!(push_near > 0.0 && push_far > 0.0);
    assert!(
        push_near > push_far,
        "closer pair repelled less: {push_near} vs {push_far}"
    );
}

#[test]
fn escaped_boids_are_reseeded_inside_the_bound() {
    let mut config = base_config();
    config.modules = RuleModules::none();
    config.bounds_radius = 100.0;
    let boids = vec![
        Boid::new(vec3(250.0, 0.0, 0.0), Vec3::ZERO), // outside the bound
        Boid::new(vec3(5.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0)), // well inside
    ];
    let mut sim = FlockSimulation::with_boids(config, boids).unwrap();
    sim.tick();

    let escaped = &sim.boids()[0];
    assert!(
        escaped.position.length() <= 100.0,
        "escaped boid not reseeded: {}",
        escaped.position
    );

    // The in-bounds boid is never teleported
    let inside = &sim.boids()[1];
    assert_eq!(inside.position, vec3(6.0, 0.0, 0.0));
}

#[test]
fn disabled_rules_reduce_to_constant_velocity_motion() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    for count in [1usize, 2, 100] {
        let mut config = base_config();
        config.modules = RuleModules::none();
        config.bounds_radius = 1_000_000.0;

        let mut rng = StdRng::seed_from_u64(count as u64);
        let boids: Vec<Boid> = (0..count)
            .map(|_| {
                Boid::new(
                    vec3(
                        rng.gen_range(-50.0..50.0),
                        rng.gen_range(-50.0..50.0),
                        rng.gen_range(-50.0..50.0),
                    ),
                    vec3(
                        rng.gen_range(-2.0..2.0),
                        rng.gen_range(-2.0..2.0),
                        rng.gen_range(-2.0..2.0),
                    ),
                )
            })
            .collect();
        let initial = boids.clone();
        let mut sim = FlockSimulation::with_boids(config, boids).unwrap();

        for tick in 1..=10 {
            sim.tick();
            for (boid, start) in sim.boids().iter().zip(&initial) {
                assert_eq!(boid.velocity, start.velocity);
                let expected = start.position + start.velocity * tick as f32;
                assert!(
                    boid.position.distance(expected) < 1e-4,
                    "agent curved with all rules disabled (n={count}, tick={tick})"
                );
            }
        }
    }
}

#[test]
fn two_boid_separation_scenario() {
    let mut config = base_config();
    config.modules = RuleModules::only_separation();
    config.separation_radius = 0.1;
    config.speed_factor = 0.01;
    let boids = vec![
        Boid::new(vec3(0.0, 0.0, 0.0), Vec3::ZERO),
        Boid::new(vec3(0.05, 0.0, 0.0), Vec3::ZERO),
    ];
    let mut sim = FlockSimulation::with_boids(config, boids).unwrap();
    sim.tick();

    let [a, b] = [&sim.boids()[0], &sim.boids()[1]];
    assert!(a.velocity.length() > 0.0);
    assert!(b.velocity.length() > 0.0);
    assert!(
        a.position.distance(b.position) > 0.05,
        "boids failed to push apart: {}",
        a.position.distance(b.position)
    );
}
