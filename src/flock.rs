/*
 * Flock Simulation Module
 *
 * This module owns the agent collection and advances it one tick at a time.
 * A tick computes steering forces for every boid from the three flocking
 * rules (plus an optional external attraction point), integrates velocity
 * and position, and re-seeds any boid that escaped the world bound.
 *
 * Three execution paths are available:
 * - sequential: agents update in index order, each reading the already
 *   updated state of lower-indexed agents (reference behavior)
 * - parallel: forces are computed with rayon from a frame-consistent
 *   snapshot of all agents, then applied
 * - spatial grid: like the snapshot path, but neighbor candidates come from
 *   a uniform 3D grid instead of a full O(n^2) scan
 */

use glam::{vec3, Vec3};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::boid::Boid;
use crate::config::{ConfigError, FlockConfig};
use crate::spatial_grid::SpatialGrid;

pub struct FlockSimulation {
    config: FlockConfig,
    boids: Vec<Boid>,
    grid: SpatialGrid,
    attractor: Option<Vec3>,
    rng: StdRng,
}

impl FlockSimulation {
    /// Creates a simulation with `config.num_boids` agents at random
    /// positions inside the world bound, with random initial headings.
    pub fn new(config: FlockConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let boids = (0..config.num_boids)
            .map(|_| random_boid(&mut rng, &config))
            .collect();
        Ok(Self::assemble(config, boids, rng))
    }

    /// Creates a simulation with an explicit initial agent state. The agent
    /// count in the config is updated to match.
    pub fn with_boids(mut config: FlockConfig, boids: Vec<Boid>) -> Result<Self, ConfigError> {
        config.validate()?;
        config.num_boids = boids.len();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self::assemble(config, boids, rng))
    }

    fn assemble(config: FlockConfig, boids: Vec<Boid>, rng: StdRng) -> Self {
        // Sparse, so this holds no per-cell storage until the grid path
        // populates it.
        let grid = SpatialGrid::new(config.grid_cell_size());
        Self {
            config,
            boids,
            grid,
            attractor: None,
            rng,
        }
    }

    /// Advances the simulation by one tick.
    pub fn tick(&mut self) {
        if self.config.enable_spatial_grid {
            self.tick_grid();
        } else if self.config.enable_parallel {
            self.tick_parallel();
        } else {
            self.tick_sequential();
        }
    }

    // Reference path: in-place sequential update. Boid i reads boid j's
    // pre-tick state for j > i and post-tick state for j < i.
    fn tick_sequential(&mut self) {
        let speed_factor = self.config.speed_factor;
        let bounds_radius = self.config.bounds_radius;

        for i in 0..self.boids.len() {
            let force = {
                let boid = &self.boids[i];
                let mut force = boid.flock(&self.boids, &self.config);
                if let Some(target) = self.attractor {
                    force += boid.steer_toward(target, self.config.attractor_strength);
                }
                force
            };

            let boid = &mut self.boids[i];
            boid.apply_force(force);
            boid.integrate(speed_factor);
            if boid.position.length() > bounds_radius {
                boid.position = random_point_in_sphere(&mut self.rng, bounds_radius);
            }
        }
    }

    // Frame-consistent path: all forces are computed from a snapshot taken
    // before any agent is mutated.
    fn tick_parallel(&mut self) {
        let snapshot = self.boids.clone();
        let speed_factor = self.config.speed_factor;
        let forces: Vec<Vec3> = {
            let config = &self.config;
            let attractor = self.attractor;
            snapshot
                .par_iter()
                .map(|boid| {
                    let mut force = boid.flock(&snapshot, config);
                    if let Some(target) = attractor {
                        force += boid.steer_toward(target, config.attractor_strength);
                    }
                    force
                })
                .collect()
        };

        for (boid, force) in self.boids.iter_mut().zip(forces) {
            boid.apply_force(force);
            boid.integrate(speed_factor);
        }
        self.reseed_escaped();
    }

    // Grid path: snapshot semantics with neighbor candidates gathered from
    // the spatial grid. Honors enable_parallel for the force computation.
    fn tick_grid(&mut self) {
        let cell_size = self.config.grid_cell_size();
        if (cell_size - self.grid.cell_size()).abs() > f32::EPSILON {
            debug!("rebuilding spatial grid with cell size {cell_size}");
            self.grid = SpatialGrid::new(cell_size);
        }
        self.grid.clear();
        for (i, boid) in self.boids.iter().enumerate() {
            self.grid.insert(i, boid.position);
        }

        let snapshot = self.boids.clone();
        let speed_factor = self.config.speed_factor;
        let forces: Vec<Vec3> = {
            let config = &self.config;
            let grid = &self.grid;
            let attractor = self.attractor;
            let search_radius = config.max_rule_radius();
            let compute = |boid: &Boid| {
                let candidates = grid.nearby_indices(boid.position, search_radius);
                let mut force = boid.flock_indexed(&snapshot, &candidates, config);
                if let Some(target) = attractor {
                    force += boid.steer_toward(target, config.attractor_strength);
                }
                force
            };
            if config.enable_parallel {
                snapshot.par_iter().map(compute).collect()
            } else {
                snapshot.iter().map(compute).collect()
            }
        };

        for (boid, force) in self.boids.iter_mut().zip(forces) {
            boid.apply_force(force);
            boid.integrate(speed_factor);
        }
        self.reseed_escaped();
    }

    // Teleport any boid outside the world bound to a random position inside
    // it. Velocity and acceleration are untouched.
    fn reseed_escaped(&mut self) {
        let bounds_radius = self.config.bounds_radius;
        for boid in &mut self.boids {
            if boid.position.length() > bounds_radius {
                boid.position = random_point_in_sphere(&mut self.rng, bounds_radius);
            }
        }
    }

    /// Sets or clears the external attraction point for subsequent ticks.
    pub fn set_attractor(&mut self, target: Option<Vec3>) {
        self.attractor = target;
    }

    /// Replaces the configuration wholesale. Agents are re-created when the
    /// agent count changes; otherwise the existing agents are kept.
    pub fn update_config(&mut self, config: FlockConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let recreate = config.num_boids != self.boids.len();
        self.config = config;
        if recreate {
            self.recreate_boids();
        }
        Ok(())
    }

    /// Changes the agent count, re-creating the whole agent collection.
    pub fn set_agent_count(&mut self, num_boids: usize) {
        self.config.num_boids = num_boids;
        self.recreate_boids();
    }

    fn recreate_boids(&mut self) {
        debug!("re-creating {} agents", self.config.num_boids);
        self.boids = (0..self.config.num_boids)
            .map(|_| random_boid(&mut self.rng, &self.config))
            .collect();
    }

    /// The agents, ordered and indexable so a renderer can address a
    /// matching draw instance by the same index.
    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    /// Mean agent position, or the origin for an empty flock.
    pub fn centroid(&self) -> Vec3 {
        if self.boids.is_empty() {
            return Vec3::ZERO;
        }
        let sum: Vec3 = self.boids.iter().map(|b| b.position).sum();
        sum / self.boids.len() as f32
    }

    /// Mean velocity magnitude, or zero for an empty flock.
    pub fn average_speed(&self) -> f32 {
        if self.boids.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.boids.iter().map(|b| b.velocity.length()).sum();
        sum / self.boids.len() as f32
    }
}

fn random_boid(rng: &mut StdRng, config: &FlockConfig) -> Boid {
    let position = random_point_in_sphere(rng, config.bounds_radius);
    let velocity = random_heading(rng) * (config.speed_factor * 0.5);
    Boid::new(position, velocity)
}

// Uniform sample inside a sphere, by rejection from the enclosing cube
fn random_point_in_sphere(rng: &mut StdRng, radius: f32) -> Vec3 {
    loop {
        let v = vec3(
            rng.gen_range(-1.0f32..1.0),
            rng.gen_range(-1.0f32..1.0),
            rng.gen_range(-1.0f32..1.0),
        );
        if v.length_squared() <= 1.0 {
            return v * radius;
        }
    }
}

fn random_heading(rng: &mut StdRng) -> Vec3 {
    loop {
        let v = vec3(
            rng.gen_range(-1.0f32..1.0),
            rng.gen_range(-1.0f32..1.0),
            rng.gen_range(-1.0f32..1.0),
        );
        if v.length_squared() <= 1.0 {
            if let Some(heading) = v.try_normalize() {
                return heading;
            }
        }
    }
}
