/*
 * Boid Module
 *
 * This module defines the Boid struct and its steering behavior.
 * Each boid follows three main rules:
 * 1. Alignment: Steer towards the average heading of neighbors
 * 2. Cohesion: Steer towards the average position of neighbors
 * 3. Separation: Avoid crowding neighbors, weighted by proximity
 */

use glam::{Quat, Vec3};

use crate::config::FlockConfig;

/// Neighbors closer than this are skipped by every rule. This implements
/// self-exclusion (a boid is at distance zero from itself) and keeps
/// coincident agent pairs from producing NaN repulsion vectors.
pub const MIN_NEIGHBOR_DISTANCE: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boid {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
}

impl Boid {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            acceleration: Vec3::ZERO,
        }
    }

    /// Apply a force to the boid for the current tick.
    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force;
    }

    /// Advance the boid one tick: accumulate acceleration into velocity,
    /// clamp the speed (direction preserved), move, and clear the
    /// acceleration scratch accumulator.
    pub fn integrate(&mut self, speed_factor: f32) {
        self.velocity += self.acceleration;
        self.velocity = self.velocity.clamp_length_max(speed_factor);
        self.position += self.velocity;
        self.acceleration = Vec3::ZERO;
    }

    /// Calculate alignment steering (match the average heading of neighbors).
    pub fn steer_alignment<'a>(
        &self,
        neighbors: impl IntoIterator<Item = &'a Boid>,
        radius: f32,
    ) -> Vec3 {
        let mut steering = Vec3::ZERO;
        let mut count = 0;

        for other in neighbors {
            let d = self.position.distance(other.position);
            if d > MIN_NEIGHBOR_DISTANCE && d < radius {
                steering += other.velocity;
                count += 1;
            }
        }

        if count > 0 {
            steering /= count as f32;
            steering - self.velocity
        } else {
            Vec3::ZERO
        }
    }

    /// Calculate cohesion steering (move towards the centroid of neighbors,
    /// damped by the current velocity).
    pub fn steer_cohesion<'a>(
        &self,
        neighbors: impl IntoIterator<Item = &'a Boid>,
        radius: f32,
    ) -> Vec3 {
        let mut steering = Vec3::ZERO;
        let mut count = 0;

        for other in neighbors {
            let d = self.position.distance(other.position);
            if d > MIN_NEIGHBOR_DISTANCE && d < radius {
                steering += other.position;
                count += 1;
            }
        }

        if count > 0 {
            steering /= count as f32;
            steering - self.position - self.velocity
        } else {
            Vec3::ZERO
        }
    }

    /// Calculate separation steering (push away from neighbors, closer
    /// neighbors push harder).
    pub fn steer_separation<'a>(
        &self,
        neighbors: impl IntoIterator<Item = &'a Boid>,
        radius: f32,
    ) -> Vec3 {
        let mut steering = Vec3::ZERO;
        let mut count = 0;

        for other in neighbors {
            let d = self.position.distance(other.position);
            if d > MIN_NEIGHBOR_DISTANCE && d < radius {
                // Unit vector away from the neighbor, weighted by inverse distance
                let diff = (self.position - other.position) / (d * d);
                steering += diff;
                count += 1;
            }
        }

        if count > 0 {
            steering /= count as f32;
        }
        steering
    }

    /// Combined force from every enabled rule, scanning the full agent pool.
    pub fn flock(&self, others: &[Boid], config: &FlockConfig) -> Vec3 {
        let mut force = Vec3::ZERO;
        if config.modules.alignment {
            force += self.steer_alignment(others, config.alignment_radius);
        }
        if config.modules.cohesion {
            force += self.steer_cohesion(others, config.cohesion_radius);
        }
        if config.modules.separation {
            force += self.steer_separation(others, config.separation_radius);
        }
        force
    }

    /// Combined force from every enabled rule, scanning only the candidate
    /// indices produced by the spatial grid. The exact distance predicate is
    /// re-checked per rule, so candidates outside a radius never qualify.
    pub fn flock_indexed(
        &self,
        others: &[Boid],
        neighbor_indices: &[usize],
        config: &FlockConfig,
    ) -> Vec3 {
        let candidates = || neighbor_indices.iter().map(|&i| &others[i]);
        let mut force = Vec3::ZERO;
        if config.modules.alignment {
            force += self.steer_alignment(candidates(), config.alignment_radius);
        }
        if config.modules.cohesion {
            force += self.steer_cohesion(candidates(), config.cohesion_radius);
        }
        if config.modules.separation {
            force += self.steer_separation(candidates(), config.separation_radius);
        }
        force
    }

    /// Steering contribution toward an external attraction point (e.g. a
    /// pointer position supplied by the host), scaled by `strength`.
    pub fn steer_toward(&self, target: Vec3, strength: f32) -> Vec3 {
        let to_target = target - self.position;
        if to_target.length() > MIN_NEIGHBOR_DISTANCE {
            to_target.normalize() * strength
        } else {
            Vec3::ZERO
        }
    }

    /// Orientation for a render instance: rotates the +Y reference axis onto
    /// the normalized velocity. Identity when the boid is at rest.
    pub fn orientation(&self) -> Quat {
        match self.velocity.try_normalize() {
            Some(heading) => Quat::from_rotation_arc(Vec3::Y, heading),
            None => Quat::IDENTITY,
        }
    }
}
