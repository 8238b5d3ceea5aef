/*
 * Boid Flocking Simulation - Module Definitions
 *
 * This file defines the module structure for the flocking simulation library.
 * The simulation core is headless: a renderer consumes per-agent position,
 * velocity, and orientation after each tick, addressed by agent index.
 */

// Re-export key components for easier access
pub use boid::{Boid, MIN_NEIGHBOR_DISTANCE};
pub use config::{ConfigError, FlockConfig, RuleModules};
pub use flock::FlockSimulation;
pub use spatial_grid::SpatialGrid;

// Define modules
pub mod boid;
pub mod config;
pub mod flock;
pub mod spatial_grid;
