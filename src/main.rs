/*
 * Boid Flocking Simulation - Headless Runner
 *
 * This binary drives the flocking simulation without any renderer attached:
 * it loads a TOML configuration, advances the flock for a requested number
 * of ticks, and logs aggregate statistics along the way. Useful for tuning
 * parameters, profiling, and sanity-checking flock dynamics.
 *
 * Usage: boids3d [config-path] [ticks]
 */

use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

use boids3d::{FlockConfig, FlockSimulation};

const STATS_INTERVAL: u64 = 100;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "config.toml".to_string());
    let ticks: u64 = match args.next() {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid tick count '{raw}'"))?,
        None => 1000,
    };

    let config = FlockConfig::load(&config_path)?;
    info!("Loaded configuration from {config_path}");
    debug!("Configuration: {config:#?}");

    if config.enable_parallel {
        info!("Using {} rayon threads", rayon::current_num_threads());
    }

    let mut sim = FlockSimulation::new(config)?;
    info!("Simulating {} boids for {} ticks", sim.len(), ticks);

    let start_time = Instant::now();
    for tick in 1..=ticks {
        sim.tick();

        if tick % STATS_INTERVAL == 0 || tick == ticks {
            let centroid = sim.centroid();
            let spread = sim
                .boids()
                .iter()
                .map(|b| b.position.distance(centroid))
                .sum::<f32>()
                / sim.len().max(1) as f32;
            info!(
                "tick {tick}: avg speed {:.3}, spread {:.1}",
                sim.average_speed(),
                spread
            );
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        "Completed {} ticks in {:.2?} ({:.0} ticks/s)",
        ticks,
        elapsed,
        ticks as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );

    Ok(())
}
