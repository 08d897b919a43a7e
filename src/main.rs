use packet_courier::adapters::outbound::{init_buffered_logger, init_combined_logger};
use packet_courier::application::Simulation;
use packet_courier::Config;
use std::error::Error;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = if Path::new(&path).exists() {
        Config::from_file(&path).await?
    } else {
        warn!("{} not found, using built-in defaults", path);
        Config::default()
    };
    info!(
        "Simulating {} courier(s) on a {}x{} grid for up to {} ticks",
        config.simulation.agents, config.simulation.width, config.simulation.height, config.simulation.ticks
    );

    let sink = init_combined_logger(config.logging.file.as_deref());
    let logger = match config.logging.buffer_capacity {
        0 => sink,
        capacity => init_buffered_logger(sink, capacity),
    };

    let mut simulation = Simulation::new(&config, logger)?;
    let summary = simulation.run(config.simulation.ticks)?;

    info!(
        "Finished after {} ticks: {} delivered, {} left",
        summary.ticks, summary.delivered, summary.packets_left
    );
    for (courier, stats) in &summary.couriers {
        info!(
            "{}: {} pickups, {} deliveries, {} charging sessions, {} tasks abandoned",
            courier, stats.pickups, stats.deliveries, stats.charging_sessions, stats.tasks_abandoned
        );
    }

    // Let the buffered logger drain.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    Ok(())
}
