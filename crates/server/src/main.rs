use std::sync::atomic::AtomicBool;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;

use astrolith::net::DEFAULT_PORT;
use astrolith::{MemoryScoreStore, Player, Rgb, ScoreStore, Simulation, SimulationRunner};
use astrolith_server::{HostConfig, HostServer};

#[derive(Parser)]
#[command(name = "astrolith-server")]
#[command(about = "Astrolith match host")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Clients required before the match starts.
    #[arg(short, long, default_value_t = 1)]
    min_opponents: usize,

    /// The host's own player name.
    #[arg(short, long, default_value = "host")]
    name: String,

    /// The host's ship color as an rrggbb hex triplet.
    #[arg(short, long, default_value = "ff8800")]
    color: String,
}

fn parse_color(value: &str) -> Result<Rgb> {
    let value = value.trim_start_matches('#');
    anyhow::ensure!(value.len() == 6, "color must be an rrggbb hex triplet");
    let packed = u32::from_str_radix(value, 16).context("color must be hex")?;
    Ok([(packed >> 16) as u8, (packed >> 8) as u8, packed as u8])
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let color = parse_color(&args.color)?;

    let config = HostConfig {
        bind: args.bind,
        port: args.port,
        min_opponents: args.min_opponents,
    };

    let host_player = Player::new(args.name.clone(), color);
    let mut store = MemoryScoreStore::new();
    store.upsert_player(&args.name, color);

    let sim = Arc::new(Mutex::new(
        Simulation::host(host_player).with_store(Box::new(store)),
    ));
    let running = Arc::new(AtomicBool::new(true));

    let (command_tx, command_rx) = mpsc::channel();
    let mut runner = SimulationRunner::new(Arc::clone(&sim), command_rx, Arc::clone(&running));
    let snapshots = runner.subscribe();
    let sim_thread = runner.spawn();

    let mut host = HostServer::new(config, command_tx, snapshots, running)
        .context("failed to bind the host port")?;
    log::info!(
        "hosting on {} (waiting for {} opponent(s))",
        host.local_addr(),
        args.min_opponents
    );

    host.run();

    sim_thread.join().ok();
    Ok(())
}
