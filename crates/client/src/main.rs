use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use astrolith::net::DEFAULT_PORT;
use astrolith::{Player, Rgb, Simulation, SimulationRunner};
use astrolith_client::{JoinerClient, SpectatorClient};

#[derive(Parser)]
#[command(name = "astrolith-client")]
#[command(about = "Astrolith peer")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Join a hosted match as a player.
    Join {
        /// Host address.
        host: String,

        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        #[arg(short, long, default_value = "pilot")]
        name: String,

        /// Ship color as an rrggbb hex triplet.
        #[arg(short, long, default_value = "22aaff")]
        color: String,
    },
    /// Watch a hosted match without playing.
    Spectate {
        host: String,

        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Run a purely local single-player match.
    Solo {
        #[arg(short, long, default_value = "pilot")]
        name: String,

        #[arg(short, long, default_value = "22aaff")]
        color: String,
    },
}

fn parse_color(value: &str) -> Result<Rgb> {
    let value = value.trim_start_matches('#');
    anyhow::ensure!(value.len() == 6, "color must be an rrggbb hex triplet");
    let packed = u32::from_str_radix(value, 16).context("color must be hex")?;
    Ok([(packed >> 16) as u8, (packed >> 8) as u8, packed as u8])
}

fn host_addr(host: &str, port: u16) -> Result<SocketAddr> {
    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid host address {host}:{port}"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Args::parse().command {
        Command::Join {
            host,
            port,
            name,
            color,
        } => {
            let player = Player::new(name, parse_color(&color)?);
            let mut client = JoinerClient::new(host_addr(&host, port)?, player)
                .context("failed to open a socket")?;
            client.run().context("join loop failed")?;
        }
        Command::Spectate { host, port } => {
            let mut client = SpectatorClient::new(host_addr(&host, port)?)
                .context("failed to open a socket")?;
            client.run().context("spectate loop failed")?;
        }
        Command::Solo { name, color } => {
            let player = Player::new(name, parse_color(&color)?);
            let sim = Arc::new(Mutex::new(Simulation::single(player)));
            let running = Arc::new(AtomicBool::new(true));

            // No external mutations in a local match; the sender stays
            // alive so the channel simply sits empty.
            let (_command_tx, command_rx) = mpsc::channel();
            let runner = SimulationRunner::new(sim, command_rx, running);
            log::info!("local match running");
            runner.run();
        }
    }

    Ok(())
}
