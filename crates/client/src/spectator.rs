use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use astrolith::net::{GameSnapshot, Message, NetworkEndpoint};
use astrolith::{GameCommand, Simulation, SimulationRunner};

const LOOP_INTERVAL: Duration = Duration::from_millis(2);

/// A watch-only peer: announces itself with `spectate`, applies every
/// snapshot the host broadcasts, and never sends an action diff. Its
/// replica ticks only to animate between snapshots and spawns nothing of
/// its own.
pub struct SpectatorClient {
    endpoint: NetworkEndpoint,
    host_addr: SocketAddr,
    sim: Arc<Mutex<Simulation>>,
    connected: Arc<AtomicBool>,
    replica_runner: Option<SimulationRunner>,
    replica_running: Arc<AtomicBool>,
    replica_thread: Option<JoinHandle<()>>,
    _replica_commands: Sender<GameCommand>,
}

impl SpectatorClient {
    pub fn new(host_addr: SocketAddr) -> io::Result<Self> {
        let endpoint = NetworkEndpoint::bind("0.0.0.0:0")?;

        let sim = Arc::new(Mutex::new(Simulation::spectator()));
        let replica_running = Arc::new(AtomicBool::new(true));
        let (command_tx, command_rx) = mpsc::channel();
        let replica_runner = SimulationRunner::new(
            Arc::clone(&sim),
            command_rx,
            Arc::clone(&replica_running),
        );

        Ok(Self {
            endpoint,
            host_addr,
            sim,
            connected: Arc::new(AtomicBool::new(true)),
            replica_runner: Some(replica_runner),
            replica_running,
            replica_thread: None,
            _replica_commands: command_tx,
        })
    }

    pub fn connected_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.connected)
    }

    pub fn replica(&self) -> Arc<Mutex<Simulation>> {
        Arc::clone(&self.sim)
    }

    pub fn subscribe_frames(&mut self) -> Option<Receiver<GameSnapshot>> {
        self.replica_runner.as_mut().map(SimulationRunner::subscribe)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.endpoint.local_addr()
    }

    pub fn run(&mut self) -> io::Result<()> {
        self.endpoint
            .send_to(Message::Spectate, self.host_addr)?;
        log::info!("spectating match at {}", self.host_addr);

        // The replica animates from the first snapshot on.
        if let Some(runner) = self.replica_runner.take() {
            self.replica_thread = Some(runner.spawn());
        }

        while self.connected.load(Ordering::SeqCst) {
            match self.endpoint.receive() {
                Ok(received) => {
                    for (message, _) in received {
                        if let Message::Snapshot(snapshot) = message {
                            if let Ok(mut sim) = self.sim.lock() {
                                sim.apply_snapshot(&snapshot);
                            }
                        }
                    }
                }
                Err(e) => log::warn!("receive failed: {e}"),
            }
            thread::sleep(LOOP_INTERVAL);
        }

        if let Err(e) = self.endpoint.send_to(Message::Disconnect, self.host_addr) {
            log::warn!("goodbye send failed: {e}");
        }

        self.replica_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.replica_thread.take() {
            handle.join().ok();
        }
        self.endpoint.shutdown();
        log::info!("stopped spectating");
        Ok(())
    }
}
