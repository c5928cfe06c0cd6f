use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use astrolith::net::{GameSnapshot, Message, NetworkEndpoint};
use astrolith::{GameCommand, Player, PlayerId, PlayerProfile, Simulation, SimulationRunner};

use crate::input::IntentHandle;

/// Poll interval for the joiner's receive-and-send loop.
const LOOP_INTERVAL: Duration = Duration::from_millis(2);

/// A playing peer. Sends its join payload once, then keeps the host fed
/// with action diffs while applying every received snapshot wholesale to
/// the local replica. The replica runs its own simulation thread once the
/// host says `start`, purely for prediction and animation; the host's
/// snapshots always win.
pub struct JoinerClient {
    endpoint: NetworkEndpoint,
    host_addr: SocketAddr,
    sim: Arc<Mutex<Simulation>>,
    ship_id: PlayerId,
    profile: PlayerProfile,
    intent: IntentHandle,
    connected: Arc<AtomicBool>,
    last_sent: Option<astrolith::ShipIntent>,
    replica_runner: Option<SimulationRunner>,
    replica_running: Arc<AtomicBool>,
    replica_thread: Option<JoinHandle<()>>,
    // Keeps the replica's command channel connected; the replica takes
    // no external commands.
    _replica_commands: Sender<GameCommand>,
}

impl JoinerClient {
    pub fn new(host_addr: SocketAddr, player: Player) -> io::Result<Self> {
        let endpoint = NetworkEndpoint::bind("0.0.0.0:0")?;
        let profile = PlayerProfile::from(&player);
        let ship_id = player.id;

        let sim = Arc::new(Mutex::new(Simulation::replica(player)));
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
            ship_id,
            profile,
            intent: IntentHandle::new(),
            connected: Arc::new(AtomicBool::new(true)),
            last_sent: None,
            replica_runner: Some(replica_runner),
            replica_running,
            replica_thread: None,
            _replica_commands: command_tx,
        })
    }

    /// Handle the input layer writes intent bits into.
    pub fn intent_handle(&self) -> IntentHandle {
        self.intent.clone()
    }

    /// Cleared by the UI when the player quits; the loop then says
    /// goodbye to the host and winds down.
    pub fn connected_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.connected)
    }

    /// The local replica, for a render surface to read.
    pub fn replica(&self) -> Arc<Mutex<Simulation>> {
        Arc::clone(&self.sim)
    }

    /// Frame subscription on the replica's own tick loop. Only available
    /// before the match starts.
    pub fn subscribe_frames(&mut self) -> Option<Receiver<GameSnapshot>> {
        self.replica_runner.as_mut().map(SimulationRunner::subscribe)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.endpoint.local_addr()
    }

    /// Blocks until the player disconnects. The join payload goes out
    /// once; everything after that is best effort.
    pub fn run(&mut self) -> io::Result<()> {
        self.endpoint
            .send_to(Message::Join(self.profile.clone()), self.host_addr)?;
        log::info!("joining match at {}", self.host_addr);

        while self.connected.load(Ordering::SeqCst) {
            match self.endpoint.receive() {
                Ok(received) => {
                    for (message, _) in received {
                        self.handle_message(message);
                    }
                }
                Err(e) => log::warn!("receive failed: {e}"),
            }

            self.push_intent();
            thread::sleep(LOOP_INTERVAL);
        }

        if let Err(e) = self.endpoint.send_to(
            Message::Stop {
                ship_id: self.ship_id.0,
            },
            self.host_addr,
        ) {
            log::warn!("goodbye send failed: {e}");
        }

        self.stop_replica();
        self.endpoint.shutdown();
        log::info!("left the match");
        Ok(())
    }

    fn handle_message(&mut self, message: Message) {
        match message {
            Message::Snapshot(snapshot) => {
                if let Ok(mut sim) = self.sim.lock() {
                    sim.apply_snapshot(&snapshot);
                }
            }
            Message::Start => self.start_replica(),
            other => log::debug!("ignoring {other:?} from host"),
        }
    }

    /// Applies the current intent bits to the local ship and re-sends the
    /// action diff if they changed since the last send.
    fn push_intent(&mut self) {
        let current = self.intent.get();
        if self.last_sent == Some(current) {
            return;
        }

        if let Ok(mut sim) = self.sim.lock() {
            if let Some(ship) = sim.state_mut().ship_mut(self.ship_id) {
                ship.intent = current;
            }
        }

        match self.endpoint.send_to(
            Message::Actions {
                ship_id: self.ship_id.0,
                intent: current.bits(),
            },
            self.host_addr,
        ) {
            Ok(_) => self.last_sent = Some(current),
            Err(e) => log::warn!("action send failed: {e}"),
        }
    }

    fn start_replica(&mut self) {
        if let Some(runner) = self.replica_runner.take() {
            log::info!("match started");
            self.replica_thread = Some(runner.spawn());
        }
    }

    fn stop_replica(&mut self) {
        self.replica_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.replica_thread.take() {
            handle.join().ok();
        }
    }
}
