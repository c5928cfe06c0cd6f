use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::net::GameSnapshot;
use crate::snapshot::SnapshotBus;

use super::{GameCommand, MatchPhase, Simulation, TICK_MS};

const TICK: Duration = Duration::from_millis(TICK_MS);

/// Poll interval while waiting for the match to start and between
/// end-of-match re-checks.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Drives one [`Simulation`] at the fixed tick cadence on its own thread.
/// External mutations arrive on the command channel and are drained once
/// per iteration; every tick that changed state is published to the bus
/// as an immutable snapshot.
pub struct SimulationRunner {
    sim: Arc<Mutex<Simulation>>,
    commands: Receiver<GameCommand>,
    bus: SnapshotBus,
    running: Arc<AtomicBool>,
}

impl SimulationRunner {
    pub fn new(
        sim: Arc<Mutex<Simulation>>,
        commands: Receiver<GameCommand>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            sim,
            commands,
            bus: SnapshotBus::new(),
            running,
        }
    }

    /// Registers a snapshot subscriber. Call before [`spawn`](Self::spawn).
    pub fn subscribe(&mut self) -> Receiver<GameSnapshot> {
        self.bus.subscribe()
    }

    pub fn spawn(self) -> thread::JoinHandle<()> {
        thread::spawn(move || self.run())
    }

    pub fn run(mut self) {
        while self.running.load(Ordering::SeqCst) {
            let started = Instant::now();

            let Ok(mut sim) = self.sim.lock() else {
                break;
            };

            let mut changed = false;
            for command in self.commands.try_iter() {
                changed |= sim.apply(command);
            }

            match sim.phase() {
                MatchPhase::Waiting => {
                    let snapshot = changed.then(|| sim.snapshot());
                    drop(sim);
                    if let Some(snapshot) = snapshot {
                        self.bus.publish(snapshot);
                    }
                    thread::sleep(IDLE_POLL);
                }
                MatchPhase::Running => {
                    sim.update();
                    let snapshot = sim.snapshot();
                    drop(sim);
                    self.bus.publish(snapshot);
                    thread::sleep(TICK.saturating_sub(started.elapsed()));
                }
                MatchPhase::Over => {
                    let proceed = sim.end_of_match();
                    let snapshot = sim.snapshot();
                    drop(sim);
                    self.bus.publish(snapshot);
                    if !proceed {
                        break;
                    }
                    thread::sleep(IDLE_POLL);
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        log::debug!("simulation loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::player::Player;
    use crate::simulation::GameMode;

    #[test]
    fn runner_ticks_and_publishes() {
        let (tx, rx) = mpsc::channel();
        let sim = Arc::new(Mutex::new(Simulation::single(Player::new(
            "solo",
            [1, 2, 3],
        ))));
        let running = Arc::new(AtomicBool::new(true));

        let mut runner = SimulationRunner::new(Arc::clone(&sim), rx, Arc::clone(&running));
        let snapshots = runner.subscribe();
        let handle = runner.spawn();

        let snapshot = snapshots
            .recv_timeout(Duration::from_secs(2))
            .expect("first tick published");
        assert_eq!(snapshot.players.len(), 1);

        running.store(false, Ordering::SeqCst);
        drop(tx);
        handle.join().unwrap();
    }

    #[test]
    fn begin_command_starts_a_waiting_match() {
        let (tx, rx) = mpsc::channel();
        let sim = Arc::new(Mutex::new(Simulation::host(Player::new(
            "host",
            [4, 5, 6],
        ))));
        let running = Arc::new(AtomicBool::new(true));

        let mut runner = SimulationRunner::new(Arc::clone(&sim), rx, Arc::clone(&running));
        let snapshots = runner.subscribe();
        let handle = runner.spawn();

        // Nothing ticks while waiting; joining a peer publishes the
        // roster change.
        tx.send(GameCommand::AddPlayer(Player::new("peer", [7, 8, 9])))
            .unwrap();
        let roster = snapshots
            .recv_timeout(Duration::from_secs(2))
            .expect("join published");
        assert_eq!(roster.players.len(), 2);

        tx.send(GameCommand::Begin).unwrap();
        let ticked = snapshots
            .recv_timeout(Duration::from_secs(2))
            .expect("tick published");
        assert!(ticked.tick >= 1 || ticked.players.len() == 2);

        assert_eq!(sim.lock().unwrap().mode(), GameMode::Multi);

        running.store(false, Ordering::SeqCst);
        handle.join().unwrap();
    }
}
