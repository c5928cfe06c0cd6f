use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use astrolith::net::{GameSnapshot, Message, NetworkEndpoint, Packet, PeerKind, PeerRegistry};
use astrolith::{GameCommand, Player, PlayerId, ShipIntent};

use crate::config::HostConfig;
use crate::events::HostEvent;

/// The authoritative side of a multiplayer match. Owns the well-known
/// socket and the peer address book; every mutation of the game state is
/// forwarded to the simulation thread over the command channel, and every
/// snapshot the simulation publishes is fanned out to all registered
/// addresses. One instance per process, owned by the entry point.
pub struct HostServer {
    endpoint: NetworkEndpoint,
    registry: PeerRegistry,
    commands: Sender<GameCommand>,
    snapshots: Receiver<GameSnapshot>,
    config: HostConfig,
    started: bool,
    running: Arc<AtomicBool>,
    events: VecDeque<HostEvent>,
}

impl HostServer {
    pub fn new(
        config: HostConfig,
        commands: Sender<GameCommand>,
        snapshots: Receiver<GameSnapshot>,
        running: Arc<AtomicBool>,
    ) -> io::Result<Self> {
        let endpoint = NetworkEndpoint::bind((config.bind.as_str(), config.port))?;

        Ok(Self {
            endpoint,
            registry: PeerRegistry::new(),
            commands,
            snapshots,
            config,
            started: false,
            running,
            events: VecDeque::new(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.endpoint.local_addr()
    }

    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn connected_clients(&self) -> usize {
        self.registry.client_count()
    }

    pub fn spectators(&self) -> usize {
        self.registry.spectator_count()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = HostEvent> + '_ {
        self.events.drain(..)
    }

    /// Blocks the calling thread until the match ends or the run flag is
    /// cleared.
    pub fn run(&mut self) {
        while self.running.load(Ordering::SeqCst) {
            self.pump();
            for event in self.events.drain(..) {
                event.log();
            }
            std::thread::sleep(Duration::from_millis(1));
        }

        // The simulation publishes its final snapshot (end-of-match
        // bookkeeping) right before clearing the run flag; flush it out
        // to the peers before letting go of the socket.
        self.forward_snapshots();
        for event in self.events.drain(..) {
            event.log();
        }
        log::info!("host server stopped");
    }

    /// One service iteration: dispatch inbound messages, start the match
    /// once enough clients joined, fan out pending snapshots.
    pub fn pump(&mut self) {
        self.process_network();
        self.maybe_start();
        self.forward_snapshots();
    }

    fn process_network(&mut self) {
        let received = match self.endpoint.receive() {
            Ok(received) => received,
            Err(e) => {
                self.events.push_back(HostEvent::Error {
                    message: format!("receive failed: {e}"),
                });
                return;
            }
        };

        for (message, addr) in received {
            self.dispatch(message, addr);
        }
    }

    fn dispatch(&mut self, message: Message, addr: SocketAddr) {
        match message {
            Message::Join(profile) => {
                let player = Player::from(&profile);
                let ship_id = player.id;
                self.registry.register_client(addr, ship_id);
                self.events.push_back(HostEvent::ClientJoined {
                    addr,
                    name: player.name.clone(),
                    ship_id,
                });
                self.send_command(GameCommand::AddPlayer(player));

                // A peer joining a match already underway starts its
                // local loop right away.
                if self.started {
                    self.send(Message::Start, addr);
                }
            }
            Message::Actions { ship_id, intent } => {
                self.send_command(GameCommand::SetIntent {
                    ship_id: PlayerId(ship_id),
                    intent: ShipIntent::from_bits_truncate(intent),
                });
            }
            Message::Spectate => {
                self.registry.register_spectator(addr);
                self.events.push_back(HostEvent::SpectatorJoined { addr });
            }
            Message::Stop { ship_id } => {
                self.registry.remove(&addr);
                self.events.push_back(HostEvent::ShipStopped {
                    addr,
                    ship_id: PlayerId(ship_id),
                });
                self.send_command(GameCommand::DestroyShip {
                    ship_id: PlayerId(ship_id),
                });
            }
            Message::Disconnect => {
                if self.registry.remove(&addr).is_some() {
                    self.events.push_back(HostEvent::PeerLeft { addr });
                }
            }
            // Host-to-peer messages arriving here are a confused or
            // misbehaving peer; drop them.
            Message::Start | Message::Snapshot(_) => {
                log::debug!("ignoring peer-bound message from {addr}");
            }
        }
    }

    fn maybe_start(&mut self) {
        if self.started || self.registry.client_count() < self.config.min_opponents {
            return;
        }

        self.started = true;
        let clients: Vec<SocketAddr> = self.registry.client_addresses().collect();
        for addr in &clients {
            self.send(Message::Start, *addr);
        }
        self.send_command(GameCommand::Begin);
        self.events.push_back(HostEvent::MatchStarted {
            clients: clients.len(),
        });
    }

    fn forward_snapshots(&mut self) {
        for snapshot in self.snapshots.try_iter().collect::<Vec<_>>() {
            if self.registry.is_empty() {
                continue;
            }

            // Encode once, fan out to every registered address.
            let data = match Packet::new(Message::Snapshot(snapshot)).serialize() {
                Ok(data) => data,
                Err(e) => {
                    self.events.push_back(HostEvent::Error {
                        message: format!("snapshot encode failed: {e}"),
                    });
                    continue;
                }
            };

            for addr in self.registry.addresses().collect::<Vec<_>>() {
                if let Err(e) = self.endpoint.send_raw(&data, addr) {
                    self.events.push_back(HostEvent::Error {
                        message: format!("snapshot send to {addr} failed: {e}"),
                    });
                }
            }
        }
    }

    fn send(&mut self, message: Message, addr: SocketAddr) {
        if let Err(e) = self.endpoint.send_to(message, addr) {
            self.events.push_back(HostEvent::Error {
                message: format!("send to {addr} failed: {e}"),
            });
        }
    }

    fn send_command(&mut self, command: GameCommand) {
        // The simulation thread hanging up means the match is over.
        if self.commands.send(command).is_err() {
            self.running.store(false, Ordering::SeqCst);
        }
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }

    pub fn peer_kind(&self, addr: &SocketAddr) -> Option<PeerKind> {
        self.registry.get(addr)
    }
}
