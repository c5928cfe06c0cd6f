pub mod collision;
pub mod entity;
pub mod net;
pub mod player;
pub mod score;
pub mod simulation;
pub mod snapshot;
pub mod world;

pub use entity::{Asteroid, AsteroidSize, Body, Bullet, Ship, ShipIntent, FIELD_SIZE};
pub use net::{
    GameSnapshot, Message, NetworkEndpoint, NetworkStats, Packet, PacketError, PacketHeader,
    PeerKind, PeerRegistry, PlayerProfile, DEFAULT_PORT, MAX_DATAGRAM_SIZE,
};
pub use player::{Player, PlayerId, Rgb};
pub use score::{MemoryScoreStore, ScoreStore};
pub use simulation::{
    GameCommand, GameMode, MatchPhase, Simulation, SimulationRunner, TICK_MS,
};
pub use snapshot::SnapshotBus;
pub use world::GameState;
