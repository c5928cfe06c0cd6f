use glam::Vec2;
use rkyv::{rancor, Archive, Deserialize, Serialize};

use crate::entity::{Asteroid, AsteroidSize, Body, Bullet, Ship, ShipIntent};
use crate::player::{Player, PlayerId};
use crate::world::GameState;

/// Upper bound on one datagram; a full snapshot of a busy field fits
/// with room to spare.
pub const MAX_DATAGRAM_SIZE: usize = 8192;

pub const PROTOCOL_VERSION: u32 = 1;
pub const PROTOCOL_MAGIC: u32 = 0x4153_544C;

/// The host's well-known port.
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub struct PacketHeader {
    pub magic: u32,
    pub version: u32,
}

impl PacketHeader {
    pub fn new() -> Self {
        Self {
            magic: PROTOCOL_MAGIC,
            version: PROTOCOL_VERSION,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == PROTOCOL_MAGIC && self.version == PROTOCOL_VERSION
    }
}

impl Default for PacketHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Every message exchanged between host and peers, dispatched exhaustively
/// on the variant tag rather than by sniffing payload content.
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum Message {
    /// One-time join payload: the joining player's profile.
    Join(PlayerProfile),
    /// A peer's current control-intent bits for its ship.
    Actions { ship_id: u32, intent: u8 },
    /// Register the sender as a watch-only peer.
    Spectate,
    /// Deregister the sender without touching any ship (spectators).
    Disconnect,
    /// Deregister the sender and remove its ship from the match.
    Stop { ship_id: u32 },
    /// Host to joiner: begin the local replica loop.
    Start,
    /// Full authoritative state, broadcast on every change.
    Snapshot(GameSnapshot),
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct PlayerProfile {
    pub name: String,
    pub color: [u8; 3],
    pub id: u32,
    pub score: u32,
}

impl From<&Player> for PlayerProfile {
    fn from(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            color: player.color,
            id: player.id.0,
            score: player.score,
        }
    }
}

impl From<&PlayerProfile> for Player {
    fn from(profile: &PlayerProfile) -> Self {
        Self {
            name: profile.name.clone(),
            color: profile.color,
            id: PlayerId(profile.id),
            score: profile.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct ShipState {
    pub id: u32,
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub direction: f32,
    pub intent: u8,
    pub fire_cooldown: u8,
    pub grace: u8,
    pub color: [u8; 3],
    pub name: String,
}

impl ShipState {
    fn capture(ship: &Ship) -> Self {
        Self {
            id: ship.player_id.0,
            position: ship.body.position.into(),
            velocity: ship.body.velocity.into(),
            direction: ship.direction,
            intent: ship.intent.bits(),
            fire_cooldown: ship.fire_cooldown,
            grace: ship.body.grace(),
            color: ship.color,
            name: ship.name.clone(),
        }
    }

    fn restore(&self) -> Ship {
        let mut body = Body::new(
            Vec2::from(self.position),
            Vec2::from(self.velocity),
            crate::entity::SHIP_RADIUS,
        );
        body.set_grace(self.grace);
        Ship {
            body,
            direction: self.direction,
            intent: ShipIntent::from_bits_truncate(self.intent),
            fire_cooldown: self.fire_cooldown,
            player_id: PlayerId(self.id),
            color: self.color,
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct BulletState {
    pub owner: u32,
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub ticks_left: i16,
    pub grace: u8,
}

impl BulletState {
    fn capture(bullet: &Bullet) -> Self {
        Self {
            owner: bullet.owner.0,
            position: bullet.body.position.into(),
            velocity: bullet.body.velocity.into(),
            ticks_left: bullet.ticks_left,
            grace: bullet.body.grace(),
        }
    }

    fn restore(&self) -> Bullet {
        let mut body = Body::new(
            Vec2::from(self.position),
            Vec2::from(self.velocity),
            0.0,
        );
        body.set_grace(self.grace);
        Bullet {
            body,
            owner: PlayerId(self.owner),
            ticks_left: self.ticks_left,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct AsteroidState {
    pub size: u8,
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub grace: u8,
}

impl AsteroidState {
    fn capture(asteroid: &Asteroid) -> Self {
        Self {
            size: asteroid.size as u8,
            position: asteroid.body.position.into(),
            velocity: asteroid.body.velocity.into(),
            grace: asteroid.body.grace(),
        }
    }

    fn restore(&self) -> Asteroid {
        let mut asteroid = Asteroid::new(
            Vec2::from(self.position),
            Vec2::from(self.velocity),
            AsteroidSize::from(self.size),
        );
        asteroid.body.set_grace(self.grace);
        asteroid
    }
}

/// A full serialized copy of the authoritative aggregate. Applying one to
/// a replica replaces the replica's collections wholesale, so applying
/// the same snapshot twice is the same as applying it once.
#[derive(Debug, Clone, Default, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct GameSnapshot {
    pub tick: u64,
    pub ships: Vec<ShipState>,
    pub bullets: Vec<BulletState>,
    pub asteroids: Vec<AsteroidState>,
    pub players: Vec<PlayerProfile>,
    pub pending_points: Vec<u32>,
}

impl GameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            tick: state.tick,
            ships: state.ships.iter().map(ShipState::capture).collect(),
            bullets: state.bullets.iter().map(BulletState::capture).collect(),
            asteroids: state.asteroids.iter().map(AsteroidState::capture).collect(),
            players: state.players.iter().map(PlayerProfile::from).collect(),
            pending_points: state.pending_points.iter().map(|id| id.0).collect(),
        }
    }

    pub fn apply_to(&self, state: &mut GameState) {
        state.tick = self.tick;
        state.ships = self.ships.iter().map(ShipState::restore).collect();
        state.bullets = self.bullets.iter().map(BulletState::restore).collect();
        state.asteroids = self.asteroids.iter().map(AsteroidState::restore).collect();
        state.players = self.players.iter().map(Player::from).collect();
        state.pending_points = self
            .pending_points
            .iter()
            .map(|&id| PlayerId(id))
            .collect();
    }
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct Packet {
    pub header: PacketHeader,
    pub message: Message,
}

#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("serialization failed: {0}")]
    Serialize(rancor::Error),
    #[error("deserialization failed: {0}")]
    Deserialize(rancor::Error),
    #[error("unsupported protocol header")]
    BadHeader,
}

impl Packet {
    pub fn new(message: Message) -> Self {
        Self {
            header: PacketHeader::new(),
            message,
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, PacketError> {
        rkyv::to_bytes::<rancor::Error>(self)
            .map(|aligned| aligned.into_vec())
            .map_err(PacketError::Serialize)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, PacketError> {
        let packet =
            rkyv::from_bytes::<Self, rancor::Error>(data).map_err(PacketError::Deserialize)?;
        if !packet.header.is_valid() {
            return Err(PacketError::BadHeader);
        }
        Ok(packet)
    }
}
