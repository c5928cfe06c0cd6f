mod protocol;
mod registry;
mod transport;

pub use protocol::{
    AsteroidState, BulletState, GameSnapshot, Message, Packet, PacketError, PacketHeader,
    PlayerProfile, ShipState, DEFAULT_PORT, MAX_DATAGRAM_SIZE, PROTOCOL_MAGIC, PROTOCOL_VERSION,
};
pub use registry::{PeerKind, PeerRegistry};
pub use transport::{NetworkEndpoint, NetworkStats};
