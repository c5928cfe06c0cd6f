use std::net::SocketAddr;

use astrolith::PlayerId;

#[derive(Debug, Clone)]
pub enum HostEvent {
    ClientJoined {
        addr: SocketAddr,
        name: String,
        ship_id: PlayerId,
    },
    SpectatorJoined {
        addr: SocketAddr,
    },
    PeerLeft {
        addr: SocketAddr,
    },
    ShipStopped {
        addr: SocketAddr,
        ship_id: PlayerId,
    },
    MatchStarted {
        clients: usize,
    },
    Error {
        message: String,
    },
}

impl HostEvent {
    pub fn log(&self) {
        match self {
            HostEvent::ClientJoined { addr, name, ship_id } => {
                log::info!("client {name} joined from {addr} (ship {ship_id})")
            }
            HostEvent::SpectatorJoined { addr } => {
                log::info!("spectator joined from {addr}")
            }
            HostEvent::PeerLeft { addr } => log::info!("peer {addr} left"),
            HostEvent::ShipStopped { addr, ship_id } => {
                log::info!("peer {addr} stopped ship {ship_id}")
            }
            HostEvent::MatchStarted { clients } => {
                log::info!("match started with {clients} connected clients")
            }
            HostEvent::Error { message } => log::warn!("{message}"),
        }
    }
}
