use std::collections::HashMap;
use std::net::SocketAddr;

use crate::player::PlayerId;

/// What a registered peer is to the host: a playing client with a ship in
/// the match, or a watch-only spectator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerKind {
    Client { ship_id: PlayerId },
    Spectator,
}

/// The host's address book. Every registered address receives each
/// broadcast snapshot; spectators are tracked separately only so the
/// connected-client count stays meaningful.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: HashMap<SocketAddr, PeerKind>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_client(&mut self, addr: SocketAddr, ship_id: PlayerId) {
        self.peers.insert(addr, PeerKind::Client { ship_id });
    }

    pub fn register_spectator(&mut self, addr: SocketAddr) {
        self.peers.insert(addr, PeerKind::Spectator);
    }

    pub fn remove(&mut self, addr: &SocketAddr) -> Option<PeerKind> {
        self.peers.remove(addr)
    }

    pub fn get(&self, addr: &SocketAddr) -> Option<PeerKind> {
        self.peers.get(addr).copied()
    }

    pub fn addresses(&self) -> impl Iterator<Item = SocketAddr> + '_ {
        self.peers.keys().copied()
    }

    pub fn client_addresses(&self) -> impl Iterator<Item = SocketAddr> + '_ {
        self.peers
            .iter()
            .filter(|(_, kind)| matches!(kind, PeerKind::Client { .. }))
            .map(|(addr, _)| *addr)
    }

    pub fn client_count(&self) -> usize {
        self.peers
            .values()
            .filter(|kind| matches!(kind, PeerKind::Client { .. }))
            .count()
    }

    pub fn spectator_count(&self) -> usize {
        self.peers.len() - self.client_count()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn clear(&mut self) {
        self.peers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> SocketAddr {
        format!("127.0.0.1:{port}").parse().unwrap()
    }

    #[test]
    fn clients_and_spectators_counted_separately() {
        let mut registry = PeerRegistry::new();
        registry.register_client(addr(1000), PlayerId(1));
        registry.register_client(addr(1001), PlayerId(2));
        registry.register_spectator(addr(1002));

        assert_eq!(registry.client_count(), 2);
        assert_eq!(registry.spectator_count(), 1);
        assert_eq!(registry.addresses().count(), 3);
        assert_eq!(registry.client_addresses().count(), 2);
    }

    #[test]
    fn remove_returns_the_peer_kind() {
        let mut registry = PeerRegistry::new();
        registry.register_client(addr(1000), PlayerId(9));

        assert_eq!(
            registry.remove(&addr(1000)),
            Some(PeerKind::Client { ship_id: PlayerId(9) })
        );
        assert_eq!(registry.remove(&addr(1000)), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn rejoining_address_replaces_its_entry() {
        let mut registry = PeerRegistry::new();
        registry.register_spectator(addr(1000));
        registry.register_client(addr(1000), PlayerId(3));

        assert_eq!(registry.client_count(), 1);
        assert_eq!(registry.spectator_count(), 0);
    }
}
