use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::protocol::{Message, Packet, MAX_DATAGRAM_SIZE};

#[derive(Debug, Clone, Default)]
pub struct NetworkStats {
    pub packets_sent: u64,
    pub packets_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// Thin wrapper over a nonblocking UDP socket. Best effort only: no
/// retries, no ordering, no acks. A failed send is logged and skipped; a
/// malformed or stale-versioned datagram is dropped at decode. Loss is
/// papered over by the next periodic snapshot or action re-send.
pub struct NetworkEndpoint {
    socket: UdpSocket,
    local_addr: SocketAddr,
    stats: NetworkStats,
    recv_buffer: Box<[u8; MAX_DATAGRAM_SIZE]>,
    running: Arc<AtomicBool>,
}

impl NetworkEndpoint {
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;
        let local_addr = socket.local_addr()?;

        Ok(Self {
            socket,
            local_addr,
            stats: NetworkStats::default(),
            recv_buffer: Box::new([0u8; MAX_DATAGRAM_SIZE]),
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> &NetworkStats {
        &self.stats
    }

    pub fn send_to(&mut self, message: Message, addr: SocketAddr) -> io::Result<usize> {
        let packet = Packet::new(message);
        let data = packet.serialize().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("encode failed: {e}"))
        })?;
        self.send_raw(&data, addr)
    }

    /// Sends pre-encoded packet bytes, for fanning one encode out to many
    /// addresses.
    pub fn send_raw(&mut self, data: &[u8], addr: SocketAddr) -> io::Result<usize> {
        if data.len() > MAX_DATAGRAM_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "datagram exceeds maximum size",
            ));
        }

        let bytes = self.socket.send_to(data, addr)?;
        self.stats.packets_sent += 1;
        self.stats.bytes_sent += bytes as u64;
        Ok(bytes)
    }

    /// Drains every datagram currently queued on the socket. Undecodable
    /// payloads are dropped without a response.
    pub fn receive(&mut self) -> io::Result<Vec<(Message, SocketAddr)>> {
        let mut messages = Vec::new();

        loop {
            match self.socket.recv_from(&mut self.recv_buffer[..]) {
                Ok((size, addr)) => match Packet::deserialize(&self.recv_buffer[..size]) {
                    Ok(packet) => {
                        self.stats.packets_received += 1;
                        self.stats.bytes_received += size as u64;
                        messages.push((packet.message, addr));
                    }
                    Err(e) => {
                        log::debug!("dropping undecodable datagram from {addr}: {e}");
                    }
                },
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }

        Ok(messages)
    }

    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (NetworkEndpoint, NetworkEndpoint) {
        let a = NetworkEndpoint::bind("127.0.0.1:0").unwrap();
        let b = NetworkEndpoint::bind("127.0.0.1:0").unwrap();
        (a, b)
    }

    fn wait_for(endpoint: &mut NetworkEndpoint) -> Vec<(Message, SocketAddr)> {
        let start = std::time::Instant::now();
        while start.elapsed() < std::time::Duration::from_secs(2) {
            let received = endpoint.receive().unwrap();
            if !received.is_empty() {
                return received;
            }
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        Vec::new()
    }

    #[test]
    fn message_reaches_the_other_endpoint() {
        let (mut a, mut b) = pair();
        a.send_to(Message::Stop { ship_id: 7 }, b.local_addr()).unwrap();

        let received = wait_for(&mut b);
        assert_eq!(received.len(), 1);
        assert!(matches!(received[0].0, Message::Stop { ship_id: 7 }));
        assert_eq!(received[0].1, a.local_addr());
    }

    #[test]
    fn garbage_datagrams_are_dropped_silently() {
        let (_a, mut b) = pair();
        let raw = UdpSocket::bind("127.0.0.1:0").unwrap();
        raw.send_to(b"definitely not a packet", b.local_addr()).unwrap();

        // Give the datagram a moment to land, then drain: nothing usable.
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert!(b.receive().unwrap().is_empty());
    }

    #[test]
    fn oversized_send_is_refused() {
        let (mut a, b) = pair();
        let blob = vec![0u8; MAX_DATAGRAM_SIZE + 1];
        assert!(a.send_raw(&blob, b.local_addr()).is_err());
    }
}
