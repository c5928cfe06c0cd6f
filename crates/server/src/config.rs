use astrolith::net::DEFAULT_PORT;

#[derive(Debug, Clone)]
pub struct HostConfig {
    pub bind: String,
    pub port: u16,
    /// Clients (beyond the host's own player) required before the match
    /// starts.
    pub min_opponents: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            min_opponents: 1,
        }
    }
}
