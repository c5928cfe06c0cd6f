pub mod config;
pub mod events;
pub mod host;

pub use config::HostConfig;
pub use events::HostEvent;
pub use host::HostServer;
