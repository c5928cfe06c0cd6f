pub mod input;
pub mod joiner;
pub mod spectator;

pub use input::IntentHandle;
pub use joiner::JoinerClient;
pub use spectator::SpectatorClient;
