use std::sync::{Arc, Mutex};

use astrolith::ShipIntent;

/// Shared handle the input layer writes the local ship's intent bits
/// into. The joiner loop reads it every iteration, applies it to the
/// local replica ship and re-sends the action diff whenever it changed.
#[derive(Clone, Default)]
pub struct IntentHandle(Arc<Mutex<ShipIntent>>);

impl IntentHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, intent: ShipIntent) {
        if let Ok(mut current) = self.0.lock() {
            *current = intent;
        }
    }

    pub fn get(&self) -> ShipIntent {
        self.0.lock().map(|current| *current).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_is_visible_through_clones() {
        let handle = IntentHandle::new();
        let other = handle.clone();

        handle.set(ShipIntent::THRUST | ShipIntent::FIRE);
        assert_eq!(other.get(), ShipIntent::THRUST | ShipIntent::FIRE);
    }
}
