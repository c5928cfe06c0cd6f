use std::sync::mpsc::{self, Receiver, Sender};

use crate::net::GameSnapshot;

/// Fan-out channel for published snapshots. The simulation pushes an
/// immutable snapshot value to every subscriber queue after each tick
/// that changed state; subscribers (network broadcaster, render surface)
/// pull at their own pace. Subscribers that went away are dropped on the
/// next publish.
#[derive(Default)]
pub struct SnapshotBus {
    subscribers: Vec<Sender<GameSnapshot>>,
}

impl SnapshotBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<GameSnapshot> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, snapshot: GameSnapshot) {
        // Last subscriber gets the value, the rest get clones.
        self.subscribers
            .retain(|tx| tx.send(snapshot.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
