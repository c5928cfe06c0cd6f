use crate::entity::ShipIntent;
use crate::player::{Player, PlayerId};

/// Mutations funneled into the simulation thread. The host's network
/// dispatcher never touches the aggregate directly; it sends one of these
/// and the simulation drains the queue once per loop iteration, keeping a
/// single writer.
#[derive(Debug, Clone)]
pub enum GameCommand {
    /// A peer joined: add them to the roster with a fresh ship.
    AddPlayer(Player),
    /// A peer reported new control-intent bits for its ship.
    SetIntent {
        ship_id: PlayerId,
        intent: ShipIntent,
    },
    /// A peer disconnected with ship removal (`stop`).
    DestroyShip { ship_id: PlayerId },
    /// Enough peers joined; leave the waiting phase and start the match.
    Begin,
}
