use crate::entity::{Asteroid, Bullet, Ship};
use crate::player::{Player, PlayerId};

/// Asteroid population target at the start of a match.
pub const INITIAL_ASTEROID_LIMIT: usize = 7;

/// Ticks between periodic asteroid spawn attempts.
pub const SPAWN_CYCLE_TICKS: u32 = 200;

/// The authoritative aggregate for one match: every live entity, the
/// player roster, and the point tokens earned this tick but not yet
/// settled. On the host this is owned by the simulation; peers hold a
/// replica that is wholesale-replaced whenever a snapshot arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub ships: Vec<Ship>,
    pub bullets: Vec<Bullet>,
    pub asteroids: Vec<Asteroid>,
    pub players: Vec<Player>,
    /// Player ids credited one point this tick, settled once at tick end.
    pub pending_points: Vec<PlayerId>,
    pub asteroid_limit: usize,
    /// Tick counter modulo [`SPAWN_CYCLE_TICKS`] driving the spawn cadence.
    pub cycle: u32,
    pub tick: u64,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            ships: Vec::new(),
            bullets: Vec::new(),
            asteroids: Vec::new(),
            players: Vec::new(),
            pending_points: Vec::new(),
            asteroid_limit: INITIAL_ASTEROID_LIMIT,
            cycle: 0,
            tick: 0,
        }
    }

    /// Adds a player to the roster along with a fresh ship for them.
    /// A duplicate id is ignored.
    pub fn add_player(&mut self, player: Player) {
        if self.players.iter().any(|p| p.id == player.id) {
            log::debug!("ignoring duplicate player id {}", player.id);
            return;
        }
        self.ships.push(Ship::for_player(&player));
        self.players.push(player);
    }

    pub fn ship(&self, id: PlayerId) -> Option<&Ship> {
        self.ships.iter().find(|s| s.player_id == id)
    }

    pub fn ship_mut(&mut self, id: PlayerId) -> Option<&mut Ship> {
        self.ships.iter_mut().find(|s| s.player_id == id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Drops a ship and its player from the roster. Returns true if the
    /// ship existed.
    pub fn remove_ship_and_player(&mut self, id: PlayerId) -> bool {
        let had_ship = self.ships.iter().any(|s| s.player_id == id);
        self.ships.retain(|s| s.player_id != id);
        self.players.retain(|p| p.id != id);
        had_ship
    }

    /// Resets the field for a fresh round: clears transient entities and
    /// the spawn bookkeeping, and respawns one ship per rostered player.
    /// Player identities survive; their scores are left untouched.
    pub fn reset_field(&mut self) {
        self.bullets.clear();
        self.asteroids.clear();
        self.pending_points.clear();
        self.asteroid_limit = INITIAL_ASTEROID_LIMIT;
        self.cycle = 0;
        self.ships = self.players.iter().map(Ship::for_player).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn add_player_spawns_ship() {
        let mut state = GameState::new();
        let player = Player::new("ada", [255, 0, 0]);
        let id = player.id;
        state.add_player(player);

        assert_eq!(state.players.len(), 1);
        assert_eq!(state.ships.len(), 1);
        assert_eq!(state.ship(id).unwrap().player_id, id);
    }

    #[test]
    fn duplicate_player_id_ignored() {
        let mut state = GameState::new();
        let player = Player::new("ada", [255, 0, 0]);
        state.add_player(player.clone());
        state.add_player(player);

        assert_eq!(state.players.len(), 1);
        assert_eq!(state.ships.len(), 1);
    }

    #[test]
    fn remove_ship_and_player_clears_both() {
        let mut state = GameState::new();
        let player = Player::new("ada", [255, 0, 0]);
        let id = player.id;
        state.add_player(player);

        assert!(state.remove_ship_and_player(id));
        assert!(state.ships.is_empty());
        assert!(state.players.is_empty());
        assert!(!state.remove_ship_and_player(id));
    }

    #[test]
    fn reset_field_respawns_rostered_ships() {
        let mut state = GameState::new();
        let player = Player::new("ada", [255, 0, 0]);
        let id = player.id;
        state.add_player(player);

        state.ship_mut(id).unwrap().body.position = Vec2::new(13.0, 13.0);
        state.asteroid_limit = 11;
        state.cycle = 77;

        state.reset_field();

        assert_eq!(state.asteroid_limit, INITIAL_ASTEROID_LIMIT);
        assert_eq!(state.cycle, 0);
        assert_eq!(
            state.ship(id).unwrap().body.position,
            Vec2::new(400.0, 400.0)
        );
    }
}
