mod command;
mod runner;

pub use command::GameCommand;
pub use runner::SimulationRunner;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::collision;
use crate::entity::{Asteroid, AsteroidSize, Bullet, FIELD_SIZE};
use crate::net::GameSnapshot;
use crate::player::Player;
use crate::score::ScoreStore;
use crate::world::{GameState, SPAWN_CYCLE_TICKS};

/// Target tick interval: 25 updates per second.
pub const TICK_MS: u64 = 40;

/// Minimum distance between a freshly spawned asteroid and the ship it
/// was placed relative to.
const MIN_SPAWN_DISTANCE: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    Single,
    Multi,
}

/// Per-match state machine. Single-player matches cycle back to
/// `Running` after a re-init; multi-player `Over` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Waiting,
    Running,
    Over,
}

/// One match's simulation: the authoritative aggregate plus the tick
/// update rules. Host-side this is the single source of truth; peers run
/// the same type over a replica that incoming snapshots overwrite.
pub struct Simulation {
    state: GameState,
    mode: GameMode,
    phase: MatchPhase,
    /// Multi-player matches may only end once this is set: on the host
    /// when the match starts, on replicas when the first snapshot from
    /// the host lands. Keeps a lobby of one from "winning" instantly.
    armed: bool,
    /// Spectator replicas never spawn asteroids and skip end-of-match
    /// bookkeeping.
    is_spectator: bool,
    store: Option<Box<dyn ScoreStore>>,
    rng: StdRng,
}

impl Simulation {
    fn with_mode(mode: GameMode, phase: MatchPhase) -> Self {
        Self {
            state: GameState::new(),
            mode,
            phase,
            armed: false,
            is_spectator: false,
            store: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// A purely local single-player match.
    pub fn single(player: Player) -> Self {
        let mut sim = Self::with_mode(GameMode::Single, MatchPhase::Running);
        sim.armed = true;
        sim.state.add_player(player);
        sim
    }

    /// The authoritative match on the host, waiting for peers.
    pub fn host(host_player: Player) -> Self {
        let mut sim = Self::with_mode(GameMode::Multi, MatchPhase::Waiting);
        sim.state.add_player(host_player);
        sim
    }

    /// A joiner's local replica: ticks for prediction/animation, armed
    /// once the first host snapshot arrives.
    pub fn replica(local_player: Player) -> Self {
        let mut sim = Self::with_mode(GameMode::Multi, MatchPhase::Running);
        sim.state.add_player(local_player);
        sim
    }

    /// A spectator's replica: no local player, no asteroid spawning.
    pub fn spectator() -> Self {
        let mut sim = Self::with_mode(GameMode::Multi, MatchPhase::Running);
        sim.is_spectator = true;
        sim
    }

    pub fn with_store(mut self, store: Box<dyn ScoreStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn armed(&self) -> bool {
        self.armed
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.state)
    }

    /// Wholesale-replaces the replica with the host's snapshot and arms
    /// the end-of-match check.
    pub fn apply_snapshot(&mut self, snapshot: &GameSnapshot) {
        snapshot.apply_to(&mut self.state);
        self.armed = true;
    }

    /// Applies one queued mutation. Returns whether anything changed.
    pub fn apply(&mut self, command: GameCommand) -> bool {
        match command {
            GameCommand::AddPlayer(player) => {
                if let Some(store) = self.store.as_deref_mut() {
                    store.upsert_player(&player.name, player.color);
                }
                self.state.add_player(player);
                true
            }
            GameCommand::SetIntent { ship_id, intent } => {
                match self.state.ship_mut(ship_id) {
                    Some(ship) => {
                        ship.intent = intent;
                        true
                    }
                    None => {
                        log::debug!("intent update for unknown ship {ship_id}");
                        false
                    }
                }
            }
            GameCommand::DestroyShip { ship_id } => {
                if self.state.remove_ship_and_player(ship_id) {
                    true
                } else {
                    log::debug!("stop for unknown ship {ship_id}");
                    false
                }
            }
            GameCommand::Begin => {
                if self.phase == MatchPhase::Waiting {
                    self.phase = MatchPhase::Running;
                    self.armed = true;
                    log::info!("match started with {} players", self.state.players.len());
                    true
                } else {
                    false
                }
            }
        }
    }

    /// One full tick: motion, fire-intent bullet spawns, collision and
    /// scoring, then the periodic asteroid top-up.
    pub fn update(&mut self) {
        for asteroid in &mut self.state.asteroids {
            asteroid.advance();
        }
        for bullet in &mut self.state.bullets {
            bullet.advance();
        }

        let mut fired = Vec::new();
        for ship in &mut self.state.ships {
            if !ship.body.is_destroyed() && ship.ready_to_fire() {
                fired.push(Bullet::fired_by(ship));
                ship.mark_fired();
            }
            ship.advance();
        }
        self.state.bullets.extend(fired);

        collision::resolve(&mut self.state, self.mode, self.store.as_deref_mut());

        if self.state.cycle == 0
            && self.state.asteroids.len() < self.state.asteroid_limit
            && !self.is_spectator
        {
            self.spawn_random_asteroid();
        }
        self.state.cycle = (self.state.cycle + 1) % SPAWN_CYCLE_TICKS;
        self.state.tick += 1;

        if self.game_over() {
            self.phase = MatchPhase::Over;
        }
    }

    pub fn game_over(&self) -> bool {
        match self.mode {
            GameMode::Single => self.state.ships.is_empty(),
            GameMode::Multi => self.state.players.len() <= 1 && self.armed,
        }
    }

    /// End-of-match bookkeeping, run once per `Over`. Returns whether the
    /// loop should keep going (single-player restarts; multi-player
    /// matches are done).
    pub fn end_of_match(&mut self) -> bool {
        match self.mode {
            GameMode::Single => {
                log::info!("round over, restarting");
                self.state.reset_field();
                self.phase = MatchPhase::Running;
                true
            }
            GameMode::Multi => {
                if !self.is_spectator {
                    // The last player standing takes a bonus point.
                    if let Some(winner) = self.state.players.first() {
                        let id = winner.id;
                        self.state.pending_points.push(id);
                    }
                    collision::resolve(&mut self.state, self.mode, self.store.as_deref_mut());
                }
                false
            }
        }
    }

    /// Places one random asteroid at least [`MIN_SPAWN_DISTANCE`] away
    /// from a randomly chosen ship.
    fn spawn_random_asteroid(&mut self) {
        if self.state.ships.is_empty() {
            return;
        }
        let idx = self.rng.gen_range(0..self.state.ships.len());
        let anchor = self.state.ships[idx].body.position;

        let position = loop {
            let candidate = Vec2::new(
                self.rng.gen_range(0.0..FIELD_SIZE),
                self.rng.gen_range(0.0..FIELD_SIZE),
            );
            if candidate.distance(anchor) >= MIN_SPAWN_DISTANCE {
                break candidate;
            }
        };

        let size = match self.rng.gen_range(0..3u8) {
            0 => AsteroidSize::Large,
            1 => AsteroidSize::Medium,
            _ => AsteroidSize::Small,
        };
        let velocity = Vec2::new(self.rng.gen_range(-3.0..3.0), self.rng.gen_range(-3.0..3.0));

        self.state
            .asteroids
            .push(Asteroid::new(position, velocity, size));
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::entity::ShipIntent;
    use crate::score::{MemoryScoreStore, ScoreStore};

    fn quiet_single() -> (Simulation, crate::player::PlayerId) {
        let player = Player::new("solo", [200, 10, 10]);
        let id = player.id;
        let mut sim = Simulation::single(player);
        // Suppress the periodic top-up so nothing random interferes.
        sim.state_mut().asteroid_limit = 0;
        (sim, id)
    }

    #[test]
    fn held_fire_spawns_one_bullet_per_cooldown_window() {
        let (mut sim, id) = quiet_single();
        sim.state_mut().ship_mut(id).unwrap().intent = ShipIntent::FIRE;

        for _ in 0..20 {
            sim.update();
        }
        assert_eq!(sim.state().bullets.len(), 1);

        for _ in 0..20 {
            sim.update();
        }
        assert_eq!(sim.state().bullets.len(), 2);

        sim.update();
        assert_eq!(sim.state().bullets.len(), 3);
    }

    #[test]
    fn asteroid_spawns_on_cycle_boundary_only() {
        let player = Player::new("solo", [5, 5, 5]);
        let mut sim = Simulation::single(player);
        sim.state_mut().asteroid_limit = 1;

        sim.update();
        let spawned = sim.state().asteroids.clone();
        assert_eq!(spawned.len(), 1);

        let ship_pos = Vec2::new(400.0, 400.0);
        assert!(spawned[0].body.position.distance(ship_pos) >= 50.0);
        assert!(spawned[0].body.velocity.x.abs() <= 3.0);
        assert!(spawned[0].body.velocity.y.abs() <= 3.0);

        // No further spawn until the counter wraps.
        sim.state_mut().asteroids.clear();
        for _ in 0..199 {
            sim.update();
        }
        assert!(sim.state().asteroids.is_empty());

        sim.update();
        assert_eq!(sim.state().asteroids.len(), 1);
    }

    #[test]
    fn collision_course_restarts_single_round() {
        let (mut sim, id) = quiet_single();
        sim.state_mut().player_mut(id).unwrap().score = 3;

        let mut rock = Asteroid::new(Vec2::new(430.0, 400.0), Vec2::ZERO, AsteroidSize::Large);
        rock.body.set_grace(0);
        sim.state_mut().asteroids.push(rock);

        // Ship grace runs out after three ticks; the overlap then counts.
        for _ in 0..3 {
            sim.update();
        }

        assert!(sim.state().ships.is_empty());
        assert_eq!(sim.phase(), MatchPhase::Over);
        assert_eq!(sim.state().player(id).unwrap().score, 0);

        assert!(sim.end_of_match());
        assert_eq!(sim.phase(), MatchPhase::Running);
        let respawned = sim.state().ship(id).expect("ship respawned");
        assert_eq!(respawned.body.position, Vec2::new(400.0, 400.0));
        assert_eq!(sim.state().player(id).unwrap().score, 0);
    }

    #[test]
    fn lobby_of_one_never_ends_until_armed() {
        let player = Player::new("early", [1, 2, 3]);
        let mut sim = Simulation::replica(player);
        sim.state_mut().asteroid_limit = 0;

        sim.update();
        assert_eq!(sim.phase(), MatchPhase::Running);

        sim.armed = true;
        sim.update();
        assert_eq!(sim.phase(), MatchPhase::Over);
    }

    #[test]
    fn survivor_takes_bonus_point_when_match_ends() {
        let host = Player::new("host", [10, 0, 0]);
        let rival = Player::new("rival", [0, 10, 0]);
        let (host_id, rival_id) = (host.id, rival.id);

        let mut store = MemoryScoreStore::new();
        store.upsert_player("host", [10, 0, 0]);
        store.upsert_player("rival", [0, 10, 0]);

        let mut sim = Simulation::host(host).with_store(Box::new(store));
        sim.state_mut().asteroid_limit = 0;
        assert!(sim.apply(GameCommand::AddPlayer(rival)));
        assert!(sim.apply(GameCommand::Begin));

        assert!(sim.apply(GameCommand::DestroyShip { ship_id: rival_id }));
        sim.update();
        assert_eq!(sim.phase(), MatchPhase::Over);

        assert!(!sim.end_of_match());
        assert_eq!(sim.state().player(host_id).unwrap().score, 1);
        let persisted = sim
            .store
            .as_ref()
            .map(|s| s.players())
            .unwrap_or_default();
        assert!(persisted.contains(&("host".to_string(), 1)));
    }

    #[test]
    fn intent_command_for_unknown_ship_is_a_noop() {
        let (mut sim, _) = quiet_single();
        let ghost = crate::player::PlayerId(123456);
        assert!(!sim.apply(GameCommand::SetIntent {
            ship_id: ghost,
            intent: ShipIntent::THRUST,
        }));
        assert!(!sim.apply(GameCommand::DestroyShip { ship_id: ghost }));
    }
}
