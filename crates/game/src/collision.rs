//! Pairwise collision resolution and score bookkeeping, run once per tick
//! after all entities have moved.

use crate::player::PlayerId;
use crate::score::ScoreStore;
use crate::simulation::GameMode;
use crate::world::GameState;

/// Points a player must accumulate to raise the asteroid cap by one.
const POINTS_PER_LIMIT_RAISE: u32 = 5;

/// One full resolution pass: mark colliding pairs destroyed and queue
/// point tokens, settle the tokens into player scores, then sweep the
/// destroyed entities out (spawning asteroid successors in place).
///
/// Tokens settle before the sweep so that a kill still credits its owner
/// even when the owning ship died in the same tick.
pub fn resolve(
    state: &mut GameState,
    mode: GameMode,
    mut store: Option<&mut (dyn ScoreStore + '_)>,
) {
    mark_collisions(state, mode);
    settle_points(state, mode, &mut store);
    sweep(state, mode);
}

fn mark_collisions(state: &mut GameState, mode: GameMode) {
    let GameState {
        ships,
        bullets,
        asteroids,
        pending_points,
        ..
    } = state;

    for bullet in bullets.iter_mut() {
        for asteroid in asteroids.iter_mut() {
            if asteroid.body.collides_with(&bullet.body) {
                asteroid.body.destroy();
                bullet.body.destroy();
                pending_points.push(bullet.owner);
            }
        }
    }

    match mode {
        GameMode::Single => {
            // The lone ship against the field; contact ends the round.
            if let Some(ship) = ships.first_mut() {
                for asteroid in asteroids.iter_mut() {
                    if asteroid.body.collides_with(&ship.body) {
                        asteroid.body.destroy();
                        ship.body.destroy();
                    }
                }
            }
        }
        GameMode::Multi => {
            for asteroid in asteroids.iter_mut() {
                for ship in ships.iter_mut() {
                    if asteroid.body.collides_with(&ship.body) {
                        asteroid.body.destroy();
                        ship.body.destroy();
                    }
                }
            }
            // A bullet is live against every ship, its own firing ship
            // included; the owner is credited either way.
            for bullet in bullets.iter_mut() {
                for ship in ships.iter_mut() {
                    if bullet.body.collides_with(&ship.body) {
                        bullet.body.destroy();
                        ship.body.destroy();
                        pending_points.push(bullet.owner);
                    }
                }
            }
        }
    }
}

fn settle_points(
    state: &mut GameState,
    mode: GameMode,
    store: &mut Option<&mut (dyn ScoreStore + '_)>,
) {
    let GameState {
        players,
        pending_points,
        asteroid_limit,
        ..
    } = state;

    for id in pending_points.drain(..) {
        let Some(player) = players.iter_mut().find(|p| p.id == id) else {
            log::debug!("point token for unknown player {id}");
            continue;
        };

        player.score += 1;
        if player.score % POINTS_PER_LIMIT_RAISE == 0 {
            *asteroid_limit += 1;
        }

        if mode == GameMode::Multi {
            if let Some(store) = store.as_deref_mut() {
                store.update_score_if_higher(&player.name, player.score);
            }
        }
    }
}

fn sweep(state: &mut GameState, mode: GameMode) {
    let mut survivors = Vec::with_capacity(state.asteroids.len());
    for asteroid in state.asteroids.drain(..) {
        if asteroid.body.is_destroyed() {
            survivors.extend(asteroid.successors());
        } else {
            survivors.push(asteroid);
        }
    }
    state.asteroids = survivors;

    state.bullets.retain(|b| !b.body.is_destroyed());

    let dead: Vec<PlayerId> = state
        .ships
        .iter()
        .filter(|s| s.body.is_destroyed())
        .map(|s| s.player_id)
        .collect();
    state.ships.retain(|s| !s.body.is_destroyed());

    for id in dead {
        match mode {
            // The lone player keeps their roster slot; the round restarts
            // with their score wiped.
            GameMode::Single => {
                if let Some(player) = state.player_mut(id) {
                    player.score = 0;
                }
            }
            GameMode::Multi => {
                state.players.retain(|p| p.id != id);
            }
        }
    }
}
