use glam::Vec2;

use crate::player::{Player, PlayerId, Rgb};

use super::Body;

/// Ticks between shots while the fire intent is held.
pub const FIRE_COOLDOWN_TICKS: u8 = 20;

pub const SHIP_RADIUS: f32 = 15.0;

/// Turn rate per tick while a turn intent bit is held.
const TURN_RATE: f32 = 0.04 * std::f32::consts::PI;

/// Acceleration added along the facing direction per thrust tick.
const THRUST_ACCEL: f32 = 0.4;

/// Per-axis velocity clamp applied while thrusting.
const MAX_AXIS_SPEED: f32 = 10.0;

/// Velocity retained each tick (simulated drag).
const DRAG: f32 = 0.99;

const DEFAULT_SPAWN: Vec2 = Vec2::new(400.0, 400.0);

bitflags::bitflags! {
    /// The four control-intent bits a peer reports for its ship.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ShipIntent: u8 {
        const THRUST = 1 << 0;
        const TURN_LEFT = 1 << 1;
        const TURN_RIGHT = 1 << 2;
        const FIRE = 1 << 3;
    }
}

/// The player-controlled ship. Unlike the other entities it has a facing
/// direction, which determines thrust and the trajectory of spawned
/// bullets, and it decelerates over time.
#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub body: Body,
    /// Facing in radians; 0 points straight up, positive turns clockwise.
    pub direction: f32,
    pub intent: ShipIntent,
    pub fire_cooldown: u8,
    pub player_id: PlayerId,
    pub color: Rgb,
    pub name: String,
}

impl Ship {
    /// Spawns a fresh ship for `player` at the default field position.
    pub fn for_player(player: &Player) -> Self {
        Self {
            body: Body::new(DEFAULT_SPAWN, Vec2::ZERO, SHIP_RADIUS),
            direction: 0.0,
            intent: ShipIntent::empty(),
            fire_cooldown: 0,
            player_id: player.id,
            color: player.color,
            name: player.name.clone(),
        }
    }

    /// Unit vector the ship currently points along.
    pub fn facing(&self) -> Vec2 {
        Vec2::new(self.direction.sin(), -self.direction.cos())
    }

    /// One tick of ship motion: turn, thrust with the per-axis clamp,
    /// integrate, then bleed speed off to drag.
    pub fn advance(&mut self) {
        self.body.tick_grace();

        if self.intent.contains(ShipIntent::TURN_LEFT) {
            self.direction -= TURN_RATE;
        }
        if self.intent.contains(ShipIntent::TURN_RIGHT) {
            self.direction += TURN_RATE;
        }

        if self.intent.contains(ShipIntent::THRUST) {
            let next = self.body.velocity + self.facing() * THRUST_ACCEL;
            self.body.velocity = next.clamp(
                Vec2::splat(-MAX_AXIS_SPEED),
                Vec2::splat(MAX_AXIS_SPEED),
            );
        }

        self.body.integrate_and_wrap();
        self.body.velocity *= DRAG;

        if self.fire_cooldown > 0 {
            self.fire_cooldown -= 1;
        }
    }

    /// True when the fire bit is held and the cooldown has elapsed.
    pub fn ready_to_fire(&self) -> bool {
        self.intent.contains(ShipIntent::FIRE) && self.fire_cooldown == 0
    }

    pub fn mark_fired(&mut self) {
        self.fire_cooldown = FIRE_COOLDOWN_TICKS;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Player;

    fn test_ship() -> Ship {
        Ship::for_player(&Player::new("pilot", [255, 0, 0]))
    }

    #[test]
    fn spawns_at_field_center() {
        let ship = test_ship();
        assert_eq!(ship.body.position, Vec2::new(400.0, 400.0));
        assert_eq!(ship.body.velocity, Vec2::ZERO);
        assert_eq!(ship.direction, 0.0);
    }

    #[test]
    fn turning_changes_direction_per_tick() {
        let mut ship = test_ship();
        ship.intent = ShipIntent::TURN_RIGHT;
        ship.advance();
        assert!((ship.direction - TURN_RATE).abs() < 1e-6);

        ship.intent = ShipIntent::TURN_LEFT;
        ship.advance();
        ship.advance();
        assert!((ship.direction + TURN_RATE).abs() < 1e-6);
    }

    #[test]
    fn thrust_accelerates_along_facing() {
        let mut ship = test_ship();
        ship.intent = ShipIntent::THRUST;
        ship.advance();

        // Facing 0 is straight up: velocity grows in -y only, then drags.
        assert!((ship.body.velocity.x).abs() < 1e-6);
        assert!((ship.body.velocity.y - (-THRUST_ACCEL * DRAG)).abs() < 1e-5);
    }

    #[test]
    fn velocity_clamped_per_axis() {
        let mut ship = test_ship();
        ship.intent = ShipIntent::THRUST;
        for _ in 0..2000 {
            ship.advance();
        }

        assert!(ship.body.velocity.x.abs() <= MAX_AXIS_SPEED);
        assert!(ship.body.velocity.y.abs() <= MAX_AXIS_SPEED);
    }

    #[test]
    fn drag_decays_velocity_without_thrust() {
        let mut ship = test_ship();
        ship.body.velocity = Vec2::new(8.0, -8.0);
        ship.advance();

        assert!((ship.body.velocity.x - 8.0 * DRAG).abs() < 1e-5);
        assert!((ship.body.velocity.y + 8.0 * DRAG).abs() < 1e-5);
    }

    #[test]
    fn fire_gated_on_cooldown() {
        let mut ship = test_ship();
        ship.intent = ShipIntent::FIRE;
        assert!(ship.ready_to_fire());

        ship.mark_fired();
        assert!(!ship.ready_to_fire());

        for _ in 0..FIRE_COOLDOWN_TICKS {
            ship.advance();
        }
        assert!(ship.ready_to_fire());
    }
}
