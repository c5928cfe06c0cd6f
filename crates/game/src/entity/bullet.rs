use crate::player::PlayerId;

use super::{Body, Ship};

/// Ticks a bullet survives before expiring on its own.
pub const BULLET_LIFETIME_TICKS: i16 = 45;

/// Speed added along the firing ship's facing, on top of the ship's own
/// velocity.
pub const MUZZLE_SPEED: f32 = 15.0;

/// A bullet flies in a straight line (modulo wraparound) and expires after
/// a fixed number of ticks. The owner id attributes any kill to the
/// firing player.
#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub body: Body,
    pub owner: PlayerId,
    pub ticks_left: i16,
}

impl Bullet {
    /// Spawns a bullet at the ship's position, inheriting its velocity
    /// plus the muzzle speed along its facing.
    pub fn fired_by(ship: &Ship) -> Self {
        Self {
            body: Body::new(
                ship.body.position,
                ship.body.velocity + ship.facing() * MUZZLE_SPEED,
                0.0,
            ),
            owner: ship.player_id,
            ticks_left: BULLET_LIFETIME_TICKS,
        }
    }

    pub fn advance(&mut self) {
        self.body.tick_grace();
        self.body.integrate_and_wrap();
        self.ticks_left -= 1;
        if self.ticks_left < 0 {
            self.body.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::player::Player;

    #[test]
    fn inherits_ship_velocity_plus_muzzle_speed() {
        let mut ship = Ship::for_player(&Player::new("gunner", [0, 255, 0]));
        ship.body.velocity = Vec2::new(2.0, 1.0);
        ship.direction = std::f32::consts::FRAC_PI_2;

        let bullet = Bullet::fired_by(&ship);
        assert_eq!(bullet.body.position, ship.body.position);
        // Facing π/2 is along +x.
        assert!((bullet.body.velocity.x - (2.0 + MUZZLE_SPEED)).abs() < 1e-4);
        assert!((bullet.body.velocity.y - 1.0).abs() < 1e-4);
        assert_eq!(bullet.owner, ship.player_id);
    }

    #[test]
    fn expires_after_lifetime() {
        let ship = Ship::for_player(&Player::new("gunner", [0, 255, 0]));
        let mut bullet = Bullet::fired_by(&ship);

        for _ in 0..=BULLET_LIFETIME_TICKS {
            assert!(!bullet.body.is_destroyed());
            bullet.advance();
        }

        assert!(bullet.body.is_destroyed());
    }
}
