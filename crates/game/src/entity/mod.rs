mod asteroid;
mod bullet;
mod ship;

pub use asteroid::{Asteroid, AsteroidSize, SPLIT_SPEED_FACTOR};
pub use bullet::{Bullet, BULLET_LIFETIME_TICKS, MUZZLE_SPEED};
pub use ship::{Ship, ShipIntent, FIRE_COOLDOWN_TICKS, SHIP_RADIUS};

use glam::Vec2;

/// Side length of the square playfield. Positions wrap on both axes.
pub const FIELD_SIZE: f32 = 800.0;

/// Ticks a freshly spawned body must wait before it may collide.
pub const GRACE_TICKS: u8 = 3;

/// Kinematic state shared by every game object: a position on the toroidal
/// field, a velocity, a collision radius, a destroyed flag and the
/// spawn-grace countdown that keeps split asteroids from instantly
/// re-colliding with whatever created them.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    destroyed: bool,
    grace: u8,
}

impl Body {
    pub fn new(position: Vec2, velocity: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity,
            radius,
            destroyed: false,
            grace: GRACE_TICKS,
        }
    }

    /// Counts the grace window down. Called once per tick by every entity.
    pub fn tick_grace(&mut self) {
        self.grace = self.grace.saturating_sub(1);
    }

    /// Adds the velocity to the position and wraps both axes into
    /// `[0, FIELD_SIZE)`.
    pub fn integrate_and_wrap(&mut self) {
        self.position += self.velocity;
        self.position.x = self.position.x.rem_euclid(FIELD_SIZE);
        self.position.y = self.position.y.rem_euclid(FIELD_SIZE);
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn grace(&self) -> u8 {
        self.grace
    }

    pub(crate) fn set_grace(&mut self, grace: u8) {
        self.grace = grace;
    }

    /// Circle-overlap test, gated on both grace windows having elapsed.
    /// Symmetric in its arguments.
    pub fn collides_with(&self, other: &Body) -> bool {
        self.position.distance(other.position) < self.radius + other.radius
            && self.grace == 0
            && other.grace == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrate_wraps_into_field() {
        let mut body = Body::new(Vec2::new(795.0, 2.0), Vec2::new(10.0, -5.0), 1.0);
        body.integrate_and_wrap();

        assert!((body.position.x - 5.0).abs() < 1e-3);
        assert!((body.position.y - 797.0).abs() < 1e-3);
    }

    #[test]
    fn integrate_matches_modular_arithmetic() {
        let cases = [
            (Vec2::new(0.0, 0.0), Vec2::new(-0.5, -0.5)),
            (Vec2::new(400.0, 400.0), Vec2::new(3.25, -9.75)),
            (Vec2::new(799.9, 799.9), Vec2::new(0.2, 0.2)),
        ];

        for (p, v) in cases {
            let mut body = Body::new(p, v, 1.0);
            body.integrate_and_wrap();

            let expected = Vec2::new(
                (p.x + v.x).rem_euclid(FIELD_SIZE),
                (p.y + v.y).rem_euclid(FIELD_SIZE),
            );
            assert!(body.position.x >= 0.0 && body.position.x < FIELD_SIZE);
            assert!(body.position.y >= 0.0 && body.position.y < FIELD_SIZE);
            assert!((body.position - expected).length() < 1e-3);
        }
    }

    #[test]
    fn grace_blocks_collision_until_elapsed() {
        let mut a = Body::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 10.0);
        let mut b = Body::new(Vec2::new(105.0, 100.0), Vec2::ZERO, 10.0);

        // Overlapping from the start, but both just spawned.
        assert!(!a.collides_with(&b));

        for _ in 0..GRACE_TICKS {
            assert!(!a.collides_with(&b));
            a.tick_grace();
            b.tick_grace();
        }

        assert!(a.collides_with(&b));
        assert!(b.collides_with(&a));
    }

    #[test]
    fn collision_is_one_sided_until_both_graces_expire() {
        let mut a = Body::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 10.0);
        let b = Body::new(Vec2::new(105.0, 100.0), Vec2::ZERO, 10.0);

        for _ in 0..GRACE_TICKS {
            a.tick_grace();
        }

        // `a` is eligible but `b` still is not.
        assert!(!a.collides_with(&b));
    }

    #[test]
    fn disjoint_bodies_never_collide() {
        let mut a = Body::new(Vec2::new(0.0, 0.0), Vec2::ZERO, 10.0);
        let mut b = Body::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 10.0);
        for _ in 0..GRACE_TICKS {
            a.tick_grace();
            b.tick_grace();
        }

        assert!(!a.collides_with(&b));
    }
}
