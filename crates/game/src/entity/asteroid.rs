use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::Body;

/// Speed multiplier applied to an asteroid's successors.
pub const SPLIT_SPEED_FACTOR: f32 = 1.5;

/// The three asteroid classes. Radius and the successor class are plain
/// data on the variant rather than behavior spread over subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AsteroidSize {
    Large = 0,
    Medium = 1,
    Small = 2,
}

impl AsteroidSize {
    pub fn radius(self) -> f32 {
        match self {
            Self::Large => 40.0,
            Self::Medium => 20.0,
            Self::Small => 10.0,
        }
    }

    /// The class spawned when this one is destroyed, if any.
    pub fn split(self) -> Option<AsteroidSize> {
        match self {
            Self::Large => Some(Self::Medium),
            Self::Medium => Some(Self::Small),
            Self::Small => None,
        }
    }
}

impl From<u8> for AsteroidSize {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Large,
            1 => Self::Medium,
            _ => Self::Small,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Asteroid {
    pub body: Body,
    pub size: AsteroidSize,
}

impl Asteroid {
    pub fn new(position: Vec2, velocity: Vec2, size: AsteroidSize) -> Self {
        Self {
            body: Body::new(position, velocity, size.radius()),
            size,
        }
    }

    pub fn advance(&mut self) {
        self.body.tick_grace();
        self.body.integrate_and_wrap();
    }

    /// The asteroids left behind when this one is destroyed: two of the
    /// next class down at the same location, velocities rotated a quarter
    /// turn each way and scaled up. A small asteroid leaves nothing.
    pub fn successors(&self) -> Vec<Asteroid> {
        let Some(next) = self.size.split() else {
            return Vec::new();
        };

        let spun = self.body.velocity.perp() * SPLIT_SPEED_FACTOR;
        vec![
            Asteroid::new(self.body.position, spun, next),
            Asteroid::new(self.body.position, -spun, next),
        ]
    }
}
