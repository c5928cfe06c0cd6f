use rand::Rng;
use serde::{Deserialize, Serialize};

/// Display color as packed RGB channels.
pub type Rgb = [u8; 3];

/// Transient per-match player identity, derived from the player's color
/// plus a random salt. Two peers whose colors land on the same value are
/// not corrected; the roster simply refuses the duplicate (see
/// DESIGN.md).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlayerId(pub u32);

impl PlayerId {
    /// Salt range added to the packed color.
    const SALT_RANGE: u32 = 300;

    pub fn derive(color: Rgb) -> Self {
        let packed =
            ((color[0] as u32) << 16) | ((color[1] as u32) << 8) | color[2] as u32;
        let salt = rand::thread_rng().gen_range(0..Self::SALT_RANGE);
        Self(packed.wrapping_add(salt))
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Stable identity for one participant in a match. The score accumulates
/// over the match; persistence beyond the match goes through the
/// [`ScoreStore`](crate::score::ScoreStore) keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub color: Rgb,
    pub id: PlayerId,
    pub score: u32,
}

impl Player {
    pub fn new(name: impl Into<String>, color: Rgb) -> Self {
        Self {
            name: name.into(),
            color,
            id: PlayerId::derive(color),
            score: 0,
        }
    }
}
