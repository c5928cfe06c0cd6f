use std::collections::BTreeMap;

use crate::player::Rgb;

/// Interface to the external high-score persistence layer. The core only
/// ever calls [`upsert_player`](ScoreStore::upsert_player) when a peer
/// joins and [`update_score_if_higher`](ScoreStore::update_score_if_higher)
/// when a score settles on the host; it never reads scores back.
pub trait ScoreStore: Send {
    /// All persisted players with their high scores, ordered by name.
    fn players(&self) -> Vec<(String, u32)>;

    /// Registers a player, keeping the existing record if the name is
    /// already present.
    fn upsert_player(&mut self, name: &str, color: Rgb);

    /// Raises the persisted score for `name`; never lowers it.
    fn update_score_if_higher(&mut self, name: &str, score: u32);

    fn delete_player(&mut self, name: &str);
}

/// In-memory store used by the binaries and tests. A relational backend
/// lives outside this crate and implements the same trait.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    entries: BTreeMap<String, (Rgb, u32)>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn players(&self) -> Vec<(String, u32)> {
        self.entries
            .iter()
            .map(|(name, (_, score))| (name.clone(), *score))
            .collect()
    }

    fn upsert_player(&mut self, name: &str, color: Rgb) {
        self.entries
            .entry(name.to_string())
            .or_insert((color, 0));
    }

    fn update_score_if_higher(&mut self, name: &str, score: u32) {
        if let Some((_, stored)) = self.entries.get_mut(name) {
            if *stored <= score {
                *stored = score;
            }
        }
    }

    fn delete_player(&mut self, name: &str) {
        self.entries.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_keeps_existing_record() {
        let mut store = MemoryScoreStore::new();
        store.upsert_player("ada", [1, 2, 3]);
        store.update_score_if_higher("ada", 9);
        store.upsert_player("ada", [4, 5, 6]);

        assert_eq!(store.players(), vec![("ada".to_string(), 9)]);
    }

    #[test]
    fn score_never_lowered() {
        let mut store = MemoryScoreStore::new();
        store.upsert_player("ada", [1, 2, 3]);

        store.update_score_if_higher("ada", 7);
        store.update_score_if_higher("ada", 3);
        assert_eq!(store.players(), vec![("ada".to_string(), 7)]);

        store.update_score_if_higher("ada", 7);
        assert_eq!(store.players(), vec![("ada".to_string(), 7)]);
    }

    #[test]
    fn players_ordered_by_name() {
        let mut store = MemoryScoreStore::new();
        store.upsert_player("zoe", [0, 0, 0]);
        store.upsert_player("ada", [0, 0, 0]);

        let names: Vec<String> = store.players().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["ada", "zoe"]);
    }

    #[test]
    fn delete_removes_entry() {
        let mut store = MemoryScoreStore::new();
        store.upsert_player("ada", [1, 2, 3]);
        store.delete_player("ada");
        assert!(store.players().is_empty());
    }
}
