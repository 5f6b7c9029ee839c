//! High score leaderboard system
//!
//! Tracks the human's top 10 rounds, persisted through [`crate::platform::storage`].

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::platform::storage::Store;
use crate::session::Standings;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u32,
    /// Display name at the time
    pub name: String,
    /// How long the round lasted
    pub seconds_played: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "asteroid_arena_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Find insertion point (sorted descending by score, earlier entries win ties)
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Record the human's result from a finished round
    pub fn record(&mut self, standings: &Standings, timestamp: f64) -> Option<usize> {
        let human = standings.human()?;
        self.add_score(HighScoreEntry {
            score: human.score,
            name: human.name.clone(),
            seconds_played: standings.seconds_played,
            timestamp,
        })
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores, starting fresh when nothing readable is stored
    pub fn load(store: &Store) -> Self {
        match store.load_json::<HighScores>(Self::STORAGE_KEY) {
            Ok(Some(scores)) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Discarding unreadable high scores: {e}");
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &Store) -> Result<()> {
        store.save_json(Self::STORAGE_KEY, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{EndReason, World};
    use crate::tuning::Tuning;

    fn entry(score: u32) -> HighScoreEntry {
        HighScoreEntry {
            score,
            name: "ace".to_string(),
            seconds_played: 60,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert_eq!(scores.add_score(entry(0)), None);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_ranks_descending() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(entry(30)), Some(1));
        assert_eq!(scores.add_score(entry(50)), Some(1));
        assert_eq!(scores.add_score(entry(40)), Some(2));
        assert_eq!(scores.add_score(entry(40)), Some(3));
        let order: Vec<u32> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![50, 40, 40, 30]);
        assert_eq!(scores.top_score(), Some(50));
    }

    #[test]
    fn test_full_table_trims_and_rejects() {
        let mut scores = HighScores::new();
        for i in 1..=MAX_HIGH_SCORES as u32 {
            scores.add_score(entry(i * 10));
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(10));
        assert_eq!(scores.potential_rank(15), Some(MAX_HIGH_SCORES));
        assert_eq!(scores.add_score(entry(15)), Some(MAX_HIGH_SCORES));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(15));
    }

    #[test]
    fn test_record_takes_human_result() {
        let mut world = World::new("ace", 1, &Tuning::default());
        let human_id = world.human_id.clone();
        if let Some(p) = world.players.get_mut(&human_id) {
            p.score = 70;
        }
        world.time_remaining = 20;
        world.finish(EndReason::HumanDestroyed);
        let standings = Standings::from_world(&world).expect("finished");

        let mut scores = HighScores::new();
        assert_eq!(scores.record(&standings, 1234.0), Some(1));
        assert_eq!(scores.entries[0].name, "ace");
        assert_eq!(scores.entries[0].seconds_played, 40);
        assert_eq!(scores.entries[0].timestamp, 1234.0);
    }
}
