//! Top-score persistence
//!
//! Scores are kept as a JSON array of integers, highest first, in the
//! platform data directory (e.g. ~/.local/share/stackfall/scores.json).

use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Number of scores kept on the board
pub const MAX_SCORES: usize = 5;

/// Where finished games are recorded and read back from
pub trait LeaderboardStore {
    fn record_score(&mut self, score: u64);

    /// Best scores, highest first
    fn fetch_top_scores(&self, limit: usize) -> Vec<u64>;
}

/// Insert a score, keeping the list sorted descending and capped
fn insert_score(scores: &mut Vec<u64>, score: u64) {
    scores.push(score);
    scores.sort_unstable_by(|a, b| b.cmp(a));
    scores.truncate(MAX_SCORES);
}

/// Leaderboard held in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryLeaderboard {
    scores: Vec<u64>,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeaderboardStore for MemoryLeaderboard {
    fn record_score(&mut self, score: u64) {
        insert_score(&mut self.scores, score);
    }

    fn fetch_top_scores(&self, limit: usize) -> Vec<u64> {
        self.scores.iter().take(limit).copied().collect()
    }
}

/// Leaderboard backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileLeaderboard {
    path: Option<PathBuf>,
}

impl Default for FileLeaderboard {
    fn default() -> Self {
        Self::new()
    }
}

impl FileLeaderboard {
    /// Use the platform data directory. If it can't be determined the
    /// board silently behaves as empty.
    pub fn new() -> Self {
        let path = ProjectDirs::from("com", "stackfall", "stackfall")
            .map(|dirs| dirs.data_dir().join("scores.json"));
        Self { path }
    }

    #[cfg(test)]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Stored scores; anything unreadable counts as an empty board
    fn load(&self) -> Vec<u64> {
        let Some(path) = &self.path else {
            return Vec::new();
        };
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Could not read leaderboard {}: {}", path.display(), e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<u64>>(&contents) {
            Ok(mut scores) => {
                scores.sort_unstable_by(|a, b| b.cmp(a));
                scores
            }
            Err(e) => {
                warn!("Ignoring corrupt leaderboard {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    fn save(path: &Path, scores: &[u64]) -> io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string(scores).map_err(io::Error::other)?;
        fs::write(path, json)
    }
}

impl LeaderboardStore for FileLeaderboard {
    fn record_score(&mut self, score: u64) {
        let Some(path) = &self.path else {
            return;
        };
        let mut scores = self.load();
        insert_score(&mut scores, score);
        match Self::save(path, &scores) {
            Ok(()) => info!(score, "score recorded"),
            Err(e) => warn!("Could not save leaderboard {}: {}", path.display(), e),
        }
    }

    fn fetch_top_scores(&self, limit: usize) -> Vec<u64> {
        let mut scores = self.load();
        scores.truncate(limit);
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stackfall-test-{}", rand::random::<u32>()));
        dir.join(name)
    }

    #[test]
    fn test_memory_keeps_top_five_descending() {
        let mut board = MemoryLeaderboard::new();
        for score in [300, 100, 900, 0, 400, 1600, 200] {
            board.record_score(score);
        }
        assert_eq!(board.fetch_top_scores(5), vec![1600, 900, 400, 300, 200]);
        assert_eq!(board.fetch_top_scores(2), vec![1600, 900]);
    }

    #[test]
    fn test_file_round_trip() {
        let path = scratch_file("scores.json");
        let mut board = FileLeaderboard::at(&path);
        assert!(board.fetch_top_scores(5).is_empty());

        board.record_score(400);
        board.record_score(1600);
        board.record_score(100);

        let reopened = FileLeaderboard::at(&path);
        assert_eq!(reopened.fetch_top_scores(5), vec![1600, 400, 100]);
        let _ = fs::remove_dir_all(path.parent().expect("dir"));
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let path = scratch_file("scores.json");
        fs::create_dir_all(path.parent().expect("dir")).expect("mkdir");
        fs::write(&path, "not json").expect("write");

        let mut board = FileLeaderboard::at(&path);
        assert!(board.fetch_top_scores(5).is_empty());

        board.record_score(900);
        assert_eq!(board.fetch_top_scores(5), vec![900]);
        let _ = fs::remove_dir_all(path.parent().expect("dir"));
    }
}
