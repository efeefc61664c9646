//! Scoring

/// Points per cleared row, before the squared multiplier
const LINE_POINTS: u64 = 100;

/// Score tracking for one game
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
    /// Current score; never decreases during a game
    pub points: u64,
    /// Total rows cleared
    pub lines: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points awarded for clearing `rows` rows with a single lock: `rows² × 100`
    pub fn points_for(rows: usize) -> u64 {
        let rows = rows as u64;
        rows * LINE_POINTS * rows
    }

    /// Record a line clear and return the points it was worth
    pub fn add_clear(&mut self, rows: usize) -> u64 {
        let awarded = Self::points_for(rows);
        self.points += awarded;
        self.lines += rows as u32;
        awarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_points_table() {
        assert_eq!(Score::points_for(0), 0);
        assert_eq!(Score::points_for(1), 100);
        assert_eq!(Score::points_for(2), 400);
        assert_eq!(Score::points_for(3), 900);
        assert_eq!(Score::points_for(4), 1600);
    }

    #[test]
    fn test_accumulates() {
        let mut score = Score::new();
        assert_eq!(score.add_clear(1), 100);
        assert_eq!(score.add_clear(4), 1600);
        assert_eq!(score.add_clear(0), 0);
        assert_eq!(score.points, 1700);
        assert_eq!(score.lines, 5);
    }
}
