//! Game board representation and line clearing

use ratatui::style::Color;

/// Default board dimensions
pub const DEFAULT_COLS: usize = 10;
pub const DEFAULT_ROWS: usize = 20;

/// A cell on the board - either empty or filled with a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Color),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }
}

/// The grid of locked cells
///
/// Stored as `cells[y][x]`; row 0 is the top of the well and `y` grows
/// downward. Dimensions are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cols: usize,
    rows: usize,
    cells: Vec<Vec<Cell>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_COLS, DEFAULT_ROWS)
    }
}

impl Board {
    /// Create a new empty board
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![vec![Cell::Empty; cols]; rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get the cell at (x, y), or None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.cells
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    /// True if (x, y) is inside the board and filled.
    ///
    /// Callers bound-check before asking; out-of-range coordinates read as
    /// unoccupied.
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(|cell| cell.is_filled())
    }

    /// Write locked cells into the grid. Cells outside the board (including
    /// rows above the top) are dropped.
    pub fn lock(&mut self, cells: &[(i32, i32, Color)]) {
        for &(x, y, color) in cells {
            if x < 0 || y < 0 {
                continue;
            }
            let (x, y) = (x as usize, y as usize);
            if x < self.cols && y < self.rows {
                self.cells[y][x] = Cell::Filled(color);
            }
        }
    }

    /// Remove every full row, shifting the rows above down and inserting
    /// empty rows at the top. Returns the number of rows removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = self.rows;

        // Re-examine the same index after a removal, since the row above
        // has shifted into it.
        while y > 0 {
            let row = y - 1;
            if self.is_row_full(row) {
                self.cells.remove(row);
                self.cells.insert(0, vec![Cell::Empty; self.cols]);
                cleared += 1;
            } else {
                y -= 1;
            }
        }

        cleared
    }

    fn is_row_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|cell| cell.is_filled())
    }

    pub fn is_empty(&self) -> bool {
        self.rows_iter().all(|row| row.iter().all(|cell| cell.is_empty()))
    }

    /// Rows top to bottom
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(Vec::as_slice)
    }

    /// Owned copy of every cell, for render snapshots
    pub fn cells(&self) -> Vec<Vec<Cell>> {
        self.cells.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RED: Color = Color::Red;

    fn fill_row(board: &mut Board, y: i32) {
        let cells: Vec<_> = (0..board.cols() as i32).map(|x| (x, y, RED)).collect();
        board.lock(&cells);
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(10, 20);
        assert!(board.is_empty());
        assert_eq!(board.cols(), 10);
        assert_eq!(board.rows(), 20);
    }

    #[test]
    fn test_lock_and_query() {
        let mut board = Board::default();
        board.lock(&[(5, 5, RED)]);
        assert!(board.is_occupied(5, 5));
        assert!(!board.is_occupied(4, 5));
        assert_eq!(board.get(5, 5), Some(Cell::Filled(RED)));
    }

    #[test]
    fn test_lock_drops_out_of_range_cells() {
        let mut board = Board::default();
        board.lock(&[(3, -1, RED), (3, -2, RED), (10, 0, RED), (-1, 0, RED), (0, 20, RED)]);
        assert!(board.is_empty());
    }

    #[test]
    fn test_out_of_bounds() {
        let board = Board::default();
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(0, -1), None);
        assert_eq!(board.get(DEFAULT_COLS as i32, 0), None);
        assert_eq!(board.get(0, DEFAULT_ROWS as i32), None);
        assert!(!board.is_occupied(-1, 0));
    }

    #[test]
    fn test_clear_single_line() {
        let mut board = Board::default();
        fill_row(&mut board, 19);
        board.lock(&[(0, 18, Color::Blue)]);

        assert_eq!(board.clear_full_rows(), 1);
        // The block from row 18 falls to row 19
        assert_eq!(board.get(0, 19), Some(Cell::Filled(Color::Blue)));
        assert_eq!(board.get(0, 18), Some(Cell::Empty));
    }

    #[test]
    fn test_clear_adjacent_lines_without_skipping() {
        let mut board = Board::default();
        fill_row(&mut board, 19);
        fill_row(&mut board, 18);
        fill_row(&mut board, 17);
        board.lock(&[(4, 16, Color::Green)]);

        assert_eq!(board.clear_full_rows(), 3);
        assert_eq!(board.get(4, 19), Some(Cell::Filled(Color::Green)));
        let filled: usize = board
            .rows_iter()
            .map(|row| row.iter().filter(|c| c.is_filled()).count())
            .sum();
        assert_eq!(filled, 1);
    }

    #[test]
    fn test_clear_split_lines() {
        let mut board = Board::default();
        fill_row(&mut board, 19);
        board.lock(&[(1, 18, Color::Blue)]);
        fill_row(&mut board, 17);

        assert_eq!(board.clear_full_rows(), 2);
        assert_eq!(board.get(1, 19), Some(Cell::Filled(Color::Blue)));
        assert_eq!(board.get(1, 18), Some(Cell::Empty));
    }

    #[test]
    fn test_no_full_rows() {
        let mut board = Board::default();
        board.lock(&[(0, 19, RED), (1, 19, RED)]);
        let before = board.clone();
        assert_eq!(board.clear_full_rows(), 0);
        assert_eq!(board, before);
    }

    fn arb_board() -> impl Strategy<Value = (usize, usize, Vec<Vec<bool>>)> {
        (1usize..8, 1usize..12).prop_flat_map(|(cols, rows)| {
            // Bias towards full rows so clears actually happen
            let row = prop_oneof![
                Just(vec![true; cols]),
                proptest::collection::vec(any::<bool>(), cols),
            ];
            (Just(cols), Just(rows), proptest::collection::vec(row, rows))
        })
    }

    proptest! {
        #[test]
        fn prop_clear_removes_exactly_full_rows((cols, rows, grid) in arb_board()) {
            let mut board = Board::new(cols, rows);
            for (y, row) in grid.iter().enumerate() {
                for (x, &filled) in row.iter().enumerate() {
                    if filled {
                        board.lock(&[(x as i32, y as i32, RED)]);
                    }
                }
            }
            let full = grid.iter().filter(|r| r.iter().all(|&c| c)).count();
            let survivors: Vec<Vec<bool>> = grid
                .iter()
                .filter(|r| !r.iter().all(|&c| c))
                .cloned()
                .collect();

            prop_assert_eq!(board.clear_full_rows(), full);
            prop_assert_eq!(board.cols(), cols);
            prop_assert_eq!(board.rows(), rows);

            let after: Vec<Vec<bool>> = board
                .rows_iter()
                .map(|r| r.iter().map(Cell::is_filled).collect())
                .collect();
            prop_assert_eq!(after.len(), rows);
            // Top rows are fresh and empty, the rest keep their order
            for row in &after[..full] {
                prop_assert!(row.iter().all(|&c| !c));
            }
            prop_assert_eq!(&after[full..], &survivors[..]);
        }
    }
}
