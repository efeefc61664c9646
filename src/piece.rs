//! Active falling piece logic

use crate::board::Board;
use crate::tetromino::{RotationDirection, TetrominoType};
use ratatui::style::Color;

/// Column shifts tried, in order, when a rotation collides in place
const WALL_KICKS: [i32; 2] = [1, -1];

/// An active falling piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// The type of tetromino
    pub kind: TetrominoType,
    /// Occupancy matrix for the current orientation, owned by this piece
    pub matrix: Vec<Vec<bool>>,
    pub color: Color,
    /// Column of the bounding box's left edge
    pub x: i32,
    /// Row of the bounding box's top edge; may be negative above the well
    pub y: i32,
}

/// Spawn column for a bounding box of `width` on a board of `cols`
pub fn spawn_column(cols: usize, width: usize) -> i32 {
    (cols / 2) as i32 - width.div_ceil(2) as i32
}

impl Piece {
    /// Create a new piece at the top of the board, horizontally centered
    pub fn spawn(kind: TetrominoType, cols: usize) -> Self {
        Self::with_matrix(kind, kind.matrix(), kind.color(), cols)
    }

    /// Create a piece from an explicit matrix and color, centered at the top
    pub fn with_matrix(kind: TetrominoType, matrix: Vec<Vec<bool>>, color: Color, cols: usize) -> Self {
        let width = matrix.first().map_or(0, Vec::len);
        Self {
            kind,
            matrix,
            color,
            x: spawn_column(cols, width),
            y: 0,
        }
    }

    /// Fresh copy of this piece's shape and color, re-centered at the top.
    /// Used when promoting the preview piece to the active one.
    pub fn respawned(&self, cols: usize) -> Self {
        Self::with_matrix(self.kind, self.matrix.clone(), self.color, cols)
    }

    /// Absolute (x, y, color) of every occupied cell
    pub fn cells(&self) -> Vec<(i32, i32, Color)> {
        occupied(&self.matrix)
            .map(|(c, r)| (self.x + c, self.y + r, self.color))
            .collect()
    }

    /// Would the piece collide if shifted by (dx, dy)?
    pub fn collides(&self, board: &Board, dx: i32, dy: i32) -> bool {
        matrix_collides(&self.matrix, board, self.x + dx, self.y + dy)
    }

    /// Try to translate the piece; returns false and leaves it untouched if blocked
    pub fn try_move(&mut self, board: &Board, dx: i32, dy: i32) -> bool {
        if self.collides(board, dx, dy) {
            return false;
        }
        self.x += dx;
        self.y += dy;
        true
    }

    /// Try to rotate 90 degrees, kicking one column right then left if the
    /// rotated shape collides in place. On failure nothing changes.
    pub fn rotate(&mut self, board: &Board, direction: RotationDirection) -> bool {
        let rotated = rotate_matrix(&self.matrix, direction);

        let offset = std::iter::once(0)
            .chain(WALL_KICKS)
            .find(|&dx| !matrix_collides(&rotated, board, self.x + dx, self.y));

        match offset {
            Some(dx) => {
                self.matrix = rotated;
                self.x += dx;
                true
            }
            None => false,
        }
    }

    /// Move down until blocked; returns the number of rows dropped
    pub fn drop_to_floor(&mut self, board: &Board) -> u32 {
        let mut distance = 0;
        while self.try_move(board, 0, 1) {
            distance += 1;
        }
        distance
    }
}

/// (col, row) of every set cell in a matrix
fn occupied(matrix: &[Vec<bool>]) -> impl Iterator<Item = (i32, i32)> + '_ {
    matrix.iter().enumerate().flat_map(|(r, row)| {
        row.iter()
            .enumerate()
            .filter(|&(_, &set)| set)
            .map(move |(c, _)| (c as i32, r as i32))
    })
}

/// Walls and floor always collide; the board is only consulted for rows
/// inside the well, so pieces may hang above row 0.
fn matrix_collides(matrix: &[Vec<bool>], board: &Board, x: i32, y: i32) -> bool {
    let cols = board.cols() as i32;
    let rows = board.rows() as i32;
    occupied(matrix).any(|(c, r)| {
        let nx = x + c;
        let ny = y + r;
        if nx < 0 || nx >= cols || ny >= rows {
            return true;
        }
        ny >= 0 && board.is_occupied(nx, ny)
    })
}

/// Rotate a matrix a quarter turn.
///
/// Clockwise is transpose then reverse each row; counter-clockwise is
/// transpose then reverse the row order.
pub fn rotate_matrix(matrix: &[Vec<bool>], direction: RotationDirection) -> Vec<Vec<bool>> {
    let width = matrix.first().map_or(0, Vec::len);
    let mut transposed: Vec<Vec<bool>> = (0..width)
        .map(|c| matrix.iter().map(|row| row[c]).collect())
        .collect();

    match direction {
        RotationDirection::Clockwise => transposed.iter_mut().for_each(|row| row.reverse()),
        RotationDirection::CounterClockwise => transposed.reverse(),
    }
    transposed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::DEFAULT_COLS;
    use proptest::prelude::*;

    fn m(rows: &[&[u8]]) -> Vec<Vec<bool>> {
        rows.iter().map(|r| r.iter().map(|&c| c != 0).collect()).collect()
    }

    #[test]
    fn test_spawn_centering() {
        assert_eq!(Piece::spawn(TetrominoType::I, DEFAULT_COLS).x, 3);
        assert_eq!(Piece::spawn(TetrominoType::O, DEFAULT_COLS).x, 4);
        for kind in [
            TetrominoType::T,
            TetrominoType::J,
            TetrominoType::L,
            TetrominoType::S,
            TetrominoType::Z,
        ] {
            let piece = Piece::spawn(kind, DEFAULT_COLS);
            assert_eq!(piece.x, 4, "{}", kind.name());
            assert_eq!(piece.y, 0);
        }
    }

    #[test]
    fn test_rotate_matrix_cw() {
        let t = TetrominoType::T.matrix();
        let cw = rotate_matrix(&t, RotationDirection::Clockwise);
        assert_eq!(cw, m(&[&[1, 0], &[1, 1], &[1, 0]]));
    }

    #[test]
    fn test_rotate_matrix_ccw() {
        let t = TetrominoType::T.matrix();
        let ccw = rotate_matrix(&t, RotationDirection::CounterClockwise);
        assert_eq!(ccw, m(&[&[0, 1], &[1, 1], &[0, 1]]));
    }

    #[test]
    fn test_four_rotations_are_identity() {
        for kind in TetrominoType::all() {
            let mut matrix = kind.matrix();
            for _ in 0..4 {
                matrix = rotate_matrix(&matrix, RotationDirection::Clockwise);
            }
            assert_eq!(matrix, kind.matrix());
        }
    }

    #[test]
    fn test_move_blocked_by_walls() {
        let board = Board::default();
        let mut piece = Piece::spawn(TetrominoType::O, DEFAULT_COLS);
        piece.x = 0;
        assert!(!piece.try_move(&board, -1, 0));
        assert_eq!(piece.x, 0);
        piece.x = 8;
        assert!(!piece.try_move(&board, 1, 0));
        assert_eq!(piece.x, 8);
    }

    #[test]
    fn test_move_blocked_by_locked_cells() {
        let mut board = Board::default();
        board.lock(&[(4, 2, Color::Red)]);
        let mut piece = Piece::spawn(TetrominoType::O, DEFAULT_COLS);
        assert!(!piece.try_move(&board, 0, 1));
        assert_eq!(piece.y, 0);
    }

    #[test]
    fn test_cells_above_the_well_ignore_board() {
        let mut board = Board::default();
        board.lock(&[(4, 0, Color::Red)]);
        let mut piece = Piece::spawn(TetrominoType::O, DEFAULT_COLS);
        piece.y = -2;
        assert!(!piece.collides(&board, 0, 0));
        assert!(piece.collides(&board, 0, 1));
    }

    #[test]
    fn test_drop_to_floor() {
        let board = Board::default();
        let mut piece = Piece::spawn(TetrominoType::I, DEFAULT_COLS);
        assert_eq!(piece.drop_to_floor(&board), 19);
        assert_eq!(piece.y, 19);
    }

    #[test]
    fn test_wall_kick_right() {
        let mut board = Board::default();
        board.lock(&[(3, 7, Color::Gray)]);
        let mut j = Piece::spawn(TetrominoType::J, DEFAULT_COLS);
        j.x = 3;
        j.y = 5;
        assert!(!j.collides(&board, 0, 0));

        assert!(j.rotate(&board, RotationDirection::Clockwise));
        assert_eq!(j.x, 4);
        assert_eq!(j.matrix, m(&[&[1, 1], &[1, 0], &[1, 0]]));
    }

    #[test]
    fn test_wall_kick_left() {
        let board = Board::default();
        // Vertical I two columns from the right wall
        let mut i = Piece::spawn(TetrominoType::I, DEFAULT_COLS);
        i.matrix = rotate_matrix(&i.matrix, RotationDirection::Clockwise);
        i.x = 7;
        i.y = 5;
        assert!(i.rotate(&board, RotationDirection::CounterClockwise));
        assert_eq!(i.x, 6);
        assert_eq!(i.matrix, TetrominoType::I.matrix());
    }

    #[test]
    fn test_failed_rotation_changes_nothing() {
        let mut board = Board::default();
        // Vertical I in a one-wide shaft
        let walls: Vec<_> = (0..20)
            .flat_map(|y| [(3, y, Color::Gray), (5, y, Color::Gray)])
            .filter(|&(_, y, _)| y >= 8)
            .collect();
        board.lock(&walls);
        let mut piece = Piece::spawn(TetrominoType::I, DEFAULT_COLS);
        piece.matrix = rotate_matrix(&piece.matrix, RotationDirection::Clockwise);
        piece.x = 4;
        piece.y = 10;
        assert!(!piece.collides(&board, 0, 0));

        let before = piece.clone();
        assert!(!piece.rotate(&board, RotationDirection::Clockwise));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_respawned_copies_shape_and_recenters() {
        let mut next = Piece::spawn(TetrominoType::L, DEFAULT_COLS);
        next.x = 0;
        next.y = 7;
        let current = next.respawned(DEFAULT_COLS);
        assert_eq!(current.matrix, next.matrix);
        assert_eq!(current.color, next.color);
        assert_eq!((current.x, current.y), (4, 0));
    }

    fn arb_kind() -> impl Strategy<Value = TetrominoType> {
        (0usize..7).prop_map(|i| TetrominoType::all()[i])
    }

    fn arb_board() -> impl Strategy<Value = Board> {
        proptest::collection::vec((0i32..10, 0i32..20), 0..60).prop_map(|cells| {
            let mut board = Board::default();
            let cells: Vec<_> = cells.into_iter().map(|(x, y)| (x, y, Color::Gray)).collect();
            board.lock(&cells);
            board
        })
    }

    proptest! {
        #[test]
        fn prop_failed_rotation_is_bit_identical(
            board in arb_board(),
            kind in arb_kind(),
            x in -2i32..10,
            y in -2i32..20,
            clockwise in any::<bool>(),
        ) {
            let mut piece = Piece::spawn(kind, DEFAULT_COLS);
            piece.x = x;
            piece.y = y;
            let before = piece.clone();
            let direction = if clockwise {
                RotationDirection::Clockwise
            } else {
                RotationDirection::CounterClockwise
            };
            if !piece.rotate(&board, direction) {
                prop_assert_eq!(piece, before);
            } else {
                prop_assert!(!piece.collides(&board, 0, 0));
            }
        }

        #[test]
        fn prop_successful_move_never_collides(
            board in arb_board(),
            kind in arb_kind(),
            x in -2i32..10,
            y in -2i32..20,
            dx in -1i32..=1,
            dy in 0i32..=1,
        ) {
            let mut piece = Piece::spawn(kind, DEFAULT_COLS);
            piece.x = x;
            piece.y = y;
            let before = piece.clone();
            if piece.try_move(&board, dx, dy) {
                prop_assert!(!piece.collides(&board, 0, 0));
            } else {
                prop_assert_eq!(piece, before);
            }
        }
    }
}
