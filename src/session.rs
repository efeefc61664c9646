//! A single game session: the board, the active and preview pieces, and
//! the score. Everything a running game mutates lives here, so several
//! sessions can coexist and tests can drive one directly.

use crate::board::{Board, Cell};
use crate::piece::Piece;
use crate::score::Score;
use crate::tetromino::{RotationDirection, TetrominoType};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ratatui::style::Color;
use tracing::{debug, info};

/// Abstract sound requests; playback is someone else's problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    Move,
    Rotate,
    Drop,
    GameOver,
}

/// Things that happened during a mutation, drained by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Sound(Sound),
    LinesCleared { rows: usize, points: u64 },
    GameOver { score: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Paused,
    Over,
}

/// Read-only view of a piece for renderers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceView {
    pub matrix: Vec<Vec<bool>>,
    pub color: Color,
    pub x: i32,
    pub y: i32,
}

impl From<&Piece> for PieceView {
    fn from(piece: &Piece) -> Self {
        Self {
            matrix: piece.matrix.clone(),
            color: piece.color,
            x: piece.x,
            y: piece.y,
        }
    }
}

/// Everything the board renderer needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// `cells[y][x]`, top row first
    pub cells: Vec<Vec<Cell>>,
    pub piece: Option<PieceView>,
}

pub struct Session {
    board: Board,
    current: Option<Piece>,
    next: Option<Piece>,
    score: Score,
    state: SessionState,
    rng: ChaCha8Rng,
    events: Vec<GameEvent>,
}

impl Session {
    /// Start a fresh session: empty board, zero score, first piece spawned
    pub fn with_seed(cols: usize, rows: usize, seed: u64) -> Self {
        let mut session = Self {
            board: Board::new(cols, rows),
            current: None,
            next: None,
            score: Score::new(),
            state: SessionState::Running,
            rng: ChaCha8Rng::seed_from_u64(seed),
            events: Vec::new(),
        };
        session.spawn_piece();
        session
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn current(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    pub fn next(&self) -> Option<&Piece> {
        self.next.as_ref()
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state == SessionState::Over
    }

    /// Toggle pause. Has no effect once the game is over.
    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            SessionState::Running => SessionState::Paused,
            SessionState::Paused => SessionState::Running,
            SessionState::Over => SessionState::Over,
        };
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cells: self.board.cells(),
            piece: self.current.as_ref().map(PieceView::from),
        }
    }

    /// The upcoming piece for the preview panel
    pub fn preview(&self) -> Option<PieceView> {
        self.next.as_ref().map(PieceView::from)
    }

    pub fn move_left(&mut self) {
        self.shift(-1, 0);
    }

    pub fn move_right(&mut self) {
        self.shift(1, 0);
    }

    /// Move down one row. Never locks; gravity does that.
    pub fn soft_drop(&mut self) {
        self.shift(0, 1);
    }

    pub fn rotate(&mut self, direction: RotationDirection) {
        if self.state != SessionState::Running {
            return;
        }
        let Some(piece) = &mut self.current else {
            return;
        };
        if piece.rotate(&self.board, direction) {
            self.events.push(GameEvent::Sound(Sound::Rotate));
        }
    }

    pub fn rotate_cw(&mut self) {
        self.rotate(RotationDirection::Clockwise);
    }

    /// Drop straight to the floor and lock immediately
    pub fn hard_drop(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        let Some(piece) = &mut self.current else {
            return;
        };
        piece.drop_to_floor(&self.board);
        self.lock_current();
    }

    /// One gravity step: fall a row, or lock if blocked. No-op unless running.
    pub fn tick(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        let Some(piece) = &mut self.current else {
            return;
        };
        if !piece.try_move(&self.board, 0, 1) {
            self.lock_current();
        }
    }

    fn shift(&mut self, dx: i32, dy: i32) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        let Some(piece) = &mut self.current else {
            return false;
        };
        let moved = piece.try_move(&self.board, dx, dy);
        if moved && dx != 0 {
            self.events.push(GameEvent::Sound(Sound::Move));
        }
        moved
    }

    /// Write the active piece into the board, clear rows, then either spawn
    /// the next piece or end the game if the lock happened in the spawn area.
    fn lock_current(&mut self) {
        let Some(piece) = self.current.take() else {
            return;
        };

        self.board.lock(&piece.cells());
        self.events.push(GameEvent::Sound(Sound::Drop));
        debug!(kind = piece.kind.name(), x = piece.x, y = piece.y, "piece locked");

        let rows = self.board.clear_full_rows();
        if rows > 0 {
            let points = self.score.add_clear(rows);
            debug!(rows, points, total = self.score.points, "rows cleared");
            self.events.push(GameEvent::LinesCleared { rows, points });
        }

        if piece.y <= 0 && piece.collides(&self.board, 0, 0) {
            self.end();
        } else {
            self.spawn_piece();
        }
    }

    /// Promote the preview piece to active and draw a new preview. Ends the
    /// game if the promoted piece is blocked where it spawns.
    fn spawn_piece(&mut self) {
        let cols = self.board.cols();
        let next = match self.next.take() {
            Some(next) => next,
            None => Piece::spawn(TetrominoType::random(&mut self.rng), cols),
        };

        let current = next.respawned(cols);
        self.next = Some(Piece::spawn(TetrominoType::random(&mut self.rng), cols));

        let blocked = current.collides(&self.board, 0, 0);
        self.current = Some(current);
        if blocked {
            self.end();
        }
    }

    fn end(&mut self) {
        if self.state == SessionState::Over {
            return;
        }
        self.state = SessionState::Over;
        info!(score = self.score.points, lines = self.score.lines, "game over");
        self.events.push(GameEvent::Sound(Sound::GameOver));
        self.events.push(GameEvent::GameOver {
            score: self.score.points,
        });
    }
}
