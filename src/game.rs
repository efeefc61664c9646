//! Game controller
//!
//! Owns the current session, the fixed-interval tick timer and the
//! leaderboard. Input and the timer both go through here; after each
//! mutation the session's events are drained so sounds can be played and
//! the end of a game recorded.

use crate::leaderboard::{LeaderboardStore, MAX_SCORES};
use crate::session::{GameEvent, PieceView, Session, SessionState, Snapshot, Sound};
use crate::tetromino::RotationDirection;
use std::time::{Duration, Instant};
use tracing::info;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Idle,
    Running,
    Paused,
    Ended,
}

/// Input actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCW,
    RotateCCW,
    Pause,
    Restart,
    ToggleSound,
    Quit,
}

/// Fixed-interval timer polled from the frame loop.
///
/// Fires at most once per poll; after a stall it resumes from the poll time
/// instead of bursting to catch up.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next_due: Instant,
}

impl Ticker {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now + interval,
        }
    }

    #[cfg(test)]
    fn interval(&self) -> Duration {
        self.interval
    }

    /// True if a tick is due at `now`
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due += self.interval;
        if self.next_due <= now {
            self.next_due = now + self.interval;
        }
        true
    }
}

/// The game controller
pub struct Game<L: LeaderboardStore> {
    session: Option<Session>,
    ticker: Option<Ticker>,
    tick_interval: Duration,
    cols: usize,
    rows: usize,
    leaderboard: L,
    top_scores: Vec<u64>,
    sounds: Vec<Sound>,
    /// Rows and points of the most recent clear in this game
    last_clear: Option<(usize, u64)>,
}

impl<L: LeaderboardStore> Game<L> {
    #[cfg(test)]
    pub fn new(leaderboard: L) -> Self {
        use crate::board::{DEFAULT_COLS, DEFAULT_ROWS};
        Self::with_board_size(leaderboard, DEFAULT_COLS, DEFAULT_ROWS)
    }

    pub fn with_board_size(leaderboard: L, cols: usize, rows: usize) -> Self {
        let top_scores = leaderboard.fetch_top_scores(MAX_SCORES);
        Self {
            session: None,
            ticker: None,
            tick_interval: Duration::ZERO,
            cols,
            rows,
            leaderboard,
            top_scores,
            sounds: Vec::new(),
            last_clear: None,
        }
    }

    pub fn state(&self) -> GameState {
        match self.session.as_ref().map(Session::state) {
            None => GameState::Idle,
            Some(SessionState::Running) => GameState::Running,
            Some(SessionState::Paused) => GameState::Paused,
            Some(SessionState::Over) => GameState::Ended,
        }
    }

    /// Begin a new game, replacing any game (and timer) already running
    pub fn start(&mut self, tick_interval: Duration) {
        self.start_with_seed(tick_interval, rand::random());
    }

    pub fn start_with_seed(&mut self, tick_interval: Duration, seed: u64) {
        info!(
            interval_ms = tick_interval.as_millis() as u64,
            seed, "starting game"
        );
        self.sounds.clear();
        self.last_clear = None;
        self.session = Some(Session::with_seed(self.cols, self.rows, seed));
        self.tick_interval = tick_interval;
        self.ticker = Some(Ticker::new(tick_interval, Instant::now()));
        self.refresh_leaderboard();
        self.collect_events();
    }

    /// Start again with the last interval used
    pub fn restart(&mut self) {
        self.start(self.tick_interval);
    }

    /// Drop the current game entirely; only the leaderboard survives
    pub fn quit(&mut self) {
        info!("quitting game");
        self.session = None;
        self.ticker = None;
        self.sounds.clear();
        self.last_clear = None;
        self.refresh_leaderboard();
    }

    /// Advance the timer; runs one gravity step if a tick is due.
    /// The timer keeps running while paused, the step is just skipped.
    pub fn update(&mut self, now: Instant) {
        let Some(ticker) = &mut self.ticker else {
            return;
        };
        if !ticker.poll(now) {
            return;
        }
        if let Some(session) = &mut self.session {
            session.tick();
        }
        self.collect_events();
    }

    pub fn process_action(&mut self, action: Action) {
        match action {
            Action::MoveLeft => self.move_left(),
            Action::MoveRight => self.move_right(),
            Action::SoftDrop => self.soft_drop(),
            Action::HardDrop => self.hard_drop(),
            Action::RotateCW => self.rotate_cw(),
            Action::RotateCCW => self.rotate(RotationDirection::CounterClockwise),
            Action::Pause => self.toggle_pause(),
            Action::Restart => self.restart(),
            // Sound and quit belong to the application shell
            Action::ToggleSound | Action::Quit => {}
        }
    }

    pub fn toggle_pause(&mut self) {
        if let Some(session) = &mut self.session {
            session.toggle_pause();
        }
    }

    pub fn move_left(&mut self) {
        self.with_session(Session::move_left);
    }

    pub fn move_right(&mut self) {
        self.with_session(Session::move_right);
    }

    pub fn soft_drop(&mut self) {
        self.with_session(Session::soft_drop);
    }

    pub fn rotate_cw(&mut self) {
        self.rotate(RotationDirection::Clockwise);
    }

    pub fn rotate(&mut self, direction: RotationDirection) {
        self.with_session(|session| session.rotate(direction));
    }

    pub fn hard_drop(&mut self) {
        self.with_session(Session::hard_drop);
    }

    fn with_session(&mut self, f: impl FnOnce(&mut Session)) {
        if let Some(session) = &mut self.session {
            f(session);
            self.collect_events();
        }
    }

    fn collect_events(&mut self) {
        let events = match &mut self.session {
            Some(session) => session.drain_events(),
            None => return,
        };
        for event in events {
            match event {
                GameEvent::Sound(sound) => self.sounds.push(sound),
                GameEvent::LinesCleared { rows, points } => self.last_clear = Some((rows, points)),
                GameEvent::GameOver { score } => self.end(score),
            }
        }
    }

    /// Stop the timer and record the final score
    fn end(&mut self, score: u64) {
        self.ticker = None;
        self.leaderboard.record_score(score);
        self.refresh_leaderboard();
        info!(score, "game ended");
    }

    fn refresh_leaderboard(&mut self) {
        self.top_scores = self.leaderboard.fetch_top_scores(MAX_SCORES);
    }

    /// Sounds requested since the last call
    pub fn drain_sounds(&mut self) -> Vec<Sound> {
        std::mem::take(&mut self.sounds)
    }

    /// Board plus active piece, or None before the first game
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.session.as_ref().map(Session::snapshot)
    }

    /// The next piece, or None before the first spawn
    pub fn preview(&self) -> Option<PieceView> {
        self.session.as_ref().and_then(Session::preview)
    }

    pub fn score(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.score().points)
    }

    pub fn lines(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.score().lines)
    }

    pub fn top_scores(&self) -> &[u64] {
        &self.top_scores
    }

    /// Gravity interval of the current (or last) game
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn last_clear(&self) -> Option<(usize, u64)> {
        self.last_clear
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    #[cfg(test)]
    fn ticker(&self) -> Option<&Ticker> {
        self.ticker.as_ref()
    }

    #[cfg(test)]
    fn leaderboard(&self) -> &L {
        &self.leaderboard
    }
}
