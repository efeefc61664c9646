//! Tetromino definitions and shapes
//!
//! The catalog of the 7 canonical shapes. Each shape is an occupancy matrix
//! (rows top to bottom) plus a display color.

use rand::Rng;
use ratatui::style::Color;

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoType {
    I, // Cyan - long bar
    O, // Amber - square
    T, // Pink - T-shape
    J, // Purple - J-shape
    L, // Orange - L-shape
    S, // Green - S-shape
    Z, // Red - Z-shape
}

const I_SHAPE: &[&[u8]] = &[&[1, 1, 1, 1]];
const O_SHAPE: &[&[u8]] = &[&[1, 1], &[1, 1]];
const T_SHAPE: &[&[u8]] = &[&[0, 1, 0], &[1, 1, 1]];
const J_SHAPE: &[&[u8]] = &[&[1, 0, 0], &[1, 1, 1]];
const L_SHAPE: &[&[u8]] = &[&[0, 0, 1], &[1, 1, 1]];
const S_SHAPE: &[&[u8]] = &[&[0, 1, 1], &[1, 1, 0]];
const Z_SHAPE: &[&[u8]] = &[&[1, 1, 0], &[0, 1, 1]];

impl TetrominoType {
    /// Get the color for this tetromino
    pub fn color(&self) -> Color {
        match self {
            TetrominoType::I => Color::Rgb(6, 182, 212),
            TetrominoType::O => Color::Rgb(245, 158, 11),
            TetrominoType::T => Color::Rgb(244, 114, 182),
            TetrominoType::J => Color::Rgb(167, 139, 250),
            TetrominoType::L => Color::Rgb(251, 146, 60),
            TetrominoType::S => Color::Rgb(52, 211, 153),
            TetrominoType::Z => Color::Rgb(239, 68, 68),
        }
    }

    /// All tetromino types, in catalog order
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::J,
            TetrominoType::L,
            TetrominoType::S,
            TetrominoType::Z,
        ]
    }

    /// Pick a shape uniformly at random. Every draw is independent.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> TetrominoType {
        let all = Self::all();
        all[rng.gen_range(0..all.len())]
    }

    /// Occupancy matrix in spawn orientation.
    ///
    /// Returns a fresh copy on every call; the catalog itself is immutable.
    pub fn matrix(&self) -> Vec<Vec<bool>> {
        let rows = match self {
            TetrominoType::I => I_SHAPE,
            TetrominoType::O => O_SHAPE,
            TetrominoType::T => T_SHAPE,
            TetrominoType::J => J_SHAPE,
            TetrominoType::L => L_SHAPE,
            TetrominoType::S => S_SHAPE,
            TetrominoType::Z => Z_SHAPE,
        };
        rows.iter()
            .map(|row| row.iter().map(|&cell| cell != 0).collect())
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            TetrominoType::I => "I",
            TetrominoType::O => "O",
            TetrominoType::T => "T",
            TetrominoType::J => "J",
            TetrominoType::L => "L",
            TetrominoType::S => "S",
            TetrominoType::Z => "Z",
        }
    }
}

/// Direction for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}
