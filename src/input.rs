//! Keyboard input mapping
//!
//! Terminals deliver held keys as repeated press events, so every press
//! maps straight to one action.

use crate::game::Action;
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::warn;

/// Key bindings - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub hard_drop: Vec<KeyCode>,
    pub rotate_cw: Vec<KeyCode>,
    pub rotate_ccw: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
    pub restart: Vec<KeyCode>,
    pub toggle_sound: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    pub fn parse_key(s: &str) -> Option<KeyCode> {
        let code = match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "esc" | "escape" => KeyCode::Esc,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(code)
    }

    /// Parse a list of key strings, skipping ones we don't understand
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter()
            .filter_map(|s| {
                let code = Self::parse_key(s);
                if code.is_none() {
                    warn!("Unknown key binding {:?}", s);
                }
                code
            })
            .collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let keys = &settings.keys;
        Self {
            move_left: Self::parse_keys(&keys.move_left),
            move_right: Self::parse_keys(&keys.move_right),
            soft_drop: Self::parse_keys(&keys.soft_drop),
            hard_drop: Self::parse_keys(&keys.hard_drop),
            rotate_cw: Self::parse_keys(&keys.rotate_cw),
            rotate_ccw: Self::parse_keys(&keys.rotate_ccw),
            pause: Self::parse_keys(&keys.pause),
            restart: Self::parse_keys(&keys.restart),
            toggle_sound: Self::parse_keys(&keys.toggle_sound),
            quit: Self::parse_keys(&keys.quit),
        }
    }

    /// First matching action wins, in the order listed here
    fn action_for(&self, code: KeyCode) -> Option<Action> {
        let table = [
            (&self.move_left, Action::MoveLeft),
            (&self.move_right, Action::MoveRight),
            (&self.soft_drop, Action::SoftDrop),
            (&self.hard_drop, Action::HardDrop),
            (&self.rotate_cw, Action::RotateCW),
            (&self.rotate_ccw, Action::RotateCCW),
            (&self.pause, Action::Pause),
            (&self.restart, Action::Restart),
            (&self.toggle_sound, Action::ToggleSound),
            (&self.quit, Action::Quit),
        ];
        table
            .into_iter()
            .find(|(keys, _)| keys.contains(&code))
            .map(|(_, action)| action)
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Translates key events into game actions
#[derive(Debug, Clone, Default)]
pub struct InputHandler {
    bindings: KeyBindings,
}

impl InputHandler {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            bindings: KeyBindings::from_settings(settings),
        }
    }

    /// Handle a key press event
    pub fn key_down(&self, key: KeyEvent) -> Option<Action> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        self.bindings.action_for(normalize_key(key.code))
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
