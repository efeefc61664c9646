//! Main menu with the settings that matter before a game starts

use crate::settings::{Difficulty, Settings};

/// Menu screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuScreen {
    Main,
    Leaderboard,
}

/// Menu state
#[derive(Debug, Clone)]
pub struct Menu {
    pub screen: MenuScreen,
    pub selected: usize,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub label: String,
    pub item_type: MenuItemType,
}

#[derive(Debug, Clone)]
pub enum MenuItemType {
    /// Simple button that triggers an action
    Button(MenuAction),
    /// Toggle boolean setting
    Toggle { key: SettingKey, value: bool },
    /// Cycle through options
    Cycle { key: SettingKey, options: Vec<String>, current: usize },
    /// Display-only label (not selectable)
    Label { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    StartGame,
    GoToScreen(MenuScreen),
    Back,
    Quit,
}

/// Setting keys for identifying which setting to modify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    Difficulty,
    Sound,
}

impl MenuItem {
    fn button(label: &str, action: MenuAction) -> Self {
        Self {
            label: label.to_string(),
            item_type: MenuItemType::Button(action),
        }
    }

    fn is_selectable(&self) -> bool {
        !matches!(self.item_type, MenuItemType::Label { .. })
    }
}

impl Menu {
    pub fn new(settings: &Settings) -> Self {
        Self::main_menu(settings)
    }

    pub fn main_menu(settings: &Settings) -> Self {
        let options = Difficulty::all().iter().map(|d| d.name().to_string()).collect();
        let current = Difficulty::all()
            .iter()
            .position(|d| *d == settings.gameplay.difficulty)
            .unwrap_or(0);

        Self {
            screen: MenuScreen::Main,
            selected: 0,
            items: vec![
                MenuItem::button("Start Game", MenuAction::StartGame),
                MenuItem {
                    label: "Difficulty".to_string(),
                    item_type: MenuItemType::Cycle {
                        key: SettingKey::Difficulty,
                        options,
                        current,
                    },
                },
                MenuItem {
                    label: "Sound".to_string(),
                    item_type: MenuItemType::Toggle {
                        key: SettingKey::Sound,
                        value: settings.audio.sound_on,
                    },
                },
                MenuItem::button("Leaderboard", MenuAction::GoToScreen(MenuScreen::Leaderboard)),
                MenuItem::button("Quit", MenuAction::Quit),
            ],
        }
    }

    pub fn leaderboard(top_scores: &[u64]) -> Self {
        let mut items: Vec<MenuItem> = top_scores
            .iter()
            .enumerate()
            .map(|(i, score)| MenuItem {
                label: format!("#{}", i + 1),
                item_type: MenuItemType::Label {
                    text: score.to_string(),
                },
            })
            .collect();
        if items.is_empty() {
            items.push(MenuItem {
                label: "No scores yet".to_string(),
                item_type: MenuItemType::Label { text: String::new() },
            });
        }
        items.push(MenuItem::button("Back", MenuAction::Back));

        Self {
            screen: MenuScreen::Leaderboard,
            selected: items.len() - 1,
            items,
        }
    }

    pub fn move_up(&mut self) {
        self.step(self.items.len().saturating_sub(1));
    }

    pub fn move_down(&mut self) {
        self.step(1);
    }

    /// Move the cursor by `offset` (mod len), skipping labels
    fn step(&mut self, offset: usize) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        let mut next = self.selected;
        for _ in 0..len {
            next = (next + offset) % len;
            if self.items[next].is_selectable() {
                self.selected = next;
                return;
            }
        }
    }

    /// Handle left/right for cycling options and toggles
    pub fn adjust_left(&mut self, settings: &mut Settings) {
        self.adjust(settings, false);
    }

    pub fn adjust_right(&mut self, settings: &mut Settings) {
        self.adjust(settings, true);
    }

    fn adjust(&mut self, settings: &mut Settings, forward: bool) {
        let Some(item) = self.items.get_mut(self.selected) else {
            return;
        };
        match &mut item.item_type {
            MenuItemType::Toggle { key, value } => {
                *value = !*value;
                apply_setting(settings, *key, &SettingValue::Bool(*value));
            }
            MenuItemType::Cycle { key, options, current } if !options.is_empty() => {
                *current = if forward {
                    (*current + 1) % options.len()
                } else if *current == 0 {
                    options.len() - 1
                } else {
                    *current - 1
                };
                apply_setting(settings, *key, &SettingValue::String(&options[*current]));
            }
            _ => {}
        }
    }

    /// Get the action for the current selection (for Button types)
    pub fn select(&self) -> Option<MenuAction> {
        match self.items.get(self.selected).map(|item| &item.item_type) {
            Some(MenuItemType::Button(action)) => Some(*action),
            _ => None,
        }
    }

    pub fn go_to(&mut self, screen: MenuScreen, settings: &Settings, top_scores: &[u64]) {
        *self = match screen {
            MenuScreen::Main => Self::main_menu(settings),
            MenuScreen::Leaderboard => Self::leaderboard(top_scores),
        };
    }

    /// Go back to previous screen
    pub fn go_back(&mut self, settings: &Settings) {
        *self = Self::main_menu(settings);
    }
}

/// Helper enum for setting values
enum SettingValue<'a> {
    Bool(bool),
    String(&'a str),
}

/// Apply a setting change to the Settings struct
fn apply_setting(settings: &mut Settings, key: SettingKey, value: &SettingValue) {
    match (key, value) {
        (SettingKey::Sound, SettingValue::Bool(v)) => {
            settings.audio.sound_on = *v;
        }
        (SettingKey::Difficulty, SettingValue::String(name)) => {
            if let Some(difficulty) = Difficulty::from_name(name) {
                settings.gameplay.difficulty = difficulty;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_menu_layout() {
        let menu = Menu::new(&Settings::default());
        let labels: Vec<_> = menu.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, ["Start Game", "Difficulty", "Sound", "Leaderboard", "Quit"]);
        assert_eq!(menu.select(), Some(MenuAction::StartGame));
    }

    #[test]
    fn test_cursor_wraps() {
        let mut menu = Menu::new(&Settings::default());
        menu.move_up();
        assert_eq!(menu.select(), Some(MenuAction::Quit));
        menu.move_down();
        assert_eq!(menu.selected, 0);
    }

    #[test]
    fn test_cycle_difficulty() {
        let mut settings = Settings::default();
        let mut menu = Menu::new(&settings);
        menu.move_down();
        menu.adjust_right(&mut settings);
        assert_eq!(settings.gameplay.difficulty, Difficulty::Hard);
        menu.adjust_left(&mut settings);
        menu.adjust_left(&mut settings);
        assert_eq!(settings.gameplay.difficulty, Difficulty::Easy);
        menu.adjust_left(&mut settings);
        assert_eq!(settings.gameplay.difficulty, Difficulty::Insane);
    }

    #[test]
    fn test_toggle_sound() {
        let mut settings = Settings::default();
        let mut menu = Menu::new(&settings);
        menu.move_down();
        menu.move_down();
        menu.adjust_left(&mut settings);
        assert!(!settings.audio.sound_on);
        assert_eq!(menu.select(), None);
    }

    #[test]
    fn test_leaderboard_screen() {
        let settings = Settings::default();
        let mut menu = Menu::new(&settings);
        menu.go_to(MenuScreen::Leaderboard, &settings, &[1600, 400]);
        assert_eq!(menu.screen, MenuScreen::Leaderboard);
        assert_eq!(menu.items.len(), 3);
        assert_eq!(menu.select(), Some(MenuAction::Back));

        // Labels are skipped, so the cursor stays on Back
        menu.move_up();
        assert_eq!(menu.select(), Some(MenuAction::Back));

        menu.go_back(&settings);
        assert_eq!(menu.screen, MenuScreen::Main);
    }

    #[test]
    fn test_empty_leaderboard() {
        let menu = Menu::leaderboard(&[]);
        assert_eq!(menu.items[0].label, "No scores yet");
        assert_eq!(menu.select(), Some(MenuAction::Back));
    }
}
