//! Stackfall - a falling-block puzzle for the terminal

mod audio;
mod board;
mod game;
mod input;
mod leaderboard;
mod menu;
mod piece;
mod score;
mod session;
mod settings;
mod tetromino;
mod ui;

use audio::{AudioManager, SoundPlayer};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use game::{Action, Game, GameState};
use input::InputHandler;
use leaderboard::FileLeaderboard;
use menu::{Menu, MenuAction, MenuItemType, MenuScreen};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use session::Sound;
use settings::Settings;
use std::{
    io::{self, stdout},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Application state
enum AppState {
    Menu(Menu),
    Playing(InputHandler),
}

/// Get the stackfall temp directory, creating it if needed
fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("stackfall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    let session_id: u32 = rand::random();
    let log_dir = temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Log to a file, the terminal belongs to the UI
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stackfall=debug")),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "Stackfall starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let mut settings = Settings::load();

    // Audio is optional - the game works without it
    let mut audio = AudioManager::new();
    if let Some(a) = &mut audio {
        a.set_bgm_volume(settings.audio.bgm_volume as f32 / 100.0);
        a.set_sfx_volume(settings.audio.sfx_volume as f32 / 100.0);
        a.set_muted(!settings.audio.sound_on);
    }

    let mut game = Game::with_board_size(
        FileLeaderboard::new(),
        settings.board.cols,
        settings.board.rows,
    );

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut game, &mut settings, &mut audio);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture)?;

    if let Err(e) = settings.save() {
        tracing::warn!("Could not save settings: {}", e);
        eprintln!("Warning: Could not save settings: {}", e);
    }

    if result.is_ok() {
        println!("\nThanks for playing Stackfall!");
        if let Some(best) = game.top_scores().first() {
            println!("Best score: {}", best);
        }
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    game: &mut Game<FileLeaderboard>,
    settings: &mut Settings,
    audio: &mut Option<AudioManager>,
) -> io::Result<()> {
    let mut state = AppState::Menu(Menu::new(settings));

    loop {
        terminal.draw(|frame| match &state {
            AppState::Menu(menu) => ui::render_menu(frame, menu),
            AppState::Playing(_) => ui::render_game(frame, game, settings),
        })?;

        if event::poll(FRAME_DURATION)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match &mut state {
                    AppState::Menu(menu) => {
                        let action = match key.code {
                            KeyCode::Up => {
                                menu.move_up();
                                None
                            }
                            KeyCode::Down => {
                                menu.move_down();
                                None
                            }
                            KeyCode::Left => {
                                menu.adjust_left(settings);
                                apply_sound_setting(audio, settings);
                                None
                            }
                            KeyCode::Right => {
                                menu.adjust_right(settings);
                                apply_sound_setting(audio, settings);
                                None
                            }
                            KeyCode::Enter => menu.select(),
                            KeyCode::Char('q') | KeyCode::Esc => match menu.screen {
                                MenuScreen::Main => Some(MenuAction::Quit),
                                MenuScreen::Leaderboard => Some(MenuAction::Back),
                            },
                            _ => None,
                        };

                        if let Some(action) = action {
                            match action {
                                MenuAction::StartGame => {
                                    start_game(game, settings, audio);
                                    state = AppState::Playing(InputHandler::from_settings(settings));
                                }
                                MenuAction::GoToScreen(screen) => {
                                    menu.go_to(screen, settings, game.top_scores());
                                }
                                MenuAction::Back => menu.go_back(settings),
                                MenuAction::Quit => return Ok(()),
                            }
                        }
                    }
                    AppState::Playing(input) => {
                        if let Some(action) = input.key_down(key) {
                            if handle_game_action(action, game, settings, audio) {
                                state = AppState::Menu(Menu::new(settings));
                            }
                        }
                    }
                },
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    let area = Rect::new(0, 0, size.width, size.height);
                    match &mut state {
                        AppState::Menu(menu) => match handle_menu_mouse(menu, mouse, area, settings) {
                            Some(MenuAction::StartGame) => {
                                start_game(game, settings, audio);
                                state = AppState::Playing(InputHandler::from_settings(settings));
                            }
                            Some(MenuAction::GoToScreen(screen)) => {
                                menu.go_to(screen, settings, game.top_scores());
                            }
                            Some(MenuAction::Back) => menu.go_back(settings),
                            Some(MenuAction::Quit) => return Ok(()),
                            None => apply_sound_setting(audio, settings),
                        },
                        AppState::Playing(_) => {
                            let clicked = handle_game_mouse(mouse, area, game.cols(), game.rows());
                            if let Some(action) = clicked {
                                if handle_game_action(action, game, settings, audio) {
                                    state = AppState::Menu(Menu::new(settings));
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        // Gravity
        game.update(Instant::now());

        for sound in game.drain_sounds() {
            audio.play(sound);
            if sound == Sound::GameOver {
                if let Some(a) = audio {
                    a.stop_bgm();
                }
            }
        }
    }
}

/// Begin a new game with the configured speed, replacing any running one
fn start_game(game: &mut Game<FileLeaderboard>, settings: &Settings, audio: &mut Option<AudioManager>) {
    game.start(settings.gameplay.tick_interval());
    if let Some(a) = audio {
        a.play_bgm();
    }
}

/// Apply an in-game action from a key or an on-screen button.
/// Returns true when play should leave for the menu.
fn handle_game_action(
    action: Action,
    game: &mut Game<FileLeaderboard>,
    settings: &mut Settings,
    audio: &mut Option<AudioManager>,
) -> bool {
    match action {
        Action::Quit => {
            game.quit();
            if let Some(a) = audio {
                a.stop_bgm();
            }
            return true;
        }
        Action::ToggleSound => {
            settings.audio.sound_on = !settings.audio.sound_on;
            apply_sound_setting(audio, settings);
            if settings.audio.sound_on && game.state() == GameState::Running {
                if let Some(a) = audio {
                    a.resume_bgm();
                }
            }
        }
        Action::Restart => start_game(game, settings, audio),
        Action::Pause => {
            game.process_action(action);
            if let Some(a) = audio {
                match game.state() {
                    GameState::Paused => a.pause_bgm(),
                    GameState::Running => a.resume_bgm(),
                    _ => {}
                }
            }
        }
        _ => game.process_action(action),
    }
    false
}

fn apply_sound_setting(audio: &mut Option<AudioManager>, settings: &Settings) {
    if let Some(a) = audio {
        a.set_muted(!settings.audio.sound_on);
    }
}

/// Handle mouse events in the menu
fn handle_menu_mouse(
    menu: &mut Menu,
    mouse: MouseEvent,
    size: Rect,
    settings: &mut Settings,
) -> Option<MenuAction> {
    // Must match the layout in ui::render_menu
    let (menu_width, menu_height) = (44u16, 20u16);
    let title_height: u16 = if menu.screen == MenuScreen::Main { 5 } else { 3 };

    let menu_x = size.x + size.width.saturating_sub(menu_width) / 2;
    let menu_y = size.y + size.height.saturating_sub(menu_height) / 2;

    let inner_y = menu_y + title_height + 1;
    let inner_x = menu_x + 1;
    let inner_width = menu_width - 2;

    // Each item takes 2 rows (item + spacing) after 1 row of spacing
    let item_count = menu.items.len();
    let item_at = |x: u16, y: u16| {
        if x >= inner_x && x < inner_x + inner_width && y > inner_y {
            let index = ((y - inner_y - 1) / 2) as usize;
            (index < item_count).then_some(index)
        } else {
            None
        }
    };

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let index = item_at(mouse.column, mouse.row)?;
            let adjustable = match &menu.items[index].item_type {
                MenuItemType::Label { .. } => return None,
                MenuItemType::Button(_) => false,
                MenuItemType::Toggle { .. } | MenuItemType::Cycle { .. } => true,
            };
            menu.selected = index;
            if adjustable {
                menu.adjust_right(settings);
                None
            } else {
                menu.select()
            }
        }
        MouseEventKind::Moved => {
            if let Some(index) = item_at(mouse.column, mouse.row) {
                if !matches!(menu.items[index].item_type, MenuItemType::Label { .. }) {
                    menu.selected = index;
                }
            }
            None
        }
        MouseEventKind::ScrollUp => {
            menu.move_up();
            None
        }
        MouseEventKind::ScrollDown => {
            menu.move_down();
            None
        }
        _ => None,
    }
}

/// Handle mouse events during play: a left click on the control strip
fn handle_game_mouse(mouse: MouseEvent, size: Rect, cols: usize, rows: usize) -> Option<Action> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let layout = ui::game_layout(size, cols, rows);
            ui::control_at(layout.controls, mouse.column, mouse.row)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_click_on_button_maps_to_action() {
        let size = Rect::new(0, 0, 80, 30);
        let layout = ui::game_layout(size, 10, 20);
        for button in ui::control_buttons(layout.controls) {
            let click = mouse(
                MouseEventKind::Down(MouseButton::Left),
                button.rect.x + 1,
                button.rect.y,
            );
            assert_eq!(handle_game_mouse(click, size, 10, 20), Some(button.action));
        }
    }

    #[test]
    fn test_other_mouse_events_do_nothing() {
        let size = Rect::new(0, 0, 80, 30);
        let layout = ui::game_layout(size, 10, 20);
        let button = ui::control_buttons(layout.controls)[0];
        let (x, y) = (button.rect.x, button.rect.y);

        let right = mouse(MouseEventKind::Down(MouseButton::Right), x, y);
        assert_eq!(handle_game_mouse(right, size, 10, 20), None);
        let hover = mouse(MouseEventKind::Moved, x, y);
        assert_eq!(handle_game_mouse(hover, size, 10, 20), None);

        // Clicking the well itself is not a control
        let board = mouse(MouseEventKind::Down(MouseButton::Left), layout.board.x + 3, layout.board.y + 3);
        assert_eq!(handle_game_mouse(board, size, 10, 20), None);
    }
}
