//! Terminal UI rendering with ratatui

use crate::board::Cell;
use crate::game::{Action, Game, GameState};
use crate::leaderboard::{LeaderboardStore, MAX_SCORES};
use crate::menu::{Menu, MenuItem, MenuItemType, MenuScreen};
use crate::session::{PieceView, Snapshot};
use crate::settings::Settings;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const BLOCK: &str = "██";
const EMPTY: &str = "  ";
/// Well background
const EMPTY_BG: Color = Color::Rgb(7, 16, 36);

/// Width of the side panel (preview, stats, leaderboard)
const SIDE_WIDTH: u16 = 18;

/// Two button rows with a blank row between them
const CONTROLS_HEIGHT: u16 = 3;

const MOVE_BUTTONS: [(&str, Action); 5] = [
    ("◀", Action::MoveLeft),
    ("▶", Action::MoveRight),
    ("⟳", Action::RotateCW),
    ("▼", Action::SoftDrop),
    ("⤓", Action::HardDrop),
];

const COMMAND_BUTTONS: [(&str, Action); 3] = [
    ("Pause", Action::Pause),
    ("Restart", Action::Restart),
    ("Quit", Action::Quit),
];

/// Render the main menu
pub fn render_menu(frame: &mut Frame, menu: &Menu) {
    let area = frame.area();
    let (menu_width, menu_height) = (44u16, 20u16);
    let menu_area = center_rect(area, menu_width, menu_height);

    let show_big_title = menu.screen == MenuScreen::Main;
    let title_height = if show_big_title { 5u16 } else { 3u16 };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(title_height), Constraint::Min(8)])
        .split(menu_area);

    if show_big_title {
        let title = Paragraph::new(big_title()).alignment(Alignment::Center);
        frame.render_widget(title, layout[0]);
    } else {
        let title_lines = vec![
            Line::raw(""),
            Line::styled("TOP SCORES", Style::default().fg(Color::Cyan).bold()),
        ];
        let title = Paragraph::new(title_lines).alignment(Alignment::Center);
        frame.render_widget(title, layout[0]);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(layout[1]);
    frame.render_widget(block, layout[1]);

    let mut lines = vec![Line::raw("")];
    for (i, item) in menu.items.iter().enumerate() {
        lines.push(render_menu_item(item, i == menu.selected));
        lines.push(Line::raw(""));
    }

    lines.push(Line::styled(
        controls_hint(menu),
        Style::default().fg(Color::DarkGray),
    ));

    let menu_text = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(menu_text, inner);
}

/// Main screen banner. Must stay within the 5-row title area that
/// `handle_menu_mouse` assumes.
fn big_title() -> Vec<Line<'static>> {
    let cyan = Style::default().fg(Color::Cyan);
    let rule = "━".repeat(21);
    vec![
        Line::raw(""),
        Line::styled(rule.clone(), cyan),
        Line::styled("S T A C K F A L L", cyan.bold()),
        Line::styled(rule, cyan),
    ]
}

/// Render a single menu item based on its type
fn render_menu_item(item: &MenuItem, is_selected: bool) -> Line<'static> {
    let prefix = if is_selected { "▶ " } else { "  " };

    let base_style = if is_selected {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::White)
    };

    match &item.item_type {
        MenuItemType::Button(_) => Line::styled(format!("{}{}", prefix, item.label), base_style),
        MenuItemType::Toggle { value, .. } => {
            let value_str = if *value { "ON" } else { "OFF" };
            let value_color = if *value { Color::Green } else { Color::Red };
            Line::from(vec![
                Span::styled(format!("{}{}: ", prefix, item.label), base_style),
                Span::styled(
                    format!("< {} >", value_str),
                    Style::default().fg(value_color).bold(),
                ),
            ])
        }
        MenuItemType::Cycle { options, current, .. } => {
            let value_str = options.get(*current).cloned().unwrap_or_default();
            Line::from(vec![
                Span::styled(format!("{}{}: ", prefix, item.label), base_style),
                Span::styled(format!("< {} >", value_str), Style::default().fg(Color::Cyan)),
            ])
        }
        MenuItemType::Label { text } => {
            if text.is_empty() {
                Line::styled(format!("  {}", item.label), Style::default().fg(Color::Gray))
            } else {
                Line::from(vec![
                    Span::styled(format!("  {}: ", item.label), Style::default().fg(Color::Gray)),
                    Span::styled(text.clone(), Style::default().fg(Color::Cyan)),
                ])
            }
        }
    }
}

fn controls_hint(menu: &Menu) -> &'static str {
    match menu.items.get(menu.selected).map(|item| &item.item_type) {
        Some(MenuItemType::Toggle { .. } | MenuItemType::Cycle { .. }) => "↑↓ Select  ←→ Adjust  q Quit",
        _ if menu.screen == MenuScreen::Leaderboard => "Enter Back  Esc Back",
        _ => "↑↓ Select  Enter Confirm  q Quit",
    }
}

/// Render the entire game UI
pub fn render_game<L: LeaderboardStore>(frame: &mut Frame, game: &Game<L>, settings: &Settings) {
    let area = frame.area();
    let Some(snapshot) = game.snapshot() else {
        return;
    };

    let layout = game_layout(area, game.cols(), game.rows());
    render_board(frame, layout.board, &snapshot);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),                     // Next
            Constraint::Length(9),                     // Stats
            Constraint::Length(MAX_SCORES as u16 + 2), // Top scores
        ])
        .split(layout.side);

    render_next(frame, right_layout[0], game.preview().as_ref());
    render_stats(frame, right_layout[1], game, settings);
    render_top_scores(frame, right_layout[2], game.top_scores());
    render_controls(frame, layout.controls, game.state());

    match game.state() {
        GameState::Paused => render_overlay(frame, area, "PAUSED", &["Press P to resume".to_string()]),
        GameState::Ended => render_overlay(
            frame,
            area,
            "GAME OVER",
            &[
                format!("Final Score: {}", game.score()),
                "R Restart  Q Menu".to_string(),
            ],
        ),
        GameState::Running | GameState::Idle => {}
    }
}

/// Where the game screen's parts go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameLayout {
    pub board: Rect,
    pub side: Rect,
    pub controls: Rect,
}

/// Split the frame for a `cols`×`rows` well. Rendering and mouse
/// hit-testing both go through here so they can't drift apart.
pub fn game_layout(area: Rect, cols: usize, rows: usize) -> GameLayout {
    let board_width = cols as u16 * 2 + 2;
    let board_height = (rows as u16 + 2).max(22);
    let game_area = center_rect(area, board_width + SIDE_WIDTH, board_height + CONTROLS_HEIGHT);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(board_height), Constraint::Length(CONTROLS_HEIGHT)])
        .split(game_area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(board_width), Constraint::Length(SIDE_WIDTH)])
        .split(vertical[0]);

    GameLayout {
        board: horizontal[0],
        side: horizontal[1],
        controls: vertical[1],
    }
}

/// An on-screen button for mouse and touch play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlButton {
    pub rect: Rect,
    pub label: &'static str,
    pub action: Action,
}

/// Buttons of the control strip: moves on the first row, commands on the
/// last. Buttons that don't fit the width are left out.
pub fn control_buttons(area: Rect) -> Vec<ControlButton> {
    let mut buttons = button_row(&MOVE_BUTTONS, area, area.y);
    if area.height >= CONTROLS_HEIGHT {
        buttons.extend(button_row(&COMMAND_BUTTONS, area, area.y + CONTROLS_HEIGHT - 1));
    }
    buttons
}

fn button_row(row: &[(&'static str, Action)], area: Rect, y: u16) -> Vec<ControlButton> {
    if area.height == 0 {
        return Vec::new();
    }
    let widths: Vec<u16> = row.iter().map(|(label, _)| label.chars().count() as u16 + 4).collect();
    let total = widths.iter().sum::<u16>() + widths.len().saturating_sub(1) as u16;
    let mut x = area.x + area.width.saturating_sub(total) / 2;

    let mut buttons = Vec::new();
    for (&(label, action), width) in row.iter().zip(widths) {
        if x + width > area.right() {
            break;
        }
        buttons.push(ControlButton {
            rect: Rect::new(x, y, width, 1),
            label,
            action,
        });
        x += width + 1;
    }
    buttons
}

/// Action of the button under (x, y), if any
pub fn control_at(area: Rect, x: u16, y: u16) -> Option<Action> {
    control_buttons(area)
        .into_iter()
        .find(|b| x >= b.rect.x && x < b.rect.right() && y >= b.rect.y && y < b.rect.bottom())
        .map(|b| b.action)
}

fn render_controls(frame: &mut Frame, area: Rect, state: GameState) {
    for button in control_buttons(area) {
        let active = button.action == Action::Pause && state == GameState::Paused;
        let style = if active {
            Style::default().fg(Color::Black).bg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        };
        let text = Paragraph::new(Line::styled(button.label, style))
            .alignment(Alignment::Center)
            .style(style);
        frame.render_widget(text, button.rect);
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Color at (x, y): the active piece wins over the locked cell below it
fn cell_color(snapshot: &Snapshot, x: usize, y: usize) -> Option<Color> {
    if let Some(piece) = &snapshot.piece {
        let (px, py) = (x as i32 - piece.x, y as i32 - piece.y);
        if px >= 0 && py >= 0 {
            let hit = piece
                .matrix
                .get(py as usize)
                .and_then(|row| row.get(px as usize))
                .copied()
                .unwrap_or(false);
            if hit {
                return Some(piece.color);
            }
        }
    }
    match snapshot.cells.get(y).and_then(|row| row.get(x)) {
        Some(Cell::Filled(color)) => Some(*color),
        _ => None,
    }
}

/// Render the game board. Piece cells above row 0 are not drawn.
fn render_board(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = snapshot
        .cells
        .iter()
        .enumerate()
        .map(|(y, row)| {
            let spans: Vec<Span> = (0..row.len())
                .map(|x| match cell_color(snapshot, x, y) {
                    Some(color) => Span::styled(BLOCK, Style::default().fg(color)),
                    None => Span::styled(EMPTY, Style::default().bg(EMPTY_BG)),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the next piece preview
fn render_next(frame: &mut Frame, area: Rect, next: Option<&PieceView>) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(piece) = next else {
        return;
    };

    let lines: Vec<Line> = piece
        .matrix
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|&filled| {
                    if filled {
                        Span::styled(BLOCK, Style::default().fg(piece.color))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

/// Render stats panel
fn render_stats<L: LeaderboardStore>(frame: &mut Frame, area: Rect, game: &Game<L>, settings: &Settings) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let gray = Style::default().fg(Color::Gray);
    let sound = if settings.audio.sound_on { "ON" } else { "OFF" };
    let last_clear = match game.last_clear() {
        Some((rows, points)) => format!("+{} ({} {})", points, rows, if rows == 1 { "line" } else { "lines" }),
        None => String::new(),
    };
    let lines = vec![
        Line::styled("SCORE", gray),
        Line::styled(
            game.score().to_string(),
            Style::default().fg(Color::Yellow).bold(),
        ),
        Line::styled(last_clear, Style::default().fg(Color::Magenta)),
        Line::styled("LINES", gray),
        Line::styled(game.lines().to_string(), Style::default().fg(Color::Green)),
        Line::styled(
            format!("Speed {}ms", game.tick_interval().as_millis()),
            Style::default().fg(Color::DarkGray),
        ),
        Line::styled(format!("Sound {} (m)", sound), Style::default().fg(Color::DarkGray)),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the leaderboard panel
fn render_top_scores(frame: &mut Frame, area: Rect, scores: &[u64]) {
    let block = Block::default()
        .title(" TOP ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = if scores.is_empty() {
        vec![Line::styled("—", Style::default().fg(Color::DarkGray))]
    } else {
        scores
            .iter()
            .enumerate()
            .map(|(i, score)| Line::styled(format!("#{}: {}", i + 1, score), Style::default().fg(Color::Cyan)))
            .collect()
    };

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, details: &[String]) {
    let popup_width = 26u16;
    let popup_height = 4 + details.len() as u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut text = vec![
        Line::styled(title.to_string(), Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
    ];
    text.extend(
        details
            .iter()
            .map(|line| Line::styled(line.clone(), Style::default().fg(Color::Gray))),
    );

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn snapshot_with_piece() -> Snapshot {
        let mut board = Board::new(4, 4);
        board.lock(&[(0, 3, Color::Red)]);
        Snapshot {
            cells: board.cells(),
            piece: Some(PieceView {
                matrix: vec![vec![true, true], vec![true, false]],
                color: Color::Blue,
                x: 1,
                y: -1,
            }),
        }
    }

    #[test]
    fn test_cell_color_overlays_piece() {
        let snapshot = snapshot_with_piece();
        assert_eq!(cell_color(&snapshot, 0, 3), Some(Color::Red));
        // Matrix row 1 lands on board row 0
        assert_eq!(cell_color(&snapshot, 1, 0), Some(Color::Blue));
        assert_eq!(cell_color(&snapshot, 2, 0), None);
        assert_eq!(cell_color(&snapshot, 3, 3), None);
    }

    #[test]
    fn test_big_title_spells_the_name() {
        let title = big_title();
        assert!(title.len() < 5);
        let text: Vec<String> = title.iter().map(|line| line.to_string()).collect();
        assert!(text.iter().any(|line| line == "S T A C K F A L L"));
        // Everything else is blank or a plain rule
        assert!(text
            .iter()
            .filter(|line| !line.contains('S'))
            .all(|line| line.chars().all(|c| c == '━')));
    }

    #[test]
    fn test_control_click_maps_to_action() {
        let layout = game_layout(Rect::new(0, 0, 80, 30), 10, 20);
        let buttons = control_buttons(layout.controls);
        assert_eq!(buttons.len(), MOVE_BUTTONS.len() + COMMAND_BUTTONS.len());

        for button in &buttons {
            let (x, y) = (button.rect.x + button.rect.width / 2, button.rect.y);
            assert_eq!(control_at(layout.controls, x, y), Some(button.action));
        }

        let drop = buttons.iter().find(|b| b.label == "⤓").expect("drop button");
        assert_eq!(control_at(layout.controls, drop.rect.x, drop.rect.y), Some(Action::HardDrop));
        // The gap after a button and the blank middle row hit nothing
        assert_eq!(control_at(layout.controls, buttons[0].rect.right(), buttons[0].rect.y), None);
        assert_eq!(control_at(layout.controls, buttons[0].rect.x, buttons[0].rect.y + 1), None);
    }

    #[test]
    fn test_controls_sit_below_the_board() {
        let layout = game_layout(Rect::new(0, 0, 80, 30), 10, 20);
        assert_eq!(layout.board, Rect::new(20, 2, 22, 22));
        assert_eq!(layout.side, Rect::new(42, 2, 18, 22));
        assert_eq!(layout.controls, Rect::new(20, 24, 40, 3));
        for button in control_buttons(layout.controls) {
            assert!(button.rect.x >= layout.controls.x);
            assert!(button.rect.right() <= layout.controls.right());
        }
    }

    #[test]
    fn test_narrow_strip_drops_buttons_that_dont_fit() {
        let buttons = control_buttons(Rect::new(0, 0, 12, 3));
        assert!(buttons.iter().all(|b| b.rect.right() <= 12));
        assert_eq!(control_at(Rect::new(0, 0, 12, 3), 2, 0), Some(Action::MoveLeft));
    }

    #[test]
    fn test_center_rect_clamps() {
        let area = Rect::new(0, 0, 10, 10);
        assert_eq!(center_rect(area, 4, 2), Rect::new(3, 4, 4, 2));
        assert_eq!(center_rect(area, 40, 20), Rect::new(0, 0, 10, 10));
    }
}
