use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph};

use crate::config::Config;
use crate::tree::Envelope;
use crate::tui::render::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEvent {
    None,
    Changed,
    Close,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsPanelState {
    pub selected_row: usize,
}

const SETTINGS_ROW_COUNT: usize = 3;

pub fn handle_key(
    key: KeyEvent,
    state: &mut SettingsPanelState,
    config: &mut Config,
) -> SettingsEvent {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => SettingsEvent::Close,
        KeyCode::Up | KeyCode::Char('k') => {
            state.selected_row = state.selected_row.saturating_sub(1);
            SettingsEvent::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.selected_row = (state.selected_row + 1).min(SETTINGS_ROW_COUNT - 1);
            SettingsEvent::None
        }
        KeyCode::Left
        | KeyCode::Char('h')
        | KeyCode::Right
        | KeyCode::Char('l')
        | KeyCode::Enter
        | KeyCode::Char(' ') => adjust(config, state.selected_row),
        _ => SettingsEvent::None,
    }
}

pub fn draw(frame: &mut Frame, state: &SettingsPanelState, config: &Config) {
    let area = centered_rect(frame.area(), 56, 40);
    frame.render_widget(Clear, area);

    let title = Line::from(vec![
        Span::styled(
            "Settings",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("[Esc] close", Style::default().fg(Color::Gray)),
    ]);

    let selected_row = state.selected_row.min(SETTINGS_ROW_COUNT - 1);
    let mut lines = vec![
        settings_row(
            selected_row == 0,
            "save on exit",
            if config.autosave { "[ON]" } else { "[OFF]" },
            config.autosave,
        ),
        settings_row(
            selected_row == 1,
            "show node ids",
            if config.show_ids { "[ON]" } else { "[OFF]" },
            config.show_ids,
        ),
        settings_row(
            selected_row == 2,
            "snapshot envelope",
            config.envelope.as_str(),
            config.envelope == Envelope::Wrapped,
        ),
        Line::from(""),
    ];
    for text in selected_row_description(selected_row) {
        lines.push(Line::from(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "Use arrows/hjkl or Enter/Space to toggle.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .padding(Padding::new(1, 1, 1, 0)),
    );
    frame.render_widget(panel, area);
}

fn settings_row(selected: bool, key: &str, value_text: &str, enabled: bool) -> Line<'static> {
    let indicator = if selected { ">" } else { " " };
    let base_style = if selected {
        Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut value_style = if enabled {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::LightRed)
    };
    value_style = value_style.add_modifier(Modifier::BOLD);
    if selected {
        value_style = value_style.bg(Color::DarkGray);
    }

    Line::from(vec![
        Span::styled(format!("{indicator} {key:<24}"), base_style),
        Span::styled(value_text.to_string(), value_style),
    ])
}

fn selected_row_description(selected_row: usize) -> [&'static str; 2] {
    match selected_row {
        0 => [
            "Write the outline back to its file when",
            "the viewer closes with unsaved changes.",
        ],
        1 => [
            "Prefix every node with its numeric id,",
            "as stored in the snapshot file.",
        ],
        2 => [
            "wrapped writes {\"data\": [...]}; bare writes",
            "a plain array for older readers.",
        ],
        _ => ["", ""],
    }
}

fn adjust(config: &mut Config, selected_row: usize) -> SettingsEvent {
    match selected_row {
        0 => {
            config.autosave = !config.autosave;
            SettingsEvent::Changed
        }
        1 => {
            config.show_ids = !config.show_ids;
            SettingsEvent::Changed
        }
        2 => {
            config.envelope = match config.envelope {
                Envelope::Wrapped => Envelope::Bare,
                Envelope::Bare => Envelope::Wrapped,
            };
            SettingsEvent::Changed
        }
        _ => SettingsEvent::None,
    }
}
