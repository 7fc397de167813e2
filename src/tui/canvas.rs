use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};
use tracing::{info, warn};

use crate::config::{self, Config};
use crate::editor::{Command, Outcome, Session};
use crate::tree::NodeTree;
use crate::tui::input::{self, Action, Direction};
use crate::tui::render::{self, OutlineView, StatusData, centered_rect};
use crate::tui::settings::{self, SettingsEvent, SettingsPanelState};
use crate::workspace::Target;

#[derive(Debug, Clone)]
struct PendingText {
    title: String,
    buffer: String,
    cursor: usize,
}

#[derive(Debug)]
struct AppState {
    outline_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    session: Session,
    view: OutlineView,
    config: Config,
    /// Text handed to the next created child.
    register: String,
    dirty: bool,
    show_help: bool,
    show_settings: bool,
    settings_state: SettingsPanelState,
    status_message: Option<String>,
    pending_text: Option<PendingText>,
}

impl AppState {
    fn load(target: Option<&Target>, demo: bool) -> Result<Self> {
        if demo {
            let session = demo_session()?;
            let config = Config {
                autosave: false,
                ..Config::default()
            };
            return Ok(Self::with_session(
                session,
                config,
                None,
                None,
                Some("demo mode: changes are in-memory only".to_string()),
            ));
        }

        let Some(target) = target else {
            anyhow::bail!("no outline to open");
        };
        let config_path = target.config_path();
        let config = match &config_path {
            Some(path) => config::load(path)?,
            None => Config::default(),
        };

        let (tree, message) = if target.outline.exists() {
            let text = fs::read_to_string(&target.outline)
                .with_context(|| format!("failed to read {}", target.outline.display()))?;
            let tree = NodeTree::from_json(&text)
                .with_context(|| format!("failed to load {}", target.outline.display()))?;
            (tree, None)
        } else {
            (
                NodeTree::new(),
                Some("new outline: it will be created on save".to_string()),
            )
        };
        info!(
            path = %target.outline.display(),
            nodes = tree.len(),
            "outline opened"
        );

        let session = Session::from_tree(tree).with_keymap(config.keymap());
        Ok(Self::with_session(
            session,
            config,
            Some(target.outline.clone()),
            config_path,
            message,
        ))
    }

    fn with_session(
        session: Session,
        config: Config,
        outline_path: Option<PathBuf>,
        config_path: Option<PathBuf>,
        status_message: Option<String>,
    ) -> Self {
        let mut app = Self {
            outline_path,
            config_path,
            session,
            view: OutlineView::default(),
            config,
            register: String::new(),
            dirty: false,
            show_help: false,
            show_settings: false,
            settings_state: SettingsPanelState::default(),
            status_message,
            pending_text: None,
        };
        app.sync_view();
        app
    }

    fn draw(&mut self, frame: &mut Frame) {
        let tree = self.session.tree();
        let focused = self.session.focused();
        self.view.project(tree, focused, self.session.keymap());

        let file_label = self
            .outline_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(demo)".to_string());
        let hints = self.hints();
        let status = StatusData {
            focused,
            focused_value: self
                .session
                .focused_node()
                .map(|n| n.value())
                .unwrap_or(""),
            parent: tree.parent(focused),
            child_count: tree.children(focused).len(),
            depth: tree.depth(focused).unwrap_or(0),
            node_count: tree.len(),
            file_label: &file_label,
            dirty: self.dirty,
            show_ids: self.config.show_ids,
            mode_label: self.mode_label(),
            hints: &hints,
            message: self.status_message.as_deref(),
            register: &self.register,
            show_help: self.show_help,
            keymap: self.session.keymap(),
        };
        render::draw(frame, &mut self.view, &status);

        if self.show_settings {
            settings::draw(frame, &self.settings_state, &self.config);
        }
        if let Some(prompt) = &self.pending_text {
            draw_text_prompt(frame, prompt);
        }
    }

    fn mode_label(&self) -> &'static str {
        if self.show_settings {
            "SETTINGS"
        } else if self.pending_text.is_some() {
            "EDIT"
        } else {
            "OUTLINE"
        }
    }

    fn hints(&self) -> String {
        if self.show_settings {
            return "[j/k] select  [h/l or Enter] change  [Esc] close".to_string();
        }
        if self.pending_text.is_some() {
            return "type text, [Backspace] delete, [Enter] apply, [Esc] cancel".to_string();
        }
        let children = render::child_digits_label(self.session.keymap())
            .map(|digits| format!("[{digits}] child  "))
            .unwrap_or_default();
        format!(
            "[a] add child  [x] delete  [h] parent  {children}[e] edit  [y] yank  [s] save  [o] load  [c] settings"
        )
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        self.status_message = None;

        if self.show_settings {
            match settings::handle_key(key, &mut self.settings_state, &mut self.config) {
                SettingsEvent::Changed => self.persist_config(),
                SettingsEvent::Close => self.show_settings = false,
                SettingsEvent::None => {}
            }
            return Ok(false);
        }

        let in_text_mode = self.pending_text.is_some();
        let action = input::action_for_key(key, in_text_mode);
        if in_text_mode {
            self.handle_text_action(action);
            self.sync_view();
            return Ok(false);
        }

        match action {
            Action::Quit => return Ok(true),
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::OpenSettings => self.show_settings = true,
            Action::CreateChild => {
                let value = std::mem::take(&mut self.register);
                self.run(Command::create_child(value));
            }
            Action::DeleteFocused => {
                if self.run(Command::DeleteFocused) == Some(Outcome::Ignored) {
                    self.status_message = Some("the root node cannot be deleted".to_string());
                }
            }
            Action::GoToParent => {
                self.run(Command::GoToParent);
            }
            Action::FirstChild => {
                self.run(Command::GoToChild(0));
            }
            Action::Digit(digit) => {
                if let Err(err) = self.session.apply_digit(digit) {
                    self.status_message = Some(err.to_string());
                }
            }
            Action::EditValue => self.start_edit_prompt(),
            Action::Yank => {
                self.register = self
                    .session
                    .focused_node()
                    .map(|n| n.value().to_string())
                    .unwrap_or_default();
                self.status_message = Some("copied into register".to_string());
            }
            Action::Save => {
                if let Err(err) = self.save() {
                    let message = format!("save failed: {err:#}");
                    warn!("{message}");
                    self.status_message = Some(message);
                }
            }
            Action::Load => self.reload(),
            Action::Cancel => self.show_help = false,
            Action::Move(_)
            | Action::SubmitText
            | Action::Backspace
            | Action::InputChar(_)
            | Action::Noop => {}
        }
        self.sync_view();
        Ok(false)
    }

    fn handle_text_action(&mut self, action: Action) {
        match action {
            Action::SubmitText => {
                if let Some(prompt) = self.pending_text.take() {
                    self.run(Command::SetValue(prompt.buffer));
                }
            }
            Action::Cancel => self.pending_text = None,
            Action::Backspace => {
                if let Some(prompt) = &mut self.pending_text
                    && prompt.cursor > 0
                {
                    let from = byte_index_for_cursor(&prompt.buffer, prompt.cursor - 1);
                    let to = byte_index_for_cursor(&prompt.buffer, prompt.cursor);
                    prompt.buffer.replace_range(from..to, "");
                    prompt.cursor -= 1;
                }
            }
            Action::InputChar(c) => {
                if let Some(prompt) = &mut self.pending_text {
                    let at = byte_index_for_cursor(&prompt.buffer, prompt.cursor);
                    prompt.buffer.insert(at, c);
                    prompt.cursor += 1;
                }
            }
            Action::Move(Direction::Left) => {
                if let Some(prompt) = &mut self.pending_text {
                    prompt.cursor = prompt.cursor.saturating_sub(1);
                }
            }
            Action::Move(Direction::Right) => {
                if let Some(prompt) = &mut self.pending_text {
                    let max = prompt.buffer.chars().count();
                    prompt.cursor = (prompt.cursor + 1).min(max);
                }
            }
            _ => {}
        }
    }

    fn start_edit_prompt(&mut self) {
        let Some(node) = self.session.focused_node() else {
            return;
        };
        let buffer = node.value().to_string();
        self.pending_text = Some(PendingText {
            title: format!("Edit node #{}", node.id()),
            cursor: buffer.chars().count(),
            buffer,
        });
    }

    /// Apply a command, surfacing rejections in the status line.
    fn run(&mut self, command: Command) -> Option<Outcome> {
        let edits = command.modifies_tree();
        match self.session.apply(command) {
            Ok(outcome) => {
                if edits && outcome == Outcome::Applied {
                    self.dirty = true;
                }
                Some(outcome)
            }
            Err(err) => {
                warn!(error = %err, "command rejected");
                self.status_message = Some(err.to_string());
                None
            }
        }
    }

    fn sync_view(&mut self) {
        let events = self.session.drain_events();
        self.view.handle_events(&events);
    }

    fn save(&mut self) -> Result<()> {
        let Some(path) = &self.outline_path else {
            self.status_message = Some("demo mode: nothing saved".to_string());
            return Ok(());
        };
        let text = self.session.save(self.config.envelope)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
        self.dirty = false;
        self.status_message = Some(format!(
            "saved {} nodes to {}",
            self.session.tree().len(),
            path.display()
        ));
        Ok(())
    }

    fn reload(&mut self) {
        let Some(path) = self.outline_path.clone() else {
            self.status_message = Some("demo mode: nothing to load".to_string());
            return;
        };
        let ticket = match self.session.begin_load() {
            Ok(ticket) => ticket,
            Err(err) => {
                self.status_message = Some(err.to_string());
                return;
            }
        };
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                self.session.cancel_load(ticket);
                self.status_message = Some(format!("cannot read {}: {err}", path.display()));
                return;
            }
        };
        match self.session.complete_load(ticket, &text) {
            Ok(()) => {
                self.dirty = false;
                self.status_message =
                    Some(format!("loaded {} nodes", self.session.tree().len()));
            }
            Err(err) => {
                self.status_message = Some(format!("load failed, outline unchanged: {err}"));
            }
        }
    }

    fn persist_config(&mut self) {
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(err) = fs::write(path, config::serialize(&self.config)) {
            warn!(error = %err, "config not written");
            self.status_message = Some(format!("could not write config: {err}"));
        }
    }

    /// Save on exit when configured and something changed.
    fn finish(&mut self) -> Result<()> {
        if self.config.autosave && self.dirty && self.outline_path.is_some() {
            self.save()?;
        }
        Ok(())
    }
}

pub fn run(target: Option<&Target>, demo: bool) -> Result<()> {
    let mut app = AppState::load(target, demo)?;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| app.draw(f))?;
        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if matches!(key.kind, KeyEventKind::Release | KeyEventKind::Repeat) {
                continue;
            }
            if app.handle_key(key)? {
                break;
            }
        }
    }

    app.finish()
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn draw_text_prompt(frame: &mut Frame, prompt: &PendingText) {
    let area = centered_rect(frame.area(), 70, 28);
    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(
            prompt.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        line_with_cursor(
            &prompt.buffer,
            prompt.cursor,
            "write a short note...",
            Style::default().fg(Color::White),
            Style::default().fg(Color::DarkGray),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
        ),
        Line::from(""),
        Line::from(Span::styled(
            "Backspace deletes char. Enter applies, Esc cancels.",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(Block::default().title("Input").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn line_with_cursor(
    text: &str,
    cursor: usize,
    placeholder: &str,
    text_style: Style,
    placeholder_style: Style,
    caret_style: Style,
) -> Line<'static> {
    let mut spans = Vec::new();
    let char_len = text.chars().count();
    let clamped = cursor.min(char_len);

    if char_len == 0 {
        spans.push(Span::styled("▌", caret_style));
        if !placeholder.is_empty() {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(placeholder.to_string(), placeholder_style));
        }
        return Line::from(spans);
    }

    let split = byte_index_for_cursor(text, clamped);
    let (left, right) = text.split_at(split);
    if !left.is_empty() {
        spans.push(Span::styled(left.to_string(), text_style));
    }
    spans.push(Span::styled("▌", caret_style));
    if !right.is_empty() {
        spans.push(Span::styled(right.to_string(), text_style));
    }
    Line::from(spans)
}

fn byte_index_for_cursor(text: &str, cursor: usize) -> usize {
    text.char_indices()
        .nth(cursor)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

fn demo_session() -> Result<Session> {
    let mut session = Session::new();
    session.apply(Command::SetValue("sprig".to_string()))?;
    for (topic, notes) in [
        (
            "keys",
            &["Ctrl+k adds a child", "Ctrl+; splices a node out"][..],
        ),
        (
            "snapshots",
            &["wrapped {\"data\": [...]}", "bare arrays still load"][..],
        ),
        ("focus", &["digits jump to children"][..]),
    ] {
        session.apply(Command::create_child(topic))?;
        for note in notes {
            session.apply(Command::create_child(*note))?;
            session.apply(Command::GoToParent)?;
        }
        session.apply(Command::GoToParent)?;
    }
    Ok(session)
}
