use std::collections::HashMap;

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap};
use tracing::trace;

use crate::editor::{EditorEvent, Keymap};
use crate::tree::{NodeId, NodeTree};

const DEPTH_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
    Color::LightRed,
];

/// One projected line of the node-link outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    pub id: NodeId,
    pub depth: usize,
    /// Link glyphs drawn before the node (`├─ `, `│  `, ...).
    pub connector: String,
    pub value: String,
    /// Digit that reaches this node from the focused one.
    pub hotkey: Option<u8>,
}

/// Which screen row currently shows each node.
///
/// Owned by the renderer; the tree never sees it.
#[derive(Debug, Default, Clone)]
pub struct Bindings {
    rows: HashMap<NodeId, usize>,
}

impl Bindings {
    pub fn row_for(&self, id: NodeId) -> Option<usize> {
        self.rows.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn rebind(&mut self, rows: &[OutlineRow]) {
        self.rows.clear();
        self.rows
            .extend(rows.iter().enumerate().map(|(idx, row)| (row.id, idx)));
    }
}

/// Renderer state: the latest projection, its bindings and the scroll offset.
#[derive(Debug, Default)]
pub struct OutlineView {
    rows: Vec<OutlineRow>,
    bindings: Bindings,
    scroll: usize,
    focus_target: Option<NodeId>,
}

impl OutlineView {
    pub fn rows(&self) -> &[OutlineRow] {
        &self.rows
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn pending_focus(&self) -> Option<NodeId> {
        self.focus_target
    }

    pub fn handle_events(&mut self, events: &[EditorEvent]) {
        for event in events {
            match event {
                EditorEvent::FocusMoved(id) => self.focus_target = Some(*id),
                EditorEvent::StructureChanged { revision } => {
                    trace!(revision, "structure changed");
                }
                EditorEvent::ValueChanged(_) | EditorEvent::Loaded { .. } => {}
            }
        }
    }

    /// Rebuild every row from the current tree.
    pub fn project(&mut self, tree: &NodeTree, focused: NodeId, keymap: Keymap) {
        self.rows = build_rows(tree, focused, keymap);
        self.bindings.rebind(&self.rows);
        if self.focus_target.is_some_and(|id| !tree.contains(id)) {
            self.focus_target = None;
        }
        self.scroll = self.scroll.min(self.rows.len().saturating_sub(1));
    }

    /// Scroll a pending focus target into view.
    ///
    /// A node without a bound row (not projected yet) keeps its request for
    /// the next frame.
    pub fn follow_focus(&mut self, height: usize) {
        let Some(target) = self.focus_target else {
            return;
        };
        let Some(row) = self.bindings.row_for(target) else {
            return;
        };
        if height == 0 {
            return;
        }
        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + height {
            self.scroll = row + 1 - height;
        }
        self.focus_target = None;
    }
}

/// Everything besides the rows that the frame shows.
#[derive(Debug)]
pub struct StatusData<'a> {
    pub focused: NodeId,
    pub focused_value: &'a str,
    pub parent: Option<NodeId>,
    pub child_count: usize,
    pub depth: usize,
    pub node_count: usize,
    pub file_label: &'a str,
    pub dirty: bool,
    pub show_ids: bool,
    pub mode_label: &'a str,
    pub hints: &'a str,
    pub message: Option<&'a str>,
    pub register: &'a str,
    pub show_help: bool,
    pub keymap: Keymap,
}

pub fn draw(frame: &mut Frame, view: &mut OutlineView, status: &StatusData<'_>) {
    let area = frame.area().inner(Margin {
        horizontal: 2,
        vertical: 1,
    });

    let mut title_spans = vec![
        Span::styled("sprig view", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(status.file_label.to_string(), Style::default().fg(Color::Gray)),
        Span::raw("  "),
        Span::styled("[?] help", Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled("[q] quit", Style::default().fg(Color::DarkGray)),
    ];
    if status.dirty {
        title_spans.push(Span::raw("  "));
        title_spans.push(Span::styled(
            "[modified]",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }
    let canvas_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::DarkGray))
        .padding(Padding::new(2, 2, 1, 0))
        .title(Line::from(title_spans));
    let canvas_area = canvas_block.inner(area);
    frame.render_widget(canvas_block, area);

    let [outline_area, _gap, status_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(5),
    ])
    .areas(canvas_area);

    view.follow_focus(usize::from(outline_area.height));
    let lines = view
        .rows
        .iter()
        .skip(view.scroll)
        .take(usize::from(outline_area.height))
        .map(|row| outline_line(row, row.id == status.focused, status.show_ids))
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(lines), outline_area);

    frame.render_widget(
        Paragraph::new(status_lines(status))
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .wrap(Wrap { trim: true }),
        status_area,
    );

    if status.show_help {
        render_help_overlay(frame, status.keymap);
    }
}

fn build_rows(tree: &NodeTree, focused: NodeId, keymap: Keymap) -> Vec<OutlineRow> {
    let focused_children = tree.children(focused);
    let focused_parent = tree.parent(focused);

    let mut rows = Vec::with_capacity(tree.len());
    let mut stack = vec![(tree.root(), 0usize, String::new(), true)];
    while let Some((id, depth, prefix, last)) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        let (connector, child_prefix) = if depth == 0 {
            (String::new(), String::new())
        } else if last {
            (format!("{prefix}└─ "), format!("{prefix}   "))
        } else {
            (format!("{prefix}├─ "), format!("{prefix}│  "))
        };
        let hotkey = if Some(id) == focused_parent {
            Some(keymap.parent_digit)
        } else {
            focused_children
                .iter()
                .position(|c| *c == id)
                .and_then(|idx| keymap.digit_for_child(idx))
        };
        rows.push(OutlineRow {
            id,
            depth,
            connector,
            value: node.value().to_string(),
            hotkey,
        });

        let children = node.children();
        for (idx, child) in children.iter().enumerate().rev() {
            stack.push((*child, depth + 1, child_prefix.clone(), idx + 1 == children.len()));
        }
    }
    rows
}

fn outline_line(row: &OutlineRow, focused: bool, show_ids: bool) -> Line<'static> {
    let color = DEPTH_COLORS[row.depth % DEPTH_COLORS.len()];
    let mut spans = vec![Span::styled(
        row.connector.clone(),
        Style::default().fg(Color::DarkGray),
    )];
    if let Some(digit) = row.hotkey {
        spans.push(Span::styled(
            format!("[{digit}] "),
            Style::default().fg(Color::Yellow),
        ));
    }
    if show_ids {
        spans.push(Span::styled(
            format!("#{} ", row.id),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let mut value_style = Style::default().fg(color);
    if focused {
        value_style = value_style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
    }
    let first_line = row.value.lines().next().unwrap_or("");
    if first_line.is_empty() {
        spans.push(Span::styled(
            "(empty)",
            value_style.fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ));
    } else {
        spans.push(Span::styled(truncate_text(first_line, 80), value_style));
    }
    if focused {
        spans.push(Span::styled(" ◀", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

fn status_lines(status: &StatusData<'_>) -> Vec<Line<'static>> {
    let parent = status
        .parent
        .map(|p| format!("#{p}"))
        .unwrap_or_else(|| "none (root)".to_string());
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", status.mode_label),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!(
                    "node #{}  depth {}  parent {}  children {}  nodes {}",
                    status.focused, status.depth, parent, status.child_count, status.node_count
                ),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(Span::styled(
            truncate_text(status.focused_value, 120),
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(
            status.hints.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let mut last = Vec::new();
    if !status.register.is_empty() {
        last.push(Span::styled(
            format!("register: {}  ", truncate_text(status.register, 24)),
            Style::default().fg(Color::Magenta),
        ));
    }
    if let Some(message) = status.message {
        last.push(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Yellow),
        ));
    }
    lines.push(Line::from(last));
    lines
}

fn truncate_text(text: &str, max_width: usize) -> String {
    let count = text.chars().count();
    if count <= max_width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Child digits as shown to the user, e.g. `2..9`.
pub(crate) fn child_digits_label(keymap: Keymap) -> Option<String> {
    let first = keymap.child_digit_offset;
    match first {
        0..=8 => Some(format!("{first}..9")),
        9 => Some("9".to_string()),
        _ => None,
    }
}

fn help_rows(keymap: Keymap) -> Vec<(String, &'static str)> {
    let mut rows = vec![
        ("Ctrl+k / a".to_string(), "create child (uses register text)"),
        ("Ctrl+; / x".to_string(), "delete node, children move up"),
        (
            format!("Ctrl+{0} / {0} / h / ←", keymap.parent_digit),
            "go to parent",
        ),
    ];
    if let Some(digits) = child_digits_label(keymap) {
        rows.push((
            format!("Ctrl+{digits} / {digits}"),
            "go to child (see [n] badges)",
        ));
    }
    rows.extend([
        ("l / →".to_string(), "go to first child"),
        ("Enter / e".to_string(), "edit text"),
        ("y".to_string(), "copy text into register"),
        ("Ctrl+s / s".to_string(), "save"),
        ("Ctrl+o / o".to_string(), "reload from file"),
        ("c".to_string(), "settings"),
        ("q".to_string(), "quit"),
    ]);
    rows
}

fn render_help_overlay(frame: &mut Frame, keymap: Keymap) {
    let area = centered_rect(frame.area(), 60, 60);
    frame.render_widget(Clear, area);
    let rows = help_rows(keymap);
    let lines = rows
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(
                    format!("{keys:<22}"),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(what.to_string(), Style::default().fg(Color::Gray)),
            ])
        })
        .collect::<Vec<_>>();
    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(" keys ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .padding(Padding::new(1, 1, 1, 0)),
    );
    frame.render_widget(panel, area);
}

pub(crate) fn centered_rect(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - height_percent) / 2),
        Constraint::Percentage(height_percent),
        Constraint::Percentage((100 - height_percent) / 2),
    ])
    .flex(Flex::Center)
    .split(area);
    Layout::horizontal([
        Constraint::Percentage((100 - width_percent) / 2),
        Constraint::Percentage(width_percent),
        Constraint::Percentage((100 - width_percent) / 2),
    ])
    .flex(Flex::Center)
    .split(vertical[1])[1]
}
