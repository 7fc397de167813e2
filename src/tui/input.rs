use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateChild,
    DeleteFocused,
    GoToParent,
    FirstChild,
    /// Digit navigation, resolved through the session keymap.
    Digit(u8),
    EditValue,
    Yank,
    Save,
    Load,
    ToggleHelp,
    OpenSettings,
    Quit,
    Move(Direction),
    SubmitText,
    Cancel,
    Backspace,
    InputChar(char),
    Noop,
}

pub fn action_for_key(key: KeyEvent, text_mode: bool) -> Action {
    if text_mode {
        return match key.code {
            KeyCode::Enter => Action::SubmitText,
            KeyCode::Esc => Action::Cancel,
            KeyCode::Backspace => Action::Backspace,
            KeyCode::Left => Action::Move(Direction::Left),
            KeyCode::Right => Action::Move(Direction::Right),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                Action::InputChar(c)
            }
            _ => Action::Noop,
        };
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('k') => Action::CreateChild,
            KeyCode::Char(';') => Action::DeleteFocused,
            KeyCode::Char('s') => Action::Save,
            KeyCode::Char('o') => Action::Load,
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char(c) => digit(c).map(Action::Digit).unwrap_or(Action::Noop),
            _ => Action::Noop,
        };
    }

    match key.code {
        KeyCode::Left => Action::GoToParent,
        KeyCode::Right => Action::FirstChild,
        KeyCode::Enter => Action::EditValue,
        KeyCode::Esc | KeyCode::Backspace => Action::Cancel,
        KeyCode::Char('a') => Action::CreateChild,
        KeyCode::Char('x') => Action::DeleteFocused,
        KeyCode::Char('h') => Action::GoToParent,
        KeyCode::Char('l') => Action::FirstChild,
        KeyCode::Char('e') => Action::EditValue,
        KeyCode::Char('y') => Action::Yank,
        KeyCode::Char('s') => Action::Save,
        KeyCode::Char('o') => Action::Load,
        KeyCode::Char('c') => Action::OpenSettings,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char(c) => digit(c).map(Action::Digit).unwrap_or(Action::Noop),
        _ => Action::Noop,
    }
}

fn digit(c: char) -> Option<u8> {
    c.to_digit(10).and_then(|d| u8::try_from(d).ok())
}
