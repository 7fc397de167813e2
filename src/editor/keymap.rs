use crate::editor::command::Command;

/// Digit navigation table.
///
/// Digit `parent_digit` goes to the parent; any other digit `d` goes to child
/// `d - child_digit_offset`. Digits below the offset do nothing. The defaults
/// (1 and 2) leave `0` unbound and map `2..=9` to the first eight children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keymap {
    pub parent_digit: u8,
    pub child_digit_offset: u8,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            parent_digit: 1,
            child_digit_offset: 2,
        }
    }
}

impl Keymap {
    pub fn command_for_digit(&self, digit: u8) -> Option<Command> {
        if digit > 9 {
            return None;
        }
        if digit == self.parent_digit {
            return Some(Command::GoToParent);
        }
        digit
            .checked_sub(self.child_digit_offset)
            .map(|index| Command::GoToChild(usize::from(index)))
    }

    /// The digit that reaches child `index`, if any.
    pub fn digit_for_child(&self, index: usize) -> Option<u8> {
        let digit = u8::try_from(index).ok()?.checked_add(self.child_digit_offset)?;
        (digit <= 9 && digit != self.parent_digit).then_some(digit)
    }
}
