use super::input::Key;
use super::item::ItemId;

/// Characters reachable with Up/Down, in cycling order.
const CHARSET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 .-_@";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Editing,
    Commit { id: ItemId, value: String },
    Cancel,
}

/// D-pad text editor for input settings. Only the last character is edited:
/// Up/Down cycle it through the charset, Right appends a new one, Left
/// deletes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    id: ItemId,
    label: String,
    text: Vec<char>,
}

impl TextEntry {
    pub fn new(id: ItemId, label: impl Into<String>, value: &str) -> Self {
        Self {
            id,
            label: label.into(),
            text: value.chars().collect(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn handle(&mut self, key: Key) -> EntryOutcome {
        match key {
            Key::Up => self.cycle_last(1),
            Key::Down => self.cycle_last(-1),
            Key::Right => self.text.push(first_char()),
            Key::Left => {
                self.text.pop();
            }
            Key::Confirm => {
                return EntryOutcome::Commit {
                    id: self.id.clone(),
                    value: self.text(),
                };
            }
            Key::Back => return EntryOutcome::Cancel,
        }
        EntryOutcome::Editing
    }

    fn cycle_last(&mut self, step: isize) {
        if self.text.is_empty() {
            self.text.push(first_char());
        }
        if let Some(last) = self.text.last_mut() {
            let chars: Vec<char> = CHARSET.chars().collect();
            // characters outside the charset restart the cycle
            let next = match chars.iter().position(|c| c == last) {
                Some(i) => (i as isize + step).rem_euclid(chars.len() as isize) as usize,
                None => 0,
            };
            *last = chars[next];
        }
    }
}

fn first_char() -> char {
    CHARSET.chars().next().unwrap_or('a')
}
