use super::action::ActionKind;
use derive_more::{AsRef, Deref, Display, From, Into};
use romkit::systems::SystemId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
    AsRef,
)]
#[serde(transparent)]
pub struct ItemId(String);

romkit::impl_string_newtype!(ItemId);

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The editable value of a setting leaf, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Text(String),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Bool(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Submenu(Vec<MenuItem>),
    Game { system: SystemId, rom: PathBuf },
    Toggle(bool),
    /// `selected` always indexes into `options`.
    List { options: Vec<String>, selected: usize },
    Input(String),
    Action(ActionKind),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub id: ItemId,
    pub label: String,
    pub color: Option<String>,
    pub icon: Option<PathBuf>,
    pub description: Option<String>,
    pub kind: ItemKind,
}

impl MenuItem {
    pub fn new(id: impl Into<ItemId>, label: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color: None,
            icon: None,
            description: None,
            kind,
        }
    }

    pub fn submenu(id: &str, label: &str, children: Vec<MenuItem>) -> Self {
        Self::new(id, label, ItemKind::Submenu(children))
    }

    pub fn toggle(id: &str, label: &str, value: bool) -> Self {
        Self::new(id, label, ItemKind::Toggle(value))
    }

    /// A list whose value is `value`, or the first option if `value` is not one.
    pub fn list(id: &str, label: &str, options: &[&str], value: &str) -> Self {
        let selected = options.iter().position(|o| *o == value).unwrap_or(0);
        Self::new(
            id,
            label,
            ItemKind::List {
                options: options.iter().map(|o| o.to_string()).collect(),
                selected,
            },
        )
    }

    pub fn input(id: &str, label: &str, value: &str) -> Self {
        Self::new(id, label, ItemKind::Input(value.to_string()))
    }

    pub fn action(id: &str, label: &str, action: ActionKind) -> Self {
        Self::new(id, label, ItemKind::Action(action))
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_icon(mut self, icon: Option<PathBuf>) -> Self {
        self.icon = icon;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn children(&self) -> Option<&[MenuItem]> {
        match &self.kind {
            ItemKind::Submenu(children) => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<MenuItem>> {
        match &mut self.kind {
            ItemKind::Submenu(children) => Some(children),
            _ => None,
        }
    }

    /// Leaves that belong to a settings page rather than a wheel.
    pub fn is_setting(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::Toggle(_) | ItemKind::List { .. } | ItemKind::Input(_) | ItemKind::Action(_)
        )
    }

    pub fn value(&self) -> Option<SettingValue> {
        match &self.kind {
            ItemKind::Toggle(on) => Some(SettingValue::Bool(*on)),
            ItemKind::List { options, selected } => {
                options.get(*selected).cloned().map(SettingValue::Text)
            }
            ItemKind::Input(text) => Some(SettingValue::Text(text.clone())),
            _ => None,
        }
    }

    /// Stores `value` if it fits this item's kind. Returns whether it was
    /// accepted; list values must be one of the options.
    pub fn set_value(&mut self, value: &SettingValue) -> bool {
        match (&mut self.kind, value) {
            (ItemKind::Toggle(on), SettingValue::Bool(b)) => {
                *on = *b;
                true
            }
            (ItemKind::List { options, selected }, SettingValue::Text(text)) => {
                match options.iter().position(|o| o == text) {
                    Some(i) => {
                        *selected = i;
                        true
                    }
                    None => false,
                }
            }
            (ItemKind::Input(current), SettingValue::Text(text)) => {
                current.clone_from(text);
                true
            }
            _ => false,
        }
    }

    /// The list option `step` places away from the current one, wrapping.
    pub fn cycled(&self, step: isize) -> Option<SettingValue> {
        match &self.kind {
            ItemKind::List { options, selected } if !options.is_empty() => {
                let n = options.len() as isize;
                let next = (*selected as isize + step).rem_euclid(n) as usize;
                Some(SettingValue::Text(options[next].clone()))
            }
            _ => None,
        }
    }
}
