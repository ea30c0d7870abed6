pub mod action;
pub mod catalog;
pub mod input;
pub mod item;
pub mod settings;
pub mod stack;
pub mod text_entry;

pub use action::{ActionKind, DownloadKind};
pub use input::{Key, Outcome, route};
pub use item::{ItemId, ItemKind, MenuItem, SettingValue};
pub use stack::{LevelStyle, Navigator};
pub use text_entry::{EntryOutcome, TextEntry};
