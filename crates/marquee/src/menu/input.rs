use super::action::ActionKind;
use super::item::{ItemId, ItemKind, SettingValue};
use super::stack::{Ascend, Descend, LevelStyle, Navigator};
use romkit::systems::SystemId;
use std::path::PathBuf;

/// The whole input vocabulary: four directions, confirm and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Back,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ignored,
    Moved,
    Entered,
    Returned,
    /// Back was pressed on the root level.
    Exit,
    Launch { system: SystemId, rom: PathBuf },
    /// A setting changed in place and should be persisted.
    Changed { id: ItemId, value: SettingValue },
    Action(ActionKind),
    /// An input setting was confirmed and wants the text editor.
    EditText { id: ItemId, label: String, value: String },
    Notice(String),
}

/// Applies one key press to the navigator. Up/Down move with wraparound,
/// Confirm activates the selected item, Back leaves the level. Left/Right
/// only adjust values, and only on list-style levels.
pub fn route(nav: &mut Navigator, key: Key) -> Outcome {
    match key {
        Key::Up => moved(nav.move_by(-1)),
        Key::Down => moved(nav.move_by(1)),
        Key::Back => match nav.ascend() {
            Ascend::Popped => Outcome::Returned,
            Ascend::Exit => Outcome::Exit,
        },
        Key::Confirm => confirm(nav),
        Key::Left | Key::Right if nav.style() == LevelStyle::List => {
            adjust(nav, if key == Key::Right { 1 } else { -1 })
        }
        Key::Left | Key::Right => Outcome::Ignored,
    }
}

fn moved(changed: bool) -> Outcome {
    if changed { Outcome::Moved } else { Outcome::Ignored }
}

fn confirm(nav: &mut Navigator) -> Outcome {
    let Some(item) = nav.selected_item() else {
        return Outcome::Ignored;
    };

    let change = match &item.kind {
        ItemKind::Submenu(_) => {
            return match nav.descend() {
                Descend::Entered => Outcome::Entered,
                Descend::Empty(label) => Outcome::Notice(format!("No games found for {label}")),
                Descend::NotSubmenu => Outcome::Ignored,
            };
        }
        ItemKind::Game { system, rom } => {
            return Outcome::Launch {
                system: system.clone(),
                rom: rom.clone(),
            };
        }
        ItemKind::Action(action) => return Outcome::Action(*action),
        ItemKind::Input(text) => {
            return Outcome::EditText {
                id: item.id.clone(),
                label: item.label.clone(),
                value: text.clone(),
            };
        }
        ItemKind::Toggle(on) => SettingValue::Bool(!on),
        ItemKind::List { .. } => match item.cycled(1) {
            Some(value) => value,
            None => return Outcome::Ignored,
        },
    };

    let id = item.id.clone();
    apply(nav, id, change)
}

fn adjust(nav: &mut Navigator, step: isize) -> Outcome {
    let Some(item) = nav.selected_item() else {
        return Outcome::Ignored;
    };
    let value = match &item.kind {
        ItemKind::Toggle(_) => SettingValue::Bool(step > 0),
        ItemKind::List { .. } => match item.cycled(step) {
            Some(value) => value,
            None => return Outcome::Ignored,
        },
        _ => return Outcome::Ignored,
    };
    if item.value().as_ref() == Some(&value) {
        return Outcome::Ignored;
    }
    let id = item.id.clone();
    apply(nav, id, value)
}

fn apply(nav: &mut Navigator, id: ItemId, value: SettingValue) -> Outcome {
    if nav.update_at(&id, &value) {
        Outcome::Changed { id, value }
    } else {
        Outcome::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::catalog;
    use crate::menu::item::MenuItem;
    use crate::menu::settings;
    use romkit::scraper::GameDatabase;
    use std::path::Path;

    fn settings_nav() -> Navigator {
        Navigator::new(settings::default_tree(), "Settings")
    }

    /// Presses `key` until `pred` holds, at most `limit` times.
    fn press_until(nav: &mut Navigator, key: Key, limit: usize, pred: impl Fn(&Navigator) -> bool) {
        for _ in 0..limit {
            if pred(nav) {
                return;
            }
            route(nav, key);
        }
        assert!(pred(nav), "condition not reached");
    }

    #[test]
    fn test_root_wheel_wraps_after_last_item() {
        let root = catalog::build(&[], &GameDatabase::in_memory(), Path::new("/nonexistent"), settings::default_tree());
        let mut nav = Navigator::new(root, "Systems");
        assert_eq!(nav.items().len(), 17);

        for _ in 0..16 {
            assert_eq!(route(&mut nav, Key::Down), Outcome::Moved);
        }
        assert_eq!(nav.selected(), 16);
        route(&mut nav, Key::Down);
        assert_eq!(nav.selected(), 0);
        route(&mut nav, Key::Up);
        assert_eq!(nav.selected(), 16);
    }

    #[test]
    fn test_settings_category_remembers_index() {
        let mut nav = settings_nav();
        assert_eq!(nav.items().len(), 9);
        assert_eq!(nav.selected_item().unwrap().label, "Game Settings");

        assert_eq!(route(&mut nav, Key::Confirm), Outcome::Entered);
        assert_eq!(nav.level().title, "Game Settings");
        assert_eq!(nav.items()[0].id.as_str(), "games.ratio");
        assert_eq!(nav.style(), LevelStyle::List);

        route(&mut nav, Key::Down);
        assert_eq!(route(&mut nav, Key::Back), Outcome::Returned);
        assert_eq!(nav.selected(), 0);
        assert!(nav.is_root());
        assert_eq!(route(&mut nav, Key::Back), Outcome::Exit);
    }

    #[test]
    fn test_right_sets_toggle_once() {
        let mut nav = settings_nav();
        route(&mut nav, Key::Confirm);
        press_until(&mut nav, Key::Down, 20, |n| {
            n.selected_item().is_some_and(|i| i.id.as_str() == "games.rewind")
        });
        let selected = nav.selected();

        let mut persisted = 0;
        for _ in 0..3 {
            if let Outcome::Changed { id, value } = route(&mut nav, Key::Right) {
                assert_eq!(id.as_str(), "games.rewind");
                assert_eq!(value, SettingValue::Bool(true));
                persisted += 1;
            }
        }
        assert_eq!(persisted, 1);
        assert_eq!(nav.selected(), selected);
        assert_eq!(
            nav.find("games.rewind").and_then(MenuItem::value),
            Some(SettingValue::Bool(true))
        );

        assert!(matches!(route(&mut nav, Key::Left), Outcome::Changed { .. }));
        assert_eq!(route(&mut nav, Key::Left), Outcome::Ignored);
    }

    #[test]
    fn test_confirm_on_setting_leaves() {
        let mut nav = settings_nav();
        route(&mut nav, Key::Confirm);

        // list: Enter cycles forward, Left/Right step both ways
        assert_eq!(
            route(&mut nav, Key::Confirm),
            Outcome::Changed {
                id: "games.ratio".into(),
                value: SettingValue::Text("4:3".into())
            }
        );
        assert!(matches!(
            route(&mut nav, Key::Left),
            Outcome::Changed { value: SettingValue::Text(v), .. } if v == "Auto"
        ));

        // toggle: Enter flips
        route(&mut nav, Key::Down);
        assert_eq!(
            route(&mut nav, Key::Confirm),
            Outcome::Changed {
                id: "games.smooth".into(),
                value: SettingValue::Bool(false)
            }
        );
    }

    #[test]
    fn test_confirm_input_and_action() {
        let mut nav = settings_nav();
        press_until(&mut nav, Key::Down, 10, |n| n.selected_item().is_some_and(|i| i.id.as_str() == "network"));
        route(&mut nav, Key::Confirm);
        press_until(&mut nav, Key::Down, 10, |n| {
            n.selected_item().is_some_and(|i| i.id.as_str() == "network.hostname")
        });
        assert_eq!(
            route(&mut nav, Key::Confirm),
            Outcome::EditText {
                id: "network.hostname".into(),
                label: "Hostname".into(),
                value: "marquee".into()
            }
        );

        route(&mut nav, Key::Up);
        route(&mut nav, Key::Up);
        assert_eq!(
            route(&mut nav, Key::Confirm),
            Outcome::Action(ActionKind::ShowNetworkStatus)
        );
    }

    #[test]
    fn test_left_right_ignored_on_wheel_levels() {
        let mut nav = settings_nav();
        assert_eq!(route(&mut nav, Key::Right), Outcome::Ignored);
        assert_eq!(route(&mut nav, Key::Left), Outcome::Ignored);
        assert_eq!(nav.selected(), 0);
        assert!(nav.is_root());
    }

    #[test]
    fn test_empty_system_reports_notice() {
        let root = catalog::build(&[], &GameDatabase::in_memory(), Path::new("/nonexistent"), Vec::new());
        let mut nav = Navigator::new(root, "Systems");
        assert_eq!(
            route(&mut nav, Key::Confirm),
            Outcome::Notice("No games found for Nintendo Entertainment System".into())
        );
        assert!(nav.is_root());
    }
}
