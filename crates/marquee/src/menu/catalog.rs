use super::item::{ItemKind, MenuItem};
use romkit::library::{RomFile, SystemLibrary};
use romkit::scraper::GameDatabase;
use romkit::systems::{self, SystemDef};
use std::path::Path;

pub const SETTINGS_ID: &str = "settings";

fn system_icon(media_root: &Path, system: &SystemDef) -> Option<std::path::PathBuf> {
    let path = media_root.join("systems").join(format!("{}.png", system.id));
    path.is_file().then_some(path)
}

fn game_item(system: &SystemDef, rom: &RomFile, db: &GameDatabase) -> MenuItem {
    let scraped = db.get(system.id, &rom.path);
    let label = scraped
        .map(|g| g.title().to_string())
        .unwrap_or_else(|| rom.display_name());

    let item = MenuItem::new(
        format!("{}:{}", system.id, rom.file_name),
        label,
        ItemKind::Game {
            system: system.system_id(),
            rom: rom.path.clone(),
        },
    )
    .with_color(system.color)
    .with_icon(scraped.and_then(|g| g.assets.card_image()).map(Path::to_path_buf));

    match scraped.and_then(|g| g.metadata.description.as_deref()) {
        Some(description) => item.with_description(description),
        None => item,
    }
}

/// Builds the root wheel: one submenu per known system, in table order, each
/// holding that system's games, then the settings tree under "Settings".
/// Systems without a scanned library are listed with no games.
pub fn build(
    libraries: &[SystemLibrary],
    db: &GameDatabase,
    media_root: &Path,
    settings: Vec<MenuItem>,
) -> Vec<MenuItem> {
    let mut root: Vec<MenuItem> = systems::all()
        .iter()
        .map(|system| {
            let games = libraries
                .iter()
                .find(|lib| lib.system.id == system.id)
                .map(|lib| lib.roms.iter().map(|rom| game_item(system, rom, db)).collect())
                .unwrap_or_default();
            MenuItem::submenu(system.id, system.label, games)
                .with_color(system.color)
                .with_icon(system_icon(media_root, system))
        })
        .collect();

    root.push(MenuItem::submenu(SETTINGS_ID, "Settings", settings));
    root
}
