use super::{AssetKind, GameMetadata, ScrapeError};
use crate::library::RomFile;
use crate::systems::SystemId;
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalAssets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fanart: Option<PathBuf>,
}

impl LocalAssets {
    pub fn set(&mut self, kind: AssetKind, path: PathBuf) {
        let slot = match kind {
            AssetKind::Image => &mut self.image,
            AssetKind::Logo => &mut self.logo,
            AssetKind::Video => &mut self.video,
            AssetKind::Fanart => &mut self.fanart,
        };
        *slot = Some(path);
    }

    /// The picture a menu card should show: the logo, else the main image.
    pub fn card_image(&self) -> Option<&Path> {
        self.logo.as_deref().or(self.image.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedGame {
    pub system: SystemId,
    pub rom_path: PathBuf,
    pub name: String,
    pub metadata: GameMetadata,
    #[serde(default)]
    pub assets: LocalAssets,
    /// Seconds since the Unix epoch.
    #[serde(default)]
    pub last_scraped: u64,
}

impl ScrapedGame {
    pub fn new(rom: &RomFile, metadata: GameMetadata, assets: LocalAssets) -> Self {
        let last_scraped = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            system: rom.system.clone(),
            rom_path: rom.path.clone(),
            name: rom.display_name(),
            metadata,
            assets,
            last_scraped,
        }
    }

    pub fn title(&self) -> &str {
        if self.metadata.title.is_empty() {
            &self.name
        } else {
            &self.metadata.title
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseStats {
    pub total: usize,
    pub with_image: usize,
    pub with_logo: usize,
    pub per_system: BTreeMap<String, usize>,
}

/// Local cache of scraped games, keyed by `<system>:<rom path>`.
#[derive(Debug, Clone, Default)]
pub struct GameDatabase {
    path: Option<PathBuf>,
    games: BTreeMap<String, ScrapedGame>,
}

impl GameDatabase {
    pub fn key(system: &str, rom: &Path) -> String {
        format!("{}:{}", system, rom.display())
    }

    /// Loads the database at `path`; a missing file is an empty database.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ScrapeError> {
        let path = path.into();
        let games = if path.is_file() {
            let data = fs::read_to_string(&path)?;
            let list: Vec<ScrapedGame> = serde_json::from_str(&data)?;
            list.into_iter()
                .map(|g| (Self::key(&g.system, &g.rom_path), g))
                .collect()
        } else {
            BTreeMap::new()
        };
        log::debug!("Loaded {} scraped games from {}", games.len(), path.display());
        Ok(Self {
            path: Some(path),
            games,
        })
    }

    /// A database that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn get(&self, system: &str, rom: &Path) -> Option<&ScrapedGame> {
        self.games.get(&Self::key(system, rom))
    }

    pub fn is_scraped(&self, system: &str, rom: &Path) -> bool {
        self.games.contains_key(&Self::key(system, rom))
    }

    pub fn upsert(&mut self, game: ScrapedGame) {
        self.games
            .insert(Self::key(&game.system, &game.rom_path), game);
    }

    pub fn remove(&mut self, system: &str, rom: &Path) -> Option<ScrapedGame> {
        self.games.remove(&Self::key(system, rom))
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScrapedGame> {
        self.games.values()
    }

    pub fn stats(&self) -> DatabaseStats {
        let mut stats = DatabaseStats {
            total: self.games.len(),
            ..DatabaseStats::default()
        };
        for game in self.games.values() {
            *stats.per_system.entry(game.system.to_string()).or_default() += 1;
            stats.with_image += usize::from(game.assets.image.is_some());
            stats.with_logo += usize::from(game.assets.logo.is_some());
        }
        stats
    }

    pub fn save(&self) -> Result<(), ScrapeError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let list: Vec<&ScrapedGame> = self.games.values().collect();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&list)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
