pub mod client;
pub mod database;
pub mod screenscraper;
pub mod thegamesdb;

pub use client::{MetadataClient, RateLimiter};
pub use database::{GameDatabase, LocalAssets, ScrapedGame};

use crate::library::RomFile;
use crate::systems;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum ScraperSource {
    #[default]
    #[strum(serialize = "ScreenScraper", serialize = "ss")]
    ScreenScraper,
    #[strum(serialize = "TheGamesDB", serialize = "tgdb")]
    TheGamesDb,
    #[strum(serialize = "ArcadeDB")]
    ArcadeDb,
}

/// Which picture becomes the game's main image.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum ImageSource {
    #[strum(serialize = "Screenshot")]
    Screenshot,
    #[strum(serialize = "Title Screenshot")]
    TitleScreenshot,
    #[default]
    #[strum(serialize = "Box 2D")]
    Box2d,
    #[strum(serialize = "Box 3D")]
    Box3d,
    #[strum(serialize = "Mix")]
    Mix,
}

impl ImageSource {
    pub fn prefers_box_art(&self) -> bool {
        matches!(self, Self::Box2d | Self::Box3d | Self::Mix)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub dev_id: Option<String>,
    pub dev_password: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScraperOptions {
    pub source: ScraperSource,
    pub image_source: ImageSource,
    pub download_logo: bool,
    pub download_video: bool,
    pub download_fanart: bool,
    pub credentials: Credentials,
    /// Pause between two remote requests.
    pub delay: Duration,
    pub timeout: Duration,
}

impl Default for ScraperOptions {
    fn default() -> Self {
        Self {
            source: ScraperSource::default(),
            image_source: ImageSource::default(),
            download_logo: true,
            download_video: true,
            download_fanart: false,
            credentials: Credentials::default(),
            delay: Duration::from_millis(1000),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Scraper source {0} is not supported")]
    UnsupportedSource(ScraperSource),
    #[error("{service} returned an error: {message}")]
    Api {
        service: ScraperSource,
        message: String,
    },
    #[error(transparent)]
    Http(#[from] ureq::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameMetadata {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum AssetKind {
    Image,
    Logo,
    Video,
    Fanart,
}

impl AssetKind {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Logo => "logos",
            Self::Video => "videos",
            Self::Fanart => "fanart",
        }
    }

    pub fn default_extension(&self) -> &'static str {
        match self {
            Self::Video => "mp4",
            _ => "png",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub url: String,
    pub format: Option<String>,
}

impl MediaRef {
    pub fn new(url: impl Into<String>, format: Option<String>) -> Self {
        Self {
            url: url.into(),
            format,
        }
    }

    /// File extension for the downloaded copy: the declared format, else the
    /// URL's own extension, else `fallback`.
    pub fn extension(&self, fallback: &str) -> String {
        let valid = |s: &str| !s.is_empty() && s.len() <= 5 && s.chars().all(|c| c.is_ascii_alphanumeric());

        if let Some(format) = self.format.as_deref().filter(|f| valid(f)) {
            return format.to_ascii_lowercase();
        }

        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        path.rsplit('/')
            .next()
            .and_then(|segment| segment.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| valid(ext))
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetUrls {
    pub image: Option<MediaRef>,
    pub logo: Option<MediaRef>,
    pub video: Option<MediaRef>,
    pub fanart: Option<MediaRef>,
}

impl AssetUrls {
    pub fn iter(&self) -> impl Iterator<Item = (AssetKind, &MediaRef)> {
        [
            (AssetKind::Image, &self.image),
            (AssetKind::Logo, &self.logo),
            (AssetKind::Video, &self.video),
            (AssetKind::Fanart, &self.fanart),
        ]
        .into_iter()
        .filter_map(|(kind, media)| media.as_ref().map(|m| (kind, m)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeResult {
    pub metadata: GameMetadata,
    pub assets: AssetUrls,
}

pub fn build_client(
    options: &ScraperOptions,
) -> Result<Box<dyn MetadataClient + Send>, ScrapeError> {
    match options.source {
        ScraperSource::ScreenScraper => {
            Ok(Box::new(screenscraper::ScreenScraperClient::new(options)))
        }
        ScraperSource::TheGamesDb => Ok(Box::new(thegamesdb::TheGamesDbClient::new(options))),
        source @ ScraperSource::ArcadeDb => Err(ScrapeError::UnsupportedSource(source)),
    }
}

impl<C: MetadataClient + ?Sized> MetadataClient for Box<C> {
    fn fetch_metadata(
        &self,
        rom: &RomFile,
        system: &systems::SystemDef,
    ) -> Result<Option<ScrapeResult>, ScrapeError> {
        (**self).fetch_metadata(rom, system)
    }

    fn download_asset(&self, url: &str, destination: &Path) -> bool {
        (**self).download_asset(url, destination)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, StrumDisplay)]
pub enum ScrapePhase {
    #[default]
    Idle,
    Scanning,
    Scraping,
    Downloading,
    Complete,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapeProgress {
    pub phase: ScrapePhase,
    pub current_system: Option<String>,
    pub current_game: Option<String>,
    /// 1-based position of the ROM being processed.
    pub current: usize,
    pub total: usize,
    pub scraped: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl ScrapeProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.current as f64 / self.total as f64).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, ScrapePhase::Complete | ScrapePhase::Error)
    }
}

pub fn asset_path(media_root: &Path, rom: &RomFile, kind: AssetKind, extension: &str) -> PathBuf {
    media_root
        .join(rom.system.as_str())
        .join(kind.dir_name())
        .join(format!("{}.{}", rom.stem, extension))
}

/// Sequential batch scraper. Every remote call goes through one rate limiter,
/// so at most one request is in flight. A failed ROM is recorded and skipped.
pub struct Scraper<C> {
    client: C,
    limiter: RateLimiter,
    media_root: PathBuf,
    force: bool,
}

impl<C: MetadataClient> Scraper<C> {
    pub fn new(client: C, delay: Duration, media_root: impl Into<PathBuf>) -> Self {
        Self {
            client,
            limiter: RateLimiter::new(delay),
            media_root: media_root.into(),
            force: false,
        }
    }

    /// Re-scrape ROMs that already have a database entry.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn run(
        &self,
        roms: &[RomFile],
        db: &mut GameDatabase,
        mut on_progress: impl FnMut(&ScrapeProgress),
    ) -> ScrapeProgress {
        let mut progress = ScrapeProgress {
            phase: ScrapePhase::Scraping,
            total: roms.len(),
            ..ScrapeProgress::default()
        };
        on_progress(&progress);

        for (i, rom) in roms.iter().enumerate() {
            progress.current = i + 1;
            progress.current_system = Some(rom.system.to_string());
            progress.current_game = Some(rom.display_name());

            if !self.force && db.is_scraped(&rom.system, &rom.path) {
                progress.skipped += 1;
                on_progress(&progress);
                continue;
            }

            match self.scrape_one(rom, &mut progress, &mut on_progress) {
                Ok(game) => {
                    db.upsert(game);
                    progress.scraped += 1;
                }
                Err(message) => {
                    log::warn!("Scrape failed: {}", message);
                    progress.failed += 1;
                    progress.errors.push(message);
                }
            }
            progress.phase = ScrapePhase::Scraping;
            on_progress(&progress);
        }

        progress.current_game = None;
        progress.phase = match db.save() {
            Ok(()) => ScrapePhase::Complete,
            Err(e) => {
                log::error!("Failed to save game database: {}", e);
                progress.errors.push(format!("Failed to save game database: {e}"));
                ScrapePhase::Error
            }
        };
        log::info!(
            "Scrape finished: {} scraped, {} failed, {} skipped",
            progress.scraped,
            progress.failed,
            progress.skipped
        );
        on_progress(&progress);
        progress
    }

    fn scrape_one(
        &self,
        rom: &RomFile,
        progress: &mut ScrapeProgress,
        on_progress: &mut impl FnMut(&ScrapeProgress),
    ) -> Result<ScrapedGame, String> {
        let system = systems::find(&rom.system)
            .ok_or_else(|| format!("{}: unknown system {}", rom.file_name, rom.system))?;

        let result = self
            .limiter
            .run(|| self.client.fetch_metadata(rom, system))
            .map_err(|e| format!("{}: {}", rom.file_name, e))?
            .ok_or_else(|| format!("{}: no results found", rom.file_name))?;

        progress.phase = ScrapePhase::Downloading;
        on_progress(&*progress);
        let assets = self.download_assets(rom, &result.assets);

        Ok(ScrapedGame::new(rom, result.metadata, assets))
    }

    fn download_assets(&self, rom: &RomFile, urls: &AssetUrls) -> LocalAssets {
        let mut local = LocalAssets::default();
        for (kind, media) in urls.iter() {
            let destination = asset_path(
                &self.media_root,
                rom,
                kind,
                &media.extension(kind.default_extension()),
            );
            if self
                .limiter
                .run(|| self.client.download_asset(&media.url, &destination))
            {
                local.set(kind, destination);
            } else {
                log::warn!("Failed to download {} for {}", kind, rom.file_name);
            }
        }
        local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fs_err as fs;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::str::FromStr;

    /// Answers from a fixed table keyed by cleaned name and records every call.
    struct FakeClient {
        answers: HashMap<String, Result<Option<ScrapeResult>, String>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeClient {
        fn new() -> Self {
            Self {
                answers: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn answer(mut self, name: &str, answer: Result<Option<ScrapeResult>, String>) -> Self {
            self.answers.insert(name.to_string(), answer);
            self
        }
    }

    impl MetadataClient for FakeClient {
        fn fetch_metadata(
            &self,
            rom: &RomFile,
            _system: &systems::SystemDef,
        ) -> Result<Option<ScrapeResult>, ScrapeError> {
            let name = rom.display_name();
            self.calls.lock().push(name.clone());
            match self.answers.get(&name) {
                Some(Ok(result)) => Ok(result.clone()),
                Some(Err(message)) => Err(ScrapeError::Api {
                    service: ScraperSource::ScreenScraper,
                    message: message.clone(),
                }),
                None => Ok(None),
            }
        }

        fn download_asset(&self, url: &str, destination: &Path) -> bool {
            self.calls.lock().push(format!("GET {url}"));
            if url.contains("broken") {
                return false;
            }
            fs::create_dir_all(destination.parent().unwrap()).unwrap();
            fs::write(destination, url).unwrap();
            true
        }
    }

    fn rom(dir: &Path, system: &str, file_name: &str) -> RomFile {
        let def = systems::find(system).unwrap();
        let path = dir.join(file_name);
        fs::write(&path, b"rom").unwrap();
        RomFile::from_path(def, &path).unwrap()
    }

    fn found(title: &str, image: &str) -> Result<Option<ScrapeResult>, String> {
        Ok(Some(ScrapeResult {
            metadata: GameMetadata {
                title: title.to_string(),
                ..GameMetadata::default()
            },
            assets: AssetUrls {
                image: Some(MediaRef::new(image, None)),
                ..AssetUrls::default()
            },
        }))
    }

    #[test]
    fn test_batch_continues_after_failures() {
        let dir = tempfile::tempdir().unwrap();
        let roms = vec![
            rom(dir.path(), "snes", "Chrono Trigger (USA).sfc"),
            rom(dir.path(), "snes", "Unknown Homebrew.sfc"),
            rom(dir.path(), "snes", "Earthbound.sfc"),
            rom(dir.path(), "snes", "F-Zero.sfc"),
        ];
        let client = FakeClient::new()
            .answer("Chrono Trigger", found("Chrono Trigger", "https://cdn/ct.png"))
            .answer("Earthbound", Err("server busy".to_string()))
            .answer("F-Zero", found("F-Zero", "https://cdn/broken.png"));

        let media = dir.path().join("media");
        let mut db = GameDatabase::open(dir.path().join("gamedb.json")).unwrap();
        let scraper = Scraper::new(client, Duration::ZERO, &media);

        let mut updates = 0;
        let progress = scraper.run(&roms, &mut db, |_| updates += 1);

        assert_eq!(progress.phase, ScrapePhase::Complete);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.scraped, 2);
        assert_eq!(progress.failed, 2);
        assert_eq!(progress.errors.len(), 2);
        assert!(updates >= 6);

        let ct = db.get("snes", &roms[0].path).unwrap();
        assert_eq!(ct.metadata.title, "Chrono Trigger");
        let image = ct.assets.image.as_ref().unwrap();
        assert_eq!(image, &media.join("snes/images/Chrono Trigger (USA).png"));
        assert!(image.is_file());

        // metadata kept even when the download failed
        let fzero = db.get("snes", &roms[3].path).unwrap();
        assert!(fzero.assets.image.is_none());

        assert!(dir.path().join("gamedb.json").is_file());
    }

    #[test]
    fn test_already_scraped_roms_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let roms = vec![rom(dir.path(), "gb", "Tetris.gb")];
        let mut db = GameDatabase::in_memory();

        let first = Scraper::new(
            FakeClient::new().answer("Tetris", found("Tetris", "https://cdn/t.png")),
            Duration::ZERO,
            dir.path(),
        );
        assert_eq!(first.run(&roms, &mut db, |_| {}).scraped, 1);

        let client = FakeClient::new();
        let second = Scraper::new(client, Duration::ZERO, dir.path());
        let progress = second.run(&roms, &mut db, |_| {});
        assert_eq!(progress.skipped, 1);
        assert!(second.client.calls.lock().is_empty());

        let forced = second.force(true);
        let progress = forced.run(&roms, &mut db, |_| {});
        assert_eq!(progress.failed, 1);
        assert_eq!(forced.client.calls.lock().as_slice(), ["Tetris"]);
    }

    #[test]
    fn test_source_names_round_trip() {
        assert_eq!(
            ScraperSource::from_str("TheGamesDB").unwrap(),
            ScraperSource::TheGamesDb
        );
        assert_eq!(ScraperSource::from_str("ss").unwrap(), ScraperSource::ScreenScraper);
        assert_eq!(ScraperSource::TheGamesDb.to_string(), "TheGamesDB");
        assert_eq!(ImageSource::from_str("box 3d").unwrap(), ImageSource::Box3d);
        assert_eq!(ImageSource::TitleScreenshot.to_string(), "Title Screenshot");

        let json: ScraperSource = serde_json::from_str("\"screenscraper\"").unwrap();
        assert_eq!(json, ScraperSource::ScreenScraper);
        assert!(matches!(
            build_client(&ScraperOptions {
                source: ScraperSource::ArcadeDb,
                ..ScraperOptions::default()
            }),
            Err(ScrapeError::UnsupportedSource(ScraperSource::ArcadeDb))
        ));
    }

    #[test]
    fn test_media_extension() {
        let declared = MediaRef::new("https://x/mediaJeu.php?media=ss", Some("jpg".into()));
        assert_eq!(declared.extension("png"), "jpg");
        let from_url = MediaRef::new("https://cdn.tgdb/boxart/front/12-1.JPG?x=1", None);
        assert_eq!(from_url.extension("png"), "jpg");
        let none = MediaRef::new("https://x/mediaJeu.php?media=video", None);
        assert_eq!(none.extension("mp4"), "mp4");
    }
}
