use crate::gui::wheel::WheelParams;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use romkit::dirs;
use romkit::launch::EmulatorConfig;
use romkit::scraper::{Credentials, ScraperOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    pub roms: PathBuf,
    pub media: PathBuf,
    /// Settings blobs and the game database.
    pub data: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            roms: dirs::default_roms_dir(),
            media: dirs::default_media_dir(),
            data: dirs::default_data_dir(),
        }
    }
}

impl PathsConfig {
    pub fn gamedb(&self) -> PathBuf {
        self.data.join("gamedb.json")
    }
}

/// Hex color strings, parsed when the theme is applied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub background: String,
    pub text: String,
    pub accent: String,
    pub card: String,
    pub selected: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background: "#0F121A".to_string(),
            text: "#FFFFFF".to_string(),
            accent: "#3399FF".to_string(),
            card: "#333D52".to_string(),
            selected: "#FFCC33".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub dev_id: Option<String>,
    pub dev_password: Option<String>,
    pub api_key: Option<String>,
    pub delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            dev_id: None,
            dev_password: None,
            api_key: None,
            delay_ms: 1000,
            timeout_secs: 15,
        }
    }
}

impl ScraperConfig {
    /// Credentials and pacing; source and media choices come from the
    /// settings tree on top of this.
    pub fn options(&self) -> ScraperOptions {
        ScraperOptions {
            credentials: Credentials {
                dev_id: self.dev_id.clone(),
                dev_password: self.dev_password.clone(),
                username: self.username.clone(),
                password: self.password.clone(),
                api_key: self.api_key.clone(),
            },
            delay: Duration::from_millis(self.delay_ms),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            ..ScraperOptions::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    pub fullscreen: bool,
    pub width: i32,
    pub height: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            fullscreen: true,
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub emulator: EmulatorConfig,
    pub wheel: WheelParams,
    pub theme: ThemeConfig,
    pub scraper: ScraperConfig,
    pub window: WindowConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "marquee", "marquee").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn builder() -> config::ConfigBuilder<config::builder::DefaultState> {
    config::Config::builder()
}

fn environment() -> config::Environment {
    // MARQUEE_WHEEL__VISIBLE_ITEMS=7
    config::Environment::with_prefix("MARQUEE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(environment())
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Loads the config, falling back to defaults when the file is missing or
/// broken. A broken file is logged, never fatal.
pub fn load_or_setup() -> Config {
    if let Ok(path) = get_config_path()
        && !path.exists()
    {
        match write_default_config() {
            Ok(written) => log::info!("Wrote default config to {}", written.display()),
            Err(e) => log::warn!("Could not write default config: {}", e),
        }
        return Config::default();
    }

    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config, using defaults: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", ConfigError::from(e));
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }
    log::debug!("Watching {}", config_dir.display());

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn parse(toml: &str) -> Config {
        builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse(
            r##"
            [wheel]
            visible_items = 7
            camera_fov = 60.0

            [theme]
            accent = "#ff0000"

            [emulator.commands]
            pc = "dosbox {rom}"
            "##,
        );
        assert_eq!(config.wheel.visible_items, 7);
        assert_eq!(config.wheel.camera_fov, 60.0);
        assert_eq!(config.wheel.arc_radius, 200.0);
        assert_eq!(config.theme.accent, "#ff0000");
        assert_eq!(config.theme.card, ThemeConfig::default().card);
        assert_eq!(config.emulator.commands["pc"].as_str(), "dosbox {rom}");
        assert!(config.window.fullscreen);
        assert_eq!(config.scraper.delay_ms, 1000);
    }

    #[test]
    fn test_default_config_file_parses() {
        let config = parse(DEFAULT_CONFIG);
        assert_eq!(config.wheel, WheelParams::default());
        assert_eq!(config.window, WindowConfig::default());
        assert_eq!(config.theme, ThemeConfig::default());
    }

    #[test]
    fn test_scraper_options_from_config() {
        let config: ScraperConfig = serde_json::from_str(
            r#"{ "username": "player", "api_key": "k", "delay_ms": 250, "timeout_secs": 0 }"#,
        )
        .unwrap();
        let options = config.options();
        assert_eq!(options.credentials.username.as_deref(), Some("player"));
        assert_eq!(options.credentials.api_key.as_deref(), Some("k"));
        assert_eq!(options.delay, Duration::from_millis(250));
        assert_eq!(options.timeout, Duration::from_secs(1));
        assert!(options.download_logo);
    }
}
