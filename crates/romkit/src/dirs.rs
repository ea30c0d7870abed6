use directories::{ProjectDirs, UserDirs};
use std::path::PathBuf;

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "marquee", "marquee")
}

/// Where config blobs, the game database and scraped media live.
pub fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".marquee"))
}

pub fn default_media_dir() -> PathBuf {
    default_data_dir().join("media")
}

pub fn default_roms_dir() -> PathBuf {
    UserDirs::new()
        .map(|u| u.home_dir().join("ROMs"))
        .unwrap_or_else(|| PathBuf::from("ROMs"))
}

pub fn default_gamedb_path() -> PathBuf {
    default_data_dir().join("gamedb.json")
}
