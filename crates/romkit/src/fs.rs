use fs_err as fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("Directory does not exist: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub path: PathBuf,
    pub name: String,
    pub is_file: bool,
    pub is_dir: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub is_file: bool,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Lists a directory sorted by name. Entries that cannot be read or whose
/// names are not valid UTF-8 are skipped.
pub fn list_directory(path: &Path) -> Result<Vec<DirEntryInfo>, FsError> {
    if !path.is_dir() {
        return Err(FsError::NotADirectory(path.to_path_buf()));
    }

    let mut entries: Vec<_> = fs::read_dir(path)?
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            let name = entry.file_name().to_str()?.to_string();
            Some(DirEntryInfo {
                is_file: path.is_file(),
                is_dir: path.is_dir(),
                path,
                name,
            })
        })
        .collect();

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

pub fn path_exists(path: &Path) -> bool {
    path.exists()
}

pub fn stat(path: &Path) -> Result<FileStat, FsError> {
    let meta = fs::metadata(path)?;
    Ok(FileStat {
        is_file: meta.is_file(),
        is_dir: meta.is_dir(),
        size: meta.len(),
        modified: meta.modified().ok(),
    })
}
