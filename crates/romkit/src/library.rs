use crate::fs::{self as rfs, FsError};
use crate::systems::{self, SystemDef, SystemId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomFile {
    pub system: SystemId,
    pub path: PathBuf,
    pub file_name: String,
    pub stem: String,
    pub extension: String,
    pub size: u64,
}

impl RomFile {
    pub fn from_path(system: &SystemDef, path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        let stem = path.file_stem()?.to_str()?.to_string();
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        if !system.accepts_extension(&extension) {
            return None;
        }
        let size = rfs::stat(path).map(|s| s.size).unwrap_or(0);

        Some(Self {
            system: system.system_id(),
            path: path.to_path_buf(),
            file_name,
            stem,
            extension,
            size,
        })
    }

    pub fn display_name(&self) -> String {
        clean_game_name(&self.stem)
    }
}

#[derive(Debug, Clone)]
pub struct SystemLibrary {
    pub system: &'static SystemDef,
    pub roms: Vec<RomFile>,
}

impl SystemLibrary {
    pub fn is_empty(&self) -> bool {
        self.roms.is_empty()
    }
}

pub fn system_dir(roms_root: &Path, system: &SystemDef) -> PathBuf {
    roms_root.join(system.id)
}

/// Scans `<roms_root>/<system id>` for files the system accepts. A missing
/// directory is not an error: the system simply has no games.
pub fn scan_system(system: &'static SystemDef, roms_root: &Path) -> SystemLibrary {
    let dir = system_dir(roms_root, system);
    let mut roms: Vec<RomFile> = match rfs::list_directory(&dir) {
        Ok(entries) => entries
            .into_iter()
            .filter(|e| e.is_file)
            .filter_map(|e| RomFile::from_path(system, &e.path))
            .collect(),
        Err(FsError::NotADirectory(_)) => {
            log::debug!("No ROM directory for {} at {}", system.id, dir.display());
            Vec::new()
        }
        Err(e) => {
            log::warn!("Failed to scan {}: {}", dir.display(), e);
            Vec::new()
        }
    };

    roms.sort_by_cached_key(|r| r.display_name().to_lowercase());
    SystemLibrary { system, roms }
}

pub fn scan_all(roms_root: &Path) -> Vec<SystemLibrary> {
    let libraries: Vec<_> = systems::all()
        .iter()
        .map(|s| scan_system(s, roms_root))
        .collect();
    log::info!(
        "Scanned {}: {} games across {} systems",
        roms_root.display(),
        libraries.iter().map(|l| l.roms.len()).sum::<usize>(),
        libraries.iter().filter(|l| !l.is_empty()).count()
    );
    libraries
}

const NOISE_WORDS: &[&str] = &[
    "rev", "beta", "alpha", "proto", "prototype", "demo", "disc", "disk", "cd", "dvd",
];

fn is_version_tag(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("rev")
        .or_else(|| lower.strip_prefix('v'))
        .unwrap_or("");
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn strip_groups(name: &str) -> String {
    let mut depth = 0usize;
    name.chars()
        .filter(|&c| match c {
            '(' | '[' => {
                depth += 1;
                false
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                false
            }
            _ => depth == 0,
        })
        .collect()
}

/// Turns a ROM file stem into a search/display name: drops `(...)`/`[...]`
/// tags, revision and disc markers, and normalizes separators and spacing.
pub fn clean_game_name(stem: &str) -> String {
    let stripped = strip_groups(stem).replace('_', " ");
    let words: Vec<&str> = stripped.split_whitespace().collect();

    let mut kept = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        let word = words[i].trim_matches('-');
        if NOISE_WORDS.contains(&word.to_ascii_lowercase().as_str()) {
            // also swallow a trailing number, e.g. "Disc 2"
            if words
                .get(i + 1)
                .is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()))
            {
                i += 1;
            }
        } else if !word.is_empty() && !is_version_tag(word) {
            kept.push(words[i]);
        }
        i += 1;
    }

    let cleaned = kept.join(" ");
    let cleaned = cleaned.trim_matches(|c: char| c == '-' || c.is_whitespace());
    if cleaned.is_empty() {
        stem.trim().to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fs_err as fs;

    #[test]
    fn test_clean_game_name() {
        let cases = [
            ("Super Mario Bros. (World)", "Super Mario Bros."),
            ("Legend_of_Zelda_[!]", "Legend of Zelda"),
            ("Final Fantasy VII (USA) (Disc 1)", "Final Fantasy VII"),
            ("Castlevania - Rev 1", "Castlevania"),
            ("Sonic the Hedgehog v1.1", "Sonic the Hedgehog"),
            ("Metal Gear Solid Disc 2", "Metal Gear Solid"),
            ("Vampire Savior", "Vampire Savior"),
            ("(Beta)", "(Beta)"),
        ];
        for (input, expected) in cases {
            assert_eq!(clean_game_name(input), expected, "input: {input}");
        }
    }

    #[test]
    fn test_scan_system_filters_and_sorts() {
        let root = tempfile::tempdir().unwrap();
        let gba = systems::find("gba").unwrap();
        let dir = system_dir(root.path(), gba);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("zelda.gba"), b"z").unwrap();
        fs::write(dir.join("Advance Wars (USA).GBA"), b"aw").unwrap();
        fs::write(dir.join("readme.txt"), b"nope").unwrap();
        fs::create_dir(dir.join("saves.gba")).unwrap();

        let library = scan_system(gba, root.path());
        let names: Vec<_> = library.roms.iter().map(|r| r.display_name()).collect();
        assert_eq!(names, ["Advance Wars", "zelda"]);
        assert_eq!(library.roms[0].extension, "gba");
        assert_eq!(library.roms[0].size, 2);
        assert_eq!(library.roms[0].system.as_str(), "gba");
    }

    #[test]
    fn test_missing_system_directory_is_empty() {
        let root = tempfile::tempdir().unwrap();
        let libraries = scan_all(root.path());
        assert_eq!(libraries.len(), systems::all().len());
        assert!(libraries.iter().all(SystemLibrary::is_empty));
    }
}
