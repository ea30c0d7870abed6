use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

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
pub struct SystemId(String);

crate::impl_string_newtype!(SystemId);

/// Platform identifiers used by the remote metadata databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformIds {
    pub screenscraper: u32,
    pub thegamesdb: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemDef {
    pub id: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    /// Lowercase, without the leading dot.
    pub extensions: &'static [&'static str],
    /// libretro core name, without the `_libretro` suffix.
    pub core: &'static str,
    pub platform: PlatformIds,
}

impl SystemDef {
    pub fn system_id(&self) -> SystemId {
        SystemId::new(self.id)
    }

    pub fn accepts_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.');
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

const fn ids(screenscraper: u32, thegamesdb: u32) -> PlatformIds {
    PlatformIds {
        screenscraper,
        thegamesdb,
    }
}

pub const SYSTEMS: &[SystemDef] = &[
    SystemDef {
        id: "nes",
        label: "Nintendo Entertainment System",
        color: "#E60012",
        extensions: &["nes", "zip", "7z"],
        core: "nestopia",
        platform: ids(3, 7),
    },
    SystemDef {
        id: "snes",
        label: "Super Nintendo",
        color: "#524FA1",
        extensions: &["smc", "sfc", "zip", "7z"],
        core: "snes9x",
        platform: ids(4, 6),
    },
    SystemDef {
        id: "n64",
        label: "Nintendo 64",
        color: "#0000FF",
        extensions: &["n64", "z64", "v64", "zip", "7z"],
        core: "mupen64plus_next",
        platform: ids(14, 3),
    },
    SystemDef {
        id: "gba",
        label: "Game Boy Advance",
        color: "#8C52FF",
        extensions: &["gba", "zip", "7z"],
        core: "mgba",
        platform: ids(12, 4),
    },
    SystemDef {
        id: "gbc",
        label: "Game Boy Color",
        color: "#FFB900",
        extensions: &["gbc", "zip", "7z"],
        core: "gambatte",
        platform: ids(10, 41),
    },
    SystemDef {
        id: "gb",
        label: "Game Boy",
        color: "#8BC53F",
        extensions: &["gb", "zip", "7z"],
        core: "gambatte",
        platform: ids(9, 4),
    },
    SystemDef {
        id: "genesis",
        label: "Sega Genesis",
        color: "#0089CF",
        extensions: &["gen", "md", "bin", "zip", "7z"],
        core: "genesis_plus_gx",
        platform: ids(1, 18),
    },
    SystemDef {
        id: "megadrive",
        label: "Sega Mega Drive",
        color: "#0089CF",
        extensions: &["gen", "md", "bin", "zip", "7z"],
        core: "genesis_plus_gx",
        platform: ids(1, 18),
    },
    SystemDef {
        id: "psx",
        label: "PlayStation",
        color: "#003791",
        extensions: &["cue", "bin", "iso", "img", "chd", "pbp", "zip", "7z"],
        core: "swanstation",
        platform: ids(57, 10),
    },
    SystemDef {
        id: "nds",
        label: "Nintendo DS",
        color: "#D12228",
        extensions: &["nds", "zip", "7z"],
        core: "melonds",
        platform: ids(15, 8),
    },
    SystemDef {
        id: "3ds",
        label: "Nintendo 3DS",
        color: "#D12228",
        extensions: &["3ds", "cia", "zip", "7z"],
        core: "citra",
        platform: ids(17, 4912),
    },
    SystemDef {
        id: "psp",
        label: "PlayStation Portable",
        color: "#003791",
        extensions: &["iso", "cso", "pbp", "zip", "7z"],
        core: "ppsspp",
        platform: ids(61, 13),
    },
    SystemDef {
        id: "dreamcast",
        label: "Sega Dreamcast",
        color: "#FF6600",
        extensions: &["cdi", "gdi", "chd", "zip", "7z"],
        core: "flycast",
        platform: ids(23, 16),
    },
    SystemDef {
        id: "arcade",
        label: "Arcade",
        color: "#FFD700",
        extensions: &["zip", "7z"],
        core: "mame",
        platform: ids(75, 23),
    },
    SystemDef {
        id: "mame",
        label: "MAME",
        color: "#FFD700",
        extensions: &["zip", "7z"],
        core: "mame",
        platform: ids(75, 23),
    },
    SystemDef {
        id: "pc",
        label: "PC Games",
        color: "#00AA00",
        extensions: &["exe", "bat", "com", "dosz"],
        core: "dosbox_pure",
        platform: ids(135, 1),
    },
];

pub fn all() -> &'static [SystemDef] {
    SYSTEMS
}

pub fn find(id: &str) -> Option<&'static SystemDef> {
    SYSTEMS.iter().find(|s| s.id.eq_ignore_ascii_case(id))
}

/// First system (in table order) that claims the extension. Archive formats
/// are shared by many systems, so this is only a best guess for loose files.
pub fn find_by_extension(ext: &str) -> Option<&'static SystemDef> {
    SYSTEMS.iter().find(|s| s.accepts_extension(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_has_sixteen_unique_systems() {
        assert_eq!(all().len(), 16);
        let ids: HashSet<_> = all().iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), 16);
    }

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find("SNES").map(|s| s.core), Some("snes9x"));
        assert_eq!(find("3ds").map(|s| s.platform.thegamesdb), Some(4912));
        assert!(find("atari2600").is_none());
    }

    #[test]
    fn test_find_by_extension() {
        assert_eq!(find_by_extension(".GBA").map(|s| s.id), Some("gba"));
        assert_eq!(find_by_extension("cso").map(|s| s.id), Some("psp"));
        // shared archive extension resolves to the first system in the table
        assert_eq!(find_by_extension("zip").map(|s| s.id), Some("nes"));
        assert!(find_by_extension("txt").is_none());
    }

    #[test]
    fn test_system_id_serializes_transparently() {
        let id = find("n64").map(SystemDef::system_id);
        assert_eq!(
            serde_json::to_string(&id).ok().as_deref(),
            Some("\"n64\"")
        );
    }
}
