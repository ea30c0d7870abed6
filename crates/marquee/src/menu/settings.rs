use super::action::{ActionKind, DownloadKind};
use super::item::{ItemKind, MenuItem, SettingValue};
use romkit::scraper::{ImageSource, ScraperOptions, ScraperSource};
use std::collections::BTreeMap;
use std::str::FromStr;

pub const VISIBLE_ITEMS_ID: &str = "frontend.visible_items";
pub const FULLSCREEN_ID: &str = "frontend.fullscreen";
/// "Wheel Items" choice that defers to `[wheel] visible_items`.
pub const WHEEL_ITEMS_AUTO: &str = "Auto";

/// Snapshot of every setting value, keyed by item id. This is the persisted blob.
pub type SettingValues = BTreeMap<String, SettingValue>;

fn game_settings() -> MenuItem {
    MenuItem::submenu(
        "games",
        "Game Settings",
        vec![
            MenuItem::list(
                "games.ratio",
                "Game Aspect Ratio",
                &["Auto", "4:3", "16:9", "16:10", "19:9", "21:9", "Core Provided", "Custom"],
                "Auto",
            ),
            MenuItem::toggle("games.smooth", "Smooth Games", true)
                .with_description("Enable bilinear filtering"),
            MenuItem::toggle("games.rewind", "Rewind", false)
                .with_description("Enable rewind feature"),
            MenuItem::toggle("games.autosave", "Auto Save/Load", true)
                .with_description("Automatically save and load save states"),
            MenuItem::list(
                "games.shaders",
                "Shaders",
                &["None", "Retro", "Scanlines", "CRT", "LCD", "Enhanced"],
                "None",
            ),
            MenuItem::toggle("games.integer_scale", "Integer Scale", false)
                .with_description("Use integer scaling"),
            MenuItem::list(
                "games.decorations",
                "Decorations",
                &["None", "Default Bezel", "Thebezelproject"],
                "None",
            ),
            MenuItem::toggle("games.latency", "Latency Reduction", false)
                .with_description("Run-ahead to reduce input lag"),
            MenuItem::toggle("games.ai_service", "AI Game Translation", false),
            MenuItem::submenu(
                "games.netplay",
                "Netplay",
                vec![
                    MenuItem::toggle("games.netplay.enable", "Enable Netplay", false),
                    MenuItem::input("games.netplay.username", "Nickname", "Player"),
                    MenuItem::input("games.netplay.port", "Port", "55435"),
                ],
            ),
        ],
    )
}

fn system_settings() -> MenuItem {
    MenuItem::submenu(
        "system",
        "System Settings",
        vec![
            MenuItem::action("system.information", "Information", ActionKind::ShowSystemInfo)
                .with_description("View system information"),
            MenuItem::list(
                "system.language",
                "Language",
                &["English", "Français", "Deutsch", "Español", "Italiano", "Português", "日本語", "中文"],
                "English",
            ),
            MenuItem::list(
                "system.keyboard",
                "Keyboard Layout",
                &["US", "UK", "FR", "DE", "ES", "IT", "PT", "JP"],
                "US",
            ),
            MenuItem::list(
                "system.timezone",
                "Timezone",
                &[
                    "America/New_York",
                    "America/Los_Angeles",
                    "Europe/London",
                    "Europe/Paris",
                    "Asia/Tokyo",
                ],
                "America/New_York",
            ),
            MenuItem::submenu(
                "system.storage",
                "Storage",
                vec![
                    MenuItem::action(
                        "system.storage.info",
                        "Storage Information",
                        ActionKind::ShowStorageInfo,
                    ),
                    MenuItem::list(
                        "system.storage.device",
                        "Storage Device",
                        &["Internal", "USB Drive 1", "Network Share"],
                        "Internal",
                    ),
                ],
            ),
            MenuItem::submenu(
                "system.advanced",
                "Advanced",
                vec![
                    MenuItem::list(
                        "system.advanced.overclock",
                        "Overclock",
                        &["None", "Moderate", "High", "Turbo"],
                        "None",
                    ),
                    MenuItem::submenu(
                        "system.advanced.boot",
                        "Boot Options",
                        vec![
                            MenuItem::toggle("system.advanced.boot.splash", "Boot Splash", true),
                            MenuItem::toggle("system.advanced.boot.quiet", "Quiet Boot", false),
                        ],
                    ),
                ],
            ),
            MenuItem::action("system.shutdown", "Shutdown", ActionKind::Shutdown),
            MenuItem::action("system.restart", "Restart", ActionKind::Restart),
        ],
    )
}

fn controllers() -> MenuItem {
    let mut children: Vec<MenuItem> = (1..=4u8)
        .map(|n| {
            MenuItem::action(
                &format!("controllers.p{n}"),
                &format!("Player {n}"),
                ActionKind::ConfigureController(n),
            )
        })
        .collect();
    children.push(MenuItem::submenu(
        "controllers.bluetooth",
        "Bluetooth",
        vec![
            MenuItem::toggle("controllers.bluetooth.enable", "Enable Bluetooth", true),
            MenuItem::action("controllers.bluetooth.scan", "Start Scanning", ActionKind::BluetoothScan),
            MenuItem::action(
                "controllers.bluetooth.forget",
                "Forget All Controllers",
                ActionKind::BluetoothForget,
            ),
        ],
    ));
    MenuItem::submenu("controllers", "Controllers", children)
}

fn ui_settings() -> MenuItem {
    MenuItem::submenu(
        "ui",
        "UI Settings",
        vec![
            MenuItem::list(
                "ui.theme",
                "Theme",
                &["Default", "Dark", "Light", "Retro", "Carbon", "ES-Theme"],
                "Default",
            ),
            MenuItem::list(
                "ui.iconset",
                "Iconset",
                &["Automatic", "Monochrome", "Colored", "Flat", "Pixel"],
                "Automatic",
            ),
            MenuItem::submenu(
                "ui.screensaver",
                "Screensaver",
                vec![
                    MenuItem::toggle("ui.screensaver.enable", "Enable Screensaver", true),
                    MenuItem::list(
                        "ui.screensaver.type",
                        "Screensaver Type",
                        &["Slideshow", "Video", "Dim", "Black"],
                        "Slideshow",
                    ),
                    MenuItem::list(
                        "ui.screensaver.delay",
                        "Start Delay",
                        &["1 minute", "3 minutes", "5 minutes", "10 minutes", "30 minutes", "Never"],
                        "5 minutes",
                    ),
                ],
            ),
            MenuItem::toggle("ui.clock", "Show Clock", true),
            MenuItem::toggle("ui.help", "On-Screen Help", true),
            MenuItem::toggle("ui.quickaccess", "Quick Access Menu", true),
            MenuItem::list(
                "ui.transitions",
                "Transition Style",
                &["None", "Fade", "Slide", "Instant"],
                "Slide",
            ),
            MenuItem::list(
                "ui.gamelist",
                "Game List View",
                &["Automatic", "Basic", "Detailed", "Video", "Grid"],
                "Detailed",
            ),
        ],
    )
}

fn sound_settings() -> MenuItem {
    let volumes: Vec<String> = (0..=10).map(|v| format!("{}%", v * 10)).collect();
    let volumes: Vec<&str> = volumes.iter().map(String::as_str).collect();
    MenuItem::submenu(
        "sound",
        "Sound Settings",
        vec![
            MenuItem::list("sound.volume", "System Volume", &volumes, "90%"),
            MenuItem::list(
                "sound.device",
                "Output Device",
                &["Auto", "HDMI", "Headphones", "USB Audio"],
                "Auto",
            ),
            MenuItem::toggle("sound.music", "Frontend Music", true),
            MenuItem::toggle("sound.navigation", "Navigation Sounds", true),
            MenuItem::toggle("sound.video_audio", "Video Audio", true)
                .with_description("Play audio from video previews"),
        ],
    )
}

fn network_settings() -> MenuItem {
    MenuItem::submenu(
        "network",
        "Network Settings",
        vec![
            MenuItem::action("network.status", "Network Status", ActionKind::ShowNetworkStatus),
            MenuItem::submenu(
                "network.wifi",
                "WiFi",
                vec![
                    MenuItem::toggle("network.wifi.enable", "Enable WiFi", true),
                    MenuItem::input("network.wifi.ssid", "WiFi SSID", ""),
                    MenuItem::input("network.wifi.password", "WiFi Password", ""),
                ],
            ),
            MenuItem::input("network.hostname", "Hostname", "marquee"),
        ],
    )
}

fn scraper_settings() -> MenuItem {
    MenuItem::submenu(
        "scraper",
        "Scraper",
        vec![
            MenuItem::list(
                "scraper.source",
                "Scraper Source",
                &["ScreenScraper", "TheGamesDB", "ArcadeDB"],
                "ScreenScraper",
            ),
            MenuItem::list(
                "scraper.image_source",
                "Image Source",
                &["Screenshot", "Title Screenshot", "Box 2D", "Box 3D", "Mix"],
                "Screenshot",
            ),
            MenuItem::toggle("scraper.logo", "Get Logo", true),
            MenuItem::toggle("scraper.video", "Get Video", true),
            MenuItem::toggle("scraper.fanart", "Get Fanart", false),
            MenuItem::action("scraper.run", "Scrape Now", ActionKind::StartScraper)
                .with_description("Fetch metadata and artwork for every game"),
        ],
    )
}

fn updates() -> MenuItem {
    MenuItem::submenu(
        "updates",
        "Updates & Downloads",
        vec![
            MenuItem::action("updates.check", "Check for Updates", ActionKind::CheckUpdates),
            MenuItem::toggle("updates.auto", "Auto Update", false),
            MenuItem::submenu(
                "updates.content",
                "Content Downloader",
                vec![
                    MenuItem::action(
                        "updates.content.cores",
                        "Download Cores",
                        ActionKind::Download(DownloadKind::Cores),
                    ),
                    MenuItem::action(
                        "updates.content.themes",
                        "Download Themes",
                        ActionKind::Download(DownloadKind::Themes),
                    ),
                    MenuItem::action(
                        "updates.content.bezels",
                        "Download Bezels",
                        ActionKind::Download(DownloadKind::Bezels),
                    ),
                ],
            ),
            MenuItem::action("updates.version", "Version Information", ActionKind::ShowVersion),
        ],
    )
}

fn frontend() -> MenuItem {
    MenuItem::submenu(
        "frontend",
        "Frontend",
        vec![
            MenuItem::toggle(FULLSCREEN_ID, "Fullscreen", true),
            MenuItem::list(
                VISIBLE_ITEMS_ID,
                "Wheel Items",
                &[WHEEL_ITEMS_AUTO, "5", "7", "9", "11"],
                WHEEL_ITEMS_AUTO,
            )
            .with_description("How many items the wheel shows at once. Auto follows the config file"),
            MenuItem::action("frontend.rescan", "Rescan Library", ActionKind::RescanLibrary),
            MenuItem::action("frontend.quit", "Quit", ActionKind::Quit),
        ],
    )
}

/// The settings categories, in menu order.
pub fn default_tree() -> Vec<MenuItem> {
    vec![
        game_settings(),
        system_settings(),
        controllers(),
        ui_settings(),
        sound_settings(),
        network_settings(),
        scraper_settings(),
        updates(),
        frontend(),
    ]
}

pub fn find<'a>(items: &'a [MenuItem], id: &str) -> Option<&'a MenuItem> {
    items.iter().find_map(|item| {
        if item.id.as_str() == id {
            Some(item)
        } else {
            item.children().and_then(|children| find(children, id))
        }
    })
}

pub fn find_mut<'a>(items: &'a mut [MenuItem], id: &str) -> Option<&'a mut MenuItem> {
    for item in items.iter_mut() {
        if item.id.as_str() == id {
            return Some(item);
        }
        if let Some(found) = item.children_mut().and_then(|c| find_mut(c, id)) {
            return Some(found);
        }
    }
    None
}

/// Sets the value of the item `id` in place. False when the id is unknown or
/// the value does not fit the item.
pub fn update_at(items: &mut [MenuItem], id: &str, value: &SettingValue) -> bool {
    find_mut(items, id).is_some_and(|item| item.set_value(value))
}

/// Labels from the top level down to the item `id`.
pub fn breadcrumb(items: &[MenuItem], id: &str) -> Option<Vec<String>> {
    items.iter().find_map(|item| {
        if item.id.as_str() == id {
            return Some(vec![item.label.clone()]);
        }
        let mut trail = breadcrumb(item.children()?, id)?;
        trail.insert(0, item.label.clone());
        Some(trail)
    })
}

pub fn values(items: &[MenuItem]) -> SettingValues {
    fn collect(items: &[MenuItem], out: &mut SettingValues) {
        for item in items {
            if let Some(value) = item.value() {
                out.insert(item.id.to_string(), value);
            }
            if let Some(children) = item.children() {
                collect(children, out);
            }
        }
    }

    let mut out = SettingValues::new();
    collect(items, &mut out);
    out
}

/// Restores a snapshot. Entries that are unknown or no longer fit their item
/// are skipped; the count of applied entries is returned.
pub fn apply_values(items: &mut [MenuItem], snapshot: &SettingValues) -> usize {
    snapshot
        .iter()
        .filter(|(id, value)| {
            let applied = update_at(items, id, value);
            if !applied {
                log::debug!("Ignoring stored setting {}", id);
            }
            applied
        })
        .count()
}

fn text_value<'a>(items: &'a [MenuItem], id: &str) -> Option<&'a str> {
    match &find(items, id)?.kind {
        ItemKind::List { options, selected } => options.get(*selected).map(String::as_str),
        ItemKind::Input(text) => Some(text),
        _ => None,
    }
}

fn bool_value(items: &[MenuItem], id: &str) -> Option<bool> {
    find(items, id)?.value()?.as_bool()
}

/// Scraper options as chosen in the Scraper category, on top of `base`.
pub fn scraper_options(items: &[MenuItem], base: ScraperOptions) -> ScraperOptions {
    ScraperOptions {
        source: text_value(items, "scraper.source")
            .and_then(|s| ScraperSource::from_str(s).ok())
            .unwrap_or(base.source),
        image_source: text_value(items, "scraper.image_source")
            .and_then(|s| ImageSource::from_str(s).ok())
            .unwrap_or(base.image_source),
        download_logo: bool_value(items, "scraper.logo").unwrap_or(base.download_logo),
        download_video: bool_value(items, "scraper.video").unwrap_or(base.download_video),
        download_fanart: bool_value(items, "scraper.fanart").unwrap_or(base.download_fanart),
        ..base
    }
}

/// The in-app window size, or `None` while "Wheel Items" is on Auto.
pub fn visible_items(items: &[MenuItem]) -> Option<usize> {
    text_value(items, VISIBLE_ITEMS_ID)?.parse().ok()
}

pub fn fullscreen(items: &[MenuItem]) -> Option<bool> {
    bool_value(items, FULLSCREEN_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_root_categories() {
        let tree = default_tree();
        let labels: Vec<&str> = tree.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "Game Settings",
                "System Settings",
                "Controllers",
                "UI Settings",
                "Sound Settings",
                "Network Settings",
                "Scraper",
                "Updates & Downloads",
                "Frontend",
            ]
        );
        assert!(tree.iter().all(|c| matches!(c.kind, ItemKind::Submenu(_))));
    }

    #[test]
    fn test_ids_are_unique() {
        fn walk<'a>(items: &'a [MenuItem], seen: &mut HashSet<&'a str>) {
            for item in items {
                assert!(seen.insert(item.id.as_str()), "duplicate id {}", item.id);
                if let Some(children) = item.children() {
                    walk(children, seen);
                }
            }
        }
        let tree = default_tree();
        let mut seen = HashSet::new();
        walk(&tree, &mut seen);
        assert!(seen.contains("games.netplay.port"));
    }

    #[test]
    fn test_find_update_and_breadcrumb() {
        let mut tree = default_tree();
        assert_eq!(
            find(&tree, "system.advanced.boot.quiet").map(|i| i.label.as_str()),
            Some("Quiet Boot")
        );
        assert!(find(&tree, "nope").is_none());

        assert!(update_at(&mut tree, "games.rewind", &SettingValue::Bool(true)));
        assert!(!update_at(&mut tree, "games.rewind", &SettingValue::Text("yes".into())));
        assert!(!update_at(&mut tree, "missing", &SettingValue::Bool(true)));
        assert_eq!(bool_value(&tree, "games.rewind"), Some(true));

        assert_eq!(
            breadcrumb(&tree, "system.advanced.boot.splash").unwrap(),
            ["System Settings", "Advanced", "Boot Options", "Boot Splash"]
        );
        assert!(breadcrumb(&tree, "missing").is_none());
    }

    #[test]
    fn test_values_round_trip_through_apply() {
        let mut edited = default_tree();
        update_at(&mut edited, "ui.theme", &SettingValue::Text("Dark".into()));
        update_at(&mut edited, "network.hostname", &SettingValue::Text("arcade".into()));
        let snapshot = values(&edited);
        assert_eq!(snapshot.get("ui.theme"), Some(&SettingValue::Text("Dark".into())));
        assert!(!snapshot.contains_key("scraper.run"));
        assert!(!snapshot.contains_key("ui"));

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored_snapshot: SettingValues = serde_json::from_str(&json).unwrap();
        let mut fresh = default_tree();
        assert_eq!(apply_values(&mut fresh, &restored_snapshot), snapshot.len());
        assert_eq!(values(&fresh), snapshot);
    }

    #[test]
    fn test_apply_skips_stale_entries() {
        let mut tree = default_tree();
        let mut snapshot = SettingValues::new();
        snapshot.insert("ui.theme".into(), SettingValue::Text("Neon".into()));
        snapshot.insert("ui.clock".into(), SettingValue::Text("on".into()));
        snapshot.insert("removed.option".into(), SettingValue::Bool(true));
        snapshot.insert("ui.help".into(), SettingValue::Bool(false));

        assert_eq!(apply_values(&mut tree, &snapshot), 1);
        assert_eq!(text_value(&tree, "ui.theme"), Some("Default"));
        assert_eq!(bool_value(&tree, "ui.help"), Some(false));
    }

    #[test]
    fn test_scraper_options_from_tree() {
        let mut tree = default_tree();
        update_at(&mut tree, "scraper.source", &SettingValue::Text("TheGamesDB".into()));
        update_at(&mut tree, "scraper.image_source", &SettingValue::Text("Box 3D".into()));
        update_at(&mut tree, "scraper.video", &SettingValue::Bool(false));

        let options = scraper_options(&tree, ScraperOptions::default());
        assert_eq!(options.source, ScraperSource::TheGamesDb);
        assert_eq!(options.image_source, ImageSource::Box3d);
        assert!(options.download_logo);
        assert!(!options.download_video);
        assert_eq!(options.delay, ScraperOptions::default().delay);

        assert_eq!(visible_items(&tree), None);
        assert!(update_at(&mut tree, VISIBLE_ITEMS_ID, &SettingValue::Text("7".into())));
        assert_eq!(visible_items(&tree), Some(7));
        assert_eq!(fullscreen(&tree), Some(true));
    }
}
