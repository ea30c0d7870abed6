use derive_more::Display;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum DownloadKind {
    Cores,
    Themes,
    Bezels,
}

/// What an action item does when confirmed. Parsed from the kebab-case tag
/// used in the settings tree (`start-scraper`, `configure-controller-2`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ActionKind {
    #[display("start-scraper")]
    StartScraper,
    #[display("rescan-library")]
    RescanLibrary,
    #[display("show-system-info")]
    ShowSystemInfo,
    #[display("show-storage-info")]
    ShowStorageInfo,
    #[display("show-network-status")]
    ShowNetworkStatus,
    #[display("show-version")]
    ShowVersion,
    #[display("check-updates")]
    CheckUpdates,
    #[display("quit")]
    Quit,
    #[display("shutdown")]
    Shutdown,
    #[display("restart")]
    Restart,
    #[display("configure-controller-{_0}")]
    ConfigureController(u8),
    #[display("bluetooth-scan")]
    BluetoothScan,
    #[display("bluetooth-forget-all")]
    BluetoothForget,
    #[display("download-{_0}")]
    Download(DownloadKind),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown action '{0}'")]
pub struct UnknownAction(pub String);

impl FromStr for ActionKind {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownAction(s.to_string());

        if let Some(player) = s.strip_prefix("configure-controller-") {
            return player
                .parse()
                .ok()
                .filter(|&n| n > 0)
                .map(Self::ConfigureController)
                .ok_or_else(unknown);
        }
        if let Some(kind) = s.strip_prefix("download-") {
            return kind.parse().map(Self::Download).map_err(|_| unknown());
        }

        Ok(match s {
            "start-scraper" => Self::StartScraper,
            "rescan-library" => Self::RescanLibrary,
            "show-system-info" => Self::ShowSystemInfo,
            "show-storage-info" => Self::ShowStorageInfo,
            "show-network-status" => Self::ShowNetworkStatus,
            "show-version" => Self::ShowVersion,
            "check-updates" => Self::CheckUpdates,
            "quit" => Self::Quit,
            "shutdown" => Self::Shutdown,
            "restart" => Self::Restart,
            "bluetooth-scan" => Self::BluetoothScan,
            "bluetooth-forget-all" => Self::BluetoothForget,
            _ => return Err(unknown()),
        })
    }
}

impl ActionKind {
    /// Message for actions this front-end has no backend for.
    pub fn unavailable_notice(&self) -> Option<String> {
        match self {
            Self::CheckUpdates => Some("Updates are managed by your distribution".to_string()),
            Self::ConfigureController(n) => {
                Some(format!("Configure Player {n}: controller mapping is not available yet"))
            }
            Self::BluetoothScan | Self::BluetoothForget => {
                Some("Bluetooth management is not available".to_string())
            }
            Self::Download(kind) => Some(format!("Downloading {kind} is not available")),
            Self::ShowNetworkStatus => Some("Network status is not available".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action_tags() {
        let cases = vec![
            ("start-scraper", ActionKind::StartScraper),
            ("show-version", ActionKind::ShowVersion),
            ("bluetooth-forget-all", ActionKind::BluetoothForget),
            ("configure-controller-3", ActionKind::ConfigureController(3)),
            ("download-bezels", ActionKind::Download(DownloadKind::Bezels)),
        ];

        for (tag, expected) in cases {
            let parsed: ActionKind = tag.parse().unwrap();
            assert_eq!(parsed, expected);
            assert_eq!(parsed.to_string(), tag);
        }
    }

    #[test]
    fn test_unknown_tags_are_rejected() {
        for tag in ["", "launch-rockets", "configure-controller-0", "download-roms"] {
            assert_eq!(tag.parse::<ActionKind>(), Err(UnknownAction(tag.to_string())));
        }
    }

    #[test]
    fn test_unavailable_notices() {
        assert!(ActionKind::StartScraper.unavailable_notice().is_none());
        assert!(ActionKind::Quit.unavailable_notice().is_none());
        assert_eq!(
            ActionKind::Download(DownloadKind::Cores).unavailable_notice().unwrap(),
            "Downloading cores is not available"
        );
    }
}
