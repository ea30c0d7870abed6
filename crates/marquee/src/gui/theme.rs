use crate::config::ThemeConfig;
use crate::gui::wheel::CardStyle;
use gtk::gdk;
use gtk4 as gtk;
use palette::{Srgb, Srgba, WithAlpha};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    pub background: Srgba<f64>,
    pub text: Srgba<f64>,
    pub dim_text: Srgba<f64>,
    pub accent: Srgba<f64>,
    pub card: Srgba<f64>,
    pub selected: Srgba<f64>,
    pub panel: Srgba<f64>,
}

/// Parses `#rrggbb` / `#rgb` into an opaque color.
pub fn parse_hex(hex: &str) -> Option<Srgba<f64>> {
    Srgb::<u8>::from_str(hex.trim())
        .ok()
        .map(|c| c.into_format::<f64>().with_alpha(1.0))
}

impl ThemeColors {
    pub fn from_config(theme: &ThemeConfig) -> Self {
        let defaults = Self::default();
        let pick = |value: &str, fallback: Srgba<f64>| {
            parse_hex(value).unwrap_or_else(|| {
                log::warn!("Invalid theme color '{}', using default", value);
                fallback
            })
        };
        let text = pick(&theme.text, defaults.text);
        Self {
            background: pick(&theme.background, defaults.background),
            text,
            dim_text: Srgba::new(text.red, text.green, text.blue, 0.6),
            accent: pick(&theme.accent, defaults.accent),
            card: pick(&theme.card, defaults.card),
            selected: pick(&theme.selected, defaults.selected),
            panel: Srgba::new(0.0, 0.0, 0.0, 0.55),
        }
    }

    pub fn card_style(&self) -> CardStyle {
        CardStyle {
            fill: self.card,
            text: self.text,
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            background: Srgba::new(0.06, 0.07, 0.1, 1.0),
            text: Srgba::new(1.0, 1.0, 1.0, 1.0),
            dim_text: Srgba::new(1.0, 1.0, 1.0, 0.6),
            accent: Srgba::new(0.2, 0.6, 1.0, 1.0),
            card: Srgba::new(0.2, 0.24, 0.32, 1.0),
            selected: Srgba::new(1.0, 0.8, 0.2, 1.0),
            panel: Srgba::new(0.0, 0.0, 0.0, 0.55),
        }
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.marquee-window, .marquee-drawing-area {
    background: none;
    background-color: black;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
