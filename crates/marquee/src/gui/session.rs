use crate::config::Config;
use crate::gui::list_view;
use crate::gui::overlay::Overlay;
use crate::gui::theme::ThemeColors;
use crate::gui::wheel::{self, ImageRequest, Viewport, WheelParams, WheelScene};
use crate::menu::settings::{self, VISIBLE_ITEMS_ID};
use crate::menu::{
    ActionKind, EntryOutcome, ItemId, Key, LevelStyle, MenuItem, Navigator, Outcome, SettingValue,
    TextEntry, route,
};
use cairo::Context;
use gdk_pixbuf::Pixbuf;
use romkit::scraper::ScrapeProgress;
use romkit::systems::SystemId;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const NOTICE_DURATION: Duration = Duration::from_secs(3);

/// What the owner of the session has to do after a key press.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Redraw,
    Quit,
    Launch { system: SystemId, rom: PathBuf },
    /// A setting changed; the settings blob should be written.
    Persist(ItemId),
    Action(ActionKind),
}

#[derive(Debug, Clone)]
struct Notice {
    text: String,
    until: Instant,
}

/// The front-end's state: the navigator, the mounted wheel and the overlays.
/// Key handling and frame updates both go through here, one at a time.
pub struct Session {
    nav: Navigator,
    scene: WheelScene,
    base_params: WheelParams,
    colors: ThemeColors,
    entry: Option<TextEntry>,
    notice: Option<Notice>,
    scrape: Option<ScrapeProgress>,
    /// Navigator generation the scene was last built for.
    synced: Option<u64>,
}

impl Session {
    pub fn new(nav: Navigator, config: &Config, viewport: Viewport) -> Self {
        let colors = ThemeColors::from_config(&config.theme);
        let params = effective_params(&config.wheel, nav.root());
        Self {
            scene: WheelScene::new(params, colors.card_style(), viewport),
            nav,
            base_params: config.wheel.clone(),
            colors,
            entry: None,
            notice: None,
            scrape: None,
            synced: None,
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn scene(&self) -> &WheelScene {
        &self.scene
    }

    pub fn colors(&self) -> &ThemeColors {
        &self.colors
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|n| n.text.as_str())
    }

    pub fn is_editing(&self) -> bool {
        self.entry.is_some()
    }

    pub fn is_scraping(&self) -> bool {
        self.scrape.as_ref().is_some_and(|p| !p.is_finished())
    }

    pub fn show_notice(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::info!("{}", text);
        self.notice = Some(Notice {
            text,
            until: Instant::now() + NOTICE_DURATION,
        });
    }

    pub fn handle_key(&mut self, key: Key) -> Effect {
        if let Some(entry) = &mut self.entry {
            return match entry.handle(key) {
                EntryOutcome::Editing => Effect::Redraw,
                EntryOutcome::Cancel => {
                    self.entry = None;
                    Effect::Redraw
                }
                EntryOutcome::Commit { id, value } => {
                    self.entry = None;
                    if self.nav.update_at(&id, &SettingValue::Text(value)) {
                        Effect::Persist(id)
                    } else {
                        Effect::Redraw
                    }
                }
            };
        }

        match route(&mut self.nav, key) {
            Outcome::Ignored => Effect::None,
            Outcome::Moved | Outcome::Entered | Outcome::Returned => Effect::Redraw,
            Outcome::Exit => Effect::Quit,
            Outcome::Launch { system, rom } => Effect::Launch { system, rom },
            Outcome::Changed { id, .. } => {
                if id.as_str() == VISIBLE_ITEMS_ID {
                    self.scene
                        .set_params(effective_params(&self.base_params, self.nav.root()));
                    self.synced = None;
                }
                Effect::Persist(id)
            }
            Outcome::Action(action) => match action.unavailable_notice() {
                Some(text) => {
                    self.show_notice(text);
                    Effect::Redraw
                }
                None => Effect::Action(action),
            },
            Outcome::EditText { id, label, value } => {
                self.entry = Some(TextEntry::new(id, label, &value));
                Effect::Redraw
            }
            Outcome::Notice(text) => {
                self.show_notice(text);
                Effect::Redraw
            }
        }
    }

    /// Brings the scene in line with the active level: wheel levels get a
    /// fresh card set when the list changed, list levels unmount the wheel.
    /// Returns the images the new cards want.
    pub fn sync(&mut self) -> Vec<ImageRequest> {
        let generation = self.nav.generation();
        if self.synced == Some(generation) {
            return Vec::new();
        }
        self.synced = Some(generation);

        match self.nav.style() {
            LevelStyle::Wheel => self.scene.rebuild(self.nav.items(), self.nav.selected()),
            LevelStyle::List => {
                self.scene.unmount();
                Vec::new()
            }
        }
    }

    /// One frame. Returns whether the frame needs to be drawn.
    pub fn tick(&mut self, now: Instant) -> bool {
        let expired = self.notice.as_ref().is_some_and(|n| now >= n.until);
        if expired {
            self.notice = None;
        }
        let moving = self.nav.style() == LevelStyle::Wheel && self.scene.advance(self.nav.selected());
        moving || expired
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.scene.resize(width, height);
    }

    /// Re-applies wheel and theme parameters from a reloaded config. The
    /// navigation stack is untouched.
    pub fn apply_config(&mut self, config: &Config) {
        self.base_params = config.wheel.clone();
        self.colors = ThemeColors::from_config(&config.theme);
        self.scene
            .set_params(effective_params(&self.base_params, self.nav.root()));
        if self.scene.set_style(self.colors.card_style()) {
            self.synced = None;
        }
    }

    /// Swaps the whole menu tree, e.g. after a rescan.
    pub fn replace_root(&mut self, root: Vec<MenuItem>) {
        self.nav.replace_root(root);
        self.synced = None;
    }

    pub fn attach_image(&mut self, generation: u64, index: usize, result: Result<Pixbuf, String>) -> bool {
        self.scene.attach_image(generation, index, result)
    }

    /// Records scrape progress. Returns true once, when the batch finishes.
    pub fn set_scrape(&mut self, progress: ScrapeProgress) -> bool {
        let finished = progress.is_finished();
        if finished {
            self.show_notice(crate::gui::overlay::scrape_line(&progress));
            self.scrape = None;
        } else {
            self.scrape = Some(progress);
        }
        finished
    }

    pub fn unmount(&mut self) {
        self.scene.unmount();
        self.synced = None;
    }

    pub fn draw(&self, cr: &Context) -> Result<(), cairo::Error> {
        let viewport = self.scene.viewport();
        let (r, g, b, a) = self.colors.background.into_components();
        cr.set_source_rgba(r, g, b, a);
        cr.paint()?;

        let style = self.nav.style();
        match style {
            LevelStyle::Wheel => wheel::draw(cr, &self.scene, &self.colors)?,
            LevelStyle::List => list_view::draw(cr, &self.nav, &self.colors, viewport)?,
        }

        self.overlay().draw(cr, &self.colors, viewport)
    }

    fn overlay(&self) -> Overlay<'_> {
        let style = self.nav.style();
        Overlay {
            breadcrumb: self.nav.breadcrumb(),
            style,
            entry: self.entry.as_ref(),
            notice: self.notice(),
            description: match style {
                LevelStyle::Wheel => self.nav.selected_item().and_then(|i| i.description.as_deref()),
                LevelStyle::List => None,
            },
            scrape: self.scrape.as_ref(),
        }
    }
}

/// Config parameters with the in-app "Wheel Items" choice applied.
fn effective_params(base: &WheelParams, root: &[MenuItem]) -> WheelParams {
    WheelParams {
        visible_items: settings::visible_items(root).unwrap_or(base.visible_items),
        ..base.clone()
    }
}
