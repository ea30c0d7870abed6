use crate::config::{self, Config};
use crate::events::AppEvent;
use crate::gui::session::{Effect, Session};
use crate::gui::theme;
use crate::gui::wheel::{FrameLoop, ImageRequest, Viewport};
use crate::gui::window;
use crate::menu::catalog::{self, SETTINGS_ID};
use crate::menu::settings::{self, FULLSCREEN_ID, SettingValues};
use crate::menu::{ActionKind, ItemId, Key, MenuItem, Navigator, SettingValue};
use crate::sys::images::ImageLoader;
use crate::sys::scrape::{self, ScrapeJob};
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use romkit::launch::{self, Launcher};
use romkit::library;
use romkit::scraper::GameDatabase;
use romkit::store::{ConfigStore, StoreError};
use romkit::systems::{self, SystemId};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;
use tokio::runtime::Handle;

/// Name of the persisted settings blob.
const SETTINGS_BLOB: &str = "settings";

pub struct AppInit {
    pub config: Config,
    pub runtime: Handle,
    pub tx: async_channel::Sender<AppEvent>,
    pub rx: async_channel::Receiver<AppEvent>,
}

pub struct AppModel {
    pub session: Rc<RefCell<Session>>,
    pub config: Config,
    pub store: ConfigStore,
    pub launcher: Launcher,
    pub images: Option<ImageLoader>,
    pub runtime: Handle,
    pub events: async_channel::Sender<AppEvent>,
    pub root: gtk::ApplicationWindow,
    pub drawing_area: gtk::DrawingArea,
    pub frame_loop: FrameLoop,
}

#[derive(Debug)]
pub enum AppMsg {
    Key(Key),
    Resize(i32, i32),
    ConfigReload,
    ImageLoaded {
        generation: u64,
        index: usize,
        result: Result<gdk_pixbuf::Pixbuf, String>,
    },
    Scrape(romkit::scraper::ScrapeProgress),
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::ConfigReload => AppMsg::ConfigReload,
            AppEvent::ImageLoaded {
                generation,
                index,
                result,
            } => AppMsg::ImageLoaded {
                generation,
                index,
                result,
            },
            AppEvent::Scrape(progress) => AppMsg::Scrape(progress),
        }
    }
}

fn map_key(key: gtk::gdk::Key) -> Option<Key> {
    use gtk::gdk::Key as K;
    match key {
        K::Up => Some(Key::Up),
        K::Down => Some(Key::Down),
        K::Left => Some(Key::Left),
        K::Right => Some(Key::Right),
        K::Return | K::KP_Enter => Some(Key::Confirm),
        K::Escape | K::BackSpace => Some(Key::Back),
        _ => None,
    }
}

/// The settings tree: defaults, then the config's fullscreen choice, then
/// whatever the user saved last time. "Wheel Items" starts on Auto so the
/// `[wheel]` section keeps control until the user picks a size in the menu.
fn load_settings(store: &ConfigStore, config: &Config) -> Vec<MenuItem> {
    let mut tree = settings::default_tree();
    settings::update_at(&mut tree, FULLSCREEN_ID, &SettingValue::Bool(config.window.fullscreen));

    match store.read_config::<SettingValues>(SETTINGS_BLOB) {
        Ok(saved) => {
            let applied = settings::apply_values(&mut tree, &saved);
            log::info!("Restored {} of {} saved settings", applied, saved.len());
        }
        Err(StoreError::NotFound(_)) => {}
        Err(e) => log::warn!("Ignoring saved settings: {}", e),
    }
    tree
}

fn open_database(config: &Config) -> GameDatabase {
    GameDatabase::open(config.paths.gamedb()).unwrap_or_else(|e| {
        log::warn!("Game database unavailable: {}", e);
        GameDatabase::in_memory()
    })
}

fn build_root(config: &Config, settings_tree: Vec<MenuItem>) -> Vec<MenuItem> {
    let libraries = library::scan_all(&config.paths.roms);
    let games: usize = libraries.iter().map(|l| l.roms.len()).sum();
    log::info!("Found {} games under {}", games, config.paths.roms.display());
    catalog::build(&libraries, &open_database(config), &config.paths.media, settings_tree)
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = AppInit;
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Marquee"),
            add_css_class: "marquee-window",

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    match map_key(key) {
                        Some(k) => {
                            sender.input(AppMsg::Key(k));
                            glib::Propagation::Stop
                        }
                        None => glib::Propagation::Proceed,
                    }
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                set_focusable: true,
                add_css_class: "marquee-drawing-area",

                connect_resize[sender] => move |_, width, height| {
                    sender.input(AppMsg::Resize(width, height));
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let AppInit {
            config,
            runtime,
            tx,
            rx,
        } = init;

        theme::load_css();
        let store = ConfigStore::new(config.paths.data.clone());
        let settings_tree = load_settings(&store, &config);

        let mut window_config = config.window.clone();
        window_config.fullscreen = settings::fullscreen(&settings_tree).unwrap_or(window_config.fullscreen);
        window::init_window(&root, &window_config);

        let (width, height) = window::monitor_size(&root)
            .filter(|_| window_config.fullscreen)
            .unwrap_or((window_config.width, window_config.height));

        let nav = Navigator::new(build_root(&config, settings_tree), "Systems");
        let session = Session::new(nav, &config, Viewport::new(width as f64, height as f64));

        let images = ImageLoader::spawn(tx.clone())
            .inspect_err(|e| log::error!("Image loader unavailable: {}", e))
            .ok();

        let model = AppModel {
            session: Rc::new(RefCell::new(session)),
            launcher: Launcher::new(config.emulator.clone()),
            config,
            store,
            images,
            runtime,
            events: tx,
            root: root.clone(),
            drawing_area: gtk::DrawingArea::default(),
            frame_loop: FrameLoop::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let session_draw = model.session.clone();
        widgets.drawing_area.set_draw_func(move |_, cr, _, _| {
            if let Err(e) = session_draw.borrow().draw(cr) {
                log::error!("Drawing error: {}", e);
            }
        });

        let session_frame = model.session.clone();
        model.frame_loop.start(&widgets.drawing_area, move |area| {
            if session_frame.borrow_mut().tick(Instant::now()) {
                area.queue_draw();
            }
        });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        model.sync();
        widgets.drawing_area.grab_focus();

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Key(key) => {
                let effect = self.session.borrow_mut().handle_key(key);
                self.sync();
                match effect {
                    Effect::None => return,
                    Effect::Redraw => {}
                    Effect::Quit => relm4::main_application().quit(),
                    Effect::Launch { system, rom } => self.launch(&system, &rom),
                    Effect::Persist(id) => self.persist(&id),
                    Effect::Action(action) => self.run_action(action),
                }
                self.drawing_area.queue_draw();
            }
            AppMsg::Resize(width, height) => {
                self.session.borrow_mut().resize(width as f64, height as f64);
                self.drawing_area.queue_draw();
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    self.session.borrow_mut().apply_config(&new_config);
                    self.launcher = Launcher::new(new_config.emulator.clone());
                    self.config = new_config;
                    self.sync();
                    self.drawing_area.queue_draw();
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
            AppMsg::ImageLoaded {
                generation,
                index,
                result,
            } => {
                if self.session.borrow_mut().attach_image(generation, index, result) {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::Scrape(progress) => {
                if self.session.borrow_mut().set_scrape(progress) {
                    // new titles and artwork
                    self.rescan();
                }
                self.drawing_area.queue_draw();
            }
        }
    }

    fn shutdown(&mut self, _widgets: &mut Self::Widgets, _output: relm4::Sender<Self::Output>) {
        self.frame_loop.stop();
        self.session.borrow_mut().unmount();
    }
}

impl AppModel {
    fn sync(&self) {
        let requests: Vec<ImageRequest> = self.session.borrow_mut().sync();
        if let Some(images) = &self.images {
            images.request(requests);
        }
    }

    fn notice(&self, text: impl Into<String>) {
        self.session.borrow_mut().show_notice(text);
    }

    fn launch(&self, system: &SystemId, rom: &Path) {
        let Some(def) = systems::find(system) else {
            log::error!("Unknown system '{}'", system);
            return;
        };
        match self.launcher.launch_game(def, rom) {
            Ok(plan) => {
                log::info!("Launched {} {:?}", plan.program.display(), plan.args);
                let stem = rom.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
                self.notice(format!("Launching {}", library::clean_game_name(&stem)));
            }
            Err(e) => {
                log::error!("Launch failed: {}", e);
                self.notice(e.to_string());
            }
        }
    }

    fn persist(&self, id: &ItemId) {
        let (values, trail) = {
            let session = self.session.borrow();
            let root = session.navigator().root();
            (settings::values(root), settings::breadcrumb(root, id.as_str()))
        };
        match self.store.write_config(SETTINGS_BLOB, &values) {
            Ok(()) => log::info!(
                "Saved {}",
                trail.map(|t| t.join(" › ")).unwrap_or_else(|| id.to_string())
            ),
            Err(e) => {
                log::error!("Failed to save settings: {}", e);
                self.notice("Could not save settings");
            }
        }

        if id.as_str() == FULLSCREEN_ID
            && let Some(fullscreen) = settings::fullscreen(self.session.borrow().navigator().root())
        {
            window::set_fullscreen(&self.root, fullscreen);
        }
    }

    /// Rebuilds the catalog from disk, keeping the current settings subtree.
    fn rescan(&self) {
        let settings_tree = self
            .session
            .borrow()
            .navigator()
            .find(SETTINGS_ID)
            .and_then(MenuItem::children)
            .map(<[MenuItem]>::to_vec)
            .unwrap_or_else(settings::default_tree);
        let root = build_root(&self.config, settings_tree);
        self.session.borrow_mut().replace_root(root);
        self.sync();
    }

    fn start_scraper(&self) {
        if self.session.borrow().is_scraping() {
            self.notice("A scrape is already running");
            return;
        }
        let options = settings::scraper_options(
            self.session.borrow().navigator().root(),
            self.config.scraper.options(),
        );
        let database = match GameDatabase::open(self.config.paths.gamedb()) {
            Ok(db) => db,
            Err(e) => {
                log::error!("Cannot open game database: {}", e);
                self.notice(format!("Cannot open game database: {e}"));
                return;
            }
        };
        let job = ScrapeJob {
            roms_root: self.config.paths.roms.clone(),
            media_root: self.config.paths.media.clone(),
            options,
            database,
        };
        scrape::spawn_scrape(&self.runtime, job, self.events.clone());
    }

    fn power(&self, verb: &str) {
        let args = vec![verb.to_string()];
        if let Err(e) = launch::launch_external_program(&PathBuf::from("systemctl"), &args) {
            log::error!("systemctl {} failed: {}", verb, e);
            self.notice(format!("Could not {verb}: {e}"));
        }
    }

    fn run_action(&self, action: ActionKind) {
        log::info!("Action {}", action);
        match action {
            ActionKind::StartScraper => self.start_scraper(),
            ActionKind::RescanLibrary => {
                self.rescan();
                self.notice("Library rescanned");
            }
            ActionKind::ShowSystemInfo => self.notice(format!(
                "{} {} · {} systems supported",
                std::env::consts::OS,
                std::env::consts::ARCH,
                systems::all().len()
            )),
            ActionKind::ShowStorageInfo => {
                let stats = open_database(&self.config).stats();
                self.notice(format!(
                    "ROMs: {} · {} games scraped",
                    self.config.paths.roms.display(),
                    stats.total
                ));
            }
            ActionKind::ShowVersion => {
                self.notice(format!("marquee {}", env!("CARGO_PKG_VERSION")))
            }
            ActionKind::Quit => relm4::main_application().quit(),
            ActionKind::Shutdown => self.power("poweroff"),
            ActionKind::Restart => self.power("reboot"),
            other => {
                if let Some(text) = other.unavailable_notice() {
                    self.notice(text);
                }
            }
        }
    }
}
