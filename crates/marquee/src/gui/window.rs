use crate::config::WindowConfig;
use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;

pub fn init_window(window: &gtk::ApplicationWindow, config: &WindowConfig) {
    window.set_default_size(config.width.max(320), config.height.max(240));
    set_fullscreen(window, config.fullscreen);
    // a 10-foot UI has no pointer
    window.set_cursor_from_name(Some("none"));
}

pub fn set_fullscreen(window: &gtk::ApplicationWindow, fullscreen: bool) {
    if window.is_fullscreen() == fullscreen {
        return;
    }
    if fullscreen {
        window.fullscreen();
    } else {
        window.unfullscreen();
    }
    log::debug!("Fullscreen: {}", fullscreen);
}

/// Geometry of the monitor the window is on, or the first one.
pub fn monitor_size(window: &gtk::ApplicationWindow) -> Option<(i32, i32)> {
    let display = gdk::Display::default()?;
    let monitor = window
        .surface()
        .and_then(|s| display.monitor_at_surface(&s))
        .or_else(|| {
            display
                .monitors()
                .item(0)
                .and_then(|item| item.downcast::<gdk::Monitor>().ok())
        })?;
    let geometry = monitor.geometry();
    Some((geometry.width(), geometry.height()))
}
