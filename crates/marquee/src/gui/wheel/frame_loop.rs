use gtk::prelude::*;
use gtk4 as gtk;

/// Drives a per-frame callback from a widget's frame clock. Stopping (or
/// dropping) the loop removes the callback before anything it captured goes
/// away.
#[derive(Default)]
pub struct FrameLoop {
    tick: Option<gtk::TickCallbackId>,
}

impl FrameLoop {
    /// Installs `frame` on `widget`'s clock, replacing any previous callback.
    pub fn start<W, F>(&mut self, widget: &W, frame: F)
    where
        W: IsA<gtk::Widget>,
        F: Fn(&W) + 'static,
    {
        self.stop();
        let id = widget.add_tick_callback(move |widget, _| {
            frame(widget);
            glib::ControlFlow::Continue
        });
        self.tick = Some(id);
    }

    pub fn stop(&mut self) {
        if let Some(id) = self.tick.take() {
            id.remove();
            log::debug!("Frame loop stopped");
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
