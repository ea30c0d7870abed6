use anyhow::Context;
use marquee::config;
use marquee::gui::app::{AppInit, AppModel};
use marquee::sys::runtime;
use relm4::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = config::load_or_setup();

    let (tx, rx) = async_channel::bounded(64);

    // Start Background Services
    let rt = runtime::start_background_services(tx.clone())
        .context("Failed to start background runtime")?;

    let app = RelmApp::new("org.marquee.marquee");

    app.run::<AppModel>(AppInit {
        config,
        runtime: rt.handle().clone(),
        tx,
        rx,
    });

    rt.shutdown_background();
    Ok(())
}
