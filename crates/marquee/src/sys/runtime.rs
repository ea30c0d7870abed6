use crate::events::AppEvent;
use async_channel::Sender;
use tokio::runtime::Runtime;

/// Starts the tokio runtime that hosts the config watcher and scrape jobs.
/// The caller keeps the runtime alive for as long as the UI runs.
pub fn start_background_services(tx: Sender<AppEvent>) -> std::io::Result<Runtime> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("marquee-bg")
        .enable_all()
        .build()?;

    rt.spawn(crate::config::run_async_watcher(tx));

    log::debug!("Background services started");
    Ok(rt)
}
