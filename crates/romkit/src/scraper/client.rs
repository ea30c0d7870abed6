use super::{ScrapeError, ScrapeResult};
use crate::library::RomFile;
use crate::systems::SystemDef;
use fs_err as fs;
use parking_lot::Mutex;
use std::io;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// The remote side of scraping: one metadata lookup per ROM plus asset downloads.
pub trait MetadataClient {
    fn fetch_metadata(
        &self,
        rom: &RomFile,
        system: &SystemDef,
    ) -> Result<Option<ScrapeResult>, ScrapeError>;

    fn download_asset(&self, url: &str, destination: &Path) -> bool;
}

pub fn http_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

/// Streams `url` into `destination` through a temporary file.
pub fn download_to(agent: &ureq::Agent, url: &str, destination: &Path) -> Result<u64, ScrapeError> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    let response = agent.get(url).call()?;
    let mut reader = response.into_body().into_reader();

    let tmp = destination.with_extension("part");
    let mut file = fs::File::create(&tmp)?;
    let written = io::copy(&mut reader, &mut file)?;
    drop(file);
    fs::rename(&tmp, destination)?;
    Ok(written)
}

/// Serializes remote calls: only one runs at a time and consecutive calls are
/// spaced at least `delay` apart.
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last: Mutex::new(None),
        }
    }

    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        let mut last = self.last.lock();
        if let Some(wait) = (*last).and_then(|prev| self.delay.checked_sub(prev.elapsed())) {
            thread::sleep(wait);
        }
        let out = f();
        *last = Some(Instant::now());
        out
    }
}
