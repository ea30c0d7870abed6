use crate::events::AppEvent;
use async_channel::Sender;
use romkit::library::{self, RomFile};
use romkit::scraper::{
    self, GameDatabase, MetadataClient, ScrapePhase, ScrapeProgress, Scraper, ScraperOptions,
};
use std::path::PathBuf;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Everything a background scrape needs, moved onto the worker.
#[derive(Debug)]
pub struct ScrapeJob {
    pub roms_root: PathBuf,
    pub media_root: PathBuf,
    pub options: ScraperOptions,
    pub database: GameDatabase,
}

fn send(tx: &Sender<AppEvent>, progress: &ScrapeProgress) {
    if tx.send_blocking(AppEvent::Scrape(progress.clone())).is_err() {
        log::debug!("Scrape progress dropped, UI is gone");
    }
}

/// Scans the library and scrapes every ROM with `client`, reporting each step.
pub fn run_job<C: MetadataClient>(client: C, mut job: ScrapeJob, tx: &Sender<AppEvent>) -> ScrapeProgress {
    send(
        tx,
        &ScrapeProgress {
            phase: ScrapePhase::Scanning,
            ..ScrapeProgress::default()
        },
    );

    let roms: Vec<RomFile> = library::scan_all(&job.roms_root)
        .into_iter()
        .flat_map(|lib| lib.roms)
        .collect();
    log::info!("Scraping {} ROMs with {}", roms.len(), job.options.source);

    Scraper::new(client, job.options.delay, job.media_root).run(&roms, &mut job.database, |p| {
        send(tx, p)
    })
}

/// Runs a scrape on the runtime's blocking pool. The final progress event is
/// Complete or Error.
pub fn spawn_scrape(handle: &Handle, job: ScrapeJob, tx: Sender<AppEvent>) -> JoinHandle<()> {
    handle.spawn_blocking(move || match scraper::build_client(&job.options) {
        Ok(client) => {
            run_job(client, job, &tx);
        }
        Err(e) => {
            log::error!("Cannot start scraper: {}", e);
            send(
                &tx,
                &ScrapeProgress {
                    phase: ScrapePhase::Error,
                    errors: vec![e.to_string()],
                    ..ScrapeProgress::default()
                },
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use romkit::scraper::{AssetUrls, GameMetadata, ScrapeError, ScrapeResult, ScraperSource};
    use romkit::systems::SystemDef;
    use std::path::Path;

    struct TitleClient;

    impl MetadataClient for TitleClient {
        fn fetch_metadata(
            &self,
            rom: &RomFile,
            _system: &SystemDef,
        ) -> Result<Option<ScrapeResult>, ScrapeError> {
            if rom.stem.starts_with("unknown") {
                return Ok(None);
            }
            Ok(Some(ScrapeResult {
                metadata: GameMetadata {
                    title: rom.stem.to_uppercase(),
                    ..Default::default()
                },
                assets: AssetUrls::default(),
            }))
        }

        fn download_asset(&self, _url: &str, _destination: &Path) -> bool {
            false
        }
    }

    fn drain(rx: &async_channel::Receiver<AppEvent>) -> Vec<ScrapeProgress> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::Scrape(p) = event {
                out.push(p);
            }
        }
        out
    }

    #[test]
    fn test_job_scans_scrapes_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let nes = dir.path().join("roms").join("nes");
        fs_err::create_dir_all(&nes).unwrap();
        fs_err::write(nes.join("mario.nes"), b"rom").unwrap();
        fs_err::write(nes.join("unknown.nes"), b"rom").unwrap();
        let db_path = dir.path().join("gamedb.json");

        let job = ScrapeJob {
            roms_root: dir.path().join("roms"),
            media_root: dir.path().join("media"),
            options: ScraperOptions {
                delay: std::time::Duration::ZERO,
                ..ScraperOptions::default()
            },
            database: GameDatabase::open(&db_path).unwrap(),
        };
        let (tx, rx) = async_channel::unbounded();
        let summary = run_job(TitleClient, job, &tx);

        assert_eq!(summary.phase, ScrapePhase::Complete);
        assert_eq!((summary.scraped, summary.failed), (1, 1));

        let events = drain(&rx);
        assert_eq!(events.first().map(|p| p.phase), Some(ScrapePhase::Scanning));
        assert_eq!(events.last().map(|p| p.phase), Some(ScrapePhase::Complete));

        let saved = GameDatabase::open(&db_path).unwrap();
        assert_eq!(saved.get("nes", &nes.join("mario.nes")).map(|g| g.title()), Some("MARIO"));
    }

    #[tokio::test]
    async fn test_unsupported_source_reports_error() {
        let job = ScrapeJob {
            roms_root: PathBuf::from("/nonexistent"),
            media_root: PathBuf::from("/nonexistent"),
            options: ScraperOptions {
                source: ScraperSource::ArcadeDb,
                ..ScraperOptions::default()
            },
            database: GameDatabase::in_memory(),
        };
        let (tx, rx) = async_channel::unbounded();
        spawn_scrape(&Handle::current(), job, tx).await.unwrap();

        let AppEvent::Scrape(progress) = rx.recv().await.unwrap() else {
            panic!("expected scrape progress");
        };
        assert_eq!(progress.phase, ScrapePhase::Error);
        assert_eq!(progress.errors.len(), 1);
    }
}
