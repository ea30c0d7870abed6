use gdk_pixbuf::Pixbuf;
use romkit::scraper::ScrapeProgress;

#[derive(Debug, Clone)]
pub enum AppEvent {
    ConfigReload,
    /// A card image finished decoding. `generation` identifies the card set
    /// that asked for it.
    ImageLoaded {
        generation: u64,
        index: usize,
        result: Result<Pixbuf, String>,
    },
    Scrape(ScrapeProgress),
}
