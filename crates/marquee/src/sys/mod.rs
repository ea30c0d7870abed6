pub mod images;
pub mod runtime;
pub mod scrape;
