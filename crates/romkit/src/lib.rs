pub mod dirs;
pub mod fs;
pub mod launch;
pub mod library;
pub mod macros;
pub mod scraper;
pub mod store;
pub mod systems;
