pub mod app;
pub mod list_view;
pub mod overlay;
pub mod session;
pub mod theme;
pub mod wheel;
pub mod window;
