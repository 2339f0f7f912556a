mod app;
mod config;
mod console;
mod terminal;

pub use app::run_app;
