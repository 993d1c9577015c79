// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod game;
pub mod leaderboard;
pub mod logging;
pub mod problem;
pub mod runtime;
pub mod store;
pub mod timer;
pub mod ui;

pub use error::{Error, Result};
