//! Core: configuration, folder layout and the application context

pub mod config;
pub mod context;
pub mod paths;

pub use config::{Config, UserOptions};
pub use context::AppContext;
pub use paths::DataPaths;
