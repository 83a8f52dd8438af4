pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod features;
pub mod model;
pub mod scoring;

/// Application name for XDG paths
pub const APP_NAME: &str = "reprise";
