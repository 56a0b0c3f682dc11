//! Configuration module for Resumen.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{GeminiSettings, GeneralSettings, ServerSettings, Settings, YoutubeSettings};
