//! Resumen - Video Analysis & Report Generation
//!
//! A thin HTTP service that fetches audio from a video URL, analyzes it with
//! Google's Gemini, and renders the results into multiple document formats.
//!
//! The name "Resumen" is the Spanish word for "summary": the service's
//! reports (summaries, transcriptions, didactic guides) are generated in
//! Spanish.
//!
//! # Overview
//!
//! Resumen lets you:
//! - Download best-available audio from a video URL (yt-dlp + ffmpeg)
//! - Generate summaries, transcriptions, keywords, and didactic guides
//! - Export each section as Markdown, DOCX, PDF, and EPUB documents
//! - Keep an append-only history of every completed analysis
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `fetcher` - Audio download and metadata extraction
//! - `analyzer` - Gemini upload, generation, and response parsing
//! - `render` - Multi-format document generation
//! - `history` - Persisted analysis history
//! - `orchestrator` - Per-request pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use resumen::config::Settings;
//! use resumen::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(&settings)?;
//!
//!     let options = vec!["summary".to_string()];
//!     let entry = orchestrator.run("https://youtu.be/dQw4w9WgXcQ", &options).await?;
//!     println!("Generated {} documents", entry.files.len());
//!
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod history;
pub mod orchestrator;
pub mod render;

pub use error::{Result, ResumenError};
