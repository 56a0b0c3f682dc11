//! CLI module for Resumen.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Resumen - Video Analysis & Report Generation
///
/// Fetches audio from a video URL, analyzes it with Gemini, and renders the
/// results as Markdown, DOCX, PDF, and EPUB documents.
/// The name "Resumen" is the Spanish word for "summary."
#[derive(Parser, Debug)]
#[command(name = "resumen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Analyze a single video from the command line
    Analyze {
        /// Video URL to analyze
        url: String,

        /// Comma-separated output sections (summary, transcription_orig,
        /// transcription_es, guide). Keywords are always included.
        #[arg(short, long, default_value = "summary")]
        options: String,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Commands {
    /// Split a comma-separated options string into tags.
    pub fn parse_options(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
