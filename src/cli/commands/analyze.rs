//! One-shot analyze command.
//!
//! Runs the same pipeline the HTTP server exposes, for a single URL from
//! the terminal.

use crate::cli::{Commands, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;

/// Run the analyze command.
pub async fn run_analyze(url: &str, options_raw: &str, settings: Settings) -> anyhow::Result<()> {
    let options = Commands::parse_options(options_raw);
    let orchestrator = Orchestrator::new(&settings)?;

    Output::header("Resumen");
    println!();

    let spinner = Output::spinner(&format!("Analyzing {}", url));
    let result = orchestrator.run(url, &options).await;
    spinner.finish_and_clear();

    match result {
        Ok(entry) => {
            Output::success(&format!("Analysis complete: {}", entry.title));
            Output::kv("Request ID", &entry.id);
            Output::kv("Output dir", &entry.dir_name);
            println!();
            if entry.files.is_empty() {
                Output::warning("No documents were generated (no sections in the response).");
            } else {
                println!("Generated files:");
                for (key, path) in &entry.files {
                    Output::kv(key, path);
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&e.stage_message());
            Err(e.into())
        }
    }
}
