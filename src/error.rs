//! Error types for Resumen.

use thiserror::Error;

/// Library-level error type for Resumen operations.
#[derive(Error, Debug)]
pub enum ResumenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Required external tool not found: {0}. Please install it and ensure it's in your PATH.")]
    DependencyMissing(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Analysis request failed: {0}")]
    Analysis(String),

    #[error("Remote audio processing failed: {0}")]
    RemoteProcessingFailed(String),

    #[error("Content generation refused: {0}")]
    ContentRefused(String),

    #[error("Document rendering failed: {0}")]
    Render(String),

    #[error("History store error: {0}")]
    History(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ResumenError {
    /// Stage-labelled message for API error responses.
    ///
    /// Download-stage and analysis-stage failures carry their stage prefix;
    /// everything else surfaces its bare message.
    pub fn stage_message(&self) -> String {
        match self {
            ResumenError::DependencyMissing(_) | ResumenError::DownloadFailed(_) => {
                format!("Download failed: {}", self)
            }
            // reqwest is only spoken by the analyzer, so raw HTTP errors
            // belong to the analysis stage as well.
            ResumenError::Analysis(_)
            | ResumenError::RemoteProcessingFailed(_)
            | ResumenError::ContentRefused(_)
            | ResumenError::Http(_) => {
                format!("AI Analysis failed: {}", self)
            }
            other => other.to_string(),
        }
    }
}

/// Result type alias for Resumen operations.
pub type Result<T> = std::result::Result<T, ResumenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_stage_label() {
        let err = ResumenError::DownloadFailed("network unreachable".into());
        assert!(err.stage_message().starts_with("Download failed:"));

        let err = ResumenError::DependencyMissing("ffmpeg".into());
        assert!(err.stage_message().starts_with("Download failed:"));
    }

    #[test]
    fn test_analysis_stage_label() {
        let err = ResumenError::ContentRefused("safety block".into());
        assert!(err.stage_message().starts_with("AI Analysis failed:"));

        let err = ResumenError::RemoteProcessingFailed("file state FAILED".into());
        assert!(err.stage_message().starts_with("AI Analysis failed:"));
    }

    #[test]
    fn test_render_message_unlabelled() {
        let err = ResumenError::Render("bad font".into());
        assert!(!err.stage_message().starts_with("Download failed:"));
        assert!(!err.stage_message().starts_with("AI Analysis failed:"));
    }
}
