//! Pipeline orchestrator for Resumen.
//!
//! Sequences one analysis request through its stages: fetch audio, analyze
//! with the AI service, render documents, record history. Stages run
//! strictly in order with no internal parallelism; a failure at any stage
//! aborts the request and leaves no history entry.

use crate::analyzer::{ContentAnalyzer, GeminiAnalyzer};
use crate::config::Settings;
use crate::error::Result;
use crate::fetcher::{stage_auth, MediaFetcher, YtDlpFetcher};
use crate::history::{HistoryEntry, HistoryStore};
use crate::render::render;
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

/// The main orchestrator for the Resumen pipeline.
pub struct Orchestrator {
    fetcher: Arc<dyn MediaFetcher>,
    analyzer: Arc<dyn ContentAnalyzer>,
    history: Arc<HistoryStore>,
    output_dir: PathBuf,
}

impl Orchestrator {
    /// Create an orchestrator with the default components.
    ///
    /// Stages authentication material, builds the Gemini analyzer (requires
    /// `GOOGLE_API_KEY`), and loads the persisted history.
    pub fn new(settings: &Settings) -> Result<Self> {
        let auth = stage_auth(settings)?;
        let fetcher = Arc::new(YtDlpFetcher::new(auth));
        let analyzer = Arc::new(GeminiAnalyzer::new(&settings.gemini)?);
        let history = Arc::new(HistoryStore::load(settings.history_path()));

        let output_dir = settings.output_dir();
        std::fs::create_dir_all(&output_dir)?;

        Ok(Self::with_components(fetcher, analyzer, history, output_dir))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        fetcher: Arc<dyn MediaFetcher>,
        analyzer: Arc<dyn ContentAnalyzer>,
        history: Arc<HistoryStore>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            fetcher,
            analyzer,
            history,
            output_dir,
        }
    }

    /// Get a handle to the history store.
    pub fn history(&self) -> Arc<HistoryStore> {
        self.history.clone()
    }

    /// The base directory generated artifacts are written under.
    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    /// Run one analysis request through the full pipeline.
    #[instrument(skip(self, options), fields(url = %url))]
    pub async fn run(&self, url: &str, options: &[String]) -> Result<HistoryEntry> {
        let request_id = new_request_id();
        info!("Received analysis request ({})", request_id);

        // Download into the base dir first; the title decides the subdir name.
        let mut metadata = self.fetcher.fetch(url, &self.output_dir, &request_id).await?;
        info!("Downloaded '{}'", metadata.title);

        let dir_name = format!("{}_{}", sanitize_dir_title(&metadata.title), request_id);
        let request_dir = self.output_dir.join(&dir_name);
        std::fs::create_dir_all(&request_dir)?;

        let staged_audio = request_dir.join(
            metadata
                .audio_path
                .file_name()
                .unwrap_or_else(|| std::ffi::OsStr::new("audio.mp3")),
        );
        std::fs::rename(&metadata.audio_path, &staged_audio)?;
        metadata.audio_path = staged_audio;

        let results = self.analyzer.analyze(&metadata.audio_path, options).await?;
        info!("Analysis produced {} sections", results.len());

        let files = render(&results, &metadata, &request_dir)?;

        let entry = HistoryEntry {
            id: request_id,
            title: metadata.title.clone(),
            url: url.to_string(),
            date: metadata.upload_date.clone(),
            report_date: Local::now().format("%Y-%m-%d").to_string(),
            dir_name,
            files,
            thumbnail: metadata.thumbnail.clone(),
        };

        self.history.append(entry.clone()).await?;
        info!("Request {} recorded", entry.id);

        Ok(entry)
    }
}

/// Short random request token (8-char uuid prefix).
fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()[..8].to_string()
}

/// Directory-safe form of a video title: alphanumeric, space, `-`, `_` kept,
/// then trimmed and spaces folded to underscores.
fn sanitize_dir_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{parse_sections, AnalysisResult, ContentAnalyzer};
    use crate::error::ResumenError;
    use crate::fetcher::VideoMetadata;
    use async_trait::async_trait;
    use std::path::Path;

    struct FakeFetcher {
        title: String,
    }

    #[async_trait]
    impl MediaFetcher for FakeFetcher {
        async fn fetch(
            &self,
            url: &str,
            dest_dir: &Path,
            request_id: &str,
        ) -> Result<VideoMetadata> {
            let audio_path = dest_dir.join(format!("{}.mp3", request_id));
            std::fs::write(&audio_path, b"fake mp3 bytes")?;
            Ok(VideoMetadata {
                title: self.title.clone(),
                upload_date: "20240115".to_string(),
                thumbnail: "https://example.test/thumb.jpg".to_string(),
                webpage_url: url.to_string(),
                uploader: "Example Channel".to_string(),
                audio_path,
            })
        }
    }

    struct FakeAnalyzer {
        response: String,
    }

    #[async_trait]
    impl ContentAnalyzer for FakeAnalyzer {
        async fn analyze(&self, _audio: &Path, _options: &[String]) -> Result<AnalysisResult> {
            Ok(parse_sections(&self.response))
        }
    }

    struct FailingAnalyzer;

    #[async_trait]
    impl ContentAnalyzer for FailingAnalyzer {
        async fn analyze(&self, _audio: &Path, _options: &[String]) -> Result<AnalysisResult> {
            Err(ResumenError::RemoteProcessingFailed("file state FAILED".into()))
        }
    }

    fn orchestrator_with(
        dir: &Path,
        analyzer: Arc<dyn ContentAnalyzer>,
    ) -> Orchestrator {
        let fetcher = Arc::new(FakeFetcher {
            title: "Test Video".to_string(),
        });
        let history = Arc::new(HistoryStore::load(dir.join("history.json")));
        Orchestrator::with_components(fetcher, analyzer, history, dir.join("output"))
    }

    #[tokio::test]
    async fn test_full_pipeline_example_scenario() {
        let tmp = tempfile::tempdir().unwrap();
        let analyzer = Arc::new(FakeAnalyzer {
            response: "### KEYWORDS\nfoo, bar\n### SUMMARY\nHello world.".to_string(),
        });
        let orchestrator = orchestrator_with(tmp.path(), analyzer);
        std::fs::create_dir_all(orchestrator.output_dir()).unwrap();

        let options = vec!["summary".to_string(), "keywords".to_string()];
        let entry = orchestrator
            .run("https://example.test/v1", &options)
            .await
            .unwrap();

        assert_eq!(entry.title, "Test Video");
        assert_eq!(entry.url, "https://example.test/v1");
        for key in ["summary_md", "summary_docx", "summary_pdf", "summary_epub"] {
            assert!(entry.files.contains_key(key), "missing {key}");
        }
        assert!(entry.dir_name.starts_with("Test_Video_"));

        let history = orchestrator.history().entries().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].title, "Test Video");
    }

    #[tokio::test]
    async fn test_audio_moved_into_request_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let analyzer = Arc::new(FakeAnalyzer {
            response: "### KEYWORDS\nk".to_string(),
        });
        let orchestrator = orchestrator_with(tmp.path(), analyzer);
        std::fs::create_dir_all(orchestrator.output_dir()).unwrap();

        let entry = orchestrator
            .run("https://example.test/v1", &[])
            .await
            .unwrap();

        let audio = orchestrator
            .output_dir()
            .join(&entry.dir_name)
            .join(format!("{}.mp3", entry.id));
        assert!(audio.exists());
        // No stray audio file left in the base dir
        assert!(!orchestrator
            .output_dir()
            .join(format!("{}.mp3", entry.id))
            .exists());
    }

    #[tokio::test]
    async fn test_dir_names_unique_across_same_title() {
        let tmp = tempfile::tempdir().unwrap();
        let analyzer = Arc::new(FakeAnalyzer {
            response: "### KEYWORDS\nk".to_string(),
        });
        let orchestrator = orchestrator_with(tmp.path(), analyzer);
        std::fs::create_dir_all(orchestrator.output_dir()).unwrap();

        let first = orchestrator.run("https://example.test/v1", &[]).await.unwrap();
        let second = orchestrator.run("https://example.test/v1", &[]).await.unwrap();

        assert_ne!(first.dir_name, second.dir_name);
        assert_eq!(orchestrator.history().entries().await.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_stage_leaves_no_history() {
        let tmp = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator_with(tmp.path(), Arc::new(FailingAnalyzer));
        std::fs::create_dir_all(orchestrator.output_dir()).unwrap();

        let result = orchestrator.run("https://example.test/v1", &[]).await;
        assert!(result.is_err());
        assert!(orchestrator.history().entries().await.is_empty());
    }

    #[test]
    fn test_request_id_is_short_token() {
        let id = new_request_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() || c == '-'));
    }

    #[test]
    fn test_sanitize_dir_title() {
        assert_eq!(sanitize_dir_title("Test Video"), "Test_Video");
        assert_eq!(sanitize_dir_title("¿Qué? (1/3)"), "Qué_13");
        assert_eq!(sanitize_dir_title("  spaced  "), "spaced");
    }
}
