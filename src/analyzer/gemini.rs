//! Gemini file-API analyzer implementation.
//!
//! Flow per request: upload the audio bytes, poll the remote file until it
//! leaves the processing state, then issue a single generation call with the
//! assembled instructions.

use super::{build_instructions, parse_sections, AnalysisResult, ContentAnalyzer};
use crate::config::{GeminiSettings, Settings};
use crate::error::{ResumenError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default timeout for API requests (5 minutes); uploads can be large.
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// All fetched audio is transcoded to MP3 before upload.
const AUDIO_MIME_TYPE: &str = "audio/mpeg";

/// Remote file handle returned by the upload and lookup endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiFile {
    name: String,
    uri: String,
    #[serde(default)]
    state: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: GeminiFile,
}

/// Content analyzer backed by the Gemini file API.
pub struct GeminiAnalyzer {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    poll_interval: Duration,
}

impl GeminiAnalyzer {
    /// Create an analyzer from settings; the API key comes from the
    /// `GOOGLE_API_KEY` environment variable.
    pub fn new(settings: &GeminiSettings) -> Result<Self> {
        let api_key = Settings::gemini_api_key().ok_or_else(|| {
            ResumenError::Config(
                "GOOGLE_API_KEY not set. Set it with: export GOOGLE_API_KEY='...'".to_string(),
            )
        })?;

        Ok(Self::with_config(
            api_key,
            &settings.model,
            &settings.base_url,
            Duration::from_secs(settings.poll_interval_seconds),
        ))
    }

    /// Create an analyzer with explicit configuration.
    pub fn with_config(
        api_key: String,
        model: &str,
        base_url: &str,
        poll_interval: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            poll_interval,
        }
    }

    /// Upload the audio file bytes to the file API.
    async fn upload_audio(&self, audio_path: &Path) -> Result<GeminiFile> {
        let bytes = tokio::fs::read(audio_path).await?;
        info!(
            "Uploading {} ({} bytes) for analysis",
            audio_path.display(),
            bytes.len()
        );

        let url = format!(
            "{}/upload/v1beta/files?key={}&uploadType=media",
            self.base_url, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", AUDIO_MIME_TYPE)
            .body(bytes)
            .send()
            .await?;

        let response = Self::check_status(response, "file upload").await?;
        let upload: UploadResponse = response.json().await?;
        Ok(upload.file)
    }

    /// Fetch the current state of an uploaded file.
    async fn get_file(&self, name: &str) -> Result<GeminiFile> {
        let url = format!("{}/v1beta/{}?key={}", self.base_url, name, self.api_key);
        let response = self.client.get(&url).send().await?;
        let response = Self::check_status(response, "file lookup").await?;
        Ok(response.json().await?)
    }

    /// Poll until the remote file leaves the processing state.
    ///
    /// There is deliberately no timeout here; a stuck remote pipeline blocks
    /// the request for as long as it stays in PROCESSING.
    async fn wait_until_ready(&self, mut file: GeminiFile) -> Result<GeminiFile> {
        while file.state == "PROCESSING" {
            debug!("Waiting for remote audio processing...");
            tokio::time::sleep(self.poll_interval).await;
            file = self.get_file(&file.name).await?;
        }

        if file.state == "FAILED" {
            return Err(ResumenError::RemoteProcessingFailed(format!(
                "remote file {} entered FAILED state",
                file.name
            )));
        }

        Ok(file)
    }

    /// Issue the single generation call for this request.
    async fn generate(&self, file: &GeminiFile, instructions: &str) -> Result<String> {
        info!("Audio processing complete, generating content");

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "file_data": { "mime_type": AUDIO_MIME_TYPE, "file_uri": file.uri } },
                    { "text": instructions },
                ],
            }],
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let response = Self::check_status(response, "content generation").await?;
        let payload: serde_json::Value = response.json().await?;

        extract_text(&payload)
    }

    async fn check_status(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ResumenError::Analysis(format!(
            "{} returned {}: {}",
            what, status, body
        )))
    }
}

/// Pull the generated text out of a generateContent response.
///
/// A response with no text parts is a refusal; the service's feedback payload
/// is surfaced to the caller and the request is not retried.
fn extract_text(payload: &serde_json::Value) -> Result<String> {
    if let Some(parts) = payload["candidates"][0]["content"]["parts"].as_array() {
        let text: String = parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect::<Vec<_>>()
            .join("");
        if !text.is_empty() {
            return Ok(text);
        }
    }

    let feedback = payload
        .get("promptFeedback")
        .map(|f| f.to_string())
        .unwrap_or_else(|| "no feedback provided".to_string());

    Err(ResumenError::ContentRefused(format!(
        "service declined to generate content. Feedback: {}",
        feedback
    )))
}

#[async_trait]
impl ContentAnalyzer for GeminiAnalyzer {
    #[instrument(skip(self, options), fields(audio_path = %audio_path.display()))]
    async fn analyze(&self, audio_path: &Path, options: &[String]) -> Result<AnalysisResult> {
        let file = self.upload_audio(audio_path).await?;
        let file = self.wait_until_ready(file).await?;

        let instructions = build_instructions(options);
        let text = self.generate(&file, &instructions).await?;

        Ok(parse_sections(&text))
    }
}
