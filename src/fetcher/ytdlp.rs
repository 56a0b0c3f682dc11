//! yt-dlp fetcher implementation.

use super::{MediaFetcher, StagedAuth, VideoMetadata};
use crate::error::{ResumenError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Classification of a yt-dlp failure, derived from its stderr output.
///
/// yt-dlp exposes no structured error channel over the CLI, so the requested
/// format case is recognized by substring. The match is confined to this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DownloadErrorKind {
    /// The requested format selector matched nothing; a permissive retry may work.
    FormatUnavailable,
    /// Anything else (network, extraction, authentication); not retried.
    Other,
}

impl DownloadErrorKind {
    pub fn classify(stderr: &str) -> Self {
        if stderr.contains("Requested format is not available") {
            DownloadErrorKind::FormatUnavailable
        } else {
            DownloadErrorKind::Other
        }
    }
}

/// Media fetcher backed by yt-dlp with ffmpeg audio extraction.
pub struct YtDlpFetcher {
    auth: StagedAuth,
}

impl YtDlpFetcher {
    pub fn new(auth: StagedAuth) -> Self {
        Self { auth }
    }

    /// Run one yt-dlp download attempt and return the printed info JSON.
    async fn run_ytdlp(
        &self,
        url: &str,
        dest_dir: &Path,
        request_id: &str,
        format_selector: &str,
    ) -> Result<serde_json::Value> {
        let template = dest_dir.join(format!("{}.%(ext)s", request_id));

        let mut cmd = Command::new("yt-dlp");
        cmd.arg("--print-json")
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("-f").arg(format_selector)
            .arg("--extract-audio")
            .arg("--audio-format").arg("mp3")
            .arg("--audio-quality").arg("192K")
            .arg("--output").arg(template.to_str().unwrap_or_default());

        if let Some(cookie_file) = &self.auth.cookie_file {
            debug!("Passing cookie file {} to yt-dlp", cookie_file.display());
            cmd.arg("--cookies").arg(cookie_file);
        }
        if let Some(token) = &self.auth.po_token {
            cmd.arg("--extractor-args")
                .arg(format!("youtube:po_token={}", token));
        }

        let result = cmd
            .arg(url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ResumenError::DependencyMissing("yt-dlp".into()));
            }
            Err(e) => {
                return Err(ResumenError::DownloadFailed(format!(
                    "yt-dlp execution failed: {e}"
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ResumenError::DownloadFailed(format!("yt-dlp failed: {stderr}")));
        }

        // --print-json emits the info dict as a single JSON line on stdout
        let stdout = String::from_utf8_lossy(&output.stdout);
        let json_line = stdout
            .lines()
            .rev()
            .find(|l| l.trim_start().starts_with('{'))
            .ok_or_else(|| {
                ResumenError::DownloadFailed("yt-dlp produced no info JSON".into())
            })?;

        serde_json::from_str(json_line).map_err(|e| {
            ResumenError::DownloadFailed(format!("Failed to parse yt-dlp output: {e}"))
        })
    }

    /// Verify ffmpeg is installed before starting a download that needs it.
    async fn ensure_ffmpeg(&self) -> Result<()> {
        let result = Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match result {
            Ok(status) if status.success() => Ok(()),
            Ok(_) => Err(ResumenError::DependencyMissing(
                "ffmpeg (installed but not working)".into(),
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ResumenError::DependencyMissing("ffmpeg".into()))
            }
            Err(e) => Err(ResumenError::DependencyMissing(format!("ffmpeg: {e}"))),
        }
    }
}

/// Build metadata from a yt-dlp info dict, with placeholder fallbacks.
fn metadata_from_info(
    info: &serde_json::Value,
    requested_url: &str,
    audio_path: PathBuf,
) -> VideoMetadata {
    VideoMetadata {
        title: info["title"].as_str().unwrap_or("Unknown Title").to_string(),
        upload_date: info["upload_date"]
            .as_str()
            .unwrap_or("Unknown Date")
            .to_string(),
        thumbnail: info["thumbnail"].as_str().unwrap_or("").to_string(),
        webpage_url: info["webpage_url"]
            .as_str()
            .unwrap_or(requested_url)
            .to_string(),
        uploader: info["uploader"]
            .as_str()
            .unwrap_or("Unknown Author")
            .to_string(),
        audio_path,
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    #[instrument(skip(self, dest_dir), fields(request_id = %request_id))]
    async fn fetch(&self, url: &str, dest_dir: &Path, request_id: &str) -> Result<VideoMetadata> {
        self.ensure_ffmpeg().await?;
        std::fs::create_dir_all(dest_dir)?;

        info!("Downloading audio from {}", url);

        let info = match self.run_ytdlp(url, dest_dir, request_id, "bestaudio/best").await {
            Ok(info) => info,
            Err(ResumenError::DownloadFailed(msg))
                if DownloadErrorKind::classify(&msg) == DownloadErrorKind::FormatUnavailable =>
            {
                // One permissive retry; the audio track is still extracted to mp3.
                warn!("Preferred format not available, retrying with generic selector");
                self.run_ytdlp(url, dest_dir, request_id, "best").await?
            }
            Err(e) => return Err(e),
        };

        let audio_path = dest_dir.join(format!("{}.mp3", request_id));
        Ok(metadata_from_info(&info, url, audio_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_format_unavailable() {
        let stderr = "ERROR: [youtube] abc: Requested format is not available. \
                      Use --list-formats for a list of available formats";
        assert_eq!(
            DownloadErrorKind::classify(stderr),
            DownloadErrorKind::FormatUnavailable
        );
    }

    #[test]
    fn test_classify_other_errors() {
        assert_eq!(
            DownloadErrorKind::classify("ERROR: Sign in to confirm you're not a bot"),
            DownloadErrorKind::Other
        );
        assert_eq!(DownloadErrorKind::classify(""), DownloadErrorKind::Other);
    }

    #[test]
    fn test_metadata_from_full_info() {
        let info = serde_json::json!({
            "title": "Test Video",
            "upload_date": "20240115",
            "thumbnail": "https://example.test/thumb.jpg",
            "webpage_url": "https://example.test/watch?v=abc",
            "uploader": "Example Channel",
        });

        let meta = metadata_from_info(&info, "https://example.test/v1", PathBuf::from("a.mp3"));
        assert_eq!(meta.title, "Test Video");
        assert_eq!(meta.upload_date, "20240115");
        assert_eq!(meta.uploader, "Example Channel");
        assert_eq!(meta.webpage_url, "https://example.test/watch?v=abc");
    }

    #[test]
    fn test_metadata_fallbacks() {
        let info = serde_json::json!({});
        let meta = metadata_from_info(&info, "https://example.test/v1", PathBuf::from("a.mp3"));

        assert_eq!(meta.title, "Unknown Title");
        assert_eq!(meta.upload_date, "Unknown Date");
        assert_eq!(meta.thumbnail, "");
        assert_eq!(meta.webpage_url, "https://example.test/v1");
        assert_eq!(meta.uploader, "Unknown Author");
    }
}
