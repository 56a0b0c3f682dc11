//! Media fetching: audio download and metadata extraction.
//!
//! Wraps yt-dlp (with ffmpeg post-processing) behind a trait so the
//! pipeline can be exercised without network access.

mod auth;
mod ytdlp;

pub use auth::{stage_auth, StagedAuth};
pub use ytdlp::YtDlpFetcher;

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Metadata for a fetched video, plus the local audio file location.
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub title: String,
    /// Source-defined date string (yt-dlp emits YYYYMMDD); not guaranteed ISO.
    pub upload_date: String,
    pub thumbnail: String,
    pub webpage_url: String,
    pub uploader: String,
    /// Local path of the extracted audio file.
    pub audio_path: PathBuf,
}

/// Audio fetcher abstraction.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download best-available audio for `url` into `dest_dir`, transcoded to
    /// MP3 at `{dest_dir}/{request_id}.mp3`, and return the video metadata.
    async fn fetch(&self, url: &str, dest_dir: &Path, request_id: &str) -> Result<VideoMetadata>;
}
