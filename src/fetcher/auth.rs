//! Staging of site authentication material for the downloader.
//!
//! Cookie payloads and proof-of-origin tokens arrive out-of-band (environment
//! variables or a mounted file). They are staged once at startup and forwarded
//! to yt-dlp verbatim; their contents are never validated here.

use crate::config::Settings;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Authentication material resolved at startup.
#[derive(Debug, Clone, Default)]
pub struct StagedAuth {
    /// Cookie file to pass to yt-dlp, if any material was staged.
    pub cookie_file: Option<PathBuf>,
    /// Proof-of-origin token for the YouTube extractor.
    pub po_token: Option<String>,
}

/// Resolve and stage authentication material once, during startup.
///
/// Precedence for the cookie file: `YOUTUBE_COOKIES` payload, then a mounted
/// file (`YOUTUBE_COOKIES_FILE` env or `youtube.cookies_file` setting), then
/// a previously staged file left in the data dir.
pub fn stage_auth(settings: &Settings) -> Result<StagedAuth> {
    std::fs::create_dir_all(settings.data_dir())?;

    let payload = std::env::var("YOUTUBE_COOKIES").ok().filter(|c| !c.is_empty());
    let mounted = std::env::var("YOUTUBE_COOKIES_FILE")
        .ok()
        .filter(|p| !p.is_empty())
        .or_else(|| settings.youtube.cookies_file.clone())
        .map(|p| Settings::expand_path(&p));

    let cookie_file = stage_cookie_file(
        payload.as_deref(),
        mounted.as_deref(),
        &settings.cookie_path(),
    )?;

    let po_token = std::env::var("YOUTUBE_PO_TOKEN").ok().filter(|t| !t.is_empty());
    if po_token.is_some() {
        info!("Using proof-of-origin token from environment");
    }

    Ok(StagedAuth {
        cookie_file,
        po_token,
    })
}

/// Write or copy cookie material to `cookie_path`.
fn stage_cookie_file(
    payload: Option<&str>,
    mounted: Option<&Path>,
    cookie_path: &Path,
) -> Result<Option<PathBuf>> {
    if let Some(content) = payload {
        std::fs::write(cookie_path, content)?;
        info!(
            "Staged cookies from environment ({} bytes) to {}",
            content.len(),
            cookie_path.display()
        );
        return Ok(Some(cookie_path.to_path_buf()));
    }

    if let Some(source) = mounted {
        if source.exists() {
            std::fs::copy(source, cookie_path)?;
            info!(
                "Copied mounted cookie file {} to {}",
                source.display(),
                cookie_path.display()
            );
            return Ok(Some(cookie_path.to_path_buf()));
        }
        warn!("Configured cookie file {} does not exist", source.display());
    }

    if cookie_path.exists() {
        return Ok(Some(cookie_path.to_path_buf()));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_from_payload() {
        let dir = tempfile::tempdir().unwrap();
        let cookie_path = dir.path().join("cookies.txt");

        let staged = stage_cookie_file(Some("# Netscape HTTP Cookie File\n"), None, &cookie_path)
            .unwrap()
            .unwrap();

        assert_eq!(staged, cookie_path);
        let content = std::fs::read_to_string(&cookie_path).unwrap();
        assert!(content.starts_with("# Netscape"));
    }

    #[test]
    fn test_stage_from_mounted_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("mounted.txt");
        std::fs::write(&source, "cookie-data").unwrap();
        let cookie_path = dir.path().join("cookies.txt");

        let staged = stage_cookie_file(None, Some(&source), &cookie_path)
            .unwrap()
            .unwrap();

        assert_eq!(staged, cookie_path);
        assert_eq!(std::fs::read_to_string(&cookie_path).unwrap(), "cookie-data");
    }

    #[test]
    fn test_payload_wins_over_mounted() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("mounted.txt");
        std::fs::write(&source, "from-file").unwrap();
        let cookie_path = dir.path().join("cookies.txt");

        stage_cookie_file(Some("from-env"), Some(&source), &cookie_path).unwrap();

        assert_eq!(std::fs::read_to_string(&cookie_path).unwrap(), "from-env");
    }

    #[test]
    fn test_nothing_to_stage() {
        let dir = tempfile::tempdir().unwrap();
        let cookie_path = dir.path().join("cookies.txt");

        let staged = stage_cookie_file(None, None, &cookie_path).unwrap();
        assert!(staged.is_none());
    }

    #[test]
    fn test_existing_staged_file_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let cookie_path = dir.path().join("cookies.txt");
        std::fs::write(&cookie_path, "left over").unwrap();

        let staged = stage_cookie_file(None, None, &cookie_path).unwrap();
        assert_eq!(staged, Some(cookie_path));
    }
}
