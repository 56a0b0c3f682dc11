//! Document rendering.
//!
//! For each content section present in an analysis result, emits the
//! matching artifacts into the per-request output directory: summary and
//! guide get Markdown, DOCX, PDF, and EPUB siblings; transcriptions get a
//! single plain-text file. A shared request log records every render.

mod docx;
mod epub;
mod pdf;

pub use docx::write_docx;
pub use epub::write_epub;
pub use pdf::write_pdf;

use crate::analyzer::{AnalysisResult, SectionKind};
use crate::error::{ResumenError, Result};
use crate::fetcher::VideoMetadata;
use chrono::Local;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::{info, instrument};

/// Mapping from artifact key (e.g. `summary_pdf`) to download-relative path.
pub type GeneratedFileSet = BTreeMap<String, String>;

/// Route the HTTP server serves generated files under.
const DOWNLOAD_ROUTE: &str = "/download";

/// Render all artifacts for the sections present in `results`.
///
/// Any single-format failure aborts the whole call; partially written files
/// are left on disk.
#[instrument(skip_all, fields(output_dir = %output_dir.display()))]
pub fn render(
    results: &AnalysisResult,
    metadata: &VideoMetadata,
    output_dir: &Path,
) -> Result<GeneratedFileSet> {
    std::fs::create_dir_all(output_dir)?;

    append_request_log(output_dir, metadata)?;

    let base_filename = sanitize_base_filename(&metadata.title, &metadata.upload_date);
    let keywords = results
        .get(SectionKind::Keywords)
        .unwrap_or("No keywords generated.")
        .to_string();
    let meta_block = metadata_block(metadata, &keywords);

    let ctx = RenderContext {
        metadata,
        keywords: &keywords,
        meta_block: &meta_block,
        base_filename: &base_filename,
        output_dir,
    };

    let mut files = GeneratedFileSet::new();

    if let Some(content) = results.get(SectionKind::Summary) {
        render_full_formats(&ctx, SectionKind::Summary, "Summary", content, &mut files)?;
    }

    if let Some(content) = results.get(SectionKind::Guide) {
        render_full_formats(&ctx, SectionKind::Guide, "Didactic Guide", content, &mut files)?;
    }

    if let Some(content) = results.get(SectionKind::TranscriptionOrig) {
        let file_name = format!("{}_transcription_original.txt", base_filename);
        write_text_artifact(&output_dir.join(&file_name), &meta_block, content)?;
        files.insert(
            SectionKind::TranscriptionOrig.as_str().to_string(),
            download_path(output_dir, &file_name),
        );
    }

    if let Some(content) = results.get(SectionKind::TranscriptionEs) {
        let file_name = format!("{}_transcription_es.txt", base_filename);
        write_text_artifact(&output_dir.join(&file_name), &meta_block, content)?;
        files.insert(
            SectionKind::TranscriptionEs.as_str().to_string(),
            download_path(output_dir, &file_name),
        );
    }

    info!("Rendered {} artifacts", files.len());
    Ok(files)
}

/// Per-request values shared by every artifact writer.
struct RenderContext<'a> {
    metadata: &'a VideoMetadata,
    keywords: &'a str,
    meta_block: &'a str,
    base_filename: &'a str,
    output_dir: &'a Path,
}

/// Emit the four sibling artifacts for one full-format section.
fn render_full_formats(
    ctx: &RenderContext<'_>,
    kind: SectionKind,
    title_suffix: &str,
    content: &str,
    files: &mut GeneratedFileSet,
) -> Result<()> {
    let key = kind.as_str();
    let title = &ctx.metadata.title;
    let out = ctx.output_dir;

    // Markdown
    let md_name = format!("{}_{}.md", ctx.base_filename, key);
    let md_body = format!("# {} - {}\n\n{}{}", title, title_suffix, ctx.meta_block, content);
    std::fs::write(out.join(&md_name), md_body)?;
    files.insert(format!("{}_md", key), download_path(out, &md_name));

    // DOCX
    let docx_name = format!("{}_{}.docx", ctx.base_filename, key);
    let docx_title = format!("{} - {}", title, title_suffix);
    let docx_body = format!("{}{}", ctx.meta_block, content);
    write_docx(&docx_title, &docx_body, &out.join(&docx_name))?;
    files.insert(format!("{}_docx", key), download_path(out, &docx_name));

    // PDF
    let pdf_name = format!("{}_{}.pdf", ctx.base_filename, key);
    let doc_name = format!("{}: {}", title_suffix, title);
    write_pdf(&doc_name, content, &out.join(&pdf_name), ctx.metadata, ctx.keywords)?;
    files.insert(format!("{}_pdf", key), download_path(out, &pdf_name));

    // EPUB
    let epub_name = format!("{}_{}.epub", ctx.base_filename, key);
    let epub_title = format!("{}: {}", title_suffix, title);
    let epub_body = format!("{}{}", ctx.meta_block, content);
    write_epub(&epub_title, &epub_body, &out.join(&epub_name))?;
    files.insert(format!("{}_epub", key), download_path(out, &epub_name));

    Ok(())
}

/// Append one row to the shared request log, creating it with a header if absent.
fn append_request_log(output_dir: &Path, metadata: &VideoMetadata) -> Result<()> {
    let log_path = output_dir
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("request_log.md");

    if !log_path.exists() {
        std::fs::write(&log_path, "# Video Request Log\n\n| Date | Video |\n|---|---|\n")?;
    }

    let entry = format!(
        "| {} | [{}]({}) |\n",
        Local::now().format("%Y-%m-%d %H:%M"),
        metadata.title,
        metadata.webpage_url
    );

    let mut file = std::fs::OpenOptions::new().append(true).open(&log_path)?;
    file.write_all(entry.as_bytes())
        .map_err(|e| ResumenError::Render(format!("Failed to append request log: {e}")))?;

    Ok(())
}

/// Base filename for a request's artifacts: first 30 chars of the title with
/// spaces folded to underscores, filtered to alphanumeric/`_`/`-`, plus the
/// upload date.
pub fn sanitize_base_filename(title: &str, upload_date: &str) -> String {
    let raw = format!(
        "{}_{}",
        title.chars().take(30).collect::<String>().replace(' ', "_"),
        upload_date
    );

    raw.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Human-readable metadata header shared by the text-based artifacts.
fn metadata_block(metadata: &VideoMetadata, keywords: &str) -> String {
    format!(
        "Title: {}\nURL: {}\nAuthor: {}\nUpload Date: {}\nReport Date: {}\nKeywords: {}\n{}\n\n",
        metadata.title,
        metadata.webpage_url,
        metadata.uploader,
        metadata.upload_date,
        Local::now().format("%Y-%m-%d"),
        keywords,
        "-".repeat(40),
    )
}

fn write_text_artifact(path: &Path, meta_block: &str, content: &str) -> Result<()> {
    std::fs::write(path, format!("{}{}", meta_block, content))?;
    Ok(())
}

/// Download-route-relative path for a generated file. Never absolute.
fn download_path(output_dir: &Path, file_name: &str) -> String {
    let dir_name = output_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{}/{}/{}", DOWNLOAD_ROUTE, dir_name, file_name)
}
