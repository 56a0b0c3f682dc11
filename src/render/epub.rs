//! E-book container output.
//!
//! Single-chapter EPUB: the content is converted from markdown to XHTML
//! (the converter entity-escapes raw text; literal `<br>` markers are
//! normalized to `<br/>` so they survive as real breaks), with one
//! navigation entry pointing at the chapter.

use crate::error::{ResumenError, Result};
use epub_builder::{EpubBuilder, EpubContent, ReferenceType, ZipLibrary};
use pulldown_cmark::{html, Parser};
use std::fs::File;
use std::path::Path;

/// Write a single-chapter EPUB for one content section.
pub fn write_epub(title: &str, content: &str, path: &Path) -> Result<()> {
    let body = markdown_to_xhtml(content);
    let chapter = format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <html xmlns=\"http://www.w3.org/1999/xhtml\">\n\
         <head><title>{title}</title></head>\n\
         <body><h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = escape_xml(title),
        body = body,
    );

    let zip = ZipLibrary::new().map_err(epub_err)?;
    let mut builder = EpubBuilder::new(zip).map_err(epub_err)?;

    builder.metadata("title", title).map_err(epub_err)?;
    builder.metadata("lang", "es").map_err(epub_err)?;
    builder
        .add_content(
            EpubContent::new("content.xhtml", chapter.as_bytes())
                .title("Content")
                .reftype(ReferenceType::Text),
        )
        .map_err(epub_err)?;

    let mut file = File::create(path)?;
    builder.generate(&mut file).map_err(epub_err)?;
    Ok(())
}

fn epub_err(e: impl std::fmt::Display) -> ResumenError {
    ResumenError::Render(format!("EPUB generation failed: {e}"))
}

/// Convert lightweight markup to XHTML-compatible markup.
fn markdown_to_xhtml(content: &str) -> String {
    // Normalize bare break tags first; pulldown passes inline HTML through
    // verbatim, and `<br>` would not be well-formed inside the package.
    let normalized = content.replace("<br>", "<br/>");

    let mut out = String::with_capacity(normalized.len() * 2);
    html::push_html(&mut out, Parser::new(&normalized));
    out
}

/// Escape text for embedding in XML element content.
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            escape_xml("Rust <T> & \"friends\""),
            "Rust &lt;T&gt; &amp; &quot;friends&quot;"
        );
    }

    #[test]
    fn test_markdown_headings_and_lists() {
        let html = markdown_to_xhtml("# Título\n\n- uno\n- dos");
        assert!(html.contains("<h1>Título</h1>"));
        assert!(html.contains("<li>uno</li>"));
    }

    #[test]
    fn test_break_tags_normalized() {
        let html = markdown_to_xhtml("línea uno<br>línea dos");
        assert!(html.contains("<br/>"));
        assert!(!html.contains("<br>l"));
    }

    #[test]
    fn test_raw_angle_text_escaped() {
        let html = markdown_to_xhtml("valor a < b y b > c & d");
        assert!(html.contains("&lt;"));
        assert!(html.contains("&amp;"));
    }

    #[test]
    fn test_write_epub_creates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.epub");

        write_epub(
            "Summary: Test Video",
            "Title: Test\n\n# Resumen\n\nContenido del resumen.",
            &path,
        )
        .unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
