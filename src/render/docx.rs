//! Word-processor document output.

use crate::error::{ResumenError, Result};
use docx_rs::{Docx, Paragraph, Run};
use std::path::Path;

/// Heading size in half-points (16pt).
const HEADING_SIZE: usize = 32;

/// Write a DOCX file: one heading paragraph from the title, then one
/// paragraph per non-empty content line. Blank lines are dropped.
pub fn write_docx(title: &str, content: &str, path: &Path) -> Result<()> {
    let mut docx = Docx::new().add_paragraph(
        Paragraph::new().add_run(Run::new().add_text(title).size(HEADING_SIZE).bold()),
    );

    for line in content.split('\n') {
        if line.trim().is_empty() {
            continue;
        }
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
    }

    let file = std::fs::File::create(path)?;
    docx.build()
        .pack(file)
        .map_err(|e| ResumenError::Render(format!("DOCX packaging failed: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_docx_creates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.docx");

        write_docx("Título - Summary", "Línea uno.\n\nLínea dos.", &path).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_write_docx_empty_content() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.docx");

        // Only the heading paragraph; must still produce a valid package.
        write_docx("Just a title", "\n\n\n", &path).unwrap();
        assert!(path.exists());
    }
}
