//! Paginated PDF output.
//!
//! Built on printpdf with the built-in Helvetica faces: a title block,
//! metadata lines, a separator rule, then the content reflowed line by line.
//! Markdown-style heading markers map to three heading sizes and `- `
//! prefixes become bullet glyphs. Every page carries a running header
//! (document name left, date right) and a centered page-number footer.

use crate::error::{ResumenError, Result};
use crate::fetcher::VideoMetadata;
use chrono::Local;
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex,
    PdfLayerReference, PdfPageIndex,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

// A4 geometry, millimetres.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 25.0;
const HEADER_Y: f32 = PAGE_HEIGHT - 15.0;
const FOOTER_Y: f32 = 18.0;
const BODY_TOP: f32 = PAGE_HEIGHT - 28.0;
const BODY_BOTTOM: f32 = 28.0;

const TITLE_SIZE: f32 = 20.0;
const META_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 11.0;
const HEADING_SIZES: [f32; 3] = [16.0, 14.0, 12.0];

/// Wrap column estimate for 11pt Helvetica inside the margins.
const WRAP_COLUMNS: usize = 90;

/// Vertical advance for a line of the given point size.
fn line_height(size: f32) -> f32 {
    size * 0.47
}

/// Rough rendered width of `text`, for right/center alignment of the
/// page furniture. Average Helvetica glyph is about half an em.
fn approx_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * 0.3528
}

/// One classified content line.
#[derive(Debug, PartialEq)]
enum Block {
    Heading(u8, String),
    Bullet(String),
    Body(String),
}

/// Classify a content line; blank lines yield None and are skipped.
fn classify_line(line: &str) -> Option<Block> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if let Some(rest) = line.strip_prefix("### ") {
        Some(Block::Heading(3, rest.to_string()))
    } else if let Some(rest) = line.strip_prefix("## ") {
        Some(Block::Heading(2, rest.to_string()))
    } else if let Some(rest) = line.strip_prefix("# ") {
        Some(Block::Heading(1, rest.to_string()))
    } else if let Some(rest) = line.strip_prefix("- ") {
        Some(Block::Bullet(rest.to_string()))
    } else {
        Some(Block::Body(line.to_string()))
    }
}

/// Greedy word wrap at `columns` characters; overlong words are hard-split.
fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if !current.is_empty() && current.chars().count() + 1 + word_len > columns {
            lines.push(std::mem::take(&mut current));
        }

        if word_len > columns {
            for chunk in word.chars().collect::<Vec<_>>().chunks(columns) {
                let piece: String = chunk.iter().collect();
                if chunk.len() == columns {
                    lines.push(piece);
                } else {
                    current = piece;
                }
            }
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Cursor-style page writer: tracks the current page, layer, and baseline,
/// breaking to a fresh page (with furniture) when a line would not fit.
struct PageWriter {
    doc: PdfDocumentReference,
    page: PdfPageIndex,
    layer: PdfLayerIndex,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    doc_name: String,
    date: String,
    y: f32,
    page_number: u32,
}

impl PageWriter {
    fn new(doc_name: &str) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(doc_name, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_err)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_err)?;

        let writer = Self {
            doc,
            page,
            layer,
            regular,
            bold,
            doc_name: doc_name.to_string(),
            date: Local::now().format("%Y-%m-%d").to_string(),
            y: BODY_TOP,
            page_number: 1,
        };
        writer.draw_furniture();
        Ok(writer)
    }

    fn current_layer(&self) -> PdfLayerReference {
        self.doc.get_page(self.page).get_layer(self.layer)
    }

    /// Running header and footer for the current page.
    fn draw_furniture(&self) {
        let layer = self.current_layer();

        layer.use_text(
            self.doc_name.clone(),
            8.0,
            Mm(MARGIN),
            Mm(HEADER_Y),
            &self.regular,
        );

        let date_width = approx_width(&self.date, 6.0);
        layer.use_text(
            self.date.clone(),
            6.0,
            Mm(PAGE_WIDTH - MARGIN - date_width),
            Mm(HEADER_Y),
            &self.regular,
        );

        let label = format!("Page {}", self.page_number);
        let label_width = approx_width(&label, 9.0);
        layer.use_text(
            label,
            9.0,
            Mm((PAGE_WIDTH - label_width) / 2.0),
            Mm(FOOTER_Y),
            &self.regular,
        );
    }

    fn break_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.page = page;
        self.layer = layer;
        self.page_number += 1;
        self.y = BODY_TOP;
        self.draw_furniture();
    }

    fn write_line(&mut self, text: &str, size: f32, bold: bool, indent: f32) {
        if self.y - line_height(size) < BODY_BOTTOM {
            self.break_page();
        }
        let font = if bold { &self.bold } else { &self.regular };
        self.current_layer()
            .use_text(text.to_string(), size, Mm(MARGIN + indent), Mm(self.y), font);
        self.y -= line_height(size);
    }

    fn write_wrapped(&mut self, text: &str, size: f32, bold: bool, indent: f32) {
        for piece in wrap_text(text, WRAP_COLUMNS) {
            self.write_line(&piece, size, bold, indent);
        }
    }

    fn write_centered(&mut self, text: &str, size: f32) {
        if self.y - line_height(size) < BODY_BOTTOM {
            self.break_page();
        }
        let width = approx_width(text, size);
        self.current_layer().use_text(
            text.to_string(),
            size,
            Mm((PAGE_WIDTH - width) / 2.0),
            Mm(self.y),
            &self.regular,
        );
        self.y -= line_height(size);
    }

    fn advance(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn save(self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(pdf_err)
    }
}

fn pdf_err(e: impl std::fmt::Display) -> ResumenError {
    ResumenError::Render(format!("PDF generation failed: {e}"))
}

/// Write a paginated PDF report for one content section.
pub fn write_pdf(
    doc_name: &str,
    content: &str,
    path: &Path,
    metadata: &VideoMetadata,
    keywords: &str,
) -> Result<()> {
    let mut writer = PageWriter::new(doc_name)?;

    // Title block
    writer.write_wrapped(&metadata.title, TITLE_SIZE, true, 0.0);
    writer.advance(4.0);

    // Metadata key/value lines
    let report_date = Local::now().format("%Y-%m-%d").to_string();
    let meta: [(&str, &str); 5] = [
        ("URL", &metadata.webpage_url),
        ("Author", &metadata.uploader),
        ("Date", &metadata.upload_date),
        ("Report Date", &report_date),
        ("Keywords", keywords),
    ];
    for (label, value) in meta {
        writer.write_wrapped(&format!("{}: {}", label, value), META_SIZE, false, 0.0);
    }

    writer.advance(6.0);
    writer.write_centered(&"_".repeat(50), META_SIZE);
    writer.advance(6.0);

    // Content, reflowed line by line. Literal <br> markers become real breaks.
    let content = content.replace("<br/>", "\n").replace("<br>", "\n");
    for line in content.split('\n') {
        match classify_line(line) {
            None => continue,
            Some(Block::Heading(level, text)) => {
                let size = HEADING_SIZES[(level - 1) as usize];
                writer.advance(2.0);
                writer.write_wrapped(&text, size, true, 0.0);
                writer.advance(1.5);
            }
            Some(Block::Bullet(text)) => {
                writer.write_wrapped(&format!("\u{2022} {}", text), BODY_SIZE, false, 4.0);
            }
            Some(Block::Body(text)) => {
                writer.write_wrapped(&text, BODY_SIZE, false, 0.0);
            }
        }
    }

    writer.save(path)
}
