//! Section parsing for analysis responses.
//!
//! The model is instructed to separate its output with `### SECTION` header
//! lines. Parsing is a single left-to-right pass over the response: marker
//! lines open a new section, everything else accumulates into the currently
//! open one. A content line that happens to start with a marker prefix will
//! be misparsed; that is a known limitation of the delimiter scheme.

use super::{AnalysisResult, SectionKind};

/// Parse a freeform analysis response into labelled sections.
///
/// Lines before the first marker are discarded. Section text is trimmed of
/// leading and trailing whitespace; interior lines are kept verbatim.
pub fn parse_sections(text: &str) -> AnalysisResult {
    let mut result = AnalysisResult::default();
    let mut current: Option<SectionKind> = None;
    let mut buffer: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if let Some(kind) = marker_kind(line) {
            if let Some(open) = current {
                result.insert(open, buffer.join("\n").trim().to_string());
            }
            current = Some(kind);
            buffer.clear();
        } else if current.is_some() {
            buffer.push(line);
        }
    }

    if let Some(open) = current {
        result.insert(open, buffer.join("\n").trim().to_string());
    }

    result
}

/// Identify a section marker line (after trimming surrounding whitespace).
fn marker_kind(line: &str) -> Option<SectionKind> {
    let trimmed = line.trim();
    SectionKind::ALL
        .iter()
        .copied()
        .find(|kind| trimmed.starts_with(kind.marker()))
}
