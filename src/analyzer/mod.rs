//! Content analysis: audio upload, generation, and response parsing.
//!
//! The analyzer sends extracted audio to the Gemini file API and turns the
//! freeform response into labelled sections.

mod gemini;
mod parser;
mod prompt;

pub use gemini::GeminiAnalyzer;
pub use parser::parse_sections;
pub use prompt::build_instructions;

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// The labelled sections an analysis response can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Summary,
    TranscriptionOrig,
    TranscriptionEs,
    Keywords,
    Guide,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Summary,
        SectionKind::TranscriptionOrig,
        SectionKind::TranscriptionEs,
        SectionKind::Keywords,
        SectionKind::Guide,
    ];

    /// Section key as used in option tags and artifact names.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Summary => "summary",
            SectionKind::TranscriptionOrig => "transcription_orig",
            SectionKind::TranscriptionEs => "transcription_es",
            SectionKind::Keywords => "keywords",
            SectionKind::Guide => "guide",
        }
    }

    /// Literal line prefix marking the start of this section in a response.
    pub fn marker(&self) -> &'static str {
        match self {
            SectionKind::Summary => "### SUMMARY",
            SectionKind::TranscriptionOrig => "### TRANSCRIPTION_ORIG",
            SectionKind::TranscriptionEs => "### TRANSCRIPTION_ES",
            SectionKind::Keywords => "### KEYWORDS",
            SectionKind::Guide => "### GUIDE",
        }
    }

    /// Parse a request option tag. Unrecognized tags yield None.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == tag)
    }
}

/// Parsed analysis response: a mapping from section kind to raw section text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisResult {
    sections: HashMap<SectionKind, String>,
}

impl AnalysisResult {
    pub fn insert(&mut self, kind: SectionKind, text: String) {
        self.sections.insert(kind, text);
    }

    pub fn get(&self, kind: SectionKind) -> Option<&str> {
        self.sections.get(&kind).map(|s| s.as_str())
    }

    pub fn contains(&self, kind: SectionKind) -> bool {
        self.sections.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionKind, &str)> {
        self.sections.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Audio analysis abstraction.
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    /// Upload the audio file, request the sections named in `options`, and
    /// return the parsed response. Unrecognized option tags are ignored.
    async fn analyze(&self, audio_path: &Path, options: &[String]) -> Result<AnalysisResult>;
}
