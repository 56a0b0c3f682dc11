//! Instruction assembly for the generation request.
//!
//! One composite prompt is built per request: a fixed preamble, the
//! always-included keywords directive, then one block per requested section
//! in a fixed order. Unrecognized option tags emit nothing.

use super::SectionKind;

const PREAMBLE: &str = "\
You are an expert video analyst and educational content creator.
Analyze the provided audio from a video and generate the following outputs based on the requested sections.
Please separate your response clearly with headers like '### SECTION_NAME'.";

const KEYWORDS_DIRECTIVE: &str = "\
Please include a section ### KEYWORDS at the beginning with a list of 5-10 relevant keywords/tags for this video.";

const SUMMARY_DIRECTIVE: &str = "\
### SUMMARY
Generate an EXTENSIVE and DETAILED summary of the video content in Spanish.
- Go deep into the details, arguments, and examples provided.
- Do not be brief. Aim for a comprehensive overview that covers all aspects of the video.
- Structure it with clear subheadings.";

const TRANSCRIPTION_ORIG_DIRECTIVE: &str = "\
### TRANSCRIPTION_ORIG
Provide a transcription of the video in its original language.
Identify different speakers (e.g., 'Speaker A', 'Speaker B') if possible.
Do not include timestamps.";

const TRANSCRIPTION_ES_DIRECTIVE: &str = "\
### TRANSCRIPTION_ES
Provide a transcription of the video translated to Spanish.
Identify different speakers.
Do not include timestamps.";

const GUIDE_DIRECTIVE: &str = "\
### GUIDE
Create a comprehensive Didactic Guide (in Spanish) for the content.
- Structure it as a professional course script or tutorial.
- Section 1: Introduction & Learning Objectives.
- Section 2: Detailed Content Modules (break down the video into logical lessons).
  - For each module, provide a detailed explanation and a text-based schema or infographic description.
- Section 3: Key Takeaways & Conclusion.
- Section 4: Quiz/Self-assessment questions.";

const CLOSING: &str = "Using the provided audio file, generate the response.";

/// Sections a caller may request, in the order their directives are emitted.
const REQUESTABLE: [SectionKind; 4] = [
    SectionKind::Summary,
    SectionKind::TranscriptionOrig,
    SectionKind::TranscriptionEs,
    SectionKind::Guide,
];

fn directive_for(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::Summary => SUMMARY_DIRECTIVE,
        SectionKind::TranscriptionOrig => TRANSCRIPTION_ORIG_DIRECTIVE,
        SectionKind::TranscriptionEs => TRANSCRIPTION_ES_DIRECTIVE,
        SectionKind::Guide => GUIDE_DIRECTIVE,
        SectionKind::Keywords => KEYWORDS_DIRECTIVE,
    }
}

/// Assemble the instruction payload for one generation call.
///
/// Directive order is fixed regardless of the order tags arrive in.
pub fn build_instructions(options: &[String]) -> String {
    let mut parts = vec![PREAMBLE.to_string(), KEYWORDS_DIRECTIVE.to_string()];

    for kind in REQUESTABLE {
        if options.iter().any(|tag| tag == kind.as_str()) {
            parts.push(directive_for(kind).to_string());
        }
    }

    parts.push(CLOSING.to_string());
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_keywords_always_included() {
        let prompt = build_instructions(&[]);
        assert!(prompt.contains("### KEYWORDS"));
        assert!(prompt.ends_with(CLOSING));
    }

    #[test]
    fn test_fixed_order_regardless_of_input_order() {
        let prompt = build_instructions(&opts(&["guide", "transcription_es", "summary"]));

        let summary_pos = prompt.find("### SUMMARY").unwrap();
        let es_pos = prompt.find("### TRANSCRIPTION_ES").unwrap();
        let guide_pos = prompt.find("### GUIDE").unwrap();

        assert!(summary_pos < es_pos);
        assert!(es_pos < guide_pos);
    }

    #[test]
    fn test_unrecognized_tags_ignored() {
        let with_junk = build_instructions(&opts(&["summary", "chapters", "SUMMARY", ""]));
        let without = build_instructions(&opts(&["summary"]));
        assert_eq!(with_junk, without);
    }

    #[test]
    fn test_unrequested_sections_absent() {
        let prompt = build_instructions(&opts(&["summary"]));
        assert!(prompt.contains("### SUMMARY"));
        assert!(!prompt.contains("### GUIDE"));
        assert!(!prompt.contains("### TRANSCRIPTION_ORIG"));
    }

    #[test]
    fn test_duplicate_tags_emit_one_directive() {
        let prompt = build_instructions(&opts(&["guide", "guide"]));
        assert_eq!(prompt.matches("### GUIDE").count(), 1);
    }
}
