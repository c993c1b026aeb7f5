//! Marker-based extraction of the five analysis sections.
//!
//! The parser is tolerant: each marker is searched after the previous
//! section's marker, and each section runs from its marker to the next
//! expected marker found after it, or to the end of the text when that
//! marker is missing. Absent markers produce `None` for their section only.

use super::result::AiSections;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionId {
    Overview,
    StatusAnalysis,
    Trends,
    Risks,
    Recommendations,
}

/// Markers in the order the prompt asks for them.
pub const SECTION_MARKERS: [(&str, SectionId); 5] = [
    ("OVERVIEW", SectionId::Overview),
    ("STATUS ANALYSIS", SectionId::StatusAnalysis),
    ("TIMELINE TRENDS", SectionId::Trends),
    ("IDENTIFIED RISKS", SectionId::Risks),
    ("RECOMMENDATIONS", SectionId::Recommendations),
];

/// Extracts sections from AI markdown.
///
/// Returns `None` only when the text is blank.
pub fn parse_sections(text: &str) -> Option<AiSections> {
    if text.trim().is_empty() {
        return None;
    }

    let mut sections = AiSections::default();
    let mut cursor = 0;
    for (index, (marker, id)) in SECTION_MARKERS.iter().enumerate() {
        let Some(offset) = text[cursor..].find(marker) else {
            continue;
        };
        let content_start = cursor + offset + marker.len();
        cursor = content_start;
        let end = SECTION_MARKERS
            .get(index + 1)
            .and_then(|(next, _)| text[content_start..].find(next))
            .map_or(text.len(), |offset| content_start + offset);

        let content = Some(text[content_start..end].trim().to_string());
        match id {
            SectionId::Overview => sections.overview = content,
            SectionId::StatusAnalysis => sections.status_analysis = content,
            SectionId::Trends => sections.trends = content,
            SectionId::Risks => sections.risks = content,
            SectionId::Recommendations => sections.recommendations = content,
        }
    }
    Some(sections)
}
