//! Response Segmenter — splits a raw critique into labeled sections.
//!
//! Algorithm: single left-to-right pass over `\n`-separated lines.
//! 1. A marker line (see `marker_kind`) closes the current section and opens a new one.
//! 2. Every other line is appended verbatim to the open section, blank lines included.
//! 3. Lines before the first marker are dropped; there is no preamble section.
//!
//! Markers are anchored: after trimming and removing leading markdown decoration
//! (`#`, `*`, `_`, `-`, `>`, `1.`, `2)`), the line must START with a marker pattern,
//! compared case-insensitively. A mention in the middle of a paragraph is body text.
//!
//! Word markers must also read as a heading. The word has to end at a word
//! boundary ("Strengths-based" is prose). A mixed-case word also needs heading
//! emphasis (`#`, `*`, `_`, `>`) or nothing but `:` after it, so a sentence like
//! "Fix suggestions below..." stays in the body. All-caps headings need neither.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Strengths,
    Issues,
    Risks,
    Fixes,
    Unclassified,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Strengths => "✅ Strengths",
            SectionKind::Issues => "⚠️ Detected Issues",
            SectionKind::Risks => "🚫 AI/Flag Risk & Auto-Rejection Triggers",
            SectionKind::Fixes => "💡 Fix Suggestions",
            SectionKind::Unclassified => "Analysis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub body: String,
}

/// Closed set of marker patterns. `⚠` also covers `⚠️` (same base glyph).
const MARKERS: [(SectionKind, &[&str]); 4] = [
    (SectionKind::Strengths, &["✅", "STRENGTHS"]),
    (SectionKind::Issues, &["⚠", "DETECTED ISSUES"]),
    (
        SectionKind::Risks,
        &["🚫", "AI/FLAG RISK", "AUTO-REJECTION"],
    ),
    (SectionKind::Fixes, &["💡", "FIX SUGGESTIONS"]),
];

/// Splits a critique into sections. Deterministic; re-segmenting the same text
/// yields the same result.
pub fn segment(report: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<(SectionKind, Vec<&str>)> = None;

    for line in report.split('\n') {
        if let Some(kind) = marker_kind(line) {
            if let Some((kind, lines)) = current.take() {
                sections.push(Section {
                    kind,
                    body: lines.join("\n"),
                });
            }
            current = Some((kind, Vec::new()));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }

    if let Some((kind, lines)) = current {
        sections.push(Section {
            kind,
            body: lines.join("\n"),
        });
    }

    sections
}

/// Sections for rendering: the segmentation, or the whole report as one
/// `Unclassified` section when the model ignored the requested structure.
pub fn sections_for_display(report: &str) -> Vec<Section> {
    let sections = segment(report);
    if !sections.is_empty() || report.trim().is_empty() {
        return sections;
    }
    vec![Section {
        kind: SectionKind::Unclassified,
        body: report.to_string(),
    }]
}

fn marker_kind(line: &str) -> Option<SectionKind> {
    let head = strip_decoration(line);
    MARKERS
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|p| matches_marker(line, head, p)))
        .map(|(kind, _)| *kind)
}

fn matches_marker(line: &str, head: &str, pattern: &str) -> bool {
    let Some(matched) = head.get(..pattern.len()) else {
        return false;
    };
    if !matched.eq_ignore_ascii_case(pattern) {
        return false;
    }
    if !pattern.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return true;
    }

    let rest = &head[pattern.len()..];
    match rest.chars().next() {
        None => true,
        Some(c) if c.is_alphanumeric() || c == '-' || c == '/' => false,
        Some(_) => matched == pattern || is_emphasized(line) || is_heading_tail(rest),
    }
}

/// Markdown heading, emphasis or quote at the start of the line.
fn is_emphasized(line: &str) -> bool {
    line.trim_start().starts_with(['#', '*', '_', '>'])
}

/// Nothing after the marker word except closing emphasis and an optional colon.
fn is_heading_tail(rest: &str) -> bool {
    let tail = rest.trim_start_matches(['*', '_', '#', ' ', '\t']);
    tail.is_empty() || tail.starts_with(':')
}

/// Strips leading markdown emphasis, heading, quote and list decoration.
fn strip_decoration(line: &str) -> &str {
    let mut rest = line.trim();
    loop {
        let before = rest;
        rest = rest.trim_start_matches(['#', '*', '_', '-', '>', ' ', '\t']);

        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits > 0 {
            if let Some(after) = rest[digits..].strip_prefix(['.', ')']) {
                rest = after;
            }
        }

        if rest == before {
            return rest;
        }
    }
}
