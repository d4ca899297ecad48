//! Line-oriented structuring of marked text into render blocks.
//!
//! Best-effort classifier: every line becomes exactly one block, in order.
//! Risk marks are clipped to the line (and to the stored content of the line)
//! they fall on; a mark spanning a newline becomes one span per line.
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::highlight::MarkedText;
use crate::options::RenderOptions;
use crate::tree::{BlockText, HeadingLevel, HighlightSpan, RenderBlock, RenderTree, SpanKind};

static LIST_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(●|•|[-*]|[0-9]+\.)\s").expect("valid regex"));
static LIST_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(●|•|[-*]|[0-9]+\.)\s*").expect("valid regex"));

/// Structure marked text using default options.
pub fn structure(marked: &MarkedText) -> RenderTree {
    structure_with(marked, &RenderOptions::default())
}

/// Split marked text on newlines and classify each line.
///
/// - blank (whitespace only) → `Blank`, closing any open list
/// - bullet glyph, `-`, `*` or `N.` prefix → `ListItem`, prefix stripped
/// - first non-blank line shorter than `title_max_chars` → title `Heading`
/// - shorter than `heading_max_chars`, no trailing period, first character
///   unchanged by uppercasing → section `Heading`
/// - otherwise `Paragraph`, keeping the line untrimmed
pub fn structure_with(marked: &MarkedText, options: &RenderOptions) -> RenderTree {
    if marked.text.is_empty() {
        return RenderTree::new(Vec::new());
    }

    let mut blocks = Vec::new();
    let mut seen_content = false;
    let mut line_start = 0;

    for line in marked.text.split('\n') {
        let line_range = line_start..line_start + line.len();
        line_start = line_range.end + 1;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            blocks.push(RenderBlock::Blank);
            continue;
        }
        let first_content_line = !seen_content;
        seen_content = true;

        if is_list_line(line) {
            let prefix_len = LIST_PREFIX_RE.find(line).map_or(0, |m| m.end());
            let content = trim_range(line, prefix_len..line.len());
            blocks.push(RenderBlock::ListItem {
                text: block_text(marked, &line_range, content),
            });
            continue;
        }

        let trimmed_range = trim_range(line, 0..line.len());
        let chars = trimmed.chars().count();

        if first_content_line && chars < options.title_max_chars {
            blocks.push(RenderBlock::Heading {
                level: HeadingLevel::Title,
                text: block_text(marked, &line_range, trimmed_range),
            });
        } else if chars < options.heading_max_chars
            && !trimmed.ends_with('.')
            && starts_uppercase(trimmed)
        {
            blocks.push(RenderBlock::Heading {
                level: HeadingLevel::Section,
                text: block_text(marked, &line_range, trimmed_range),
            });
        } else {
            blocks.push(RenderBlock::Paragraph {
                text: block_text(marked, &line_range, 0..line.len()),
            });
        }
    }

    debug!(blocks = blocks.len(), "structured document");
    RenderTree::new(blocks)
}

fn is_list_line(line: &str) -> bool {
    let trimmed = line.trim();
    LIST_LINE_RE.is_match(line) || trimmed.starts_with('●') || trimmed.starts_with('•')
}

/// A character counts as uppercase when uppercasing leaves it unchanged, so
/// digits and punctuation qualify as well as capitals.
fn starts_uppercase(text: &str) -> bool {
    text.chars()
        .next()
        .is_some_and(|c| c.to_uppercase().eq(std::iter::once(c)))
}

/// `range` within `line` with surrounding whitespace removed.
fn trim_range(line: &str, range: Range<usize>) -> Range<usize> {
    let slice = &line[range.clone()];
    let start = range.start + (slice.len() - slice.trim_start().len());
    let end = range.end - (slice.len() - slice.trim_end().len());
    start..end.max(start)
}

/// Block text for `content` (relative to the line), with every risk mark that
/// overlaps it clipped and rebased.
fn block_text(marked: &MarkedText, line: &Range<usize>, content: Range<usize>) -> BlockText {
    let abs = line.start + content.start..line.start + content.end;
    let spans = marked
        .marks
        .iter()
        .filter(|m| m.start < abs.end && m.end > abs.start)
        .map(|m| HighlightSpan {
            start: m.start.max(abs.start) - abs.start,
            end: m.end.min(abs.end) - abs.start,
            kind: SpanKind::Risk {
                risk_index: m.risk_index,
                risk_level: m.risk_level,
                tooltip: m.tooltip.clone(),
            },
        })
        .filter(|s| s.start < s.end)
        .collect();

    BlockText {
        text: marked.text[abs].to_string(),
        spans,
    }
}
