//! The render tree: ordered blocks whose text carries highlight spans.
//!
//! Block text is escaped markup-safe text. Spans are byte ranges into it and
//! always land on visible character boundaries.
use std::ops::Range;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::RiskLevel;
use crate::normalize::unescape;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpanKind {
    /// Persistent highlight for `Document.risks[risk_index]`.
    Risk {
        risk_index: usize,
        risk_level: RiskLevel,
        tooltip: String,
    },
    /// Ephemeral search match.
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
}

impl HighlightSpan {
    pub fn is_risk(&self) -> bool {
        matches!(self.kind, SpanKind::Risk { .. })
    }

    pub fn is_search(&self) -> bool {
        matches!(self.kind, SpanKind::Search)
    }

    pub fn risk_level(&self) -> Option<RiskLevel> {
        match &self.kind {
            SpanKind::Risk { risk_level, .. } => Some(*risk_level),
            SpanKind::Search => None,
        }
    }

    pub fn tooltip(&self) -> Option<&str> {
        match &self.kind {
            SpanKind::Risk { tooltip, .. } => Some(tooltip),
            SpanKind::Search => None,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Escaped text of one block plus its highlight spans, ordered by start.
/// Risk spans never overlap each other; search spans never overlap each other
/// and never cross a risk span boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct BlockText {
    pub text: String,
    pub spans: Vec<HighlightSpan>,
}

impl BlockText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }

    /// Visible text covered by `span`.
    pub fn span_text(&self, span: &HighlightSpan) -> String {
        self.text
            .get(span.range())
            .map(unescape)
            .unwrap_or_default()
    }

    pub fn risk_spans(&self) -> impl Iterator<Item = &HighlightSpan> {
        self.spans.iter().filter(|s| s.is_risk())
    }

    pub fn search_spans(&self) -> impl Iterator<Item = &HighlightSpan> {
        self.spans.iter().filter(|s| s.is_search())
    }

    /// Maximal runs of text not crossing a risk span boundary. These are the
    /// text-bearing leaves a search overlay is allowed to match within.
    pub fn leaves(&self) -> Vec<Range<usize>> {
        let mut cuts = vec![0, self.text.len()];
        for span in self.risk_spans() {
            cuts.push(span.start);
            cuts.push(span.end);
        }
        cuts.sort_unstable();
        cuts.dedup();
        cuts.windows(2)
            .filter(|w| w[0] < w[1])
            .map(|w| w[0]..w[1])
            .collect()
    }

    pub(crate) fn sort_spans(&mut self) {
        self.spans
            .sort_by_key(|s| (s.start, s.is_search(), std::cmp::Reverse(s.end)));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HeadingLevel {
    /// First non-blank line of the document.
    Title,
    /// Short capitalized line elsewhere.
    Section,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderBlock {
    Heading { level: HeadingLevel, text: BlockText },
    Paragraph { text: BlockText },
    ListItem { text: BlockText },
    Blank,
}

impl RenderBlock {
    pub fn text(&self) -> Option<&BlockText> {
        match self {
            RenderBlock::Heading { text, .. }
            | RenderBlock::Paragraph { text }
            | RenderBlock::ListItem { text } => Some(text),
            RenderBlock::Blank => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut BlockText> {
        match self {
            RenderBlock::Heading { text, .. }
            | RenderBlock::Paragraph { text }
            | RenderBlock::ListItem { text } => Some(text),
            RenderBlock::Blank => None,
        }
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self, RenderBlock::ListItem { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            RenderBlock::Heading { .. } => "heading",
            RenderBlock::Paragraph { .. } => "paragraph",
            RenderBlock::ListItem { .. } => "list_item",
            RenderBlock::Blank => "blank",
        }
    }
}

/// Position of a risk span inside a tree: the block, then the span's ordinal
/// among that block's risk spans. Search spans are not counted, so a reference
/// stays valid while the search overlay changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct SpanRef {
    pub block: usize,
    pub risk: usize,
}

/// Ordered blocks of one rendered document, plus the search query whose
/// overlay is currently applied (if any).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderTree {
    blocks: Vec<RenderBlock>,
    search_query: Option<String>,
}

impl RenderTree {
    pub fn new(blocks: Vec<RenderBlock>) -> Self {
        Self {
            blocks,
            search_query: None,
        }
    }

    pub(crate) fn with_search(blocks: Vec<RenderBlock>, search_query: Option<String>) -> Self {
        Self {
            blocks,
            search_query,
        }
    }

    pub fn blocks(&self) -> &[RenderBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn search_query(&self) -> Option<&str> {
        self.search_query.as_deref()
    }

    /// Index ranges of each continuous list: maximal runs of adjacent list items.
    pub fn list_groups(&self) -> Vec<Range<usize>> {
        let mut groups = Vec::new();
        let mut open: Option<usize> = None;
        for (i, block) in self.blocks.iter().enumerate() {
            match (block.is_list_item(), open) {
                (true, None) => open = Some(i),
                (false, Some(start)) => {
                    groups.push(start..i);
                    open = None;
                }
                _ => {}
            }
        }
        if let Some(start) = open {
            groups.push(start..self.blocks.len());
        }
        groups
    }

    /// Risk spans in document order, with their position.
    pub fn risk_spans(&self) -> impl Iterator<Item = (SpanRef, &HighlightSpan)> {
        self.blocks.iter().enumerate().flat_map(|(block, b)| {
            b.text()
                .into_iter()
                .flat_map(|t| t.risk_spans().enumerate())
                .map(move |(risk, s)| (SpanRef { block, risk }, s))
        })
    }

    /// Search spans in document order, with their block index.
    pub fn search_spans(&self) -> impl Iterator<Item = (usize, &HighlightSpan)> {
        self.blocks.iter().enumerate().flat_map(|(block, b)| {
            b.text()
                .into_iter()
                .flat_map(|t| t.search_spans())
                .map(move |s| (block, s))
        })
    }

    pub fn search_match_count(&self) -> usize {
        self.search_spans().count()
    }

    pub fn span(&self, at: SpanRef) -> Option<&HighlightSpan> {
        self.blocks.get(at.block)?.text()?.risk_spans().nth(at.risk)
    }

    /// Visible text covered by the risk span at `at`.
    pub fn span_text(&self, at: SpanRef) -> Option<String> {
        let text = self.blocks.get(at.block)?.text()?;
        let span = text.risk_spans().nth(at.risk)?;
        Some(text.span_text(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risk(start: usize, end: usize) -> HighlightSpan {
        HighlightSpan {
            start,
            end,
            kind: SpanKind::Risk {
                risk_index: 0,
                risk_level: RiskLevel::Low,
                tooltip: String::new(),
            },
        }
    }

    #[test]
    fn test_leaves_split_at_risk_boundaries() {
        let text = BlockText {
            text: "abcdefgh".to_string(),
            spans: vec![risk(2, 5)],
        };
        assert_eq!(text.leaves(), vec![0..2, 2..5, 5..8]);

        let whole = BlockText {
            text: "abc".to_string(),
            spans: vec![risk(0, 3)],
        };
        assert_eq!(whole.leaves(), vec![0..3]);
        assert!(BlockText::plain("").leaves().is_empty());
    }

    #[test]
    fn test_list_groups() {
        let item = || RenderBlock::ListItem {
            text: BlockText::plain("x"),
        };
        let tree = RenderTree::new(vec![
            item(),
            item(),
            RenderBlock::Blank,
            item(),
            RenderBlock::Paragraph {
                text: BlockText::plain("p"),
            },
            item(),
        ]);
        assert_eq!(tree.list_groups(), vec![0..2, 3..4, 5..6]);
    }

    #[test]
    fn test_span_ref_ignores_search_spans() {
        let search = HighlightSpan {
            start: 0,
            end: 1,
            kind: SpanKind::Search,
        };
        let text = BlockText {
            text: "abcdefgh".to_string(),
            spans: vec![search, risk(2, 5)],
        };
        let tree = RenderTree::new(vec![RenderBlock::Paragraph { text }]);
        let (at, _) = tree.risk_spans().next().unwrap();
        assert_eq!(at, SpanRef { block: 0, risk: 0 });
        assert!(tree.span(at).unwrap().is_risk());
        assert_eq!(tree.span_text(at).unwrap(), "cde");
        assert_eq!(tree.search_match_count(), 1);
        assert_eq!(tree.span(SpanRef { block: 0, risk: 1 }), None);
    }

    #[test]
    fn test_span_text_is_visible() {
        let text = BlockText {
            text: "a &amp; b".to_string(),
            spans: vec![risk(2, 9)],
        };
        let tree = RenderTree::new(vec![RenderBlock::Paragraph { text }]);
        let (at, _) = tree.risk_spans().next().unwrap();
        assert_eq!(tree.span_text(at).unwrap(), "& b");
    }
}
