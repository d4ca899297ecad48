//! Ephemeral search overlay.
//!
//! Every application starts from the tree with all previous search spans
//! removed, so applying the same query twice equals applying it once, and an
//! empty query restores the tree exactly. Risk spans are never touched.
use regex::RegexBuilder;
use tracing::{debug, warn};

use crate::normalize::VisibleText;
use crate::tree::{BlockText, HighlightSpan, RenderTree, SpanKind};

/// Return `tree` with its search overlay replaced by matches of `query`.
///
/// The query is trimmed and matched as literal text, case-insensitively,
/// against the visible characters of each text leaf (a leaf never crosses a
/// risk span boundary). An empty query only clears.
pub fn apply_search(tree: &RenderTree, query: &str) -> RenderTree {
    let mut blocks = tree.blocks().to_vec();
    for text in blocks.iter_mut().filter_map(|b| b.text_mut()) {
        text.spans.retain(|s| !s.is_search());
    }

    let query = query.trim();
    if query.is_empty() {
        return RenderTree::with_search(blocks, None);
    }

    let regex = match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(regex) => regex,
        Err(e) => {
            warn!(query_len = query.len(), error = %e, "search query rejected");
            return RenderTree::with_search(blocks, None);
        }
    };

    let mut matches = 0usize;
    for text in blocks.iter_mut().filter_map(|b| b.text_mut()) {
        matches += overlay_block(text, &regex);
    }
    debug!(query_len = query.len(), matches, "search overlay applied");

    RenderTree::with_search(blocks, Some(query.to_string()))
}

/// Remove any search overlay.
pub fn clear_search(tree: &RenderTree) -> RenderTree {
    apply_search(tree, "")
}

fn overlay_block(text: &mut BlockText, regex: &regex::Regex) -> usize {
    let mut found = Vec::new();
    for leaf in text.leaves() {
        let visible = VisibleText::decode(&text.text[leaf.clone()]);
        for m in regex.find_iter(&visible.text) {
            if m.is_empty() {
                continue;
            }
            found.push(HighlightSpan {
                start: leaf.start + visible.to_escaped(m.start()),
                end: leaf.start + visible.to_escaped(m.end()),
                kind: SpanKind::Search,
            });
        }
    }

    let count = found.len();
    if count > 0 {
        text.spans.extend(found);
        text.sort_spans();
    }
    count
}
