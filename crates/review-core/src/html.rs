//! HTML serialization of a render tree.
//!
//! Block text is already escaped, so only tooltips are escaped here.
use crate::highlight::risk_open_tag;
use crate::tree::{BlockText, HeadingLevel, RenderBlock, RenderTree, SpanKind};

const SEARCH_OPEN_TAG: &str = "<mark class=\"risk-highlight highlight-search\">";

impl RenderTree {
    /// One element per line, list items grouped into `<ul>` runs.
    pub fn to_html(&self) -> String {
        let mut out: Vec<String> = Vec::with_capacity(self.len() + 2);
        let mut in_list = false;

        for block in self.blocks() {
            match (block.is_list_item(), in_list) {
                (true, false) => out.push("<ul class='doc-list'>".to_string()),
                (false, true) => out.push("</ul>".to_string()),
                _ => {}
            }
            in_list = block.is_list_item();

            out.push(match block {
                RenderBlock::Heading {
                    level: HeadingLevel::Title,
                    text,
                } => format!("<h2 class='doc-title'>{}</h2>", render_inline(text)),
                RenderBlock::Heading {
                    level: HeadingLevel::Section,
                    text,
                } => format!("<h3 class='doc-heading'>{}</h3>", render_inline(text)),
                RenderBlock::Paragraph { text } => {
                    format!("<p class='doc-para'>{}</p>", render_inline(text))
                }
                RenderBlock::ListItem { text } => {
                    format!("<li class='doc-item'>{}</li>", render_inline(text))
                }
                RenderBlock::Blank => "<br>".to_string(),
            });
        }

        if in_list {
            out.push("</ul>".to_string());
        }
        out.join("\n")
    }
}

/// Text with its spans as nested `<mark>` elements. Spans are properly nested:
/// risk spans are disjoint and search spans never cross a risk boundary.
fn render_inline(text: &BlockText) -> String {
    let src = &text.text;
    let mut out = String::with_capacity(src.len());
    let mut cursor = 0;
    let mut open: Vec<usize> = Vec::new();

    for span in &text.spans {
        while let Some(&end) = open.last() {
            if end > span.start {
                break;
            }
            out.push_str(&src[cursor..end]);
            out.push_str("</mark>");
            cursor = end;
            open.pop();
        }

        out.push_str(&src[cursor..span.start]);
        cursor = span.start;
        match &span.kind {
            SpanKind::Risk {
                risk_level,
                tooltip,
                ..
            } => out.push_str(&risk_open_tag(*risk_level, tooltip)),
            SpanKind::Search => out.push_str(SEARCH_OPEN_TAG),
        }
        open.push(span.end);
    }

    while let Some(end) = open.pop() {
        out.push_str(&src[cursor..end]);
        out.push_str("</mark>");
        cursor = end;
    }
    out.push_str(&src[cursor..]);
    out
}
