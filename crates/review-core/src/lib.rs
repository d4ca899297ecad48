//! Structured rendering of extracted document text with risk and search
//! highlights.
//!
//! Pipeline: raw text → [`escape_for_markup`] → [`inject_risk_highlights`] →
//! [`structure`] → [`RenderTree`]. [`apply_search`] and [`locate`] work on the
//! finished tree; [`score`] is independent of it.
pub mod api;
pub mod error;
pub mod highlight;
pub mod html;
pub mod locate;
pub mod model;
pub mod normalize;
pub mod options;
pub mod overlay;
pub mod score;
pub mod structure;
pub mod tree;

pub use error::{ReviewError, ReviewResult};
pub use highlight::{inject_risk_highlights, inject_risk_highlights_with, MarkedText, RiskMark};
pub use locate::{locate, locate_with, Located};
pub use model::{AnalysisPayload, Document, DocumentSummary, RiskClause, RiskFilter, RiskLevel};
pub use normalize::{collapse_whitespace, escape_for_markup};
pub use options::RenderOptions;
pub use overlay::{apply_search, clear_search};
pub use score::{score, score_color, ScoreBand};
pub use structure::{structure, structure_with};
pub use tree::{BlockText, HeadingLevel, HighlightSpan, RenderBlock, RenderTree, SpanKind, SpanRef};

/// Render raw text with risk highlights, using default options.
pub fn render_document(raw_text: &str, risks: &[RiskClause]) -> RenderTree {
    render_document_with(raw_text, risks, &RenderOptions::default())
}

/// Escape, inject risk highlights, then structure into blocks.
pub fn render_document_with(
    raw_text: &str,
    risks: &[RiskClause],
    options: &RenderOptions,
) -> RenderTree {
    let escaped = escape_for_markup(raw_text);
    let marked = inject_risk_highlights_with(&escaped, risks, options);
    structure_with(&marked, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_termination_scenario() {
        let risk = RiskClause::new(
            "terminate with 30 days notice",
            RiskLevel::Medium,
            "short notice",
        );
        let raw = "Termination\nEither party may terminate with 30 days notice.\n\n- Auto-renews annually\n- No refund after 14 days";
        let tree = render_document(raw, std::slice::from_ref(&risk));

        let kinds: Vec<&str> = tree.blocks().iter().map(|b| b.kind_name()).collect();
        assert_eq!(
            kinds,
            vec!["heading", "paragraph", "blank", "list_item", "list_item"]
        );
        assert_eq!(tree.blocks()[0].text().unwrap().text, "Termination");
        assert_eq!(tree.list_groups(), vec![3..5]);

        let para = tree.blocks()[1].text().unwrap();
        assert_eq!(para.spans.len(), 1);
        let span = &para.spans[0];
        assert_eq!(&para.text[span.start..span.end], "terminate with 30 days notice");
        assert_eq!(span.risk_level(), Some(RiskLevel::Medium));
        assert_eq!(span.tooltip(), Some("short notice"));

        assert_eq!(score(&[risk]), 80);
    }

    #[test]
    fn test_render_is_deterministic_for_any_risk_order() {
        let raw = "Deposit\nThe landlord may keep the entire security deposit for any reason at all.";
        let a = RiskClause::new("keep the entire security deposit", RiskLevel::High, "a");
        let b = RiskClause::new("security deposit", RiskLevel::Low, "b");

        let ab = render_document(raw, &[a.clone(), b.clone()]);
        let ba = render_document(raw, &[b, a]);
        let texts = |t: &RenderTree| -> Vec<String> {
            t.risk_spans().map(|(at, _)| t.span_text(at).unwrap()).collect()
        };
        assert_eq!(texts(&ab), vec!["keep the entire security deposit"]);
        assert_eq!(texts(&ab), texts(&ba));
    }

    #[test]
    fn test_custom_options() {
        let options = RenderOptions {
            min_clause_chars: 20,
            ..RenderOptions::default()
        };
        let tree = render_document_with(
            "Title\nA late fee applies to every payment.",
            &[RiskClause::new("late fee", RiskLevel::Low, "")],
            &options,
        );
        assert_eq!(tree.risk_spans().count(), 0);
    }
}
