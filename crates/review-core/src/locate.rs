//! Clause → highlight lookup for "jump to clause" navigation.
use tracing::debug;

use crate::normalize::{char_prefix, normalize_for_match};
use crate::options::RenderOptions;
use crate::tree::{RenderTree, SpanRef};

/// Result of a clause lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub at: SpanRef,
    /// `true` when no span matched and the first risk span was returned.
    pub fallback: bool,
}

/// Find the risk span that renders `clause`, using default options.
pub fn locate(tree: &RenderTree, clause: &str) -> Option<SpanRef> {
    locate_with(tree, clause, &RenderOptions::default()).map(|l| l.at)
}

/// Find the risk span that renders `clause`.
///
/// Both sides are whitespace-collapsed and lowercased. The first risk span (in
/// document order) whose text contains the clause probe, or whose own prefix
/// is contained in the probe, wins. A blank clause never hits. Without a hit
/// the first risk span is returned; `None` only when the tree has no risk
/// spans at all.
pub fn locate_with(tree: &RenderTree, clause: &str, options: &RenderOptions) -> Option<Located> {
    let clause_norm = normalize_for_match(clause);
    let probe = char_prefix(&clause_norm, options.locate_probe_chars);
    if probe.is_empty() {
        // An empty probe is contained in every candidate; it names nothing.
        return tree
            .risk_spans()
            .next()
            .map(|(at, _)| Located { at, fallback: true });
    }

    let mut first = None;
    for (at, _) in tree.risk_spans() {
        first.get_or_insert(at);
        let candidate = normalize_for_match(&tree.span_text(at).unwrap_or_default());
        let candidate_probe = char_prefix(&candidate, options.locate_candidate_chars);
        if candidate.contains(probe) || probe.contains(candidate_probe) {
            return Some(Located {
                at,
                fallback: false,
            });
        }
    }

    if first.is_some() {
        debug!(clause_len = clause.len(), "no highlight matched clause, using first");
    }
    first.map(|at| Located { at, fallback: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RiskClause, RiskLevel};
    use crate::overlay::apply_search;
    use crate::render_document;

    const TEXT: &str = "Lease Agreement\n\
        The tenant shall pay a non-refundable cleaning fee of five hundred dollars at signing.\n\
        Either party may terminate this lease with 30 days written notice to the other party.\n\
        The landlord may enter the premises at any time without prior notice to the tenant.";

    fn risks() -> Vec<RiskClause> {
        vec![
            RiskClause::new("non-refundable cleaning fee", RiskLevel::Medium, "fee"),
            RiskClause::new("terminate this lease with 30 days", RiskLevel::Low, "notice"),
            RiskClause::new(
                "The landlord may enter the premises at any time without prior notice",
                RiskLevel::High,
                "privacy",
            ),
        ]
    }

    fn located_text(tree: &RenderTree, clause: &str) -> Option<String> {
        locate(tree, clause).and_then(|at| tree.span_text(at))
    }

    #[test]
    fn test_locates_exact_clause() {
        let tree = render_document(TEXT, &risks());
        assert_eq!(
            located_text(&tree, "terminate this lease with 30 days").as_deref(),
            Some("terminate this lease with 30 days")
        );
    }

    #[test]
    fn test_tolerates_whitespace_and_case_drift() {
        let tree = render_document(TEXT, &risks());
        let found = located_text(&tree, "  NON-REFUNDABLE\n cleaning   fee ");
        assert_eq!(found.as_deref(), Some("non-refundable cleaning fee"));
    }

    #[test]
    fn test_long_clause_uses_probe_prefix() {
        let tree = render_document(TEXT, &risks());
        // Only the first 40 normalized characters take part in the lookup.
        let clause = "The landlord may enter the premises at any time, day or night";
        let located = locate_with(&tree, clause, &RenderOptions::default()).unwrap();
        assert!(!located.fallback);
        assert_eq!(
            tree.span_text(located.at).unwrap(),
            "The landlord may enter the premises at any time without prior notice"
        );
    }

    #[test]
    fn test_truncated_candidate_prefix_matches() {
        let tree = render_document(TEXT, &risks());
        // Clause is longer than the rendered span; the span's own prefix is
        // contained in the clause probe.
        let located = locate_with(
            &tree,
            "non-refundable cleaning fee of 500",
            &RenderOptions::default(),
        )
        .unwrap();
        assert!(!located.fallback);
        assert_eq!(tree.span_text(located.at).unwrap(), "non-refundable cleaning fee");
    }

    #[test]
    fn test_falls_back_to_first_span() {
        let tree = render_document(TEXT, &risks());
        let located = locate_with(&tree, "an unrelated indemnity clause", &RenderOptions::default())
            .unwrap();
        assert!(located.fallback);
        assert_eq!(
            tree.span_text(located.at).unwrap(),
            "non-refundable cleaning fee"
        );
    }

    #[test]
    fn test_not_found_without_risk_spans() {
        let tree = render_document(TEXT, &[]);
        assert_eq!(locate(&tree, "terminate this lease"), None);
        assert_eq!(locate(&render_document("", &[]), "anything"), None);
    }

    #[test]
    fn test_ignores_search_spans() {
        let tree = apply_search(&render_document(TEXT, &risks()), "landlord");
        let at = locate(&tree, "landlord may enter the premises").unwrap();
        assert!(tree.span(at).unwrap().is_risk());
        assert!(tree.span_text(at).unwrap().starts_with("The landlord"));
    }

    #[test]
    fn test_blank_clause_is_a_fallback() {
        let tree = render_document(TEXT, &risks());
        for clause in ["", "  \n\t "] {
            let located = locate_with(&tree, clause, &RenderOptions::default()).unwrap();
            assert!(located.fallback);
            assert_eq!(
                tree.span_text(located.at).unwrap(),
                "non-refundable cleaning fee"
            );
        }
    }

    #[test]
    fn test_location_survives_search_overlay() {
        let base = render_document(
            "Termination\nEither party may terminate with 30 days notice.",
            &[RiskClause::new(
                "terminate with 30 days notice",
                RiskLevel::Medium,
                "short notice",
            )],
        );
        let at = locate(&base, "terminate with 30 days notice").unwrap();

        // "Either" lands before the risk span in the same block.
        let searched = apply_search(&base, "either");
        assert_eq!(searched.search_match_count(), 1);
        assert!(searched.span(at).unwrap().is_risk());
        assert_eq!(
            searched.span_text(at).as_deref(),
            Some("terminate with 30 days notice")
        );
        assert_eq!(locate(&searched, "terminate with 30 days notice"), Some(at));
    }
}
