//! Risk highlight injection.
//!
//! Clauses are matched against the escaped document text longest-first. Each
//! accepted match claims its byte range in an interval set; later (shorter)
//! clauses may not claim any byte that is already taken. The text itself is
//! never mutated, so offsets stay valid for the whole pass.
use std::collections::BTreeMap;
use std::ops::Range;

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::error::{ReviewError, ReviewResult};
use crate::model::{RiskClause, RiskLevel};
use crate::normalize::{collapse_whitespace, escape_for_markup, VisibleText};
use crate::options::RenderOptions;

/// Compiled-program budget for one clause pattern.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// A claimed risk range in the escaped text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskMark {
    pub start: usize,
    pub end: usize,
    /// Index into the caller's risk list.
    pub risk_index: usize,
    pub risk_level: RiskLevel,
    pub tooltip: String,
}

/// Escaped text with its non-overlapping risk marks, ordered by start.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkedText {
    pub text: String,
    pub marks: Vec<RiskMark>,
}

impl MarkedText {
    /// Flat markup with one `<mark>` element per risk mark.
    pub fn to_markup(&self) -> String {
        let mut out = String::with_capacity(self.text.len() + self.marks.len() * 64);
        let mut cursor = 0;
        for mark in &self.marks {
            out.push_str(&self.text[cursor..mark.start]);
            out.push_str(&risk_open_tag(mark.risk_level, &mark.tooltip));
            out.push_str(&self.text[mark.start..mark.end]);
            out.push_str("</mark>");
            cursor = mark.end;
        }
        out.push_str(&self.text[cursor..]);
        out
    }
}

pub(crate) fn risk_open_tag(level: RiskLevel, tooltip: &str) -> String {
    format!(
        "<mark class=\"risk-highlight risk-{}\" title=\"{}\">",
        level.as_str(),
        escape_for_markup(tooltip)
    )
}

/// Disjoint byte ranges keyed by start.
#[derive(Debug, Default)]
struct ClaimSet {
    claimed: BTreeMap<usize, usize>,
}

impl ClaimSet {
    fn overlaps(&self, range: &Range<usize>) -> bool {
        // Ranges are disjoint, so only the last one starting before `end` can
        // reach into `range`.
        self.claimed
            .range(..range.end)
            .next_back()
            .is_some_and(|(_, &end)| end > range.start)
    }

    fn claim(&mut self, range: Range<usize>) -> bool {
        if range.is_empty() || self.overlaps(&range) {
            return false;
        }
        self.claimed.insert(range.start, range.end);
        true
    }
}

/// Wrap every unclaimed match of each risk clause, using default options.
pub fn inject_risk_highlights(escaped: &str, risks: &[RiskClause]) -> MarkedText {
    inject_risk_highlights_with(escaped, risks, &RenderOptions::default())
}

/// Wrap every unclaimed match of each risk clause.
///
/// `escaped` must already have gone through
/// [`escape_for_markup`](crate::normalize::escape_for_markup). Clauses shorter
/// than `options.min_clause_chars` are ignored; a clause whose pattern cannot
/// be built is logged and skipped.
pub fn inject_risk_highlights_with(
    escaped: &str,
    risks: &[RiskClause],
    options: &RenderOptions,
) -> MarkedText {
    inject(escaped, risks, options, PATTERN_SIZE_LIMIT)
}

fn inject(
    escaped: &str,
    risks: &[RiskClause],
    options: &RenderOptions,
    size_limit: usize,
) -> MarkedText {
    let mut candidates: Vec<(usize, &RiskClause, String)> = risks
        .iter()
        .enumerate()
        .map(|(i, r)| (i, r, collapse_whitespace(&r.clause)))
        .filter(|(_, _, collapsed)| collapsed.chars().count() >= options.min_clause_chars)
        .collect();
    // Stable: equal lengths keep input order.
    candidates.sort_by(|a, b| b.2.chars().count().cmp(&a.2.chars().count()));

    let visible = VisibleText::decode(escaped);
    let mut claims = ClaimSet::default();
    let mut marks = Vec::new();

    for (risk_index, risk, collapsed) in candidates {
        let regex = match clause_regex(&collapsed, size_limit) {
            Ok(regex) => regex,
            Err(e) => {
                warn!(risk_index, error = %e, "skipping risk clause");
                continue;
            }
        };

        let mut accepted = 0usize;
        for m in regex.find_iter(escaped) {
            if !visible.is_boundary(m.start()) || !visible.is_boundary(m.end()) {
                continue;
            }
            if !claims.claim(m.range()) {
                continue;
            }
            accepted += 1;
            marks.push(RiskMark {
                start: m.start(),
                end: m.end(),
                risk_index,
                risk_level: risk.risk_level,
                tooltip: risk.description.clone(),
            });
        }
        debug!(
            risk_index,
            clause_len = collapsed.len(),
            accepted,
            "risk clause matched"
        );
    }

    marks.sort_by_key(|m| m.start);
    MarkedText {
        text: escaped.to_string(),
        marks,
    }
}

/// Case-insensitive literal pattern for a collapsed clause where each space
/// accepts any run of whitespace.
fn clause_regex(collapsed: &str, size_limit: usize) -> ReviewResult<Regex> {
    let source = collapsed
        .split(' ')
        .map(|word| regex::escape(&escape_for_markup(word)))
        .collect::<Vec<_>>()
        .join(r"\s+");

    RegexBuilder::new(&source)
        .case_insensitive(true)
        .size_limit(size_limit)
        .build()
        .map_err(|source| ReviewError::ClausePattern {
            clause_len: collapsed.len(),
            source,
        })
}
