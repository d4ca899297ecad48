use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{RiskClause, RiskLevel};
use crate::score::ScoreBand;
use crate::tree::RenderBlock;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LoadDocumentParams {
    /// Extracted plain text of the document.
    pub raw_text: String,
    /// Clauses flagged by the analysis step.
    #[serde(default)]
    pub risks: Vec<RiskClause>,
    /// Detected document type, if known (e.g. "lease").
    pub document_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchDocumentParams {
    /// Literal text to highlight. Empty clears the current highlight.
    pub query: String,
    /// Fingerprint returned by load_document; rejects the call if a newer document was loaded.
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LocateClauseParams {
    /// Clause text as reported by the analysis (whitespace may differ from the document).
    pub clause: String,
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct DocumentRefParams {
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListRisksParams {
    /// Levels to include (default: all).
    pub levels: Option<Vec<RiskLevel>>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ScoreRisksParams {
    pub risks: Vec<RiskClause>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScoreResponse {
    /// 0 (many severe risks) to 100 (no risks).
    pub score: u8,
    pub band: ScoreBand,
    pub label: String,
    /// Hex color for a score gauge.
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoadDocumentResponse {
    pub document_id: String,
    pub document_type: Option<String>,
    pub block_count: usize,
    pub list_count: usize,
    pub risk_count: usize,
    /// Number of risk highlight spans rendered (a clause may render zero or several).
    pub risk_span_count: usize,
    pub score: ScoreResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchDocumentResponse {
    pub document_id: String,
    /// Query now applied (or queued), or null when the highlight was cleared.
    pub query: Option<String>,
    pub match_count: usize,
    /// True when the query was queued behind the search rate limit. The latest
    /// queued query is applied once the interval ends; `match_count` is 0 here.
    pub deferred: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LocateClauseResponse {
    pub found: bool,
    /// True when no highlight matched and the first one was returned instead.
    pub fallback: bool,
    pub block_index: Option<usize>,
    /// Position among the block's risk highlights; unaffected by search highlights.
    pub span_index: Option<usize>,
    /// Visible text of the located highlight.
    pub text: Option<String>,
    pub risk_level: Option<RiskLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RenderHtmlResponse {
    pub document_id: String,
    pub search_query: Option<String>,
    pub html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocumentBlocksResponse {
    pub document_id: String,
    pub blocks: Vec<RenderBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IndexedRisk {
    /// Position in the loaded document's risk list.
    pub index: usize,
    pub clause: String,
    pub risk_level: RiskLevel,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListRisksResponse {
    pub document_id: String,
    pub risks: Vec<IndexedRisk>,
}
