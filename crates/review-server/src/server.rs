/// MCP server exposing the document review pipeline.
///
/// Exposes eight tools:
/// - `load_document`: Replace the session document and render it
/// - `load_analysis`: Same, from the analysis service's payload
/// - `search_document`: Apply or clear the search highlight
/// - `locate_clause`: Find the highlight rendering a flagged clause
/// - `render_html`: Serialize the current tree to HTML
/// - `get_blocks`: Return the structured blocks of the current tree
/// - `list_risks`: List the session's risks, optionally filtered by level
/// - `score_risks`: Score an arbitrary list of risks
use std::sync::Arc;
use std::time::Duration;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::AppError;
use crate::session::Session;
use crate::throttle::{Admission, PendingSearch, SearchThrottle};
use review_core::api::{
    DocumentBlocksResponse, DocumentRefParams, IndexedRisk, ListRisksParams, ListRisksResponse,
    LoadDocumentParams, LoadDocumentResponse, LocateClauseParams, LocateClauseResponse,
    RenderHtmlResponse, ScoreResponse, ScoreRisksParams, SearchDocumentParams,
    SearchDocumentResponse,
};
use review_core::{
    apply_search, locate_with, score, score_color, AnalysisPayload, Document, RenderOptions,
    RiskClause, RiskFilter, ScoreBand,
};

#[derive(Clone)]
pub struct ReviewServer {
    session: Arc<RwLock<Option<Session>>>,
    options: RenderOptions,
    search_throttle: Option<SearchThrottle>,
    tool_router: ToolRouter<ReviewServer>,
}

impl ReviewServer {
    pub fn new(config: Config) -> Self {
        Self {
            session: Arc::new(RwLock::new(None)),
            options: config.render,
            search_throttle: SearchThrottle::new(config.search_rate_limit_rps),
            tool_router: Self::tool_router(),
        }
    }

    /// Render `document` and make it the session, replacing any previous one.
    async fn install(
        &self,
        document: Document,
        document_type: Option<String>,
    ) -> LoadDocumentResponse {
        let document_type = document_type
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let session = Session::load(document, document_type, &self.options);

        let response = LoadDocumentResponse {
            document_id: session.document_id.clone(),
            document_type: session.document_type.clone(),
            block_count: session.tree.len(),
            list_count: session.tree.list_groups().len(),
            risk_count: session.document.risks.len(),
            risk_span_count: session.tree.risk_spans().count(),
            score: score_response(&session.document.risks),
        };
        info!(
            document_id = %response.document_id,
            blocks = response.block_count,
            risks = response.risk_count,
            risk_spans = response.risk_span_count,
            "document loaded"
        );

        *self.session.write().await = Some(session);
        response
    }
}

/// Apply the latest parked search once the throttle interval has passed. A
/// query issued against a document that has since been replaced is dropped.
async fn flush_pending_search(
    session: Arc<RwLock<Option<Session>>>,
    throttle: SearchThrottle,
    after: Duration,
) {
    tokio::time::sleep(after).await;
    // Session lock first, then the throttle: the same order as search_document.
    let mut guard = session.write().await;
    let Some(pending) = throttle.take_pending().await else {
        return;
    };
    match guard.as_mut() {
        Some(session) if session.document_id == pending.document_id => {
            session.tree = apply_search(&session.tree, &pending.query);
            debug!(
                match_count = session.tree.search_match_count(),
                "deferred search applied"
            );
        }
        _ => debug!("deferred search dropped for replaced document"),
    }
}

#[tool_router]
impl ReviewServer {
    #[tool(description = "Load a document for review. Replaces any previously loaded document, renders it into headings, paragraphs and list items with risk highlights, and returns its document_id and safety score.")]
    async fn load_document(
        &self,
        Parameters(params): Parameters<LoadDocumentParams>,
    ) -> Result<Json<LoadDocumentResponse>, String> {
        let document = Document::new(params.raw_text, params.risks);
        Ok(Json(self.install(document, params.document_type).await))
    }

    #[tool(description = "Load a document from the analysis service's payload ({full_text, summary: {document_type, flagged_risks, ...}}). Behaves like load_document.")]
    async fn load_analysis(
        &self,
        Parameters(payload): Parameters<AnalysisPayload>,
    ) -> Result<Json<LoadDocumentResponse>, String> {
        let document_type = payload.summary.document_type.clone();
        Ok(Json(self.install(payload.into_document(), document_type).await))
    }

    #[tool(description = "Highlight every case-insensitive literal occurrence of a query in the loaded document. Replaces the previous search highlight; an empty query clears it. When searches arrive faster than the configured rate, the latest one is applied shortly after and the response is marked deferred.")]
    async fn search_document(
        &self,
        Parameters(params): Parameters<SearchDocumentParams>,
    ) -> Result<Json<SearchDocumentResponse>, String> {
        // Clear and apply under one write lock so no reader sees a half-updated tree.
        let mut guard = self.session.write().await;
        let session = guard.as_mut().ok_or(AppError::NoDocument).map_err(to_tool_error)?;
        session
            .check_id(params.document_id.as_deref())
            .map_err(to_tool_error)?;

        if let Some(throttle) = &self.search_throttle {
            let pending = PendingSearch {
                document_id: session.document_id.clone(),
                query: params.query.clone(),
            };
            if let Admission::Deferred { after, schedule } = throttle.admit(pending).await {
                if schedule {
                    tokio::spawn(flush_pending_search(
                        Arc::clone(&self.session),
                        throttle.clone(),
                        after,
                    ));
                }
                debug!(?after, schedule, "search deferred");
                let query = params.query.trim();
                return Ok(Json(SearchDocumentResponse {
                    document_id: session.document_id.clone(),
                    query: (!query.is_empty()).then(|| query.to_string()),
                    match_count: 0,
                    deferred: true,
                }));
            }
        }

        session.tree = apply_search(&session.tree, &params.query);
        let match_count = session.tree.search_match_count();

        Ok(Json(SearchDocumentResponse {
            document_id: session.document_id.clone(),
            query: session.tree.search_query().map(str::to_string),
            match_count,
            deferred: false,
        }))
    }

    #[tool(description = "Find the risk highlight that renders a flagged clause, tolerating whitespace and case differences. Falls back to the first highlight when no clause text matches or the clause is blank.")]
    async fn locate_clause(
        &self,
        Parameters(params): Parameters<LocateClauseParams>,
    ) -> Result<Json<LocateClauseResponse>, String> {
        let guard = self.session.read().await;
        let session = current(guard.as_ref(), params.document_id.as_deref())?;

        let response = match locate_with(&session.tree, &params.clause, &self.options) {
            Some(located) => LocateClauseResponse {
                found: true,
                fallback: located.fallback,
                block_index: Some(located.at.block),
                span_index: Some(located.at.risk),
                text: session.tree.span_text(located.at),
                risk_level: session.tree.span(located.at).and_then(|s| s.risk_level()),
            },
            None => LocateClauseResponse {
                found: false,
                fallback: false,
                block_index: None,
                span_index: None,
                text: None,
                risk_level: None,
            },
        };
        Ok(Json(response))
    }


    #[tool(description = "Render the loaded document as HTML, including risk highlights and the current search highlight.")]
    async fn render_html(
        &self,
        Parameters(params): Parameters<DocumentRefParams>,
    ) -> Result<Json<RenderHtmlResponse>, String> {
        let guard = self.session.read().await;
        let session = current(guard.as_ref(), params.document_id.as_deref())?;

        Ok(Json(RenderHtmlResponse {
            document_id: session.document_id.clone(),
            search_query: session.tree.search_query().map(str::to_string),
            html: session.tree.to_html(),
        }))
    }

    #[tool(description = "Return the structured blocks of the loaded document (headings, paragraphs, list items, blanks) with their highlight spans as byte ranges.")]
    async fn get_blocks(
        &self,
        Parameters(params): Parameters<DocumentRefParams>,
    ) -> Result<Json<DocumentBlocksResponse>, String> {
        let guard = self.session.read().await;
        let session = current(guard.as_ref(), params.document_id.as_deref())?;

        Ok(Json(DocumentBlocksResponse {
            document_id: session.document_id.clone(),
            blocks: session.tree.blocks().to_vec(),
        }))
    }

    #[tool(description = "List the flagged risks of the loaded document in document order, optionally restricted to the given levels ('high', 'medium', 'low').")]
    async fn list_risks(
        &self,
        Parameters(params): Parameters<ListRisksParams>,
    ) -> Result<Json<ListRisksResponse>, String> {
        let guard = self.session.read().await;
        let session = current(guard.as_ref(), None)?;

        let filter = params
            .levels
            .map(|levels| RiskFilter::only(&levels))
            .unwrap_or_default();
        let risks = filter
            .apply(&session.document.risks)
            .into_iter()
            .map(|(index, risk)| IndexedRisk {
                index,
                clause: risk.clause.clone(),
                risk_level: risk.risk_level,
                description: risk.description.clone(),
            })
            .collect();

        Ok(Json(ListRisksResponse {
            document_id: session.document_id.clone(),
            risks,
        }))
    }

    #[tool(description = "Compute the 0-100 safety score, band, label and gauge color for a list of risks. Does not touch the loaded document.")]
    async fn score_risks(
        &self,
        Parameters(params): Parameters<ScoreRisksParams>,
    ) -> Result<Json<ScoreResponse>, String> {
        Ok(Json(score_response(&params.risks)))
    }
}

fn current<'a>(session: Option<&'a Session>, document_id: Option<&str>) -> Result<&'a Session, String> {
    let session = session.ok_or(AppError::NoDocument).map_err(to_tool_error)?;
    session.check_id(document_id).map_err(to_tool_error)?;
    Ok(session)
}

fn to_tool_error(e: AppError) -> String {
    e.to_string()
}

fn score_response(risks: &[RiskClause]) -> ScoreResponse {
    let value = score(risks);
    let band = ScoreBand::from_score(value);
    ScoreResponse {
        score: value,
        band,
        label: band.label().to_string(),
        color: score_color(value).to_string(),
    }
}

#[tool_handler]
impl ServerHandler for ReviewServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "review-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Document review MCP server. Load extracted document text and its \
                 flagged risk clauses with load_document (or the analysis payload with \
                 load_analysis), then use search_document \
                 to highlight text, locate_clause to jump to a flagged clause, \
                 render_html or get_blocks to display the result, list_risks to \
                 browse risks by level and score_risks for a safety score."
                    .to_string(),
            ),
        }
    }
}
