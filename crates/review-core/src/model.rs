use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ReviewError;

/// Severity assigned to a flagged clause by the upstream analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Score penalty contributed by one clause of this level.
    pub fn penalty(self) -> u32 {
        match self {
            RiskLevel::Low => 8,
            RiskLevel::Medium => 20,
            RiskLevel::High => 35,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(ReviewError::InvalidRiskLevel(s.to_string())),
        }
    }
}

// Upstream analysis output is free text; anything that is not low or medium is
// scored as high, so it deserializes as high too.
impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(RiskLevel::High))
    }
}

/// A clause flagged by the external analysis step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RiskClause {
    /// Why the clause is concerning; shown as the highlight tooltip.
    #[serde(default)]
    pub description: String,
    /// Verbatim excerpt of the source text (whitespace may differ).
    #[serde(default)]
    pub clause: String,
    #[serde(default)]
    pub risk_level: RiskLevel,
}

impl RiskClause {
    pub fn new(
        clause: impl Into<String>,
        risk_level: RiskLevel,
        description: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            clause: clause.into(),
            risk_level,
        }
    }
}

/// Extracted text plus its classified risks. Replaced wholesale on every new
/// analysis; never patched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    pub raw_text: String,
    pub risks: Vec<RiskClause>,
}

impl Document {
    pub fn new(raw_text: impl Into<String>, risks: Vec<RiskClause>) -> Self {
        Self {
            raw_text: raw_text.into(),
            risks,
        }
    }
}

/// Summary block produced by the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct DocumentSummary {
    /// Detected document type, e.g. "lease" or "NDA".
    #[serde(default)]
    pub document_type: Option<String>,
    /// Bullet-point summary.
    #[serde(default)]
    pub summary: Vec<String>,
    #[serde(default)]
    pub flagged_risks: Vec<RiskClause>,
    /// Questions to clarify before signing.
    #[serde(default)]
    pub questions_to_ask: Vec<String>,
    #[serde(default)]
    pub word_count: u64,
}

/// Full payload received from the analysis collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisPayload {
    /// Extracted plain text of the document.
    #[serde(alias = "full_text", default)]
    pub raw_text: String,
    #[serde(default)]
    pub summary: DocumentSummary,
}

impl AnalysisPayload {
    pub fn into_document(self) -> Document {
        Document {
            raw_text: self.raw_text,
            risks: self.summary.flagged_risks,
        }
    }
}

/// Which risk levels the presentation layer currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskFilter {
    pub high: bool,
    pub medium: bool,
    pub low: bool,
}

impl Default for RiskFilter {
    fn default() -> Self {
        Self {
            high: true,
            medium: true,
            low: true,
        }
    }
}

impl RiskFilter {
    /// Filter admitting only the given levels.
    pub fn only(levels: &[RiskLevel]) -> Self {
        Self {
            high: levels.contains(&RiskLevel::High),
            medium: levels.contains(&RiskLevel::Medium),
            low: levels.contains(&RiskLevel::Low),
        }
    }

    pub fn allows(&self, level: RiskLevel) -> bool {
        match level {
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => self.low,
        }
    }

    /// Risks admitted by the filter, in document order, paired with their
    /// index in the unfiltered list.
    pub fn apply<'a>(&self, risks: &'a [RiskClause]) -> Vec<(usize, &'a RiskClause)> {
        risks
            .iter()
            .enumerate()
            .filter(|(_, r)| self.allows(r.risk_level))
            .collect()
    }
}
