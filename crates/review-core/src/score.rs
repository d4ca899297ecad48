//! Document safety score.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::RiskClause;

/// Score in `[0, 100]`: 100 for no risks, minus 8 / 20 / 35 per low / medium /
/// high risk, floored at zero.
pub fn score(risks: &[RiskClause]) -> u8 {
    let penalty: u32 = risks.iter().map(|r| r.risk_level.penalty()).sum();
    100u32.saturating_sub(penalty) as u8
}

/// Coarse reading of a score for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    VerySafe,
    GenerallySafe,
    ReviewFlagged,
    Caution,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => ScoreBand::VerySafe,
            70..=89 => ScoreBand::GenerallySafe,
            50..=69 => ScoreBand::ReviewFlagged,
            _ => ScoreBand::Caution,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::VerySafe => "Very safe to sign",
            ScoreBand::GenerallySafe => "Generally safe",
            ScoreBand::ReviewFlagged => "Review flagged items",
            ScoreBand::Caution => "Exercise caution",
        }
    }
}

/// Gauge color for a score.
pub fn score_color(score: u8) -> &'static str {
    match score {
        80.. => "#16a34a",
        50..=79 => "#ca8a04",
        _ => "#dc2626",
    }
}
