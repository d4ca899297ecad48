use crate::error::{ReviewError, ReviewResult};

/// Tunable thresholds for the rendering pipeline.
///
/// Defaults reproduce the behaviour the review UI was built around; servers may
/// override them from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Clauses whose collapsed text is shorter than this are never highlighted.
    pub min_clause_chars: usize,
    /// The first non-blank line becomes the document title when shorter than this.
    pub title_max_chars: usize,
    /// Short capitalized lines below this length become section headings.
    pub heading_max_chars: usize,
    /// Length of the normalized clause prefix used to locate a highlight.
    pub locate_probe_chars: usize,
    /// Length of the candidate prefix accepted when the clause was truncated.
    pub locate_candidate_chars: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            min_clause_chars: 5,
            title_max_chars: 80,
            heading_max_chars: 60,
            locate_probe_chars: 40,
            locate_candidate_chars: 30,
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> ReviewResult<()> {
        let checks = [
            ("min_clause_chars", self.min_clause_chars),
            ("title_max_chars", self.title_max_chars),
            ("heading_max_chars", self.heading_max_chars),
            ("locate_probe_chars", self.locate_probe_chars),
            ("locate_candidate_chars", self.locate_candidate_chars),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(ReviewError::InvalidOption {
                    name,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = RenderOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.min_clause_chars, 5);
        assert_eq!(options.locate_probe_chars, 40);
    }

    #[test]
    fn test_zero_probe_rejected() {
        let options = RenderOptions {
            locate_probe_chars: 0,
            ..RenderOptions::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("locate_probe_chars"));
    }
}
