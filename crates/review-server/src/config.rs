use review_core::RenderOptions;

use crate::error::AppError;

/// Server configuration loaded explicitly from environment variables.
///
/// Every variable is optional. Unset render thresholds keep their defaults;
/// an unset rate limit disables search throttling.
#[derive(Debug, Clone)]
pub struct Config {
    pub render: RenderOptions,
    /// Maximum search overlays applied per second; faster calls coalesce into the
    /// latest one. `None` disables the limit.
    pub search_rate_limit_rps: Option<u32>,
}

impl Config {
    /// Optional:
    /// - `REVIEW_MIN_CLAUSE_CHARS`
    /// - `REVIEW_TITLE_MAX_CHARS`
    /// - `REVIEW_HEADING_MAX_CHARS`
    /// - `REVIEW_LOCATE_PROBE_CHARS`
    /// - `REVIEW_LOCATE_CANDIDATE_CHARS`
    /// - `SEARCH_RATE_LIMIT_RPS`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = RenderOptions::default();
        let render = RenderOptions {
            min_clause_chars: parse_var(&lookup, "REVIEW_MIN_CLAUSE_CHARS")?
                .unwrap_or(defaults.min_clause_chars),
            title_max_chars: parse_var(&lookup, "REVIEW_TITLE_MAX_CHARS")?
                .unwrap_or(defaults.title_max_chars),
            heading_max_chars: parse_var(&lookup, "REVIEW_HEADING_MAX_CHARS")?
                .unwrap_or(defaults.heading_max_chars),
            locate_probe_chars: parse_var(&lookup, "REVIEW_LOCATE_PROBE_CHARS")?
                .unwrap_or(defaults.locate_probe_chars),
            locate_candidate_chars: parse_var(&lookup, "REVIEW_LOCATE_CANDIDATE_CHARS")?
                .unwrap_or(defaults.locate_candidate_chars),
        };
        render.validate()?;

        let search_rate_limit_rps =
            parse_var::<u32>(&lookup, "SEARCH_RATE_LIMIT_RPS")?.filter(|&n| n > 0);

        Ok(Self {
            render,
            search_rate_limit_rps,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, AppError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{key} must be a non-negative integer, got '{raw}'"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.render, RenderOptions::default());
        assert_eq!(config.search_rate_limit_rps, None);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("REVIEW_MIN_CLAUSE_CHARS", "8"),
            ("REVIEW_LOCATE_PROBE_CHARS", " 60 "),
            ("SEARCH_RATE_LIMIT_RPS", "5"),
        ])
        .unwrap();
        assert_eq!(config.render.min_clause_chars, 8);
        assert_eq!(config.render.locate_probe_chars, 60);
        assert_eq!(config.render.title_max_chars, 80);
        assert_eq!(config.search_rate_limit_rps, Some(5));
    }

    #[test]
    fn test_zero_rate_limit_disables() {
        let config = config(&[("SEARCH_RATE_LIMIT_RPS", "0")]).unwrap();
        assert_eq!(config.search_rate_limit_rps, None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = config(&[("REVIEW_TITLE_MAX_CHARS", "wide")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = config(&[("REVIEW_LOCATE_CANDIDATE_CHARS", "0")]).unwrap_err();
        assert!(matches!(err, AppError::Review(_)));
    }
}
