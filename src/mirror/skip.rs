//! Pages excluded from the crawl before any fetch is issued.

use regex::Regex;

use crate::config::{ConfigError, SkipConfig, SkipException};

#[derive(Debug, Clone)]
enum SkipRule {
    Pattern(Regex),
    /// Everything under `prefix` except the exact path `allowed`.
    PrefixExcept { prefix: String, allowed: String },
}

impl SkipRule {
    fn matches(&self, path: &str) -> bool {
        match self {
            SkipRule::Pattern(re) => re.is_match(path),
            SkipRule::PrefixExcept { prefix, allowed } => {
                path.starts_with(prefix.as_str()) && path != allowed
            }
        }
    }
}

/// Predicate deciding whether a discovered page path is skipped.
#[derive(Debug, Clone, Default)]
pub struct SkipFilter {
    rules: Vec<SkipRule>,
}

impl SkipFilter {
    pub fn from_config(config: &SkipConfig) -> Result<Self, ConfigError> {
        let mut rules = Vec::with_capacity(config.patterns.len() + config.exceptions.len());

        for pattern in &config.patterns {
            let re = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            rules.push(SkipRule::Pattern(re));
        }

        for SkipException { prefix, allowed } in &config.exceptions {
            rules.push(SkipRule::PrefixExcept {
                prefix: prefix.clone(),
                allowed: allowed.clone(),
            });
        }

        Ok(Self { rules })
    }

    pub fn should_skip(&self, page_path: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(page_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_filter() -> SkipFilter {
        SkipFilter::from_config(&SkipConfig::default()).unwrap()
    }

    #[test]
    fn test_admin_namespace_skipped() {
        let filter = default_filter();
        assert!(filter.should_skip("/wiki/TracAdmin"));
        assert!(filter.should_skip("/wiki/TracGuide"));
        assert!(!filter.should_skip("/wiki/Start"));
    }

    #[test]
    fn test_exact_page_skipped() {
        let filter = default_filter();
        assert!(filter.should_skip("/wiki/SandBox"));
        assert!(!filter.should_skip("/wiki/SandBoxes"));
    }

    #[test]
    fn test_prefix_with_single_exception() {
        let filter = default_filter();
        assert!(!filter.should_skip("/wiki/WikiStart"));
        assert!(filter.should_skip("/wiki/WikiFormatting"));
        assert!(filter.should_skip("/wiki/WikiStartOld"));
        assert!(filter.should_skip("/wiki/Wiki"));
    }

    #[test]
    fn test_empty_filter_skips_nothing() {
        let filter = SkipFilter::default();
        assert!(!filter.should_skip("/wiki/TracAdmin"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let config = SkipConfig {
            patterns: vec!["[".to_string()],
            exceptions: vec![],
        };
        assert!(SkipFilter::from_config(&config).is_err());
    }
}
