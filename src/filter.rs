//! Profile exclusion rules
//!
//! Profiles used for traffic capture or testing never receive the build
//! number. Each rule is a pattern searched for anywhere in the profile
//! identifier, so `"test"` also excludes `"unit-test"` and `"contest"`.

use regex_lite::Regex;

/// Built-in exclusion patterns, always active
pub const DEFAULT_EXCLUSIONS: &[&str] = &["capture", "test"];

/// Errors building exclusion rules
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("invalid exclusion pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex_lite::Error,
    },
}

/// Declarative set of exclusion rules
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    rules: Vec<Regex>,
}

impl ExclusionRules {
    /// Create the built-in rule set
    pub fn new() -> Self {
        let rules = DEFAULT_EXCLUSIONS
            .iter()
            .map(|p| Regex::new(&regex_lite::escape(p)).expect("built-in pattern is a literal"))
            .collect();
        Self { rules }
    }

    /// Add patterns on top of the built-in rules
    pub fn with_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self, FilterError> {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if pattern.is_empty() {
                continue;
            }
            let regex = Regex::new(pattern).map_err(|source| FilterError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
            self.rules.push(regex);
        }
        Ok(self)
    }

    /// Check if a profile identifier matches any rule
    pub fn is_excluded(&self, id: &str) -> bool {
        self.rules.iter().any(|rule| rule.is_match(id))
    }

    /// Keep the identifiers that match no rule, preserving order
    pub fn retain(&self, ids: &[String]) -> Vec<String> {
        ids.iter()
            .filter(|id| !self.is_excluded(id))
            .cloned()
            .collect()
    }

    /// Split identifiers into `(retained, excluded)`, both order-preserving
    pub fn partition(&self, ids: &[String]) -> (Vec<String>, Vec<String>) {
        ids.iter().cloned().partition(|id| !self.is_excluded(id))
    }
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self::new()
    }
}
