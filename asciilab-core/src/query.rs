//! Catalog filtering (made by FontLab https://www.fontlab.com/)

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use regex::Regex;

#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    search: Option<String>,
    name_patterns: Vec<Regex>,
    favorites_only: bool,
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring filter; blank input clears it.
    pub fn with_search(mut self, search: impl AsRef<str>) -> Self {
        let trimmed = search.as_ref().trim();
        self.search = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        };
        self
    }

    pub fn with_name_patterns(mut self, patterns: Vec<Regex>) -> Self {
        self.name_patterns = patterns;
        self
    }

    pub fn require_favorite(mut self, yes: bool) -> Self {
        self.favorites_only = yes;
        self
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Check whether a typeface name passes every filter.
    pub fn matches(&self, name: &str, favorites: &BTreeSet<String>) -> bool {
        if self.favorites_only && !favorites.contains(name) {
            return false;
        }

        if let Some(needle) = &self.search {
            if !name.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }

        if !self.name_patterns.is_empty() && !self.name_patterns.iter().any(|re| re.is_match(name)) {
            return false;
        }

        true
    }
}

/// Compile user-supplied name patterns, naming the offending one on failure.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).with_context(|| format!("invalid regex: {p}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_is_case_insensitive_substring() {
        let query = CatalogQuery::new().with_search("  SLA ");
        let none = BTreeSet::new();
        assert!(query.matches("Slant Relief", &none));
        assert!(!query.matches("Standard", &none));
    }

    #[test]
    fn blank_search_matches_everything() {
        let query = CatalogQuery::new().with_search("   ");
        assert!(query.search().is_none());
        assert!(query.matches("Anything", &BTreeSet::new()));
    }

    #[test]
    fn patterns_and_favorites_combine() {
        let favorites: BTreeSet<String> = ["Isometric1".to_string()].into();
        let query = CatalogQuery::new()
            .with_name_patterns(compile_patterns(&["^Iso".to_string()]).unwrap())
            .require_favorite(true);

        assert!(query.matches("Isometric1", &favorites));
        assert!(!query.matches("Isometric2", &favorites));
        assert!(!query.matches("Big", &favorites));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = compile_patterns(&["(".to_string()]).unwrap_err();
        assert!(err.to_string().contains("invalid regex: ("));
    }
}
