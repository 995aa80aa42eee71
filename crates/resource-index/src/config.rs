//! Indexing pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, IndexResult};

/// How search terms are written by bulk indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TermWriteMode {
    /// One write per term, after the bulk document write.
    #[default]
    Individual,
    /// Terms are submitted as bulk items to the term index.
    Bulk,
}

impl std::str::FromStr for TermWriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "individual" => Ok(Self::Individual),
            "bulk" => Ok(Self::Bulk),
            _ => Err(format!("unknown term write mode: {}", s)),
        }
    }
}

/// Configuration shared by the indexing, lifecycle and relationship services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Prefix for physical index names (default: `"rix"`).
    /// Indices are named `{prefix}_{logical_name}`.
    #[serde(default = "default_index_prefix")]
    pub index_prefix: String,

    /// Logical index for resource documents (default: `"resource"`).
    #[serde(default = "default_resource_index")]
    pub resource_index: String,

    /// Logical index for relationship records (default: `"resource_relations"`).
    #[serde(default = "default_relations_index")]
    pub relations_index: String,

    /// Logical index for search terms (default: `"term"`).
    #[serde(default = "default_term_index")]
    pub term_index: String,

    /// String values with this many words or more produce no search term.
    /// `None` means every string value produces a term; `Some(0)` means none does.
    #[serde(default)]
    pub words_per_search_term: Option<usize>,

    /// Maximum documents per bulk request. `None` sends one request.
    #[serde(default)]
    pub bulk_batch_size: Option<usize>,

    /// How bulk indexing writes terms.
    #[serde(default)]
    pub term_write_mode: TermWriteMode,

    /// Page size used when collecting relationships during delete (default: 15).
    #[serde(default = "default_relationship_page_size")]
    pub relationship_page_size: usize,

    /// Language for relationship labels during delete (default: `"en-US"`).
    #[serde(default = "default_language")]
    pub default_language: String,
}

fn default_index_prefix() -> String {
    "rix".to_string()
}

fn default_resource_index() -> String {
    "resource".to_string()
}

fn default_relations_index() -> String {
    "resource_relations".to_string()
}

fn default_term_index() -> String {
    "term".to_string()
}

fn default_relationship_page_size() -> usize {
    15
}

fn default_language() -> String {
    "en-US".to_string()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            index_prefix: default_index_prefix(),
            resource_index: default_resource_index(),
            relations_index: default_relations_index(),
            term_index: default_term_index(),
            words_per_search_term: None,
            bulk_batch_size: None,
            term_write_mode: TermWriteMode::default(),
            relationship_page_size: default_relationship_page_size(),
            default_language: default_language(),
        }
    }
}

impl IndexConfig {
    /// Sets the word-count threshold for search terms.
    pub fn with_words_per_search_term(mut self, words: usize) -> Self {
        self.words_per_search_term = Some(words);
        self
    }

    /// Sets the bulk batch size.
    pub fn with_bulk_batch_size(mut self, size: usize) -> Self {
        self.bulk_batch_size = Some(size);
        self
    }

    /// Sets the term write mode.
    pub fn with_term_write_mode(mut self, mode: TermWriteMode) -> Self {
        self.term_write_mode = mode;
        self
    }

    /// Sets the index prefix.
    pub fn with_index_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.index_prefix = prefix.into();
        self
    }

    /// Returns the physical name of a logical index.
    pub fn physical_index(&self, logical: &str) -> String {
        if self.index_prefix.is_empty() {
            logical.to_lowercase()
        } else {
            format!("{}_{}", self.index_prefix, logical).to_lowercase()
        }
    }

    /// Checks the configuration, returning the first problem found.
    pub fn validate(&self) -> IndexResult<()> {
        for (field, value) in [
            ("resource_index", &self.resource_index),
            ("relations_index", &self.relations_index),
            ("term_index", &self.term_index),
        ] {
            if value.trim().is_empty() {
                return Err(IndexError::Config {
                    message: format!("{} cannot be empty", field),
                });
            }
        }

        if self.bulk_batch_size == Some(0) {
            return Err(IndexError::Config {
                message: "bulk_batch_size must be at least 1".to_string(),
            });
        }

        if self.relationship_page_size == 0 {
            return Err(IndexError::Config {
                message: "relationship_page_size must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Applies the term policy to a string value: a term is produced when no
    /// threshold is set or the value has fewer words than the threshold.
    ///
    /// Words are the pieces produced by splitting on single spaces.
    pub fn allows_term(&self, value: &str) -> bool {
        match self.words_per_search_term {
            None => true,
            Some(limit) => value.split(' ').count() < limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = IndexConfig::default();
        assert_eq!(config.resource_index, "resource");
        assert_eq!(config.relations_index, "resource_relations");
        assert_eq!(config.term_index, "term");
        assert_eq!(config.relationship_page_size, 15);
        assert_eq!(config.default_language, "en-US");
        assert_eq!(config.term_write_mode, TermWriteMode::Individual);
        assert!(config.words_per_search_term.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: IndexConfig =
            serde_json::from_str(r#"{"words_per_search_term": 3, "term_write_mode": "bulk"}"#)
                .unwrap();
        assert_eq!(config.words_per_search_term, Some(3));
        assert_eq!(config.term_write_mode, TermWriteMode::Bulk);
        assert_eq!(config.index_prefix, "rix");
    }

    #[test]
    fn test_physical_index() {
        let config = IndexConfig::default();
        assert_eq!(config.physical_index("resource"), "rix_resource");

        let bare = IndexConfig::default().with_index_prefix("");
        assert_eq!(bare.physical_index("Resource"), "resource");
    }

    #[test]
    fn test_allows_term() {
        let unbounded = IndexConfig::default();
        assert!(unbounded.allows_term("a very long value with many words in it"));

        let bounded = IndexConfig::default().with_words_per_search_term(3);
        assert!(bounded.allows_term("Getty Museum"));
        assert!(!bounded.allows_term("J Paul Getty"));
        // Splitting is on single spaces, so doubled spaces count as words
        assert!(!bounded.allows_term("Getty  Museum"));
    }

    #[test]
    fn test_zero_word_threshold_disables_terms() {
        let config = IndexConfig::default().with_words_per_search_term(0);
        assert!(config.validate().is_ok());
        assert!(!config.allows_term("Getty"));
        assert!(!config.allows_term(""));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        assert!(
            IndexConfig::default()
                .with_bulk_batch_size(0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_term_write_mode_from_str() {
        assert_eq!("bulk".parse::<TermWriteMode>(), Ok(TermWriteMode::Bulk));
        assert_eq!(
            "Individual".parse::<TermWriteMode>(),
            Ok(TermWriteMode::Individual)
        );
        assert!("batch".parse::<TermWriteMode>().is_err());
    }
}
