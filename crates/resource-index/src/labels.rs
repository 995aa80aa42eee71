//! Relationship type labels.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::IndexResult;

/// Type alias for a shared label resolver.
pub type DynLabelResolver = Arc<dyn LabelResolver>;

/// Resolves coded values to human-readable labels.
#[async_trait]
pub trait LabelResolver: Send + Sync {
    /// Returns the preferred label of a value in a language, if it has one.
    async fn preferred_label(&self, value_id: &str, lang: &str) -> IndexResult<Option<String>>;
}

/// A label table held in memory.
///
/// Lookups fall back from a regional language (`en-US`) to its base
/// language (`en`).
#[derive(Debug, Clone, Default)]
pub struct StaticLabelResolver {
    labels: HashMap<String, HashMap<String, String>>,
}

impl StaticLabelResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver from value id to language to label.
    pub fn from_table(labels: HashMap<String, HashMap<String, String>>) -> Self {
        Self { labels }
    }

    /// Adds a label.
    pub fn with_label(
        mut self,
        value_id: impl Into<String>,
        lang: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.labels
            .entry(value_id.into())
            .or_default()
            .insert(lang.into(), label.into());
        self
    }
}

#[async_trait]
impl LabelResolver for StaticLabelResolver {
    async fn preferred_label(&self, value_id: &str, lang: &str) -> IndexResult<Option<String>> {
        let Some(by_lang) = self.labels.get(value_id) else {
            return Ok(None);
        };

        let base = lang.split('-').next().unwrap_or(lang);
        Ok(by_lang.get(lang).or_else(|| by_lang.get(base)).cloned())
    }
}
