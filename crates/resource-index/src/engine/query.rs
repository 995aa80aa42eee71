//! Search queries and their Elasticsearch Query DSL translation.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::types::TYPE_KEY_FIELD;

/// How the term filters of a query are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// A hit matches at least one filter.
    #[default]
    Or,
    /// A hit matches every filter.
    And,
}

/// Exact-match filter on a keyword field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsFilter {
    /// Field name.
    pub field: String,
    /// Accepted values; a field matches if it equals any of them.
    pub terms: Vec<String>,
}

impl TermsFilter {
    /// Creates a filter accepting a single value.
    pub fn new(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            terms: vec![term.into()],
        }
    }

    /// Returns true if the JSON value of the field is accepted.
    ///
    /// Array fields match if any element is accepted.
    pub fn matches(&self, source: &Value) -> bool {
        match source.get(&self.field) {
            Some(Value::Array(items)) => items.iter().any(|v| self.accepts(v)),
            Some(value) => self.accepts(value),
            None => false,
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => self.terms.iter().any(|t| t == s),
            Value::Null => false,
            other => {
                let rendered = other.to_string();
                self.terms.iter().any(|t| *t == rendered)
            }
        }
    }

    fn to_dsl(&self) -> Value {
        json!({ "terms": { self.field.as_str(): self.terms } })
    }
}

/// A paginated search over one index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Term filters.
    pub filters: Vec<TermsFilter>,
    /// How the filters are combined.
    pub operator: FilterOperator,
    /// Offset of the first hit.
    pub start: usize,
    /// Maximum hits returned.
    pub limit: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            operator: FilterOperator::default(),
            start: 0,
            limit: 10,
        }
    }
}

impl SearchQuery {
    /// Creates a query matching hits that satisfy any of the filters.
    pub fn any_of(filters: Vec<TermsFilter>) -> Self {
        Self {
            filters,
            operator: FilterOperator::Or,
            ..Self::default()
        }
    }

    /// Creates a query matching hits that satisfy all of the filters.
    pub fn all_of(filters: Vec<TermsFilter>) -> Self {
        Self {
            filters,
            operator: FilterOperator::And,
            ..Self::default()
        }
    }

    /// Sets the page window.
    pub fn paginate(mut self, start: usize, limit: usize) -> Self {
        self.start = start;
        self.limit = limit;
        self
    }

    /// Returns true if a document source satisfies the filters.
    ///
    /// A query without filters matches everything.
    pub fn matches(&self, source: &Value) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        match self.operator {
            FilterOperator::Or => self.filters.iter().any(|f| f.matches(source)),
            FilterOperator::And => self.filters.iter().all(|f| f.matches(source)),
        }
    }

    /// Builds the Query DSL body, restricted to a type key when one is given.
    pub fn to_dsl(&self, type_key: Option<&str>) -> Value {
        let clauses: Vec<Value> = self.filters.iter().map(TermsFilter::to_dsl).collect();

        let mut bool_query = json!({});
        if !clauses.is_empty() {
            match self.operator {
                FilterOperator::Or => {
                    bool_query["should"] = json!(clauses);
                    bool_query["minimum_should_match"] = json!(1);
                }
                FilterOperator::And => {
                    bool_query["must"] = json!(clauses);
                }
            }
        }

        if let Some(type_key) = type_key {
            bool_query["filter"] = json!([{ "term": { TYPE_KEY_FIELD: type_key } }]);
        }

        let query = if bool_query.as_object().is_some_and(|o| o.is_empty()) {
            json!({ "match_all": {} })
        } else {
            json!({ "bool": bool_query })
        };

        json!({
            "query": query,
            "from": self.start,
            "size": self.limit,
            "track_total_hits": true,
        })
    }
}
