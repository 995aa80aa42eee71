//! Built-in datatype handlers.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::types::SearchDocument;

use super::DatatypeHandler;

fn skip(datatype: &str, value: &Value, reason: &str) {
    tracing::warn!(datatype, value = %value, "Skipping node value: {}", reason);
}

/// `string`: the value is appended to `strings`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringDatatype;

impl DatatypeHandler for StringDatatype {
    fn name(&self) -> &str {
        "string"
    }

    fn append_to_document(&self, document: &mut SearchDocument, value: &Value) {
        match value {
            Value::String(s) => document.strings.push(s.clone()),
            _ => skip(self.name(), value, "expected a string"),
        }
    }
}

/// `number`: JSON numbers and numeric strings are appended to `numbers`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberDatatype;

impl DatatypeHandler for NumberDatatype {
    fn name(&self) -> &str {
        "number"
    }

    fn append_to_document(&self, document: &mut SearchDocument, value: &Value) {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        match number {
            Some(n) if n.is_finite() => document.numbers.push(n),
            _ => skip(self.name(), value, "expected a number"),
        }
    }
}

/// `date`: partial and full dates are normalised and appended to `dates`.
///
/// Accepted forms are `YYYY`, `YYYY-MM`, `YYYY-MM-DD` and RFC 3339 date-times.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateDatatype;

impl DateDatatype {
    /// Normalises a date string, or returns `None` if it is not a date.
    pub fn normalize(raw: &str) -> Option<String> {
        let raw = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.to_rfc3339());
        }

        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(date.format("%Y-%m-%d").to_string());
        }

        // Year-month and year precision keep their precision
        if raw.len() == 7 && NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d").is_ok()
        {
            return Some(raw.to_string());
        }
        if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
            return Some(raw.to_string());
        }

        None
    }
}

impl DatatypeHandler for DateDatatype {
    fn name(&self) -> &str {
        "date"
    }

    fn append_to_document(&self, document: &mut SearchDocument, value: &Value) {
        match value.as_str().and_then(Self::normalize) {
            Some(date) => document.dates.push(date),
            None => skip(self.name(), value, "expected a date"),
        }
    }
}

/// `boolean`: not indexed into any bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanDatatype;

impl DatatypeHandler for BooleanDatatype {
    fn name(&self) -> &str {
        "boolean"
    }

    fn append_to_document(&self, _document: &mut SearchDocument, _value: &Value) {}
}

/// Single-valued coded datatypes (`concept`, `domain-value`): the value is
/// appended to `domains`.
#[derive(Debug, Clone)]
pub struct DomainDatatype {
    name: String,
}

impl DomainDatatype {
    /// Creates the handler under a datatype key.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl DatatypeHandler for DomainDatatype {
    fn name(&self) -> &str {
        &self.name
    }

    fn append_to_document(&self, document: &mut SearchDocument, value: &Value) {
        document.domains.push(value.clone());
    }
}

/// List-valued coded datatypes (`concept-list`, `domain-value-list`): each
/// non-null element is appended to `domains`.
#[derive(Debug, Clone)]
pub struct DomainListDatatype {
    name: String,
}

impl DomainListDatatype {
    /// Creates the handler under a datatype key.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl DatatypeHandler for DomainListDatatype {
    fn name(&self) -> &str {
        &self.name
    }

    fn append_to_document(&self, document: &mut SearchDocument, value: &Value) {
        match value {
            Value::Array(items) => document
                .domains
                .extend(items.iter().filter(|v| !v.is_null()).cloned()),
            // A lone value is tolerated as a one-element list
            other => document.domains.push(other.clone()),
        }
    }
}

/// `geojson-feature-collection`: the collection is appended to `geometries`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoJsonDatatype;

impl DatatypeHandler for GeoJsonDatatype {
    fn name(&self) -> &str {
        "geojson-feature-collection"
    }

    fn append_to_document(&self, document: &mut SearchDocument, value: &Value) {
        if value.get("type").and_then(Value::as_str).is_some() {
            document.geometries.push(value.clone());
        } else {
            skip(self.name(), value, "expected a GeoJSON object");
        }
    }
}

/// Datatypes stored in tiles but not extracted into buckets
/// (`file-list`, `resource-instance`).
#[derive(Debug, Clone)]
pub struct NonIndexedDatatype {
    name: String,
}

impl NonIndexedDatatype {
    /// Creates the handler under a datatype key.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl DatatypeHandler for NonIndexedDatatype {
    fn name(&self) -> &str {
        &self.name
    }

    fn append_to_document(&self, _document: &mut SearchDocument, _value: &Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apply(handler: &dyn DatatypeHandler, value: Value) -> SearchDocument {
        let mut doc = SearchDocument::default();
        handler.append_to_document(&mut doc, &value);
        doc
    }

    #[test]
    fn test_string_handler() {
        let doc = apply(&StringDatatype, json!("Getty Museum"));
        assert_eq!(doc.strings, vec!["Getty Museum"]);

        let doc = apply(&StringDatatype, json!(42));
        assert!(doc.buckets_empty());
    }

    #[test]
    fn test_number_handler() {
        assert_eq!(apply(&NumberDatatype, json!(12)).numbers, vec![12.0]);
        assert_eq!(apply(&NumberDatatype, json!("3.5")).numbers, vec![3.5]);
        assert!(apply(&NumberDatatype, json!("many")).numbers.is_empty());
    }

    #[test]
    fn test_date_normalize() {
        assert_eq!(
            DateDatatype::normalize("1889-05-06"),
            Some("1889-05-06".to_string())
        );
        assert_eq!(DateDatatype::normalize("1889-05"), Some("1889-05".to_string()));
        assert_eq!(DateDatatype::normalize("1889"), Some("1889".to_string()));
        assert_eq!(
            DateDatatype::normalize("2017-01-02T03:04:05Z"),
            Some("2017-01-02T03:04:05+00:00".to_string())
        );
        assert_eq!(DateDatatype::normalize("1889-13"), None);
        assert_eq!(DateDatatype::normalize("yesterday"), None);
    }

    #[test]
    fn test_date_handler() {
        let doc = apply(&DateDatatype, json!("1974-03-01"));
        assert_eq!(doc.dates, vec!["1974-03-01"]);
        assert!(apply(&DateDatatype, json!(1974)).dates.is_empty());
    }

    #[test]
    fn test_domain_handlers() {
        let doc = apply(&DomainDatatype::new("concept"), json!("c-1"));
        assert_eq!(doc.domains, vec![json!("c-1")]);

        let doc = apply(
            &DomainListDatatype::new("concept-list"),
            json!(["c-1", null, "c-2"]),
        );
        assert_eq!(doc.domains, vec![json!("c-1"), json!("c-2")]);
    }

    #[test]
    fn test_geojson_handler() {
        let fc = json!({"type": "FeatureCollection", "features": []});
        assert_eq!(apply(&GeoJsonDatatype, fc.clone()).geometries, vec![fc]);
        assert!(apply(&GeoJsonDatatype, json!({"features": []})).geometries.is_empty());
    }

    #[test]
    fn test_non_indexed_handlers() {
        assert!(apply(&BooleanDatatype, json!(true)).buckets_empty());
        assert!(apply(&NonIndexedDatatype::new("file-list"), json!([{"name": "a.png"}])).buckets_empty());
    }
}
