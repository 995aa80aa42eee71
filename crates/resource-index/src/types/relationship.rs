//! Relationship records between resources.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A directed edge between two resources, stored canonically and mirrored
/// in the relations index.
///
/// Callers treat relationships as directionless: a resource is related to
/// every resource it shares a record with, in either position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    /// Relationship id.
    pub resourcexid: String,
    /// Resource on the "from" side.
    pub resourceinstanceidfrom: String,
    /// Resource on the "to" side.
    pub resourceinstanceidto: String,
    /// Coded relationship type, resolved to a label at query time.
    pub relationshiptype: String,
    /// Free-text notes on the relationship.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Date the relationship began, as stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datestarted: Option<String>,
    /// Date the relationship ended, as stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dateended: Option<String>,
}

impl RelationshipRecord {
    /// Creates a relationship record.
    pub fn new(
        resourcexid: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        relationshiptype: impl Into<String>,
    ) -> Self {
        Self {
            resourcexid: resourcexid.into(),
            resourceinstanceidfrom: from.into(),
            resourceinstanceidto: to.into(),
            relationshiptype: relationshiptype.into(),
            notes: None,
            datestarted: None,
            dateended: None,
        }
    }

    /// Returns true if the resource is on either side of the record.
    pub fn touches(&self, resource_id: &str) -> bool {
        self.resourceinstanceidfrom == resource_id || self.resourceinstanceidto == resource_id
    }

    /// Returns the endpoint opposite to `resource_id`.
    ///
    /// A self-relationship returns the resource itself.
    pub fn other_endpoint(&self, resource_id: &str) -> &str {
        if self.resourceinstanceidfrom == resource_id {
            &self.resourceinstanceidto
        } else {
            &self.resourceinstanceidfrom
        }
    }
}

/// A relationship as returned by the resolver, with its type label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRelationship {
    /// The stored record, flattened into the serialized form.
    #[serde(flatten)]
    pub record: RelationshipRecord,
    /// Label of `relationshiptype` in the requested language.
    pub preflabel: String,
}

/// The answer to a related-resources query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedResources {
    /// Relationship records on the requested page.
    pub resource_relationships: Vec<ResolvedRelationship>,
    /// Raw document sources of the resources at the other endpoints.
    pub related_resources: Vec<Value>,
    /// Total relationship hits, across all pages.
    pub total: u64,
}
