//! Relationship queries.

use crate::config::IndexConfig;
use crate::engine::{DynSearchEngine, SearchQuery, TermsFilter};
use crate::error::IndexResult;
use crate::labels::DynLabelResolver;
use crate::types::{RelatedResources, RelationshipRecord, ResolvedRelationship};

/// One page of relationship records touching a resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipPage {
    /// Records on the page, labels resolved.
    pub relationships: Vec<ResolvedRelationship>,
    /// Total records touching the resource.
    pub total: u64,
}

/// Answers "what is this resource related to" from the relations index.
#[derive(Clone)]
pub struct RelationshipResolver {
    engine: DynSearchEngine,
    labels: DynLabelResolver,
    config: IndexConfig,
}

impl std::fmt::Debug for RelationshipResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationshipResolver")
            .field("engine", &self.engine.engine_name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RelationshipResolver {
    /// Creates a resolver.
    pub fn new(engine: DynSearchEngine, labels: DynLabelResolver, config: IndexConfig) -> Self {
        Self {
            engine,
            labels,
            config,
        }
    }

    fn either_endpoint(resource_id: &str) -> SearchQuery {
        SearchQuery::any_of(vec![
            TermsFilter::new("resourceinstanceidfrom", resource_id),
            TermsFilter::new("resourceinstanceidto", resource_id),
        ])
    }

    /// Returns one page of relationship records with `resource_id` at either
    /// end, in the engine's order.
    ///
    /// A relationship type without a label keeps its raw value as label.
    pub async fn relationship_page(
        &self,
        resource_id: &str,
        lang: &str,
        start: usize,
        limit: usize,
    ) -> IndexResult<RelationshipPage> {
        let relations_index = self.config.physical_index(&self.config.relations_index);
        let query = Self::either_endpoint(resource_id).paginate(start, limit);
        let hits = self.engine.search(&relations_index, None, &query).await?;

        let mut relationships = Vec::with_capacity(hits.hits.len());
        for hit in hits.hits {
            let record: RelationshipRecord = serde_json::from_value(hit.source)?;
            let preflabel = self
                .labels
                .preferred_label(&record.relationshiptype, lang)
                .await?
                .unwrap_or_else(|| record.relationshiptype.clone());
            relationships.push(ResolvedRelationship { record, preflabel });
        }

        Ok(RelationshipPage {
            relationships,
            total: hits.total,
        })
    }

    /// Collects every relationship record touching a resource, page by page.
    pub async fn all_relationships(
        &self,
        resource_id: &str,
        lang: &str,
    ) -> IndexResult<Vec<ResolvedRelationship>> {
        let page_size = self.config.relationship_page_size.max(1);
        let mut collected = Vec::new();
        let mut start = 0;

        loop {
            let page = self
                .relationship_page(resource_id, lang, start, page_size)
                .await?;
            let fetched = page.relationships.len();
            collected.extend(page.relationships);
            start += page_size;

            if fetched == 0 || start as u64 >= page.total {
                break;
            }
        }

        Ok(collected)
    }

    /// Returns the relationships of a resource and the documents of the
    /// resources at their other ends.
    ///
    /// The querying resource never appears among the related documents.
    /// `total` counts relationship records across all pages.
    pub async fn related_resources(
        &self,
        resource_id: &str,
        lang: &str,
        start: usize,
        limit: usize,
    ) -> IndexResult<RelatedResources> {
        let page = self
            .relationship_page(resource_id, lang, start, limit)
            .await?;

        let mut candidates: Vec<String> = Vec::new();
        for relationship in &page.relationships {
            for id in [
                &relationship.record.resourceinstanceidfrom,
                &relationship.record.resourceinstanceidto,
            ] {
                if id != resource_id && !candidates.contains(id) {
                    candidates.push(id.clone());
                }
            }
        }

        let related_resources = if candidates.is_empty() {
            Vec::new()
        } else {
            let resource_index = self.config.physical_index(&self.config.resource_index);
            self.engine
                .multi_get(&resource_index, None, &candidates)
                .await?
        };

        tracing::debug!(
            resource_id,
            total = page.total,
            related = related_resources.len(),
            "Resolved related resources"
        );

        Ok(RelatedResources {
            resource_relationships: page.relationships,
            related_resources,
            total: page.total,
        })
    }
}
