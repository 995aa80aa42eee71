//! Indexing service.
//!
//! Pushes assembled documents and their terms into the search engine,
//! one resource at a time or in bulk, and mirrors relationship records
//! into the relations index.
//!
//! Neither path is atomic: the document write and the term writes are
//! separate requests. Term failures never fail a call; they are logged and
//! reported in the returned [`IndexOutcome`] or [`BulkIndexReport`]. A bulk
//! call raises only when its first document request fails outright.

use std::collections::HashSet;
use std::sync::Arc;

use crate::assembler::{AssembledDocument, DocumentAssembler};
use crate::config::{IndexConfig, TermWriteMode};
use crate::datatypes::DatatypeRegistry;
use crate::engine::{BulkItem, BulkItemResult, DynSearchEngine, IndexKind};
use crate::error::IndexResult;
use crate::store::DynCanonicalStore;
use crate::types::{RelationshipRecord, Resource, SearchTerm};

/// A term that could not be written.
#[derive(Debug, Clone, PartialEq)]
pub struct TermFailure {
    /// The term's id (`{tileid}_{nodeid}`).
    pub term_id: String,
    /// Why the write failed.
    pub error: String,
}

/// The outcome of indexing a single resource.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexOutcome {
    /// The indexed resource.
    pub resource_id: String,
    /// Terms written to the term index.
    pub terms_written: usize,
    /// Terms that could not be written.
    pub term_failures: Vec<TermFailure>,
}

impl IndexOutcome {
    /// Returns true if every term was written.
    pub fn is_complete(&self) -> bool {
        self.term_failures.is_empty()
    }
}

/// Per-item results of a bulk indexing call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkIndexReport {
    /// One result per resource document, in input order.
    pub documents: Vec<BulkItemResult>,
    /// One result per term, in assembly order.
    pub terms: Vec<BulkItemResult>,
    /// Number of bulk requests sent.
    pub requests: usize,
}

impl BulkIndexReport {
    /// Returns every failed document and term item.
    pub fn failed_items(&self) -> Vec<&BulkItemResult> {
        self.documents
            .iter()
            .chain(self.terms.iter())
            .filter(|r| !r.is_ok())
            .collect()
    }

    /// Returns the number of documents written.
    pub fn documents_written(&self) -> usize {
        self.documents.iter().filter(|r| r.is_ok()).count()
    }

    /// Returns true if no item failed.
    pub fn is_complete(&self) -> bool {
        self.failed_items().is_empty()
    }
}

/// What [`IndexingService::send_batches`] does with a failed bulk request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchFailure {
    /// Raise the error if no earlier request succeeded.
    RaiseFirst,
    /// Always report the unsent items as failed.
    Report,
}

/// Writes resources, terms and relationships into the search engine.
#[derive(Clone)]
pub struct IndexingService {
    assembler: DocumentAssembler,
    store: DynCanonicalStore,
    engine: DynSearchEngine,
    config: IndexConfig,
}

impl std::fmt::Debug for IndexingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexingService")
            .field("engine", &self.engine.engine_name())
            .field("store", &self.store.store_name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl IndexingService {
    /// Creates the service, validating the configuration.
    pub fn new(
        registry: Arc<DatatypeRegistry>,
        store: DynCanonicalStore,
        engine: DynSearchEngine,
        config: IndexConfig,
    ) -> IndexResult<Self> {
        config.validate()?;
        let assembler = DocumentAssembler::new(registry, store.clone(), config.clone());
        Ok(Self {
            assembler,
            store,
            engine,
            config,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Returns the document assembler.
    pub fn assembler(&self) -> &DocumentAssembler {
        &self.assembler
    }

    /// Physical name of the resource index.
    pub fn resource_index(&self) -> String {
        self.config.physical_index(&self.config.resource_index)
    }

    /// Physical name of the relations index.
    pub fn relations_index(&self) -> String {
        self.config.physical_index(&self.config.relations_index)
    }

    /// Physical name of the term index.
    pub fn term_index(&self) -> String {
        self.config.physical_index(&self.config.term_index)
    }

    /// Creates the resource, relations and term indices if missing.
    pub async fn initialize(&self) -> IndexResult<()> {
        for (index, kind) in [
            (self.resource_index(), IndexKind::Resource),
            (self.relations_index(), IndexKind::Relations),
            (self.term_index(), IndexKind::Term),
        ] {
            self.engine.ensure_index(&index, kind).await?;
        }
        tracing::info!(
            engine = self.engine.engine_name(),
            prefix = %self.config.index_prefix,
            "Search indices ready"
        );
        Ok(())
    }

    /// Assembles the document and terms for a resource.
    ///
    /// With `fetch_tiles` the tiles are read from the canonical store;
    /// otherwise the tiles attached to `resource` are used.
    pub async fn documents_to_index(
        &self,
        resource: &Resource,
        fetch_tiles: bool,
    ) -> IndexResult<AssembledDocument> {
        if fetch_tiles {
            let tiles = self.store.tiles_for_resource(&resource.id).await?;
            self.assembler.assemble(resource, &tiles).await
        } else {
            self.assembler.assemble(resource, &resource.tiles).await
        }
    }

    /// Indexes one resource: its document, then each of its terms.
    ///
    /// Tiles are always fetched from the canonical store.
    pub async fn index_one(&self, resource: &Resource) -> IndexResult<IndexOutcome> {
        let AssembledDocument { document, terms } = self.documents_to_index(resource, true).await?;

        self.engine
            .index_document(
                &self.resource_index(),
                Some(&resource.graph_id),
                &resource.id,
                document.to_source()?,
            )
            .await?;

        let term_index = self.term_index();
        let mut outcome = IndexOutcome {
            resource_id: resource.id.clone(),
            terms_written: 0,
            term_failures: Vec::new(),
        };
        for term in &terms {
            match self.engine.index_term(&term_index, term).await {
                Ok(()) => outcome.terms_written += 1,
                Err(e) => {
                    tracing::warn!(
                        resource_id = %resource.id,
                        term_id = %term.term_id,
                        error = %e,
                        "Failed to index search term"
                    );
                    outcome.term_failures.push(TermFailure {
                        term_id: term.term_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            resource_id = %resource.id,
            graph_id = %resource.graph_id,
            terms = outcome.terms_written,
            failed_terms = outcome.term_failures.len(),
            "Indexed resource"
        );
        Ok(outcome)
    }

    /// Indexes many resources with bulk document writes.
    ///
    /// Tiles must already be attached to each resource; the canonical store
    /// is not consulted for them. Documents are sent in batches of
    /// `bulk_batch_size` (one request when unset), then terms are written
    /// according to `term_write_mode`. Terms of a resource whose document
    /// was not written are skipped.
    ///
    /// Rejected items are listed in the report, not raised. A failed bulk
    /// request is raised only when it is the first document request; once
    /// anything has been written, the items of the failed request and of
    /// every later one are reported as failed instead.
    pub async fn index_many(&self, resources: &[Resource]) -> IndexResult<BulkIndexReport> {
        let resource_index = self.resource_index();
        let mut items = Vec::with_capacity(resources.len());
        let mut terms: Vec<(String, SearchTerm)> = Vec::new();

        for resource in resources {
            let assembled = self.documents_to_index(resource, false).await?;
            let document = &assembled.document;
            let graph_id = document.graph_id().unwrap_or(&resource.graph_id);
            let id = document.resource_id().unwrap_or(&resource.id).to_string();
            items.push(self.engine.create_bulk_item(
                &resource_index,
                Some(graph_id),
                &id,
                document.to_source()?,
            ));
            terms.extend(assembled.terms.into_iter().map(|term| (id.clone(), term)));
        }

        let mut report = BulkIndexReport::default();
        report.documents = self
            .send_batches(items, BatchFailure::RaiseFirst, &mut report.requests)
            .await?;

        let written: HashSet<&str> = report
            .documents
            .iter()
            .filter(|r| r.is_ok())
            .map(|r| r.id.as_str())
            .collect();
        let terms: Vec<SearchTerm> = terms
            .into_iter()
            .filter(|(id, _)| written.contains(id.as_str()))
            .map(|(_, term)| term)
            .collect();

        let term_index = self.term_index();
        match self.config.term_write_mode {
            TermWriteMode::Individual => {
                for term in &terms {
                    let result = match self.engine.index_term(&term_index, term).await {
                        Ok(()) => BulkItemResult::ok(&term_index, &term.term_id),
                        Err(e) => {
                            tracing::warn!(term_id = %term.term_id, error = %e, "Failed to index search term");
                            BulkItemResult::failed(&term_index, &term.term_id, e.to_string())
                        }
                    };
                    report.terms.push(result);
                }
            }
            TermWriteMode::Bulk => {
                let term_items = terms
                    .iter()
                    .map(|term| {
                        self.engine
                            .create_bulk_item(&term_index, None, &term.term_id, term.to_source())
                    })
                    .collect();
                report.terms = self
                    .send_batches(term_items, BatchFailure::Report, &mut report.requests)
                    .await?;
            }
        }

        let failed = report.failed_items().len();
        if failed > 0 {
            tracing::warn!(
                resources = resources.len(),
                failed,
                "Bulk indexing finished with failed items"
            );
        } else {
            tracing::info!(
                resources = resources.len(),
                terms = report.terms.len(),
                requests = report.requests,
                "Bulk indexed resources"
            );
        }
        Ok(report)
    }

    /// Sends `items` in batches and returns one result per item.
    ///
    /// Every attempted request is counted. After a failed request nothing
    /// more is sent.
    async fn send_batches(
        &self,
        items: Vec<BulkItem>,
        on_failure: BatchFailure,
        requests: &mut usize,
    ) -> IndexResult<Vec<BulkItemResult>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let batch_size = self.config.bulk_batch_size.unwrap_or(items.len()).max(1);
        let mut results = Vec::with_capacity(items.len());
        let mut remaining = items;
        while !remaining.is_empty() {
            let rest = remaining.split_off(batch_size.min(remaining.len()));
            let keys: Vec<(String, String)> = remaining
                .iter()
                .map(|item| (item.index.clone(), item.id.clone()))
                .collect();
            *requests += 1;

            match self.engine.bulk_index(remaining).await {
                Ok(batch) => results.extend(batch),
                Err(e) if results.is_empty() && on_failure == BatchFailure::RaiseFirst => {
                    return Err(e);
                }
                Err(e) => {
                    let reason = e.to_string();
                    tracing::warn!(
                        failed = keys.len() + rest.len(),
                        error = %reason,
                        "Bulk request failed; remaining items not sent"
                    );
                    results.extend(
                        keys.into_iter()
                            .chain(rest.into_iter().map(|item| (item.index, item.id)))
                            .map(|(index, id)| BulkItemResult::failed(index, id, reason.clone())),
                    );
                    break;
                }
            }
            remaining = rest;
        }
        Ok(results)
    }

    /// Writes a relationship record into the relations index, keyed by its id.
    pub async fn index_relationship(&self, record: &RelationshipRecord) -> IndexResult<()> {
        self.engine
            .index_document(
                &self.relations_index(),
                None,
                &record.resourcexid,
                serde_json::to_value(record)?,
            )
            .await?;
        tracing::debug!(resourcexid = %record.resourcexid, "Indexed relationship");
        Ok(())
    }
}
