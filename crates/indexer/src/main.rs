//! Resource Indexer
//!
//! Builds and maintains the search indices of a canonical store snapshot.

mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use helios_resource_index::engine::elasticsearch::ElasticsearchEngine;
use helios_resource_index::engine::MemoryEngine;
use helios_resource_index::labels::StaticLabelResolver;
use helios_resource_index::naming::StaticFunctionResolver;
use helios_resource_index::store::{CanonicalStore, MemoryStore, StoreSnapshot};
use helios_resource_index::types::Resource;
use helios_resource_index::{
    DatatypeRegistry, DynSearchEngine, IndexingService, PrimaryNameResolver, RelationshipResolver,
    ResourceLifecycle,
};
use serde_json::json;
use tracing::{info, warn};

use config::{Command, EngineKind, IndexerConfig};

/// Initializes the tracing subscriber.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "helios_resource_index={level},helios_indexer={level},resource_indexer={level}"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Builds the configured engine; an Elasticsearch cluster must pass a health check.
async fn build_engine(config: &IndexerConfig) -> anyhow::Result<DynSearchEngine> {
    match config.engine {
        EngineKind::Elasticsearch => {
            let es_config = config.elasticsearch_config();
            info!(nodes = ?es_config.nodes, "Connecting to Elasticsearch");
            let engine = ElasticsearchEngine::new(es_config)?;
            engine
                .health_check()
                .await
                .context("Elasticsearch health check failed")?;
            Ok(Arc::new(engine))
        }
        EngineKind::Memory => {
            info!("Using in-memory search engine; nothing will be persisted");
            Ok(Arc::new(MemoryEngine::new()))
        }
    }
}

/// The pipeline wired over one snapshot.
struct Indexer {
    config: IndexerConfig,
    snapshot: StoreSnapshot,
    store: Arc<MemoryStore>,
    indexing: IndexingService,
    relations: RelationshipResolver,
    lifecycle: ResourceLifecycle,
    names: PrimaryNameResolver,
}

impl Indexer {
    async fn new(config: IndexerConfig) -> anyhow::Result<Self> {
        let snapshot = StoreSnapshot::read_from(&config.snapshot)
            .with_context(|| format!("reading snapshot {}", config.snapshot.display()))?;
        info!(
            snapshot = %config.snapshot.display(),
            resources = snapshot.resources.len(),
            relationships = snapshot.relationships.len(),
            "Loaded canonical store snapshot"
        );

        let labels = Arc::new(StaticLabelResolver::from_table(snapshot.labels.clone()));
        let functions = Arc::new(StaticFunctionResolver::from_table(
            snapshot.primary_name_functions.clone(),
        ));
        let store = Arc::new(MemoryStore::from_snapshot(snapshot.clone()));
        let engine = build_engine(&config).await?;
        let index_config = config.index_config();

        let indexing = IndexingService::new(
            Arc::new(DatatypeRegistry::with_builtin()),
            store.clone(),
            engine.clone(),
            index_config.clone(),
        )?;
        let relations = RelationshipResolver::new(engine.clone(), labels, index_config);
        let lifecycle = ResourceLifecycle::new(
            indexing.clone(),
            relations.clone(),
            store.clone(),
            engine,
        );
        let names = PrimaryNameResolver::new(functions, store.clone());

        Ok(Self {
            config,
            snapshot,
            store,
            indexing,
            relations,
            lifecycle,
            names,
        })
    }

    async fn load(&self, id: &str) -> anyhow::Result<Resource> {
        let mut resource = self
            .store
            .load_resource(id)
            .await?
            .with_context(|| format!("resource {} is not in the snapshot", id))?;
        resource.tiles = self.store.tiles_for_resource(id).await?;
        Ok(resource)
    }

    /// Indexes resources and every relationship touching them.
    async fn index(&self, ids: &[String]) -> anyhow::Result<()> {
        self.indexing.initialize().await?;

        let mut resources = Vec::with_capacity(ids.len());
        for id in ids {
            resources.push(self.load(id).await?);
        }
        let report = self.indexing.index_many(&resources).await?;

        let mut relationships = 0;
        for record in self.store.relationships().await? {
            if ids.iter().any(|id| record.touches(id)) {
                self.indexing.index_relationship(&record).await?;
                relationships += 1;
            }
        }

        let failed: Vec<_> = report
            .failed_items()
            .into_iter()
            .map(|item| json!({"index": item.index, "id": item.id, "error": item.error}))
            .collect();
        print_json(&json!({
            "documents": report.documents_written(),
            "terms": report.terms.iter().filter(|t| t.is_ok()).count(),
            "relationships": relationships,
            "requests": report.requests,
            "failed": failed,
        }))?;

        if !report.is_complete() {
            anyhow::bail!("{} items failed to index", failed.len());
        }
        Ok(())
    }

    /// Loads the whole snapshot into the engine, for dry runs.
    async fn prime(&self) -> anyhow::Result<()> {
        self.indexing.initialize().await?;
        let mut resources = Vec::new();
        for id in self.store.resource_ids().await? {
            resources.push(self.load(&id).await?);
        }
        self.indexing.index_many(&resources).await?;
        for record in self.store.relationships().await? {
            self.indexing.index_relationship(&record).await?;
        }
        Ok(())
    }

    async fn delete(&mut self, id: &str) -> anyhow::Result<()> {
        // A resource missing from the store may still have index documents
        let resource = match self.store.load_resource(id).await? {
            Some(resource) => resource,
            None => {
                warn!(resource_id = %id, "Resource not in snapshot; removing index entries only");
                Resource::new(id, "")
            }
        };

        let report = self.lifecycle.delete(&resource).await?;

        self.store.export_into(&mut self.snapshot);
        if self.config.engine == EngineKind::Memory {
            info!("Dry run; snapshot left unchanged");
        } else {
            self.snapshot
                .write_to(&self.config.snapshot)
                .with_context(|| format!("writing snapshot {}", self.config.snapshot.display()))?;
        }

        print_json(&json!({
            "resource_id": report.resource_id,
            "relationships_found": report.relationships_found,
            "relationships_deleted": report.relationships_deleted,
            "relation_documents_deleted": report.relation_documents_deleted,
            "document_deleted": report.document_deleted,
            "resource_deleted": report.resource_deleted,
        }))
    }

    async fn related(
        &self,
        id: &str,
        lang: Option<&str>,
        start: usize,
        limit: usize,
    ) -> anyhow::Result<()> {
        let lang = lang.unwrap_or(&self.config.language);
        let related = self
            .relations
            .related_resources(id, lang, start, limit)
            .await?;
        print_json(&serde_json::to_value(related)?)
    }

    async fn name(&self, id: &str) -> anyhow::Result<()> {
        let resource = self.load(id).await?;
        println!("{}", self.names.primary_name(&resource).await?);
        Ok(())
    }
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = IndexerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        engine = ?config.engine,
        index_prefix = %config.index_prefix,
        command = ?config.command,
        "Starting resource indexer"
    );

    let command = config.command.clone();
    let dry_run = config.engine == EngineKind::Memory;
    let mut indexer = Indexer::new(config).await?;

    if dry_run && matches!(command, Command::Delete { .. } | Command::Related { .. }) {
        indexer.prime().await?;
    }

    match command {
        Command::Init => {
            indexer.indexing.initialize().await?;
            info!(
                resource = %indexer.indexing.resource_index(),
                relations = %indexer.indexing.relations_index(),
                term = %indexer.indexing.term_index(),
                "Indices ready"
            );
        }
        Command::Index { ids, all } => {
            let ids = if all {
                indexer.store.resource_ids().await?
            } else {
                ids
            };
            indexer.index(&ids).await?;
        }
        Command::Delete { id } => indexer.delete(&id).await?,
        Command::Related {
            id,
            lang,
            start,
            limit,
        } => indexer.related(&id, lang.as_deref(), start, limit).await?,
        Command::Name { id } => indexer.name(&id).await?,
    }

    Ok(())
}
