//! Primary display names of resources.
//!
//! A resource's display name is computed, not stored. Each graph may
//! configure a `primaryname` function; the [`PrimaryNameResolver`]
//! evaluates it when exactly one is configured and otherwise degrades to
//! [`UNDEFINED_NAME`].

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{IndexError, IndexResult};
use crate::store::DynCanonicalStore;
use crate::types::{Resource, Tile, is_empty_value};

/// Name returned when a graph has zero or several naming functions.
pub const UNDEFINED_NAME: &str = "undefined";

/// Computes a display name from a resource and one function config.
pub trait PrimaryNameFunction: Send + Sync + Debug {
    /// Evaluates the function for a resource whose tiles are given.
    fn get(&self, resource: &Resource, tiles: &[Tile], config: &Value) -> IndexResult<String>;
}

/// Looks up the naming-function configs of a graph.
#[async_trait]
pub trait FunctionResolver: Send + Sync {
    /// Returns the configs of every `primaryname` function attached to the graph.
    async fn primary_name_functions(&self, graph_id: &str) -> IndexResult<Vec<Value>>;
}

/// Function configs held in memory, by graph id.
#[derive(Debug, Clone, Default)]
pub struct StaticFunctionResolver {
    functions: HashMap<String, Vec<Value>>,
}

impl StaticFunctionResolver {
    /// Creates a resolver with no functions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver from graph id to function configs.
    pub fn from_table(functions: HashMap<String, Vec<Value>>) -> Self {
        Self { functions }
    }

    /// Attaches a function config to a graph.
    pub fn with_function(mut self, graph_id: impl Into<String>, config: Value) -> Self {
        self.functions.entry(graph_id.into()).or_default().push(config);
        self
    }
}

#[async_trait]
impl FunctionResolver for StaticFunctionResolver {
    async fn primary_name_functions(&self, graph_id: &str) -> IndexResult<Vec<Value>> {
        Ok(self.functions.get(graph_id).cloned().unwrap_or_default())
    }
}

/// Fills a `string_template` with node values.
///
/// Config: `{"string_template": "<node-id> (<other-node-id>)"}`. Each
/// `<node-id>` placeholder is replaced by the first non-empty value of that
/// node across the tiles, or by nothing when the node has no value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNameFunction;

impl TemplateNameFunction {
    fn node_value(tiles: &[Tile], node_id: &str) -> String {
        tiles
            .iter()
            .filter_map(|tile| tile.value(node_id))
            .find(|value| !is_empty_value(value))
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default()
    }
}

impl PrimaryNameFunction for TemplateNameFunction {
    fn get(&self, _resource: &Resource, tiles: &[Tile], config: &Value) -> IndexResult<String> {
        let template = config
            .get("string_template")
            .and_then(Value::as_str)
            .ok_or_else(|| IndexError::Config {
                message: "primary name function config has no string_template".to_string(),
            })?;

        let mut name = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('<') {
            let Some(close) = rest[open..].find('>') else {
                break;
            };
            name.push_str(&rest[..open]);
            let node_id = &rest[open + 1..open + close];
            name.push_str(&Self::node_value(tiles, node_id));
            rest = &rest[open + close + 1..];
        }
        name.push_str(rest);

        Ok(name.trim().to_string())
    }
}

/// Resolves and evaluates the naming function of a resource's graph.
pub struct PrimaryNameResolver {
    functions: Arc<dyn FunctionResolver>,
    function: Arc<dyn PrimaryNameFunction>,
    store: DynCanonicalStore,
}

impl PrimaryNameResolver {
    /// Creates a resolver evaluating configs with [`TemplateNameFunction`].
    pub fn new(functions: Arc<dyn FunctionResolver>, store: DynCanonicalStore) -> Self {
        Self::with_function(functions, Arc::new(TemplateNameFunction), store)
    }

    /// Creates a resolver evaluating configs with a custom function.
    pub fn with_function(
        functions: Arc<dyn FunctionResolver>,
        function: Arc<dyn PrimaryNameFunction>,
        store: DynCanonicalStore,
    ) -> Self {
        Self {
            functions,
            function,
            store,
        }
    }

    /// Returns the display name of a resource.
    ///
    /// Tiles attached to the resource are used as-is; otherwise they are
    /// fetched from the canonical store.
    pub async fn primary_name(&self, resource: &Resource) -> IndexResult<String> {
        let configs = self
            .functions
            .primary_name_functions(&resource.graph_id)
            .await?;

        let [config] = configs.as_slice() else {
            tracing::debug!(
                graph_id = %resource.graph_id,
                functions = configs.len(),
                "No single primary name function configured"
            );
            return Ok(UNDEFINED_NAME.to_string());
        };

        if resource.tiles.is_empty() {
            let tiles = self.store.tiles_for_resource(&resource.id).await?;
            self.function.get(resource, &tiles, config)
        } else {
            self.function.get(resource, &resource.tiles, config)
        }
    }
}
