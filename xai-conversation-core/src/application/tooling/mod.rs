//! Tool APIs exposed to the model.
//!
//! A [`ToolApi`] bundles callable tools with an optional prompt fragment.
//! Agents select APIs by id through a [`ToolRegistry`].

mod error;

pub use error::ToolError;

use crate::domain::types::{ToolInput, ToolSpec};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait ToolApi: Send + Sync {
    fn id(&self) -> &str;

    /// Instructions appended to the system prompt when the API is active
    fn prompt(&self) -> Option<String> {
        None
    }

    fn tools(&self) -> Vec<ToolSpec>;

    async fn call_tool(&self, input: &ToolInput) -> Result<Value, ToolError>;
}

/// Tool APIs known to the host, keyed by id
#[derive(Clone, Default)]
pub struct ToolRegistry {
    apis: HashMap<String, Arc<dyn ToolApi>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an API, replacing one with the same id
    pub fn register(&mut self, api: Arc<dyn ToolApi>) {
        debug!(api = api.id(), tools = api.tools().len(), "Tool API registered");
        self.apis.insert(api.id().to_string(), api);
    }

    pub fn with(mut self, api: Arc<dyn ToolApi>) -> Self {
        self.register(api);
        self
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn ToolApi>> {
        self.apis.get(id).cloned()
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.apis.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Look up every id in order. The error carries the first unknown id.
    pub fn resolve(&self, ids: &[String]) -> Result<Vec<Arc<dyn ToolApi>>, String> {
        ids.iter()
            .map(|id| self.get(id).ok_or_else(|| id.clone()))
            .collect()
    }
}

/// Tools of several APIs merged into one set, each name routed to its API.
///
/// When two APIs declare the same tool name the first one wins.
pub struct ToolSet {
    specs: Vec<ToolSpec>,
    routes: HashMap<String, Arc<dyn ToolApi>>,
}

impl ToolSet {
    pub fn new(apis: &[Arc<dyn ToolApi>]) -> Self {
        let mut specs = Vec::new();
        let mut routes = HashMap::new();
        for api in apis {
            for spec in api.tools() {
                if routes.contains_key(&spec.name) {
                    debug!(tool = spec.name.as_str(), api = api.id(), "Shadowed tool skipped");
                    continue;
                }
                routes.insert(spec.name.clone(), Arc::clone(api));
                specs.push(spec);
            }
        }
        Self { specs, routes }
    }

    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub async fn call(&self, input: &ToolInput) -> Result<Value, ToolError> {
        let Some(api) = self.routes.get(&input.tool_name) else {
            return Err(ToolError::UnknownTool {
                api: "<none>".to_string(),
                tool: input.tool_name.clone(),
            });
        };
        api.call_tool(input).await
    }
}
