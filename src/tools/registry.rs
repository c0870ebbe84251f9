//! Tool registry for managing available tools.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use crate::context::ExecutionContext;
use crate::tools::builtin::{
    CheckJobStatusTool, GetAgentInputSchemaTool, GetAgentsByWalletTool, GetJobFullResultTool,
    GetPurchaseHistoryTool, HireAgentTool, ListAgentsTool, QueryPaymentsTool, QueryRegistryTool,
    RegisterAgentTool, UnregisterAgentTool,
};
use crate::tools::tool::{Tool, ToolError, ToolOutput, ToolSchema};

/// Registry of available tools.
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
        }
    }

    /// Registry pre-populated with every marketplace tool.
    pub fn with_masumi_tools() -> Self {
        let registry = Self::new();
        registry.register_masumi_tools();
        registry
    }

    /// Register a tool (sync version for startup).
    pub fn register_sync(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if let Ok(mut tools) = self.tools.try_write() {
            tools.insert(name.clone(), tool);
            tracing::debug!("Registered tool: {}", name);
        }
    }

    /// Get a tool by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().await.get(name).cloned()
    }

    /// List all tool names.
    pub async fn list(&self) -> Vec<String> {
        self.tools.read().await.keys().cloned().collect()
    }

    /// Get the number of registered tools.
    pub fn count(&self) -> usize {
        self.tools.try_read().map(|t| t.len()).unwrap_or(0)
    }

    /// Get all tools.
    pub async fn all(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.read().await.values().cloned().collect()
    }

    /// Schemas of every tool, sorted by name.
    pub async fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self
            .tools
            .read()
            .await
            .values()
            .map(|tool| tool.schema())
            .collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Run a tool by name. Returns `None` when no such tool is registered.
    pub async fn execute(
        &self,
        name: &str,
        params: serde_json::Value,
        ctx: &ExecutionContext,
    ) -> Option<Result<ToolOutput, ToolError>> {
        let tool = self.get(name).await?;
        let start = Instant::now();
        let result = tool.execute(params, ctx).await;
        match &result {
            Ok(_) => tracing::debug!(
                tool = name,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Tool call succeeded"
            ),
            Err(e) => tracing::warn!(
                tool = name,
                kind = ?e.kind(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Tool call failed: {}",
                e
            ),
        }
        Some(result)
    }

    /// Register all marketplace tools.
    pub fn register_masumi_tools(&self) {
        self.register_sync(Arc::new(ListAgentsTool));
        self.register_sync(Arc::new(GetAgentInputSchemaTool));
        self.register_sync(Arc::new(HireAgentTool));
        self.register_sync(Arc::new(CheckJobStatusTool));
        self.register_sync(Arc::new(GetJobFullResultTool));
        self.register_sync(Arc::new(QueryPaymentsTool));
        self.register_sync(Arc::new(GetPurchaseHistoryTool));
        self.register_sync(Arc::new(QueryRegistryTool));
        self.register_sync(Arc::new(RegisterAgentTool));
        self.register_sync(Arc::new(UnregisterAgentTool));
        self.register_sync(Arc::new(GetAgentsByWalletTool));

        tracing::info!("Registered {} marketplace tools", self.count());
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
