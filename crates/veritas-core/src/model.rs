use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::types::{ChatRole, Source};

/// One conversation turn sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelTurn {
    pub role: ChatRole,
    pub text: String,
}

/// Everything a backend needs for one generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRequest {
    /// Short label for logs ("document_analysis", "chat", ...).
    pub operation: &'static str,
    pub system_instruction: Option<String>,
    /// Earlier turns first; the last turn is the prompt.
    pub turns: Vec<ModelTurn>,
    /// Expected output shape; when set the backend asks for JSON output.
    pub response_schema: Option<Value>,
    /// Enable internet-grounded search with source attribution.
    pub grounded_search: bool,
}

impl ModelRequest {
    pub fn prompt(&self) -> &str {
        self.turns.last().map(|t| t.text.as_str()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub text: Option<String>,
    /// Grounding candidates in the order the backend reported them.
    /// Entries may lack a title or URI.
    pub grounding: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundingChunk {
    pub title: Option<String>,
    pub uri: Option<String>,
}

impl GroundingChunk {
    pub fn into_source(self) -> Option<Source> {
        match (self.title, self.uri) {
            (Some(title), Some(uri)) if !title.is_empty() && !uri.is_empty() => {
                Some(Source { title, uri })
            }
            _ => None,
        }
    }
}

#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse>;
}
