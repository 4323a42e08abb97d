use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use veritas_core::model::{GroundingChunk, ModelBackend, ModelRequest, ModelResponse};

/// Calls the hosted Gemini `generateContent` REST endpoint.
///
/// Supports schema-constrained JSON output and Google Search grounding.
/// One request per call; no retries.
pub struct GeminiBackend {
    pub base_url: String,
    pub model: String,
    api_key: String,
    /// 0 = no limit.
    pub timeout_secs: u64,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
            timeout_secs: 0,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if secs > 0 {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        self.client = builder.build().context("failed to build gemini http client")?;
        self.timeout_secs = secs;
        Ok(self)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<WireGroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct WireGroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Default, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

fn build_body(request: &ModelRequest) -> GenerateContentRequest {
    let contents = request
        .turns
        .iter()
        .map(|t| Content {
            role: Some(t.role.as_str()),
            parts: vec![Part { text: t.text.clone() }],
        })
        .collect();

    GenerateContentRequest {
        contents,
        system_instruction: request.system_instruction.as_ref().map(|s| Content {
            role: None,
            parts: vec![Part { text: s.clone() }],
        }),
        generation_config: request.response_schema.as_ref().map(|schema| GenerationConfig {
            response_mime_type: "application/json",
            response_schema: schema.clone(),
        }),
        tools: if request.grounded_search {
            vec![Tool {
                google_search: Value::Object(Default::default()),
            }]
        } else {
            Vec::new()
        },
    }
}

fn into_model_response(parsed: GenerateContentResponse) -> ModelResponse {
    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return ModelResponse::default();
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let grounding = candidate
        .grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| c.web)
        .map(|w| GroundingChunk {
            title: w.title,
            uri: w.uri,
        })
        .collect();

    ModelResponse {
        text: if text.is_empty() { None } else { Some(text) },
        grounding,
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse> {
        if self.api_key.is_empty() {
            return Err(anyhow!("GEMINI_API_KEY is not configured"));
        }

        let body = build_body(request);

        info!(
            operation = request.operation,
            model = %self.model,
            turns = request.turns.len(),
            grounded = request.grounded_search,
            "calling gemini generateContent"
        );

        let response = match self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(
                    operation = request.operation,
                    timeout_secs = self.timeout_secs,
                    "gemini request timed out"
                );
                return Err(anyhow!("Gemini request timed out after {}s", self.timeout_secs));
            }
            Err(e) => {
                warn!(operation = request.operation, "gemini request failed: {}", e);
                return Err(e).context("gemini request failed");
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                operation = request.operation,
                status = %status,
                "gemini returned non-200: {}",
                body
            );
            return Err(anyhow!("Gemini error {}: {}", status, body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("failed to parse gemini response")?;
        let out = into_model_response(parsed);

        info!(
            operation = request.operation,
            output_len = out.text.as_deref().map(str::len).unwrap_or(0),
            sources = out.grounding.len(),
            "gemini response received"
        );

        Ok(out)
    }
}
