use std::sync::Arc;

use tracing::{info, warn};
use veritas_core::{
    chat::case_context,
    model::{ModelBackend, ModelRequest, ModelResponse},
    Case, ChatMessage, ChatReply, LegalReport, ResearchResult, Result, UnclearTerm, VeritasError,
};

use crate::{normalize, shaper};

pub const ANALYSIS_FAILED: &str = "Failed to analyze the document. Please try again.";
pub const RESEARCH_FAILED: &str = "Failed to perform legal research.";

/// The four assistant operations over a pluggable model backend.
///
/// Backend failures stop here. Document analysis and research surface them
/// as `AnalysisFailed`; the ambiguity scan and chat log a warning and return
/// their default value instead.
#[derive(Clone)]
pub struct LegalAssistant {
    backend: Arc<dyn ModelBackend>,
}

impl LegalAssistant {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    async fn call(&self, request: &ModelRequest) -> anyhow::Result<ModelResponse> {
        self.backend.generate(request).await
    }

    pub async fn analyze_document(&self, text: &str) -> Result<LegalReport> {
        let request = shaper::shape_document_analysis(text)?;
        let response = self
            .call(&request)
            .await
            .map_err(|e| {
                warn!(operation = request.operation, "model call failed: {e:#}");
                VeritasError::analysis_failed(ANALYSIS_FAILED, Some(e))
            })?;

        let report = normalize::normalize_report(response.text.as_deref()).map_err(|e| {
            warn!(operation = request.operation, "unusable model output: {e}");
            VeritasError::analysis_failed(ANALYSIS_FAILED, Some(anyhow::Error::new(e)))
        })?;

        info!(
            document_type = %report.document_type,
            score = report.overall_score,
            risks = report.risks.len(),
            "document analyzed"
        );
        Ok(report)
    }

    /// Never fails: empty text or any failure yields an empty list.
    pub async fn scan_ambiguity(&self, text: &str) -> Vec<UnclearTerm> {
        let Some(request) = shaper::shape_ambiguity_scan(text) else {
            return Vec::new();
        };
        match self.call(&request).await {
            Ok(response) => normalize::normalize_unclear_terms(response.text.as_deref()),
            Err(e) => {
                let degraded = VeritasError::SoftDegrade {
                    operation: request.operation,
                    reason: format!("{e:#}"),
                };
                warn!("{degraded}");
                Vec::new()
            }
        }
    }

    pub async fn research(&self, query: &str) -> Result<ResearchResult> {
        let request = shaper::shape_research_query(query)?;
        let response = self.call(&request).await.map_err(|e| {
            warn!(operation = request.operation, "model call failed: {e:#}");
            VeritasError::analysis_failed(RESEARCH_FAILED, Some(e))
        })?;
        let result = normalize::normalize_research(response.text.as_deref(), response.grounding);
        info!(sources = result.sources.len(), "research completed");
        Ok(result)
    }

    /// Answer a question about one case. Only an empty message is an error;
    /// model failures become the fixed apology reply.
    pub async fn chat(&self, message: &str, case: &Case, history: &[ChatMessage]) -> Result<ChatReply> {
        let request = shaper::shape_contextual_chat(message, &case_context(case), history)?;
        let reply = match self.call(&request).await {
            Ok(response) => {
                let (reply, degraded) = normalize::normalize_chat(response.text.as_deref());
                if degraded {
                    warn!(case_id = %case.id, "chat output was not valid JSON");
                }
                reply
            }
            Err(e) => {
                let degraded = VeritasError::SoftDegrade {
                    operation: request.operation,
                    reason: format!("{e:#}"),
                };
                warn!(case_id = %case.id, "{degraded}");
                normalize::chat_error_reply()
            }
        };
        Ok(reply)
    }

    // ── Case helpers ─────────────────────────────────────────────────────

    fn first_document(case: &Case) -> Result<&str> {
        case.documents
            .first()
            .map(|d| d.content.as_str())
            .ok_or_else(|| VeritasError::invalid_input("This case has no documents to analyze."))
    }

    /// Headline analysis of the case's first document.
    pub async fn analyze_case(&self, case: &Case) -> Result<LegalReport> {
        let text = Self::first_document(case)?;
        info!(case_id = %case.id, "analyzing case document");
        self.analyze_document(text).await
    }

    /// Ambiguity scan of the case's first document.
    pub async fn scan_case(&self, case: &Case) -> Result<Vec<UnclearTerm>> {
        let text = Self::first_document(case)?;
        Ok(self.scan_ambiguity(text).await)
    }
}
