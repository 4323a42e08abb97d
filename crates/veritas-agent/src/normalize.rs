//! Turns raw model text into trusted typed values.
//!
//! Model output is untrusted. Each parser here is total: it either returns a
//! fully populated value (missing fields defaulted) or, for the two headline
//! operations, a distinct error. Nothing is left half-filled.

use serde_json::{Map, Value};
use thiserror::Error;
use veritas_core::{
    model::GroundingChunk, ChatReply, Clause, LegalReport, ResearchResult, Risk, RiskSeverity,
    Source, UnclearTerm,
};

pub const NO_RESULTS: &str = "No results found.";
pub const CHAT_NO_ANSWER: &str = "I could not generate a response.";
pub const CHAT_ERROR: &str = "I encountered an error analyzing that request.";

/// Strip a surrounding markdown code fence (```json ... ```), if any.
pub fn strip_fences(text: &str) -> &str {
    let t = text.trim();
    if !t.starts_with("```") {
        return t;
    }
    let nl = match t.find('\n') {
        Some(i) => i,
        None => return t,
    };
    let inner = &t[nl + 1..];
    match inner.strip_suffix("```") {
        Some(body) => body.trim_end(),
        None => inner,
    }
}

/// Parse model text (absent text counts as `{}`) into a JSON value.
fn parse_json(text: Option<&str>) -> Result<Value, serde_json::Error> {
    let raw = text.map(strip_fences).filter(|t| !t.is_empty()).unwrap_or("{}");
    serde_json::from_str(raw)
}

fn str_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn objects<'a>(obj: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = &'a Map<String, Value>> {
    obj.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn strings(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// 0-100; fractional scores are rounded, numeric strings accepted.
fn score(v: Option<&Value>) -> u8 {
    let n = match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_nan() {
        return 0;
    }
    n.round().clamp(0.0, 100.0) as u8
}

// ── Document report ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ReportParseError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("expected a JSON object")]
    NotAnObject,
}

/// Fails only when the text is not a JSON object; missing fields are
/// defaulted.
pub fn normalize_report(text: Option<&str>) -> Result<LegalReport, ReportParseError> {
    let value = parse_json(text)?;
    let obj = value.as_object().ok_or(ReportParseError::NotAnObject)?;

    let risks = objects(obj, "risks")
        .map(|r| Risk {
            severity: RiskSeverity::parse(r.get("severity").and_then(Value::as_str).unwrap_or("")),
            description: str_field(r, "description"),
            recommendation: str_field(r, "recommendation"),
        })
        .collect();

    let key_clauses = objects(obj, "keyClauses")
        .map(|c| Clause {
            title: str_field(c, "title"),
            summary: str_field(c, "summary"),
            significance: str_field(c, "significance"),
        })
        .collect();

    Ok(LegalReport {
        summary: str_field(obj, "summary"),
        document_type: str_field(obj, "documentType"),
        overall_score: score(obj.get("overallScore")),
        risks,
        key_clauses,
        recommendations: strings(obj, "recommendations"),
    })
}

// ── Ambiguity scan ───────────────────────────────────────────────────────

/// Any failure yields an empty list.
pub fn normalize_unclear_terms(text: Option<&str>) -> Vec<UnclearTerm> {
    let Ok(value) = parse_json(text) else {
        return Vec::new();
    };
    let Some(obj) = value.as_object() else {
        return Vec::new();
    };
    objects(obj, "terms")
        .map(|t| UnclearTerm {
            term: str_field(t, "term"),
            context: str_field(t, "context"),
            ambiguity: str_field(t, "ambiguity"),
            suggestion: str_field(t, "suggestion"),
        })
        .filter(|t| !t.term.is_empty())
        .collect()
}

// ── Research ─────────────────────────────────────────────────────────────

/// Drop sources without a title or URI, then keep the first source per URI.
pub fn dedupe_sources(chunks: impl IntoIterator<Item = GroundingChunk>) -> Vec<Source> {
    let mut out: Vec<Source> = Vec::new();
    for source in chunks.into_iter().filter_map(GroundingChunk::into_source) {
        if !out.iter().any(|s| s.uri == source.uri) {
            out.push(source);
        }
    }
    out
}

pub fn normalize_research(text: Option<&str>, grounding: Vec<GroundingChunk>) -> ResearchResult {
    let answer = match text.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => NO_RESULTS.to_string(),
    };
    ResearchResult {
        answer,
        sources: dedupe_sources(grounding),
    }
}

// ── Chat ─────────────────────────────────────────────────────────────────

/// Reply used when the call itself failed.
pub fn chat_error_reply() -> ChatReply {
    ChatReply {
        answer: CHAT_ERROR.to_string(),
        suggestions: Vec::new(),
    }
}

/// Returns the reply and whether it had to fall back entirely.
pub fn normalize_chat(text: Option<&str>) -> (ChatReply, bool) {
    let value = match parse_json(text) {
        Ok(v) => v,
        Err(_) => return (chat_error_reply(), true),
    };
    let Some(obj) = value.as_object() else {
        return (chat_error_reply(), true);
    };
    let answer = obj
        .get("answer")
        .and_then(Value::as_str)
        .filter(|a| !a.trim().is_empty())
        .unwrap_or(CHAT_NO_ANSWER)
        .to_string();
    (
        ChatReply {
            answer,
            suggestions: strings(obj, "suggestions"),
        },
        false,
    )
}
