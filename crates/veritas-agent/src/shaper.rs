//! Request shaping for the four assistant operations.
//!
//! Every function here is pure: it only builds a [`ModelRequest`] (prompt
//! text, system instruction, expected output schema and search flag). The
//! call itself happens in [`crate::service`]. Schemas use the Gemini
//! `Type` vocabulary (`OBJECT`, `STRING`, ...).

use serde_json::{json, Value};
use veritas_core::{
    model::{ModelRequest, ModelTurn},
    ChatMessage, ChatRole, Result, VeritasError,
};

pub const ANALYST_SYSTEM: &str = "You are Veritas, an expert legal AI assistant. Your tone is \
    professional, authoritative, and precise. You focus on protecting the client's interest.";

pub const AUDITOR_SYSTEM: &str =
    "You are a diligent legal auditor. Your goal is to find ambiguity.";

pub const RESEARCHER_SYSTEM: &str = "You are a legal researcher. Provide accurate, cited \
    information based on real-time data. Prioritize official government sources and reputable \
    legal databases.";

pub fn legal_report_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING", "description": "A concise executive summary of the document." },
            "documentType": { "type": "STRING", "description": "The type of legal document (e.g., NDA, Employment Contract)." },
            "overallScore": { "type": "INTEGER", "description": "A score from 0-100 rating the safety and quality of the document." },
            "risks": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "severity": { "type": "STRING", "enum": ["High", "Medium", "Low"] },
                        "description": { "type": "STRING" },
                        "recommendation": { "type": "STRING" }
                    },
                    "required": ["severity", "description", "recommendation"]
                }
            },
            "keyClauses": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "summary": { "type": "STRING" },
                        "significance": { "type": "STRING" }
                    },
                    "required": ["title", "summary", "significance"]
                }
            },
            "recommendations": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "General actionable advice for the lawyer."
            }
        },
        "required": ["summary", "documentType", "risks", "keyClauses", "overallScore", "recommendations"]
    })
}

pub fn unclear_terms_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "terms": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "term": { "type": "STRING", "description": "The specific word or phrase that is ambiguous." },
                        "context": { "type": "STRING", "description": "The sentence or clause where it appears." },
                        "ambiguity": { "type": "STRING", "description": "Why this term is unclear or legally risky." },
                        "suggestion": { "type": "STRING", "description": "A more precise legal alternative." }
                    },
                    "required": ["term", "context", "ambiguity", "suggestion"]
                }
            }
        }
    })
}

pub fn chat_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "answer": { "type": "STRING", "description": "The direct answer to the user's question." },
            "suggestions": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "3 short, relevant follow-up questions the user might want to ask next based on the context."
            }
        },
        "required": ["answer", "suggestions"]
    })
}

fn user_turn(text: String) -> ModelTurn {
    ModelTurn {
        role: ChatRole::User,
        text,
    }
}

/// Headline risk report for one document. Empty text is `InvalidInput`.
pub fn shape_document_analysis(text: &str) -> Result<ModelRequest> {
    if text.trim().is_empty() {
        return Err(VeritasError::invalid_input("No text provided for analysis."));
    }
    let prompt = format!(
        "Analyze the following legal document text as a senior legal partner at a top law firm.\n\
         Provide a detailed report identifying risks, key clauses, and an overall assessment.\n\n\
         Document Text:\n{text}"
    );
    Ok(ModelRequest {
        operation: "document_analysis",
        system_instruction: Some(ANALYST_SYSTEM.into()),
        turns: vec![user_turn(prompt)],
        response_schema: Some(legal_report_schema()),
        grounded_search: false,
    })
}

/// Ambiguity scan. Returns `None` for empty text: the caller answers with an
/// empty list and makes no call.
pub fn shape_ambiguity_scan(text: &str) -> Option<ModelRequest> {
    if text.trim().is_empty() {
        return None;
    }
    let prompt = format!(
        "Review the following legal text and identify vague, ambiguous, or undefined terms \
         that could lead to disputes.\n\nDocument Text:\n{text}"
    );
    Some(ModelRequest {
        operation: "ambiguity_scan",
        system_instruction: Some(AUDITOR_SYSTEM.into()),
        turns: vec![user_turn(prompt)],
        response_schema: Some(unclear_terms_schema()),
        grounded_search: false,
    })
}

/// Grounded research. Citations arrive through the backend's grounding
/// metadata, so no schema is declared.
pub fn shape_research_query(query: &str) -> Result<ModelRequest> {
    if query.trim().is_empty() {
        return Err(VeritasError::invalid_input("No query provided."));
    }
    let prompt = format!(
        "Research the following legal query. Cite official laws, court rulings, or reliable \
         legal principles where applicable.\n\nQuery: {query}"
    );
    Ok(ModelRequest {
        operation: "research",
        system_instruction: Some(RESEARCHER_SYSTEM.into()),
        turns: vec![user_turn(prompt)],
        response_schema: None,
        grounded_search: true,
    })
}

/// Case-scoped chat. `case_context` is every document of the case
/// concatenated; earlier messages go first as prior turns.
pub fn shape_contextual_chat(
    message: &str,
    case_context: &str,
    history: &[ChatMessage],
) -> Result<ModelRequest> {
    if message.trim().is_empty() {
        return Err(VeritasError::invalid_input("Message is empty."));
    }

    let mut s = String::new();
    s.push_str("You are an AI Legal Associate assisting with a specific case.\n\n");
    s.push_str("CASE CONTEXT:\n");
    s.push_str(case_context);
    s.push_str("\n\nYOUR ROLE:\n");
    s.push_str(
        "Answer the user's question based strictly on the case documents provided above and \
         general legal principles.\nBe concise, professional, and cite specific clauses if applicable.\n\n",
    );
    s.push_str("IMPORTANT:\n");
    s.push_str(
        "Provide the answer in JSON format containing an 'answer' string and a 'suggestions' \
         array of strings.\nThe 'suggestions' should be 3 intelligent follow-up questions the \
         user might want to ask next.\n\n",
    );
    s.push_str("USER QUESTION:\n");
    s.push_str(message);

    let mut turns: Vec<ModelTurn> = history
        .iter()
        .map(|m| ModelTurn {
            role: m.role,
            text: m.text.clone(),
        })
        .collect();
    turns.push(user_turn(s));

    Ok(ModelRequest {
        operation: "chat",
        system_instruction: None,
        turns,
        response_schema: Some(chat_response_schema()),
        grounded_search: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use veritas_core::ErrorKind;

    #[test]
    fn document_analysis_rejects_empty_text() {
        let err = shape_document_analysis("   ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn document_analysis_declares_required_fields() {
        let req = shape_document_analysis("This Agreement...").unwrap();
        let schema = req.response_schema.clone().unwrap();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        for field in ["summary", "documentType", "overallScore", "risks", "keyClauses", "recommendations"] {
            assert!(required.contains(&field), "missing {field}");
        }
        assert!(req.prompt().ends_with("Document Text:\nThis Agreement..."));
        assert!(!req.grounded_search);
    }

    #[test]
    fn ambiguity_scan_soft_fails_on_empty() {
        assert!(shape_ambiguity_scan("").is_none());
        assert!(shape_ambiguity_scan("\n\t").is_none());
        let req = shape_ambiguity_scan("best efforts").unwrap();
        assert_eq!(req.response_schema.unwrap()["properties"]["terms"]["type"], "ARRAY");
    }

    #[test]
    fn research_is_grounded_without_schema() {
        let req = shape_research_query("statute of limitations for breach of contract in NY").unwrap();
        assert!(req.grounded_search);
        assert!(req.response_schema.is_none());
        assert_eq!(shape_research_query("").unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn chat_puts_history_before_question() {
        let history = vec![
            ChatMessage::model("Welcome, Counsel.", vec![]),
            ChatMessage::user("Who are the parties?"),
            ChatMessage::model("TechCorp Inc. and DataFlow Ltd.", vec![]),
        ];
        let req = shape_contextual_chat("What is the term?", "Document: nda.txt\nContent:\n...", &history).unwrap();
        assert_eq!(req.turns.len(), 4);
        assert_eq!(req.turns[1].role, ChatRole::User);
        assert_eq!(req.turns[2].role, ChatRole::Model);
        let prompt = req.prompt();
        assert!(prompt.contains("CASE CONTEXT:\nDocument: nda.txt"));
        assert!(prompt.ends_with("USER QUESTION:\nWhat is the term?"));
    }

    #[test]
    fn chat_rejects_empty_message() {
        assert_eq!(
            shape_contextual_chat(" ", "", &[]).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }
}
