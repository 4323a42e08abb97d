use std::collections::HashMap;

use crate::types::{Case, ChatMessage};

/// Concatenate every document of a case as chat context.
/// No size bound is applied.
pub fn case_context(case: &Case) -> String {
    case.documents
        .iter()
        .map(|d| format!("Document: {}\nContent:\n{}", d.title, d.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn welcome_message(case: &Case) -> String {
    format!(
        "Welcome, Counsel. I am the dedicated Legal Associate for the **{}** matter. \
         I have indexed all {} documents. How may I assist you today?",
        case.title,
        case.documents.len()
    )
}

/// Append-only conversation for one case view. Lives only in memory.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub case_id: String,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Opens with the associate's welcome message.
    pub fn open(case: &Case) -> Self {
        Self {
            case_id: case.id.clone(),
            messages: vec![ChatMessage::model(welcome_message(case), Vec::new())],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push(&mut self, msg: ChatMessage) {
        self.messages.push(msg);
    }
}

/// Chat sessions keyed by case id.
#[derive(Debug, Default)]
pub struct ChatSessions {
    sessions: HashMap<String, ChatSession>,
}

impl ChatSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_open(&mut self, case: &Case) -> &mut ChatSession {
        self.sessions
            .entry(case.id.clone())
            .or_insert_with(|| ChatSession::open(case))
    }

    pub fn get(&self, case_id: &str) -> Option<&ChatSession> {
        self.sessions.get(case_id)
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{seed::seed_cases, types::ChatRole};

    #[test]
    fn context_joins_documents_with_titles() {
        let cases = seed_cases();
        let case = &cases[0];
        let ctx = case_context(case);
        assert!(ctx.starts_with("Document: Primary Merger Agreement_v3.pdf\nContent:\nMUTUAL"));
        assert!(ctx.contains("\n\nDocument: IP Portfolio Audit.docx\nContent:\nAudit text"));
    }

    #[test]
    fn context_empty_without_documents() {
        assert_eq!(case_context(&seed_cases()[1]), "");
    }

    #[test]
    fn session_opens_with_welcome() {
        let cases = seed_cases();
        let case = &cases[0];
        let session = ChatSession::open(case);
        assert_eq!(session.messages().len(), 1);
        let first = &session.messages()[0];
        assert_eq!(first.role, ChatRole::Model);
        assert!(first.text.contains("Merger: OmniCorp & FutureSystems"));
        assert!(first.text.contains("all 2 documents"));
    }

    #[test]
    fn sessions_are_per_case() {
        let cases = seed_cases();
        let mut sessions = ChatSessions::new();
        sessions.get_or_open(&cases[0]).push(ChatMessage::user("hi"));
        sessions.get_or_open(&cases[1]);
        assert_eq!(sessions.get(&cases[0].id).unwrap().messages().len(), 2);
        assert_eq!(sessions.get(&cases[1].id).unwrap().messages().len(), 1);
    }
}
