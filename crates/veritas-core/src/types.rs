use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Case records ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStatus {
    Active,
    Pending,
    Archived,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 3] = [Self::Active, Self::Pending, Self::Archived];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Pending => "Pending",
            Self::Archived => "Archived",
        }
    }
}

impl Default for CaseStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// A legal matter as stored in the case list blob.
///
/// Field names serialize in camelCase so blobs written by the browser
/// console load without migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    /// `CS-<year>-<3 digits>`.
    pub id: String,
    pub title: String,
    pub client: String,
    pub status: CaseStatus,
    pub description: String,
    /// Plain-text view code. Not a credential.
    pub access_code: String,
    #[serde(default)]
    pub documents: Vec<CaseDocument>,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub notes: Vec<CaseNote>,
    #[serde(default)]
    pub financials: Vec<FinancialRecord>,
    /// Display string ("2 hours ago", "Just now", a date).
    pub last_updated: String,
    /// 0-100. Stored blobs may carry any JS number; it is rounded and clamped.
    #[serde(default, deserialize_with = "lenient_progress")]
    pub progress: u8,
}

fn lenient_progress<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    let n = match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_nan() {
        return Ok(0);
    }
    Ok(n.round().clamp(0.0, 100.0) as u8)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDocument {
    pub id: String,
    pub title: String,
    /// Coarse label, e.g. "PDF Document" or "Text Document".
    #[serde(rename = "type")]
    pub doc_type: String,
    pub content: String,
    pub date_added: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub role: String,
    pub organization: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseNote {
    pub id: String,
    pub content: String,
    pub date: String,
    pub author: String,
}

// ── Financials ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinancialType {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinancialCategory {
    #[serde(rename = "Billable Hours")]
    BillableHours,
    #[serde(rename = "Flat Fee")]
    FlatFee,
    #[serde(rename = "Court Fee")]
    CourtFee,
    Administrative,
    Other,
}

impl Default for FinancialCategory {
    fn default() -> Self {
        Self::BillableHours
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub id: String,
    pub date: String,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: FinancialType,
    pub category: FinancialCategory,
}

impl FinancialRecord {
    /// Signed contribution to the case total.
    pub fn net(&self) -> f64 {
        match self.kind {
            FinancialType::Income => self.amount,
            FinancialType::Expense => -self.amount,
        }
    }
}

// ── AI results ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
}

impl RiskSeverity {
    /// Lenient parse; anything unrecognised is Medium.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub severity: RiskSeverity,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub title: String,
    pub summary: String,
    pub significance: String,
}

/// Headline document report. Not persisted per case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalReport {
    pub summary: String,
    pub document_type: String,
    pub overall_score: u8,
    pub risks: Vec<Risk>,
    pub key_clauses: Vec<Clause>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnclearTerm {
    pub term: String,
    pub context: String,
    pub ambiguity: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchResult {
    pub answer: String,
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    pub suggestions: Vec<String>,
}

// ── Chat ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            timestamp: Utc::now(),
            suggestions: Vec::new(),
        }
    }

    pub fn model(text: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
            timestamp: Utc::now(),
            suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(RiskSeverity::Low < RiskSeverity::Medium);
        assert!(RiskSeverity::Medium < RiskSeverity::High);
    }

    #[test]
    fn severity_parse_is_lenient() {
        assert_eq!(RiskSeverity::parse("High"), RiskSeverity::High);
        assert_eq!(RiskSeverity::parse(" low "), RiskSeverity::Low);
        assert_eq!(RiskSeverity::parse("catastrophic"), RiskSeverity::Medium);
    }

    #[test]
    fn financial_record_uses_browser_field_names() {
        let rec = FinancialRecord {
            id: "f1".into(),
            date: "2024-02-10".into(),
            description: "Initial Retainer".into(),
            amount: 5000.0,
            kind: FinancialType::Income,
            category: FinancialCategory::FlatFee,
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["type"], "Income");
        assert_eq!(v["category"], "Flat Fee");
    }

    #[test]
    fn case_without_financials_loads() {
        let json = r#"{"id":"CS-2024-001","title":"t","client":"c","status":"Active",
            "description":"d","accessCode":"1234","documents":[],"people":[],"notes":[],
            "lastUpdated":"now","progress":10}"#;
        let c: Case = serde_json::from_str(json).unwrap();
        assert!(c.financials.is_empty());
        assert_eq!(c.status, CaseStatus::Active);
    }

    #[test]
    fn progress_accepts_any_js_number() {
        let load = |progress: &str| -> u8 {
            let json = format!(
                r#"{{"id":"CS-2024-001","title":"t","client":"c","status":"Active",
                "description":"d","accessCode":"1234","lastUpdated":"now","progress":{progress}}}"#
            );
            serde_json::from_str::<Case>(&json).unwrap().progress
        };
        assert_eq!(load("62.5"), 63);
        assert_eq!(load("250"), 100);
        assert_eq!(load("-4"), 0);
        assert_eq!(load(r#""40""#), 40);
        assert_eq!(load("null"), 0);
    }

    #[test]
    fn expense_nets_negative() {
        let rec = FinancialRecord {
            id: "f3".into(),
            date: String::new(),
            description: "Filing Fees".into(),
            amount: 250.0,
            kind: FinancialType::Expense,
            category: FinancialCategory::CourtFee,
        };
        assert_eq!(rec.net(), -250.0);
    }
}
