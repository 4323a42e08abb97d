use chrono::{Datelike, Local, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::{Result, VeritasError},
    persistence::CaseStore,
    types::{
        Case, CaseDocument, CaseNote, CaseStatus, FinancialCategory, FinancialRecord,
        FinancialType, Person,
    },
};

/// Stands in for content that is not decoded (PDF and other binary formats).
pub const BINARY_PLACEHOLDER: &str = "Content simulation for PDF...";

pub const PDF_DOCUMENT: &str = "PDF Document";
pub const TEXT_DOCUMENT: &str = "Text Document";

// ── Inputs ───────────────────────────────────────────────────────────────

/// One file from a drag-drop or picker upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    /// May be empty; then guessed from the file name.
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    fn effective_mime(&self) -> String {
        if !self.mime_type.is_empty() {
            return self.mime_type.to_ascii_lowercase();
        }
        mime_guess::from_path(&self.name)
            .first_raw()
            .unwrap_or_default()
            .to_string()
    }

    pub fn type_label(&self) -> &'static str {
        if self.effective_mime().contains("pdf") {
            PDF_DOCUMENT
        } else {
            TEXT_DOCUMENT
        }
    }

    /// File content as text. Non-text formats get [`BINARY_PLACEHOLDER`].
    pub fn text_content(&self) -> String {
        if self.type_label() == PDF_DOCUMENT {
            return BINARY_PLACEHOLDER.to_string();
        }
        match std::str::from_utf8(&self.bytes) {
            Ok(s) if !s.is_empty() => s.to_string(),
            _ => BINARY_PLACEHOLDER.to_string(),
        }
    }
}

/// Ledger form input. `amount` is the raw text from the form.
#[derive(Debug, Clone, Deserialize)]
pub struct FinancialEntry {
    pub description: String,
    pub amount: String,
    #[serde(rename = "type")]
    pub kind: FinancialType,
    #[serde(default)]
    pub category: FinancialCategory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonEntry {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub email: String,
}

// ── Derived aggregates ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CaseFinancials {
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

impl CaseFinancials {
    pub fn of(records: &[FinancialRecord]) -> Self {
        let mut out = Self::default();
        for r in records {
            match r.kind {
                FinancialType::Income => out.income += r.amount,
                FinancialType::Expense => out.expenses += r.amount,
            }
        }
        out.net = out.income - out.expenses;
        out
    }
}

/// Cases partitioned by status, each list in case-list order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusGroups {
    pub active: Vec<Case>,
    pub pending: Vec<Case>,
    pub archived: Vec<Case>,
}

impl StatusGroups {
    pub fn of(cases: &[Case]) -> Self {
        let mut groups = Self::default();
        for c in cases {
            groups.bucket_mut(c.status).push(c.clone());
        }
        groups
    }

    pub fn bucket(&self, status: CaseStatus) -> &[Case] {
        match status {
            CaseStatus::Active => &self.active,
            CaseStatus::Pending => &self.pending,
            CaseStatus::Archived => &self.archived,
        }
    }

    fn bucket_mut(&mut self, status: CaseStatus) -> &mut Vec<Case> {
        match status {
            CaseStatus::Active => &mut self.active,
            CaseStatus::Pending => &mut self.pending,
            CaseStatus::Archived => &mut self.archived,
        }
    }

    pub fn total(&self) -> usize {
        self.active.len() + self.pending.len() + self.archived.len()
    }
}

// ── Id helpers ───────────────────────────────────────────────────────────

/// `CS-<year>-<100..=999>`. Collisions with existing cases are not checked.
pub fn generate_case_id(year: i32, rng: &mut impl Rng) -> String {
    format!("CS-{}-{}", year, rng.gen_range(100..1000))
}

/// `<prefix>-<unix millis>`, suffixed until unique among `existing`.
fn unique_id<'a>(prefix: &str, existing: impl Iterator<Item = &'a str> + Clone) -> String {
    let base = format!("{}-{}", prefix, Utc::now().timestamp_millis());
    let taken = |id: &str| existing.clone().any(|e| e == id);
    if !taken(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

// ── Manager ──────────────────────────────────────────────────────────────

/// Single owner of the case list during a session. Every mutation goes
/// through here and is followed by a full write to the store.
pub struct CaseManager {
    cases: Vec<Case>,
    selected: Option<String>,
    store: CaseStore,
    default_access_code: String,
}

impl CaseManager {
    /// Load from the store (seed dataset on absent or corrupt data).
    pub fn load(store: CaseStore, default_access_code: impl Into<String>) -> Self {
        let cases = store.load();
        info!(count = cases.len(), "case list loaded");
        Self {
            cases,
            selected: None,
            store,
            default_access_code: default_access_code.into(),
        }
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn get(&self, id: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.id == id)
    }

    fn require(&self, id: &str) -> Result<&Case> {
        self.get(id).ok_or_else(|| VeritasError::NotFound(id.to_string()))
    }

    /// Create a "new matter" with defaulted fields, put it first and select it.
    pub fn create_case(&mut self) -> Case {
        let id = generate_case_id(Local::now().year(), &mut rand::thread_rng());
        let case = Case {
            id,
            title: "New Legal Matter".into(),
            client: "Unassigned Client".into(),
            status: CaseStatus::Pending,
            description: "New matter created via dashboard.".into(),
            access_code: self.default_access_code.clone(),
            documents: Vec::new(),
            people: Vec::new(),
            notes: Vec::new(),
            financials: Vec::new(),
            last_updated: "Just now".into(),
            progress: 0,
        };
        info!(case_id = %case.id, "case created");
        self.cases.insert(0, case.clone());
        self.selected = Some(case.id.clone());
        self.persist();
        case
    }

    /// Select by id. An unknown id clears the selection so callers fall back
    /// to the list view.
    pub fn select_case(&mut self, id: &str) -> Option<&Case> {
        if self.get(id).is_some() {
            self.selected = Some(id.to_string());
        } else {
            self.selected = None;
        }
        self.selected_case()
    }

    pub fn selected_case(&self) -> Option<&Case> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Whole-record replace by id. Last writer wins.
    pub fn update_case(&mut self, updated: Case) -> Result<()> {
        let slot = self
            .cases
            .iter_mut()
            .find(|c| c.id == updated.id)
            .ok_or_else(|| VeritasError::NotFound(updated.id.clone()))?;
        *slot = updated;
        self.persist();
        Ok(())
    }

    pub fn set_status(&mut self, case_id: &str, status: CaseStatus) -> Result<()> {
        let mut case = self.require(case_id)?.clone();
        case.status = status;
        info!(case_id = %case_id, status = status.as_str(), "case status changed");
        self.update_case(case)
    }

    pub fn append_document(&mut self, case_id: &str, file: UploadedFile) -> Result<CaseDocument> {
        let mut case = self.require(case_id)?.clone();
        let doc = CaseDocument {
            id: unique_id("doc", case.documents.iter().map(|d| d.id.as_str())),
            title: file.name.clone(),
            doc_type: file.type_label().to_string(),
            content: file.text_content(),
            date_added: today(),
        };
        info!(
            case_id = %case_id,
            doc_id = %doc.id,
            doc_type = %doc.doc_type,
            bytes = file.bytes.len(),
            "document appended"
        );
        case.documents.push(doc.clone());
        self.update_case(case)?;
        Ok(doc)
    }

    pub fn append_financial_record(
        &mut self,
        case_id: &str,
        entry: FinancialEntry,
    ) -> Result<FinancialRecord> {
        let description = entry.description.trim();
        let amount_raw = entry.amount.trim();
        if description.is_empty() || amount_raw.is_empty() {
            return Err(VeritasError::invalid_input("Description and amount are required."));
        }
        let amount: f64 = amount_raw
            .parse()
            .ok()
            .filter(|a: &f64| a.is_finite())
            .ok_or_else(|| VeritasError::invalid_input("Amount must be a number."))?;

        let mut case = self.require(case_id)?.clone();
        let record = FinancialRecord {
            id: unique_id("fin", case.financials.iter().map(|f| f.id.as_str())),
            date: today(),
            description: description.to_string(),
            amount,
            kind: entry.kind,
            category: entry.category,
        };
        case.financials.push(record.clone());
        self.update_case(case)?;
        Ok(record)
    }

    pub fn append_note(&mut self, case_id: &str, content: &str, author: &str) -> Result<CaseNote> {
        let content = content.trim();
        if content.is_empty() {
            return Err(VeritasError::invalid_input("Note content is required."));
        }
        let mut case = self.require(case_id)?.clone();
        let note = CaseNote {
            id: unique_id("note", case.notes.iter().map(|n| n.id.as_str())),
            content: content.to_string(),
            date: today(),
            author: author.to_string(),
        };
        case.notes.push(note.clone());
        self.update_case(case)?;
        Ok(note)
    }

    pub fn add_person(&mut self, case_id: &str, entry: PersonEntry) -> Result<Person> {
        let name = entry.name.trim();
        if name.is_empty() {
            return Err(VeritasError::invalid_input("Name is required."));
        }
        let mut case = self.require(case_id)?.clone();
        let person = Person {
            id: unique_id("person", case.people.iter().map(|p| p.id.as_str())),
            name: name.to_string(),
            role: entry.role,
            organization: entry.organization,
            email: entry.email,
        };
        case.people.push(person.clone());
        self.update_case(case)?;
        Ok(person)
    }

    // ── Reads (recomputed every call) ────────────────────────────────────

    pub fn financials(&self, case_id: &str) -> Result<CaseFinancials> {
        Ok(CaseFinancials::of(&self.require(case_id)?.financials))
    }

    pub fn status_groups(&self) -> StatusGroups {
        StatusGroups::of(&self.cases)
    }

    /// Income and expenses across every case.
    pub fn portfolio_financials(&self) -> CaseFinancials {
        let all: Vec<FinancialRecord> = self
            .cases
            .iter()
            .flat_map(|c| c.financials.iter().cloned())
            .collect();
        CaseFinancials::of(&all)
    }

    /// Clear the stored blob and start over from the seed dataset.
    pub fn reset(&mut self) -> Result<()> {
        self.store.reset()?;
        self.cases = self.store.load();
        self.selected = None;
        warn!(count = self.cases.len(), "case storage reset to seed dataset");
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.cases) {
            warn!("failed to persist cases: {e:#}");
        }
    }
}
