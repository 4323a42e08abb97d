use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use veritas_core::{
    access::AccessGate,
    cases::{CaseFinancials, FinancialEntry, PersonEntry, UploadedFile},
    Case, CaseDocument, CaseNote, CaseStatus, ChatMessage, ErrorKind, FinancialRecord,
    LegalReport, Person, ResearchResult, UnclearTerm, VeritasError,
};

use crate::AppState;

// ── Error mapping ─────────────────────────────────────────────────────────

pub(crate) struct ApiError(VeritasError);

impl From<VeritasError> for ApiError {
    fn from(e: VeritasError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = match kind {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::AuthMismatch => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::AnalysisFailed => StatusCode::BAD_GATEWAY,
            ErrorKind::SoftDegrade | ErrorKind::Storage => {
                tracing::error!("internal error: {:#}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = json!({
            "error": self.0.to_string(),
            "kind": format!("{kind:?}"),
        });
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn not_found(id: &str) -> ApiError {
    ApiError(VeritasError::NotFound(id.to_string()))
}

/// Copy a case out so the manager lock is not held across a model call.
async fn snapshot(state: &AppState, id: &str) -> Result<Case, ApiError> {
    state
        .cases
        .lock()
        .await
        .get(id)
        .cloned()
        .ok_or_else(|| not_found(id))
}

// ── Request body types ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(crate) struct StatusBody {
    status: CaseStatus,
}

#[derive(Deserialize)]
pub(crate) struct UnlockBody {
    code: String,
}

#[derive(Deserialize)]
pub(crate) struct NoteBody {
    content: String,
    author: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ChatBody {
    message: String,
}

#[derive(Deserialize)]
pub(crate) struct TextBody {
    text: String,
}

#[derive(Deserialize)]
pub(crate) struct ResearchBody {
    query: String,
}

// ── Router ────────────────────────────────────────────────────────────────

pub(crate) fn router(state: Arc<AppState>) -> Router {
    let dashboard_dir = state.config.dashboard_dist_dir.clone();
    let serve_dir = ServeDir::new(&dashboard_dir).fallback(tower_http::services::ServeFile::new(
        format!("{dashboard_dir}/index.html"),
    ));

    Router::new()
        // Health
        .route("/api/health", get(health))
        // Cases
        .route("/api/cases", get(list_cases).post(create_case))
        .route("/api/cases/:id", get(get_case).put(put_case))
        .route("/api/cases/:id/status", put(put_status))
        .route("/api/cases/:id/unlock", post(unlock_case))
        .route("/api/cases/:id/documents", post(upload_document))
        .route("/api/cases/:id/financials", get(get_financials).post(post_financial))
        .route("/api/cases/:id/notes", post(post_note))
        .route("/api/cases/:id/people", post(post_person))
        // Case assistant
        .route("/api/cases/:id/analysis", post(analyze_case))
        .route("/api/cases/:id/unclear-terms", post(scan_case))
        .route("/api/cases/:id/chat", get(get_chat).post(post_chat))
        // Dashboard
        .route("/api/dashboard", get(dashboard))
        // Standalone tools
        .route("/api/tools/analyze", post(tool_analyze))
        .route("/api/tools/unclear-terms", post(tool_unclear_terms))
        .route("/api/tools/research", post(tool_research))
        // Storage
        .route("/api/storage/reset", post(reset_storage))
        // Static dashboard
        .fallback_service(serve_dir)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub(crate) async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let cases = state.cases.lock().await.cases().len();
    Json(json!({
        "status": "ok",
        "model": state.config.model,
        "cases": cases,
        "uptime_s": state.start_time.elapsed().as_secs(),
    }))
}

// Cases

pub(crate) async fn list_cases(State(state): State<Arc<AppState>>) -> Json<Vec<Case>> {
    Json(state.cases.lock().await.cases().to_vec())
}

pub(crate) async fn create_case(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Case>) {
    let case = state.cases.lock().await.create_case();
    (StatusCode::CREATED, Json(case))
}

/// Opening a case makes it the selected one.
pub(crate) async fn get_case(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Case> {
    let mut mgr = state.cases.lock().await;
    let case = mgr.select_case(&id).cloned().ok_or_else(|| not_found(&id))?;
    Ok(Json(case))
}

pub(crate) async fn put_case(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(mut case): Json<Case>,
) -> ApiResult<Case> {
    case.id = id;
    state.cases.lock().await.update_case(case.clone())?;
    Ok(Json(case))
}

pub(crate) async fn put_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Case> {
    let mut mgr = state.cases.lock().await;
    mgr.set_status(&id, body.status)?;
    let case = mgr.get(&id).cloned().ok_or_else(|| not_found(&id))?;
    Ok(Json(case))
}

pub(crate) async fn unlock_case(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UnlockBody>,
) -> ApiResult<Value> {
    let case = snapshot(&state, &id).await?;
    let mut gate = AccessGate::new(state.config.access_bypass_code.clone());
    gate.unlock(&case, &body.code)?;
    Ok(Json(json!({ "unlocked": true, "case": case })))
}

pub(crate) async fn upload_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CaseDocument>), ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| VeritasError::invalid_input(format!("Invalid upload: {e}")))?
        .ok_or_else(|| VeritasError::invalid_input("No file provided."))?;
    let name = field.file_name().unwrap_or("upload").to_string();
    let mime = field.content_type().unwrap_or_default().to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| VeritasError::invalid_input(format!("Invalid upload: {e}")))?;

    let doc = state
        .cases
        .lock()
        .await
        .append_document(&id, UploadedFile::new(name, mime, bytes.to_vec()))?;
    Ok((StatusCode::CREATED, Json(doc)))
}

pub(crate) async fn get_financials(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let mgr = state.cases.lock().await;
    let totals: CaseFinancials = mgr.financials(&id)?;
    let records = mgr.get(&id).map(|c| c.financials.clone()).unwrap_or_default();
    Ok(Json(json!({ "totals": totals, "records": records })))
}

pub(crate) async fn post_financial(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(entry): Json<FinancialEntry>,
) -> Result<(StatusCode, Json<FinancialRecord>), ApiError> {
    let record = state.cases.lock().await.append_financial_record(&id, entry)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub(crate) async fn post_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<NoteBody>,
) -> Result<(StatusCode, Json<CaseNote>), ApiError> {
    let author = body
        .author
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| state.config.note_author.clone());
    let note = state.cases.lock().await.append_note(&id, &body.content, &author)?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub(crate) async fn post_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(entry): Json<PersonEntry>,
) -> Result<(StatusCode, Json<Person>), ApiError> {
    let person = state.cases.lock().await.add_person(&id, entry)?;
    Ok((StatusCode::CREATED, Json(person)))
}

// Case assistant

pub(crate) async fn analyze_case(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<LegalReport> {
    let case = snapshot(&state, &id).await?;
    let report = state.assistant.analyze_case(&case).await?;
    Ok(Json(report))
}

pub(crate) async fn scan_case(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Vec<UnclearTerm>> {
    let case = snapshot(&state, &id).await?;
    let terms = state.assistant.scan_case(&case).await?;
    Ok(Json(terms))
}

pub(crate) async fn get_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Vec<ChatMessage>> {
    let case = snapshot(&state, &id).await?;
    let mut chats = state.chats.lock().await;
    Ok(Json(chats.get_or_open(&case).messages().to_vec()))
}

/// Records the question, asks the model without holding any lock, then
/// appends the reply. Concurrent questions land in completion order.
pub(crate) async fn post_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ChatBody>,
) -> ApiResult<Value> {
    let message = body.message.trim().to_string();
    if message.is_empty() {
        return Err(VeritasError::invalid_input("Message is empty.").into());
    }
    let case = snapshot(&state, &id).await?;

    let history = {
        let mut chats = state.chats.lock().await;
        let session = chats.get_or_open(&case);
        let history = session.messages().to_vec();
        session.push(ChatMessage::user(message.clone()));
        history
    };

    let reply = state.assistant.chat(&message, &case, &history).await?;

    let mut chats = state.chats.lock().await;
    let session = chats.get_or_open(&case);
    session.push(ChatMessage::model(reply.answer.clone(), reply.suggestions.clone()));
    Ok(Json(json!({
        "reply": reply,
        "messages": session.messages(),
    })))
}

// Dashboard

pub(crate) async fn dashboard(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mgr = state.cases.lock().await;
    let groups = mgr.status_groups();
    let totals = mgr.portfolio_financials();
    let recent: Vec<Value> = mgr
        .cases()
        .iter()
        .take(5)
        .map(|c| {
            json!({
                "id": c.id,
                "title": c.title,
                "client": c.client,
                "status": c.status,
                "lastUpdated": c.last_updated,
                "progress": c.progress,
            })
        })
        .collect();
    Json(json!({
        "totalCases": groups.total(),
        "active": groups.active.len(),
        "pending": groups.pending.len(),
        "archived": groups.archived.len(),
        "revenue": totals.income,
        "expenses": totals.expenses,
        "net": totals.net,
        "recentCases": recent,
    }))
}

// Standalone tools

pub(crate) async fn tool_analyze(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TextBody>,
) -> ApiResult<LegalReport> {
    Ok(Json(state.assistant.analyze_document(&body.text).await?))
}

pub(crate) async fn tool_unclear_terms(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TextBody>,
) -> Json<Vec<UnclearTerm>> {
    Json(state.assistant.scan_ambiguity(&body.text).await)
}

pub(crate) async fn tool_research(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResearchBody>,
) -> ApiResult<ResearchResult> {
    Ok(Json(state.assistant.research(&body.query).await?))
}

// Storage

pub(crate) async fn reset_storage(State(state): State<Arc<AppState>>) -> ApiResult<Value> {
    let count = {
        let mut mgr = state.cases.lock().await;
        mgr.reset()?;
        mgr.cases().len()
    };
    state.chats.lock().await.clear();
    info!(count, "storage reset");
    Ok(Json(json!({ "cases": count })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Instant;
    use tokio::sync::Mutex;
    use tower::ServiceExt;
    use veritas_agent::LegalAssistant;
    use veritas_core::{
        cases::CaseManager,
        chat::ChatSessions,
        config::Config,
        model::{ModelBackend, ModelRequest, ModelResponse},
        persistence::CaseStore,
        store::MemoryStore,
    };

    struct CannedBackend(&'static str);

    #[async_trait]
    impl ModelBackend for CannedBackend {
        async fn generate(&self, _request: &ModelRequest) -> anyhow::Result<ModelResponse> {
            Ok(ModelResponse {
                text: Some(self.0.to_string()),
                grounding: Vec::new(),
            })
        }
    }

    struct DownBackend;

    #[async_trait]
    impl ModelBackend for DownBackend {
        async fn generate(&self, _request: &ModelRequest) -> anyhow::Result<ModelResponse> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    fn app_with(backend: Arc<dyn ModelBackend>) -> Router {
        let config = Config {
            dashboard_dist_dir: "/nonexistent".into(),
            ..Config::default()
        };
        let store = CaseStore::new(Arc::new(MemoryStore::new()), config.storage_key.clone());
        let state = Arc::new(AppState {
            cases: Mutex::new(CaseManager::load(store, config.default_access_code.clone())),
            chats: Mutex::new(ChatSessions::new()),
            assistant: LegalAssistant::new(backend),
            config: Arc::new(config),
            start_time: Instant::now(),
        });
        router(state)
    }

    fn app() -> Router {
        app_with(Arc::new(CannedBackend(
            r#"{"answer":"The term is two years.","suggestions":["Who signed?"]}"#,
        )))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(v) => builder
                .header("content-type", "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn list_and_create_cases() {
        let app = app();
        let (status, cases) = call(&app, "GET", "/api/cases", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cases.as_array().unwrap().len(), 3);

        let (status, created) = call(&app, "POST", "/api/cases", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "Pending");

        let (_, cases) = call(&app, "GET", "/api/cases", None).await;
        assert_eq!(cases[0]["id"], created["id"]);
    }

    #[tokio::test]
    async fn unknown_case_is_404() {
        let (status, body) = call(&app(), "GET", "/api/cases/CS-0000-000", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "NotFound");
    }

    #[tokio::test]
    async fn unlock_accepts_case_code_and_rejects_others() {
        let app = app();
        let (status, _) = call(
            &app,
            "POST",
            "/api/cases/CS-2024-001/unlock",
            Some(json!({ "code": "1234" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(
            &app,
            "POST",
            "/api/cases/CS-2024-001/unlock",
            Some(json!({ "code": "0000" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "AUTHENTICATION FAILED. Access Denied.");
    }

    #[tokio::test]
    async fn invalid_financial_entry_is_400() {
        let (status, body) = call(
            &app(),
            "POST",
            "/api/cases/CS-2024-001/financials",
            Some(json!({ "description": "Filing", "amount": "abc", "type": "Expense" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Amount must be a number.");
    }

    #[tokio::test]
    async fn financial_entry_updates_totals() {
        let app = app();
        let (status, _) = call(
            &app,
            "POST",
            "/api/cases/CS-2024-001/financials",
            Some(json!({ "description": "Filing", "amount": "100", "type": "Expense", "category": "Court Fee" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (_, fin) = call(&app, "GET", "/api/cases/CS-2024-001/financials", None).await;
        assert_eq!(fin["totals"]["income"], 6500.0);
        assert_eq!(fin["totals"]["expenses"], 350.0);
        assert_eq!(fin["totals"]["net"], 6150.0);
    }

    #[tokio::test]
    async fn chat_appends_question_and_reply() {
        let app = app();
        let (status, body) = call(
            &app,
            "POST",
            "/api/cases/CS-2024-001/chat",
            Some(json!({ "message": "What is the term?" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"]["answer"], "The term is two years.");
        // welcome, question, reply
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);

        let (_, messages) = call(&app, "GET", "/api/cases/CS-2024-001/chat", None).await;
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[2]["suggestions"][0], "Who signed?");
    }

    #[tokio::test]
    async fn analysis_failure_is_502_and_scan_degrades() {
        let app = app_with(Arc::new(DownBackend));
        let (status, body) = call(&app, "POST", "/api/cases/CS-2024-001/analysis", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Failed to analyze the document. Please try again.");

        let (status, terms) = call(&app, "POST", "/api/cases/CS-2024-001/unclear-terms", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(terms, json!([]));
    }

    #[tokio::test]
    async fn case_without_documents_cannot_be_analyzed() {
        let (status, _) = call(&app(), "POST", "/api/cases/CS-2024-042/analysis", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn dashboard_totals_cover_all_cases() {
        let (_, d) = call(&app(), "GET", "/api/dashboard", None).await;
        assert_eq!(d["totalCases"], 3);
        assert_eq!(d["active"], 1);
        assert_eq!(d["revenue"], 18500.0);
        assert_eq!(d["expenses"], 250.0);
    }

    #[tokio::test]
    async fn reset_restores_seed() {
        let app = app();
        call(&app, "POST", "/api/cases", None).await;
        let (status, body) = call(&app, "POST", "/api/storage/reset", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cases"], 3);
    }

    #[tokio::test]
    async fn empty_research_query_is_400() {
        let (status, _) = call(&app(), "POST", "/api/tools/research", Some(json!({ "query": " " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_api_path_is_404() {
        let app = app();
        for uri in ["/api/logs", "/api/logs/stream"] {
            let (status, _) = call(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        }
    }
}
