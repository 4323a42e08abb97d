mod routes;

use std::{sync::Arc, time::Instant};

use tokio::sync::Mutex;
use tracing::{info, warn};
use veritas_agent::{GeminiBackend, LegalAssistant};
use veritas_core::{
    cases::CaseManager, chat::ChatSessions, config::Config, persistence::CaseStore,
    store::SqliteStore,
};

const DEFAULT_LOG_FILTER: &str =
    "veritas_server=info,veritas_agent=info,veritas_core=info,tower_http=debug";

// ── AppState ──────────────────────────────────────────────────────────────

pub struct AppState {
    pub config: Arc<Config>,
    /// Never held across a model call.
    pub cases: Mutex<CaseManager>,
    pub chats: Mutex<ChatSessions>,
    pub assistant: LegalAssistant,
    pub start_time: Instant,
}

// ── main ──────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let config = Config::from_env()?;

    std::fs::create_dir_all(&config.data_dir)?;
    let db_path = config.db_path();
    let store = Arc::new(SqliteStore::open(&db_path)?);
    info!(path = %db_path, key = %config.storage_key, "case store opened");
    let manager = CaseManager::load(
        CaseStore::new(store, config.storage_key.clone()),
        config.default_access_code.clone(),
    );

    if config.gemini_api_key.is_empty() {
        warn!("GEMINI_API_KEY is not set; assistant features will fail");
    }
    let backend = GeminiBackend::new(
        config.gemini_base_url.clone(),
        config.model.clone(),
        config.gemini_api_key.clone(),
    )
    .with_timeout(config.model_timeout_s)?;

    let config = Arc::new(config);
    let state = Arc::new(AppState {
        config: Arc::clone(&config),
        cases: Mutex::new(manager),
        chats: Mutex::new(ChatSessions::new()),
        assistant: LegalAssistant::new(Arc::new(backend)),
        start_time: Instant::now(),
    });

    let app = routes::router(state);

    let addr = format!("{}:{}", config.web_bind, config.web_port);
    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
