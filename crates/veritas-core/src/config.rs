use std::collections::HashMap;

use anyhow::Result;

/// Full application configuration.
/// Read from the process environment with `.env` as fallback.
/// The model API key is only ever taken from env/.env.
#[derive(Debug, Clone)]
pub struct Config {
    // Model capability
    pub gemini_api_key: String,
    pub model: String,
    pub gemini_base_url: String,
    /// Per-request timeout for model calls (0 = no limit).
    pub model_timeout_s: u64,

    // Storage
    pub data_dir: String,
    /// Key under which the whole case list is stored.
    pub storage_key: String,

    // Cases
    /// Access code given to newly created matters.
    pub default_access_code: String,
    /// Code that unlocks any case view. Demo shortcut, not a credential.
    pub access_bypass_code: String,
    /// Author recorded on notes added without an explicit author.
    pub note_author: String,

    // Local host
    pub web_bind: String,
    pub web_port: u16,
    pub dashboard_dist_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            model: "gemini-2.5-flash".into(),
            gemini_base_url: "https://generativelanguage.googleapis.com".into(),
            model_timeout_s: 0,
            data_dir: "store".into(),
            storage_key: "veritas_cases".into(),
            default_access_code: "1234".into(),
            access_bypass_code: "1234".into(),
            note_author: "Eleanor Sterling".into(),
            web_bind: "127.0.0.1".into(),
            web_port: 3131,
            dashboard_dist_dir: "dashboard/dist".into(),
        }
    }
}

fn parse_dotenv() -> HashMap<String, String> {
    let Ok(contents) = std::fs::read_to_string(".env") else {
        return HashMap::new();
    };
    parse_dotenv_str(&contents)
}

fn parse_dotenv_str(contents: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            let v = v.trim().trim_matches('"');
            map.insert(k.trim().to_string(), v.to_string());
        }
    }
    map
}

fn get(key: &str, dotenv: &HashMap<String, String>) -> Option<String> {
    std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
}

fn get_str(key: &str, dotenv: &HashMap<String, String>, default: &str) -> String {
    get(key, dotenv).unwrap_or_else(|| default.to_string())
}

fn get_u64(key: &str, dotenv: &HashMap<String, String>, default: u64) -> u64 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn get_u16(key: &str, dotenv: &HashMap<String, String>, default: u16) -> u16 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn resolve_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return format!("{home}/{rest}");
        }
    }
    path.to_string()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_lookup(&parse_dotenv()))
    }

    fn from_lookup(dotenv: &HashMap<String, String>) -> Self {
        let d = Config::default();

        // Accept the browser build's variable name as well.
        let gemini_api_key = get("GEMINI_API_KEY", dotenv)
            .filter(|s| !s.is_empty())
            .or_else(|| get("API_KEY", dotenv))
            .unwrap_or_default();

        Config {
            gemini_api_key,
            model: get_str("MODEL", dotenv, &d.model),
            gemini_base_url: get_str("GEMINI_BASE_URL", dotenv, &d.gemini_base_url),
            model_timeout_s: get_u64("MODEL_TIMEOUT_S", dotenv, d.model_timeout_s),
            data_dir: resolve_tilde(&get_str("DATA_DIR", dotenv, &d.data_dir)),
            storage_key: get_str("STORAGE_KEY", dotenv, &d.storage_key),
            default_access_code: get_str("DEFAULT_ACCESS_CODE", dotenv, &d.default_access_code),
            access_bypass_code: get_str("ACCESS_BYPASS_CODE", dotenv, &d.access_bypass_code),
            note_author: get_str("NOTE_AUTHOR", dotenv, &d.note_author),
            web_bind: get_str("WEB_BIND", dotenv, &d.web_bind),
            web_port: get_u16("WEB_PORT", dotenv, d.web_port),
            dashboard_dist_dir: get_str("DASHBOARD_DIST_DIR", dotenv, &d.dashboard_dist_dir),
        }
    }

    pub fn db_path(&self) -> String {
        format!("{}/veritas.db", self.data_dir.trim_end_matches('/'))
    }
}
