use thiserror::Error;

pub type Result<T> = std::result::Result<T, VeritasError>;

pub const AUTH_FAILED_MESSAGE: &str = "AUTHENTICATION FAILED. Access Denied.";

/// Coarse error classes the presentation layer switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required text was empty; nothing was attempted.
    InvalidInput,
    /// A headline operation (document report, research) could not complete.
    AnalysisFailed,
    /// An auxiliary operation failed and was replaced by a default value.
    SoftDegrade,
    /// Submitted access code matched neither the case code nor the bypass code.
    AuthMismatch,
    NotFound,
    Storage,
}

#[derive(Debug, Error)]
pub enum VeritasError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{message}")]
    AnalysisFailed {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("{operation} degraded: {reason}")]
    SoftDegrade { operation: &'static str, reason: String },

    #[error("{}", AUTH_FAILED_MESSAGE)]
    AuthMismatch,

    #[error("case not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl VeritasError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn analysis_failed(message: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::AnalysisFailed {
            message: message.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::AnalysisFailed { .. } => ErrorKind::AnalysisFailed,
            Self::SoftDegrade { .. } => ErrorKind::SoftDegrade,
            Self::AuthMismatch => ErrorKind::AuthMismatch,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}
