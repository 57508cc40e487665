use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `cvrchat`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; the CLI edge continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum CvrChatError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── API transport ────────────────────────────────────────────────────
    #[error("api: {0}")]
    Api(#[from] ApiError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── API transport errors ────────────────────────────────────────────────────

/// Everything that can go wrong between the client and the backend.
///
/// `Network` means no response was received at all; `Http` is a non-2xx
/// response; `SchemaMismatch` is a response that arrived but did not match
/// the expected shape, carrying a path to the first offending field.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no response from server: {0}")]
    Network(String),

    #[error("request failed with HTTP {status}")]
    Http { status: u16 },

    #[error("response did not match schema at {path}")]
    SchemaMismatch { path: String },

    #[error("export failed with HTTP {status}")]
    ExportFailed { status: u16 },

    #[error("invalid CVR {cvr:?}: must be exactly 8 characters")]
    InvalidCvr { cvr: String },

    #[error("search query too short: need at least {min} characters")]
    QueryTooShort { min: usize },
}

impl ApiError {
    /// Human-readable message for the user-facing error surface.
    ///
    /// Schema paths are an internal detail; they go to the log, never to the
    /// terminal.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "No response from the server. Check your connection and try again.".to_string()
            }
            Self::Http { status } => format!("The request failed (HTTP {status})."),
            Self::SchemaMismatch { .. } => "Couldn't load results. Please try again.".to_string(),
            Self::ExportFailed { status } => format!("Export failed (HTTP {status})."),
            Self::InvalidCvr { .. } => "CVR numbers are exactly 8 characters.".to_string(),
            Self::QueryTooShort { min } => {
                format!("Type at least {min} characters to search.")
            }
        }
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, CvrChatError>;
