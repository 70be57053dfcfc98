//! Error types for Global Search

use thiserror::Error;

/// Result type alias using Global Search's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Global Search error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Network errors (E100-E199)
    #[error("Transport error: {0}. Check that the search cluster is reachable.")]
    Transport(#[from] reqwest::Error),

    #[error("Search engine returned {status}: {reason}")]
    Upstream { status: u16, reason: String },

    #[error("Failed to load the site directory: {0}")]
    LoadFailure(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Cache errors (E700-E799)
    #[error("Cache storage error: {0}")]
    Cache(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an upstream error for a response body that could not be decoded
    pub fn malformed(status: u16, detail: impl std::fmt::Display) -> Self {
        Self::Upstream {
            status,
            reason: format!("malformed response: {}", detail),
        }
    }

    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E100",
            Self::Upstream { .. } => "E101",
            Self::LoadFailure(_) => "E102",
            Self::ConfigError(_) => "E600",
            Self::Cache(_) => "E700",
            Self::InvalidInput(_) => "E800",
            Self::Json(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Transport(_) => Some("globalsearch config get search.endpoint".to_string()),
            Self::Upstream { status, .. } if *status >= 500 => Some(
                "The cluster may be busy with regex scans; retry later or narrow the query"
                    .to_string(),
            ),
            Self::LoadFailure(_) => Some("globalsearch config get sites.directory_url".to_string()),
            Self::ConfigError(_) => Some("globalsearch config list".to_string()),
            Self::Cache(_) => Some("globalsearch cache clear".to_string()),
            _ => None,
        }
    }

    /// Whether this error was produced by the remote search engine
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}
