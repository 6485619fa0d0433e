#[derive(Debug, thiserror::Error)]
pub enum WebhdfsError {
    #[error("Unknown registry key: {0}")]
    UnknownKey(String),

    #[error("Registry is immutable: cannot register {0}")]
    ImmutableRegistry(String),

    #[error("Invalid search key: {0}")]
    InvalidKey(String),

    #[error("Invalid search operator: {0}")]
    InvalidOperator(String),

    #[error("Invalid operand for {key} {operator}: {message}")]
    InvalidOperand {
        key: String,
        operator: String,
        message: String,
    },

    #[error("Invalid search token: {0}")]
    InvalidToken(String),

    #[error("Search expression incorrect: {0}")]
    MalformedExpression(String),

    #[error("Missing argument: {0}")]
    MissingArgument(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{operation} failed for {path}: {message}")]
    PathUnavailable {
        path: String,
        operation: &'static str,
        message: String,
    },

    #[error("Remote exception: {0}")]
    Remote(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Cannot connect to webhdfs service at {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation cancelled")]
    Cancelled,
}

impl WebhdfsError {
    /// Returns true for environmental failures that `ignore_errors` may suppress.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::PathUnavailable { .. }
                | Self::Remote(_)
                | Self::Http(_)
                | Self::MalformedResponse(_)
                | Self::Connection(_)
        )
    }

    pub(crate) fn path_unavailable(
        path: &str,
        operation: &'static str,
        source: impl std::fmt::Display,
    ) -> Self {
        Self::PathUnavailable {
            path: path.to_string(),
            operation,
            message: source.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WebhdfsError>;
