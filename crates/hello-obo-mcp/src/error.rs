//! Error types for the hello OBO MCP server.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

/// Errors from decoding a token payload.
#[derive(thiserror::Error, Debug)]
pub enum ClaimsError {
    /// Token does not have at least `header.payload`.
    #[error("Invalid JWT format: expected at least 2 segments, found {segments}")]
    Format {
        /// Number of dot-separated segments found
        segments: usize,
    },

    /// Base64 segment length leaves a single dangling character.
    #[error("Invalid base64url length {0}")]
    InvalidLength(usize),

    /// Payload segment is not base64.
    #[error("Invalid base64url payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded payload is not UTF-8.
    #[error("Payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Decoded payload is not a JSON object.
    #[error("Payload is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the outbound HTTP layer (token endpoint and Graph).
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// OBO credentials are missing
    #[error("On-behalf-of exchange is not configured (tenant, client id and secret are required)")]
    NotConfigured,

    /// The user assertion was rejected (expired, wrong audience, malformed)
    #[error("User assertion rejected: {description}")]
    InvalidAssertion {
        /// Provider error description
        description: String,
    },

    /// The user or an admin has not consented to the downstream scopes
    #[error("Consent required: {description}")]
    ConsentRequired {
        /// Provider error description
        description: String,
    },

    /// Any other OAuth error returned by the token endpoint
    #[error("Token endpoint error ({status}) {error}: {description}")]
    TokenEndpoint {
        /// HTTP status code
        status: u16,
        /// OAuth `error` code
        error: String,
        /// Provider error description
        description: String,
    },

    /// Downstream rejected the bearer token (401/403)
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// A required field was absent from a response
    #[error("Response is missing field '{0}'")]
    MissingField(&'static str),

    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,
}

impl ClientError {
    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Create an unauthorized error.
    #[must_use]
    pub fn unauthorized(status: u16, message: impl Into<String>) -> Self {
        Self::Unauthorized { status, message: message.into() }
    }

    /// Returns true if the caller cancelled the request.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns true if the user token itself was the problem.
    #[must_use]
    pub const fn is_assertion_problem(&self) -> bool {
        matches!(self, Self::InvalidAssertion { .. } | Self::ConsentRequired { .. })
    }
}

impl From<crate::cancel::Cancelled> for ClientError {
    fn from(_: crate::cancel::Cancelled) -> Self {
        Self::Cancelled
    }
}

/// Errors from MCP tool execution.
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    /// Error from an outbound client
    #[error("API error: {0}")]
    Client(#[from] ClientError),

    /// Input validation failed
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The invocation was cancelled before it completed
    #[error("Tool invocation cancelled")]
    Cancelled,
}

impl ToolError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Returns true if the invocation was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Client(ClientError::Cancelled))
    }

    /// Convert to a user-friendly error message for MCP response.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Client(ClientError::ConsentRequired { .. }) => {
                "Consent is required for the downstream API. Ask an administrator to grant it."
                    .to_string()
            }
            Self::Validation { field, message } => {
                format!("Invalid input for '{field}': {message}")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;
