//! Error types for starknet-event-harvester

use crate::harvest::ScanWindow;
use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// RPC-related errors
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// A window failed to drain; carries the bounds so the caller can retry it
    #[error("Window {window} failed: {source}")]
    Window {
        window: ScanWindow,
        #[source]
        source: RpcError,
    },

    /// Payload decoding errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Output errors
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Attach window bounds to a transport failure
    pub fn window(window: ScanWindow, source: RpcError) -> Self {
        Error::Window { window, source }
    }

    /// The window a failure belongs to, if any
    pub fn failed_window(&self) -> Option<ScanWindow> {
        match self {
            Error::Window { window, .. } => Some(*window),
            _ => None,
        }
    }
}

/// RPC-specific errors (the transport side of the ledger query primitive)
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Rate limited by endpoint: {0}")]
    RateLimited(String),

    #[error("Invalid response from endpoint: {0}")]
    InvalidResponse(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Node error {code}: {message}")]
    Provider { code: i64, message: String },

    #[error("Continuation token did not advance: {0}")]
    StalledContinuation(String),
}

impl RpcError {
    /// Whether the endpoint's retry loop should try the request again
    pub fn is_retryable(&self) -> bool {
        match self {
            RpcError::Timeout(_) | RpcError::RateLimited(_) | RpcError::ConnectionFailed(_) => true,
            RpcError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            RpcError::InvalidResponse(_)
            | RpcError::Provider { .. }
            | RpcError::StalledContinuation(_) => false,
        }
    }
}

/// What went wrong inside a packed ByteArray
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ByteArrayFault {
    #[error("full word count {0} is not a small non-negative integer")]
    BadHeader(String),

    #[error("needs {needed} words but only {available} remain")]
    Truncated { needed: usize, available: usize },

    #[error("pending length {0} exceeds 30 bytes")]
    PendingLenOutOfRange(String),
}

/// Payload decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed ByteArray at word {offset}: {fault}")]
    MalformedByteArray { offset: usize, fault: ByteArrayFault },

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Value does not fit in 256 bits: {0}")]
    Overflow(String),

    #[error("Payload truncated: field '{field}' needs word {offset}, payload has {len}")]
    Truncated {
        field: String,
        offset: usize,
        len: usize,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid event signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid felt: {0}")]
    InvalidFelt(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config file: {0}")]
    InvalidFile(String),

    #[error("Invalid address format: {0}")]
    InvalidAddress(String),

    #[error("Invalid block number: {0}")]
    InvalidBlockNumber(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Config file parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Output-related errors
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write JSON: {0}")]
    JsonWrite(String),

    #[error("Failed to write CSV: {0}")]
    CsvWrite(String),

    #[error("Failed to create output file: {0}")]
    FileCreate(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
