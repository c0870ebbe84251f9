//! Error types for the Masumi MCP server.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Rejections from the testnet safety gate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SafetyError {
    #[error("Mainnet operations not allowed in testing mode")]
    UnsafeNetwork,

    #[error("Only Preprod network allowed in testing, got: {0}")]
    InvalidNetwork(String),

    #[error(
        "Only test data allowed. Identifier must start with 'masumi-test-', got: {0}"
    )]
    NonTestIdentifier(String),
}

/// Stdio transport errors.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Writer task failed: {0}")]
    Writer(String),
}

/// Result type alias for the server.
pub type Result<T> = std::result::Result<T, Error>;
