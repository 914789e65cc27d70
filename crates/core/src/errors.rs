use thiserror::Error;

/// Unified error type for the entire investment-records-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage / File ──────────────────────────────────────────────
    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u16),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed — wrong password or corrupted file")]
    Decryption,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Stored data under '{key}' is corrupt: {message}")]
    StorageCorruption { key: String, message: String },

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    // ── Import / Export ─────────────────────────────────────────────
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("CSV error: {0}")]
    Csv(String),
}

impl CoreError {
    /// Shorthand for a validation failure carrying a single message.
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(vec![message.into()])
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::Csv(e.to_string())
    }
}

impl From<aes_gcm::Error> for CoreError {
    fn from(_: aes_gcm::Error) -> Self {
        CoreError::Decryption
    }
}
