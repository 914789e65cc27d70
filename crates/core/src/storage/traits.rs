use crate::errors::CoreError;

/// Key-value persistence medium behind an `InvestmentStore`.
///
/// Values are opaque strings (the store writes JSON). Implementations decide
/// where the bytes live: memory, a plain file, an encrypted file. Swapping the
/// backend never touches the store's logic.
pub trait StorageBackend: Send {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// Value stored under `key`, or `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String) -> Result<(), CoreError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), CoreError>;

    /// All keys currently stored, in ascending order.
    fn keys(&self) -> Vec<String>;
}
