use std::collections::BTreeMap;

use crate::errors::CoreError;

use super::encryption::{self, KdfParams};
use super::format::VaultHeader;

/// The key space of a storage backend: key → stored string.
pub type Entries = BTreeMap<String, String>;

/// Seals and opens a whole key space as one password-protected blob.
pub struct StorageManager;

impl StorageManager {
    /// Entries → bincode → AES-256-GCM(Argon2id(password)) → IRSV bytes.
    ///
    /// Salt and nonce are fresh on every call.
    pub fn seal(entries: &Entries, password: &str, params: &KdfParams) -> Result<Vec<u8>, CoreError> {
        let plaintext = bincode::serialize(entries)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize entries: {e}")))?;

        let salt = encryption::random_bytes()?;
        let nonce = encryption::random_bytes()?;
        let key = encryption::derive_key(password, &salt, params)?;
        let ciphertext = encryption::seal(&plaintext, &key, &nonce)?;

        Ok(VaultHeader::new(*params, salt, nonce).encode(&ciphertext))
    }

    /// IRSV bytes → entries, plus the KDF parameters the vault was sealed with.
    pub fn open(data: &[u8], password: &str) -> Result<(Entries, KdfParams), CoreError> {
        let (header, ciphertext) = VaultHeader::decode(data)?;
        let key = encryption::derive_key(password, &header.salt, &header.kdf_params)?;
        let plaintext = encryption::unseal(ciphertext, &key, &header.nonce)?;

        let entries: Entries = bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize entries: {e}")))?;
        Ok((entries, header.kdf_params))
    }
}
