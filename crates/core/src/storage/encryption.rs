use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::errors::CoreError;

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;

/// Argon2id cost parameters. Written into every vault header so files sealed
/// with older settings stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Iterations
    pub time_cost: u32,
    /// Lanes
    pub parallelism: u32,
}

impl KdfParams {
    /// Cheap parameters for tests and throwaway vaults. Not for real data.
    pub fn insecure_fast() -> Self {
        Self {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    /// Reject parameters outside the range a well-formed vault can carry.
    /// Bounds crafted headers before any key derivation runs.
    pub fn check(&self) -> Result<(), CoreError> {
        if !(8..=1_048_576).contains(&self.memory_cost) {
            return Err(CoreError::InvalidFileFormat(format!(
                "KDF memory_cost {} KiB outside 8..=1048576",
                self.memory_cost
            )));
        }
        if !(1..=20).contains(&self.time_cost) {
            return Err(CoreError::InvalidFileFormat(format!(
                "KDF time_cost {} outside 1..=20",
                self.time_cost
            )));
        }
        if !(1..=16).contains(&self.parallelism) {
            return Err(CoreError::InvalidFileFormat(format!(
                "KDF parallelism {} outside 1..=16",
                self.parallelism
            )));
        }
        Ok(())
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65_536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// Stretch a password into an AES-256 key with Argon2id.
pub fn derive_key(
    password: &str,
    salt: &[u8; SALT_LEN],
    params: &KdfParams,
) -> Result<[u8; KEY_LEN], CoreError> {
    params.check()?;
    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| CoreError::Encryption(format!("Invalid Argon2 params: {e}")))?;

    let mut key = [0u8; KEY_LEN];
    Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params)
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| CoreError::Encryption(format!("Argon2 key derivation failed: {e}")))?;
    Ok(key)
}

/// AES-256-GCM encrypt; the authentication tag is appended to the output.
pub fn seal(
    plaintext: &[u8],
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>, CoreError> {
    cipher(key)?
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| CoreError::Encryption(format!("Encryption failed: {e}")))
}

/// AES-256-GCM decrypt. Any tag mismatch (wrong password, tampering) is
/// `CoreError::Decryption`.
pub fn unseal(
    ciphertext: &[u8],
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>, CoreError> {
    Ok(cipher(key)?.decrypt(Nonce::from_slice(nonce), ciphertext)?)
}

/// `N` bytes from the OS CSPRNG (salts, nonces).
pub fn random_bytes<const N: usize>() -> Result<[u8; N], CoreError> {
    let mut buf = [0u8; N];
    getrandom::getrandom(&mut buf)
        .map_err(|e| CoreError::Encryption(format!("OS random source failed: {e}")))?;
    Ok(buf)
}

fn cipher(key: &[u8; KEY_LEN]) -> Result<Aes256Gcm, CoreError> {
    Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))
}
