use std::path::{Path, PathBuf};

use crate::errors::CoreError;

use super::encryption::KdfParams;
use super::manager::{Entries, StorageManager};
use super::traits::StorageBackend;

/// Password-protected backend: the key space lives in one IRSV vault file,
/// re-sealed with a fresh salt and nonce on every change. Native only.
pub struct EncryptedFileStorage {
    path: PathBuf,
    password: String,
    kdf_params: KdfParams,
    entries: Entries,
}

impl std::fmt::Debug for EncryptedFileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedFileStorage")
            .field("path", &self.path)
            .field("kdf_params", &self.kdf_params)
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl EncryptedFileStorage {
    /// Open the vault at `path`, or start an empty one if it does not exist.
    pub fn open(path: impl AsRef<Path>, password: &str) -> Result<Self, CoreError> {
        Self::open_with_params(path, password, KdfParams::default())
    }

    /// Like `open`, but new vaults are sealed with `kdf_params`. An existing
    /// vault keeps the parameters stored in its header.
    pub fn open_with_params(
        path: impl AsRef<Path>,
        password: &str,
        kdf_params: KdfParams,
    ) -> Result<Self, CoreError> {
        kdf_params.check()?;
        let path = path.as_ref().to_path_buf();
        let (entries, kdf_params) = if path.exists() {
            let bytes = std::fs::read(&path)?;
            StorageManager::open(&bytes, password)?
        } else {
            (Entries::new(), kdf_params)
        };
        Ok(Self {
            path,
            password: password.to_string(),
            kdf_params,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-seal the vault under `new_password`. `current_password` must match.
    pub fn change_password(
        &mut self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), CoreError> {
        if current_password != self.password {
            return Err(CoreError::Decryption);
        }
        let bytes = StorageManager::seal(&self.entries, new_password, &self.kdf_params)?;
        std::fs::write(&self.path, bytes)?;
        self.password = new_password.to_string();
        Ok(())
    }

    fn flush(&self) -> Result<(), CoreError> {
        let bytes = StorageManager::seal(&self.entries, &self.password, &self.kdf_params)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl StorageBackend for EncryptedFileStorage {
    fn name(&self) -> &str {
        "encrypted-file"
    }

    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), CoreError> {
        let previous = self.entries.insert(key.to_string(), value);
        if let Err(e) = self.flush() {
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), CoreError> {
        if let Some(old) = self.entries.remove(key) {
            if let Err(e) = self.flush() {
                self.entries.insert(key.to_string(), old);
                return Err(e);
            }
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}
