use crate::errors::CoreError;

use super::encryption::{KdfParams, NONCE_LEN, SALT_LEN};

/// Magic bytes of an investment-records vault.
pub const MAGIC: &[u8; 4] = b"IRSV";

pub const CURRENT_VERSION: u16 = 1;

/// magic(4) + version(2) + kdf(3×4) + salt(16) + nonce(12) + ciphertext_len(8)
pub const HEADER_LEN: usize = 4 + 2 + 12 + SALT_LEN + NONCE_LEN + 8;

/// Everything in a vault file except the ciphertext.
///
/// ```text
/// [IRSV] [version u16 LE] [memory_cost u32 LE] [time_cost u32 LE]
/// [parallelism u32 LE] [salt 16B] [nonce 12B] [ciphertext_len u64 LE]
/// [ciphertext (AES-GCM tag included)]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultHeader {
    pub version: u16,
    pub kdf_params: KdfParams,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
}

impl VaultHeader {
    pub fn new(kdf_params: KdfParams, salt: [u8; SALT_LEN], nonce: [u8; NONCE_LEN]) -> Self {
        Self {
            version: CURRENT_VERSION,
            kdf_params,
            salt,
            nonce,
        }
    }

    /// Header followed by `ciphertext`.
    pub fn encode(&self, ciphertext: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.kdf_params.memory_cost.to_le_bytes());
        out.extend_from_slice(&self.kdf_params.time_cost.to_le_bytes());
        out.extend_from_slice(&self.kdf_params.parallelism.to_le_bytes());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&(ciphertext.len() as u64).to_le_bytes());
        out.extend_from_slice(ciphertext);
        out
    }

    /// Split a vault file into its header and ciphertext.
    pub fn decode(data: &[u8]) -> Result<(Self, &[u8]), CoreError> {
        if data.len() < HEADER_LEN {
            return Err(CoreError::InvalidFileFormat(format!(
                "vault is {} bytes, shorter than the {HEADER_LEN}-byte header",
                data.len()
            )));
        }

        let mut reader = ByteReader::new(data);
        if reader.take::<4>()? != *MAGIC {
            return Err(CoreError::InvalidFileFormat("not an IRSV vault".into()));
        }

        let version = u16::from_le_bytes(reader.take()?);
        if version == 0 || version > CURRENT_VERSION {
            return Err(CoreError::UnsupportedVersion(version));
        }

        let kdf_params = KdfParams {
            memory_cost: u32::from_le_bytes(reader.take()?),
            time_cost: u32::from_le_bytes(reader.take()?),
            parallelism: u32::from_le_bytes(reader.take()?),
        };
        kdf_params.check()?;

        let salt = reader.take()?;
        let nonce = reader.take()?;
        let declared = u64::from_le_bytes(reader.take()?);

        let rest = reader.rest();
        let len = usize::try_from(declared)
            .ok()
            .filter(|len| *len <= rest.len())
            .ok_or_else(|| {
                CoreError::InvalidFileFormat(format!(
                    "vault truncated: header declares {declared} ciphertext bytes, {} present",
                    rest.len()
                ))
            })?;

        let header = Self {
            version,
            kdf_params,
            salt,
            nonce,
        };
        Ok((header, &rest[..len]))
    }
}

/// Forward-only cursor over a byte slice.
struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], CoreError> {
        let end = self.pos + N;
        let bytes: [u8; N] = self
            .data
            .get(self.pos..end)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| CoreError::InvalidFileFormat("unexpected end of vault header".into()))?;
        self.pos = end;
        Ok(bytes)
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}
