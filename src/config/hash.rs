//! Configuration fingerprinting.
//!
//! A fingerprint is a deterministic SHA-256 digest of the parsed model, so
//! two gate runs over the same file can be matched up in logs and reports.

use sha2::{Digest, Sha256};

use super::model::{ConfigModel, ConfigValue};

/// Computes fingerprints of configuration models.
#[derive(Debug, Default)]
pub struct ConfigFingerprint;

impl ConfigFingerprint {
    /// Creates a new fingerprinter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the hex digest of the whole model.
    ///
    /// Keys are visited in sorted order, so statement order in the source
    /// file does not change the result.
    #[must_use]
    pub fn compute(&self, model: &ConfigModel) -> String {
        let mut hasher = Sha256::new();

        for (key, value) in model.iter() {
            hasher.update(key.as_bytes());
            hasher.update([0u8]);
            Self::hash_value(&mut hasher, value);
            hasher.update([0xffu8]);
        }

        hex::encode(hasher.finalize())
    }

    /// Returns the first 8 characters of the digest.
    #[must_use]
    pub fn short(&self, model: &ConfigModel) -> String {
        let mut full = self.compute(model);
        full.truncate(8);
        full
    }

    fn hash_value(hasher: &mut Sha256, value: &ConfigValue) {
        hasher.update(value.kind().as_bytes());
        match value {
            ConfigValue::Bool(b) => hasher.update([u8::from(*b)]),
            ConfigValue::String(s) => hasher.update(s.as_bytes()),
            ConfigValue::Number(n) => hasher.update(n.to_be_bytes()),
            ConfigValue::StringList(items) => {
                for item in items {
                    hasher.update(item.as_bytes());
                    hasher.update([0u8]);
                }
            }
            ConfigValue::StringMap(map) => {
                for (k, v) in map {
                    hasher.update(k.as_bytes());
                    hasher.update(b"=");
                    hasher.update(v.as_bytes());
                    hasher.update([0u8]);
                }
            }
        }
    }
}
