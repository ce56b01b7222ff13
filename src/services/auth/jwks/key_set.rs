//! JSON Web Key Set as published by the identity provider.

use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};

/// One RSA public key from the provider's key set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKey {
    pub kid: String,
    pub kty: String,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    pub n: String,
    pub e: String,
}

impl SigningKey {
    pub fn decoding_key(&self) -> Result<DecodingKey, jsonwebtoken::errors::Error> {
        DecodingKey::from_rsa_components(&self.n, &self.e)
    }
}

/// Verification keys indexed by `kid`.
///
/// Only RSA signing keys are retained; `kid`s are unique within a set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    keys: Vec<SigningKey>,
}

#[derive(Deserialize)]
struct RawKeySet {
    keys: Vec<serde_json::Value>,
}

impl KeySet {
    pub fn new(keys: impl IntoIterator<Item = SigningKey>) -> Self {
        let mut set = Self::default();
        for key in keys {
            set.push(key);
        }
        set
    }

    /// Parse a JWKS document (`{"keys": [...]}`).
    ///
    /// Entries that are not RSA signing keys (EC keys, encryption keys,
    /// keys without a `kid`) are skipped.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: RawKeySet = serde_json::from_slice(bytes)?;

        let keys = raw.keys.into_iter().filter_map(|value| {
            match serde_json::from_value::<SigningKey>(value) {
                Ok(key) if key.kty == "RSA" && key.key_use.as_deref().is_none_or(|u| u == "sig") => {
                    Some(key)
                }
                Ok(key) => {
                    tracing::debug!(kid = %key.kid, kty = %key.kty, "skipping non-signing jwk");
                    None
                }
                Err(err) => {
                    tracing::debug!(error = %err, "skipping unsupported jwk");
                    None
                }
            }
        });

        Ok(Self::new(keys))
    }

    fn push(&mut self, key: SigningKey) {
        if self.find(&key.kid).is_some() {
            tracing::warn!(kid = %key.kid, "duplicate kid in key set, keeping the first entry");
            return;
        }
        self.keys.push(key);
    }

    pub fn find(&self, kid: &str) -> Option<&SigningKey> {
        self.keys.iter().find(|k| k.kid == kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn kids(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.kid.as_str())
    }
}
