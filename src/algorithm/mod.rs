//! Signature algorithms a credential can be registered with.
//!
//! The algorithm is a closed set ([`Algorithm`]) fixed on the credential at
//! registration time. The verification pipeline never inspects the variant
//! itself; it asks an [`AlgorithmProvider`] for the registered
//! [`SignatureAlgorithm`] and calls `verify`.

pub mod cose;
pub mod es256;
pub mod key;
pub mod rs256;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use es256::Es256;
pub use key::CredentialPublicKey;
pub use rs256::Rs256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("unsupported algorithm: COSE {0}")]
    UnsupportedAlgorithm(i64),
    #[error("invalid {0} public key")]
    InvalidKey(Algorithm),
    #[error("COSE: {0}")]
    Cose(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// ECDSA over P-256 with SHA-256.
    #[serde(rename = "ES256")]
    Es256,
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    #[serde(rename = "RS256")]
    Rs256,
}

impl Algorithm {
    /// COSE algorithm identifier (IANA "COSE Algorithms" registry).
    pub const fn cose_id(self) -> i64 {
        match self {
            Self::Es256 => -7,
            Self::Rs256 => -257,
        }
    }

    pub fn from_cose_id(id: i64) -> Result<Self, KeyError> {
        match id {
            -7 => Ok(Self::Es256),
            -257 => Ok(Self::Rs256),
            other => Err(KeyError::UnsupportedAlgorithm(other)),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Es256 => "ES256",
            Self::Rs256 => "RS256",
        }
    }

    /// Parse `key` in this algorithm's storage encoding, discarding the result.
    pub(crate) fn validate_key(self, key: &[u8]) -> Result<(), KeyError> {
        match self {
            Self::Es256 => Es256::parse_key(key).map(|_| ()),
            Self::Rs256 => Rs256::parse_key(key).map(|_| ()),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One signature scheme. `public_key` is in the storage encoding of
/// [`CredentialPublicKey`] for the implementation's algorithm.
pub trait SignatureAlgorithm: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    fn verify(&self, payload: &[u8], signature: &[u8], public_key: &[u8]) -> bool;
}

/// Tag-to-implementation table consulted by the verifier.
///
/// `Default` registers ES256 and RS256. A relying party that only accepts a
/// subset removes the rest with [`AlgorithmProvider::without`]; credentials
/// tagged with a removed algorithm then fail with `UnsupportedAlgorithm`.
#[derive(Clone)]
pub struct AlgorithmProvider {
    registered: HashMap<Algorithm, Arc<dyn SignatureAlgorithm>>,
}

impl AlgorithmProvider {
    pub fn empty() -> Self {
        Self {
            registered: HashMap::new(),
        }
    }

    /// Register `implementation` under its own tag, replacing any previous one.
    pub fn with(mut self, implementation: Arc<dyn SignatureAlgorithm>) -> Self {
        self.registered
            .insert(implementation.algorithm(), implementation);
        self
    }

    pub fn without(mut self, algorithm: Algorithm) -> Self {
        self.registered.remove(&algorithm);
        self
    }

    pub fn get(&self, algorithm: Algorithm) -> Option<&dyn SignatureAlgorithm> {
        self.registered.get(&algorithm).map(|a| a.as_ref())
    }

    pub fn supports(&self, algorithm: Algorithm) -> bool {
        self.registered.contains_key(&algorithm)
    }
}

impl Default for AlgorithmProvider {
    fn default() -> Self {
        Self::empty().with(Arc::new(Es256)).with(Arc::new(Rs256))
    }
}

impl fmt::Debug for AlgorithmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.registered.keys().map(|a| a.name()).collect();
        names.sort_unstable();
        f.debug_struct("AlgorithmProvider")
            .field("registered", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cose_ids_roundtrip() {
        for alg in [Algorithm::Es256, Algorithm::Rs256] {
            assert_eq!(Algorithm::from_cose_id(alg.cose_id()).unwrap(), alg);
        }
        assert_eq!(
            Algorithm::from_cose_id(-8),
            Err(KeyError::UnsupportedAlgorithm(-8)),
            "EdDSA is not supported"
        );
    }

    #[test]
    fn test_serde_uses_jose_names() {
        assert_eq!(serde_json::to_string(&Algorithm::Es256).unwrap(), "\"ES256\"");
        let alg: Algorithm = serde_json::from_str("\"RS256\"").unwrap();
        assert_eq!(alg, Algorithm::Rs256);
        assert!(serde_json::from_str::<Algorithm>("\"PS256\"").is_err());
    }

    #[test]
    fn test_default_provider_registers_both() {
        let provider = AlgorithmProvider::default();
        assert!(provider.supports(Algorithm::Es256));
        assert!(provider.supports(Algorithm::Rs256));
        assert_eq!(provider.get(Algorithm::Rs256).unwrap().algorithm(), Algorithm::Rs256);
    }

    #[test]
    fn test_without_removes_registration() {
        let provider = AlgorithmProvider::default().without(Algorithm::Rs256);
        assert!(provider.supports(Algorithm::Es256));
        assert!(!provider.supports(Algorithm::Rs256));
        assert!(provider.get(Algorithm::Rs256).is_none());
    }

    struct AlwaysValid;

    impl SignatureAlgorithm for AlwaysValid {
        fn algorithm(&self) -> Algorithm {
            Algorithm::Es256
        }

        fn verify(&self, _: &[u8], _: &[u8], _: &[u8]) -> bool {
            true
        }
    }

    #[test]
    fn test_with_replaces_existing_tag() {
        let provider = AlgorithmProvider::default().with(Arc::new(AlwaysValid));
        let es256 = provider.get(Algorithm::Es256).unwrap();
        assert!(es256.verify(b"", b"", b""));
    }
}
