use p256::ecdsa::signature::Verifier as _;
use p256::ecdsa::{DerSignature, VerifyingKey};

use super::{Algorithm, KeyError, SignatureAlgorithm};

/// ECDSA P-256 / SHA-256. Keys are SEC1 points (compressed or uncompressed),
/// signatures are ASN.1 DER as produced by WebAuthn authenticators.
#[derive(Debug, Clone, Copy, Default)]
pub struct Es256;

impl Es256 {
    pub(crate) fn parse_key(sec1: &[u8]) -> Result<VerifyingKey, KeyError> {
        VerifyingKey::from_sec1_bytes(sec1).map_err(|_| KeyError::InvalidKey(Algorithm::Es256))
    }
}

impl SignatureAlgorithm for Es256 {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Es256
    }

    fn verify(&self, payload: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        let Ok(key) = Self::parse_key(public_key) else {
            return false;
        };
        let Ok(signature) = DerSignature::from_bytes(signature) else {
            return false;
        };
        key.verify(payload, &signature).is_ok()
    }
}
