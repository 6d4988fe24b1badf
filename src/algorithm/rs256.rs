use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier as _;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use sha2::Sha256;

use super::{Algorithm, KeyError, SignatureAlgorithm};

/// Smallest modulus accepted at registration, in bytes (2048 bits).
pub const MIN_MODULUS_LEN: usize = 256;

/// RSASSA-PKCS1-v1_5 / SHA-256. Keys are PKCS#1 DER `RSAPublicKey`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rs256;

impl Rs256 {
    pub(crate) fn parse_key(der: &[u8]) -> Result<RsaPublicKey, KeyError> {
        let key = RsaPublicKey::from_pkcs1_der(der)
            .map_err(|_| KeyError::InvalidKey(Algorithm::Rs256))?;
        if key.size() < MIN_MODULUS_LEN {
            return Err(KeyError::InvalidKey(Algorithm::Rs256));
        }
        Ok(key)
    }
}

impl SignatureAlgorithm for Rs256 {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Rs256
    }

    fn verify(&self, payload: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        let Ok(key) = Self::parse_key(public_key) else {
            return false;
        };
        let Ok(signature) = Signature::try_from(signature) else {
            return false;
        };
        VerifyingKey::<Sha256>::new(key)
            .verify(payload, &signature)
            .is_ok()
    }
}
