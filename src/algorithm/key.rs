use serde::{Deserialize, Serialize};

use super::{cose, Algorithm, KeyError};

/// A credential's public key together with its algorithm tag.
///
/// Storage encoding: SEC1 point for ES256, PKCS#1 DER for RS256. The key is
/// parsed once on construction, so a value of this type always holds a
/// loadable key for its tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PublicKeyRecord", into = "PublicKeyRecord")]
pub struct CredentialPublicKey {
    algorithm: Algorithm,
    key: Vec<u8>,
}

impl CredentialPublicKey {
    pub fn new(algorithm: Algorithm, key: Vec<u8>) -> Result<Self, KeyError> {
        algorithm.validate_key(&key)?;
        Ok(Self { algorithm, key })
    }

    pub fn es256(sec1: &[u8]) -> Result<Self, KeyError> {
        Self::new(Algorithm::Es256, sec1.to_vec())
    }

    pub fn rs256(pkcs1_der: &[u8]) -> Result<Self, KeyError> {
        Self::new(Algorithm::Rs256, pkcs1_der.to_vec())
    }

    /// Decode the COSE_Key handed over by a registration ceremony.
    pub fn from_cose(data: &[u8]) -> Result<Self, KeyError> {
        cose::decode_cose_key(data)
    }

    pub fn to_cose(&self) -> Result<Vec<u8>, KeyError> {
        cose::encode_cose_key(self)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct PublicKeyRecord {
    alg: Algorithm,
    #[serde(with = "crate::encoding::base64url")]
    key: Vec<u8>,
}

impl TryFrom<PublicKeyRecord> for CredentialPublicKey {
    type Error = KeyError;

    fn try_from(record: PublicKeyRecord) -> Result<Self, Self::Error> {
        Self::new(record.alg, record.key)
    }
}

impl From<CredentialPublicKey> for PublicKeyRecord {
    fn from(key: CredentialPublicKey) -> Self {
        Self {
            alg: key.algorithm,
            key: key.key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::SigningKey;

    fn sec1() -> Vec<u8> {
        let sk = SigningKey::from_bytes(&[3u8; 32].into()).unwrap();
        sk.verifying_key().to_encoded_point(false).as_bytes().to_vec()
    }

    #[test]
    fn test_new_validates_key() {
        assert!(CredentialPublicKey::es256(&sec1()).is_ok());
        assert_eq!(
            CredentialPublicKey::es256(&[1, 2, 3]).unwrap_err(),
            KeyError::InvalidKey(Algorithm::Es256)
        );
        // A valid P-256 point is not a valid RSA key.
        assert!(CredentialPublicKey::rs256(&sec1()).is_err());
    }

    #[test]
    fn test_json_shape() {
        let key = CredentialPublicKey::es256(&sec1()).unwrap();
        let json = serde_json::to_value(&key).unwrap();
        assert_eq!(json["alg"], "ES256");
        assert!(json["key"].is_string());

        let back: CredentialPublicKey = serde_json::from_value(json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_json_with_bad_key_rejected() {
        let json = serde_json::json!({ "alg": "ES256", "key": "AAAA" });
        assert!(serde_json::from_value::<CredentialPublicKey>(json).is_err());
    }
}
