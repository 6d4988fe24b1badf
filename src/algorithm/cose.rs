//! COSE_Key (RFC 9052 §7) encoding of credential public keys.

use ciborium::value::Value;
use rsa::pkcs1::EncodeRsaPublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPublicKey};

use super::{Algorithm, CredentialPublicKey, Es256, KeyError, Rs256};

const LABEL_KTY: i64 = 1;
const LABEL_ALG: i64 = 3;
const LABEL_EC2_CRV: i64 = -1;
const LABEL_EC2_X: i64 = -2;
const LABEL_EC2_Y: i64 = -3;
const LABEL_RSA_N: i64 = -1;
const LABEL_RSA_E: i64 = -2;

const KTY_EC2: i64 = 2;
const KTY_RSA: i64 = 3;
const CRV_P256: i64 = 1;

fn cbor_get(map: &[(Value, Value)], key: i64) -> Option<&Value> {
    let target = Value::Integer(key.into());
    map.iter().find(|(k, _)| k == &target).map(|(_, v)| v)
}

fn cbor_int(map: &[(Value, Value)], key: i64, name: &str) -> Result<i64, KeyError> {
    match cbor_get(map, key) {
        Some(Value::Integer(i)) => {
            i64::try_from(*i).map_err(|_| KeyError::Cose(format!("{name} out of range")))
        }
        Some(_) => Err(KeyError::Cose(format!("{name} is not an integer"))),
        None => Err(KeyError::Cose(format!("missing {name}"))),
    }
}

fn cbor_bytes<'a>(map: &'a [(Value, Value)], key: i64, name: &str) -> Result<&'a [u8], KeyError> {
    match cbor_get(map, key) {
        Some(Value::Bytes(b)) => Ok(b),
        Some(_) => Err(KeyError::Cose(format!("{name} is not a byte string"))),
        None => Err(KeyError::Cose(format!("missing {name}"))),
    }
}

pub(crate) fn decode_cose_key(data: &[u8]) -> Result<CredentialPublicKey, KeyError> {
    let value: Value =
        ciborium::from_reader(data).map_err(|e| KeyError::Cose(e.to_string()))?;
    let Value::Map(map) = value else {
        return Err(KeyError::Cose("expected map".into()));
    };

    let algorithm = Algorithm::from_cose_id(cbor_int(&map, LABEL_ALG, "alg")?)?;
    let kty = cbor_int(&map, LABEL_KTY, "kty")?;

    match algorithm {
        Algorithm::Es256 => {
            if kty != KTY_EC2 {
                return Err(KeyError::Cose(format!("ES256 requires kty 2, got {kty}")));
            }
            let crv = cbor_int(&map, LABEL_EC2_CRV, "crv")?;
            if crv != CRV_P256 {
                return Err(KeyError::Cose(format!("ES256 requires crv 1, got {crv}")));
            }
            let x = cbor_bytes(&map, LABEL_EC2_X, "x")?;
            let y = cbor_bytes(&map, LABEL_EC2_Y, "y")?;
            if x.len() != 32 || y.len() != 32 {
                return Err(KeyError::InvalidKey(Algorithm::Es256));
            }
            let mut sec1 = Vec::with_capacity(65);
            sec1.push(0x04);
            sec1.extend_from_slice(x);
            sec1.extend_from_slice(y);
            CredentialPublicKey::es256(&sec1)
        }
        Algorithm::Rs256 => {
            if kty != KTY_RSA {
                return Err(KeyError::Cose(format!("RS256 requires kty 3, got {kty}")));
            }
            let n = cbor_bytes(&map, LABEL_RSA_N, "n")?;
            let e = cbor_bytes(&map, LABEL_RSA_E, "e")?;
            let key = RsaPublicKey::new(BigUint::from_bytes_be(n), BigUint::from_bytes_be(e))
                .map_err(|_| KeyError::InvalidKey(Algorithm::Rs256))?;
            let der = key
                .to_pkcs1_der()
                .map_err(|_| KeyError::InvalidKey(Algorithm::Rs256))?;
            CredentialPublicKey::rs256(der.as_bytes())
        }
    }
}

pub(crate) fn encode_cose_key(key: &CredentialPublicKey) -> Result<Vec<u8>, KeyError> {
    let alg = Value::Integer(key.algorithm().cose_id().into());
    let map = match key.algorithm() {
        Algorithm::Es256 => {
            let point = Es256::parse_key(key.as_bytes())?.to_encoded_point(false);
            let (Some(x), Some(y)) = (point.x(), point.y()) else {
                return Err(KeyError::InvalidKey(Algorithm::Es256));
            };
            Value::Map(vec![
                (Value::Integer(LABEL_KTY.into()), Value::Integer(KTY_EC2.into())),
                (Value::Integer(LABEL_ALG.into()), alg),
                (Value::Integer(LABEL_EC2_CRV.into()), Value::Integer(CRV_P256.into())),
                (Value::Integer(LABEL_EC2_X.into()), Value::Bytes(x.to_vec())),
                (Value::Integer(LABEL_EC2_Y.into()), Value::Bytes(y.to_vec())),
            ])
        }
        Algorithm::Rs256 => {
            let rsa = Rs256::parse_key(key.as_bytes())?;
            Value::Map(vec![
                (Value::Integer(LABEL_KTY.into()), Value::Integer(KTY_RSA.into())),
                (Value::Integer(LABEL_ALG.into()), alg),
                (Value::Integer(LABEL_RSA_N.into()), Value::Bytes(rsa.n().to_bytes_be())),
                (Value::Integer(LABEL_RSA_E.into()), Value::Bytes(rsa.e().to_bytes_be())),
            ])
        }
    };
    let mut buf = Vec::new();
    ciborium::into_writer(&map, &mut buf).map_err(|e| KeyError::Cose(e.to_string()))?;
    Ok(buf)
}
