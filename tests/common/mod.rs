#![allow(dead_code)]

use std::sync::OnceLock;

use p256::ecdsa::signature::Signer as _;
use p256::ecdsa::{DerSignature, SigningKey};
use rsa::pkcs1::EncodeRsaPublicKey;
use rsa::signature::{SignatureEncoding, Signer as _};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use passkey_verify::algorithm::CredentialPublicKey;
use passkey_verify::config::RelyingParty;
use passkey_verify::store::Credential;
use passkey_verify::webauthn::authenticator_data::{FLAG_UP, FLAG_UV};
use passkey_verify::webauthn::{build_assertion_auth_data, Assertion};

pub const RP_ID: &str = "example.com";
pub const ORIGIN: &str = "https://example.com";
pub const CHALLENGE: &str = "Y2hhbGxlbmdlLWZvci10ZXN0cw";

pub fn relying_party() -> RelyingParty {
    RelyingParty::new(RP_ID, ORIGIN)
}

/// A software authenticator holding one private key.
pub trait TestAuthenticator {
    fn public_key(&self) -> CredentialPublicKey;
    fn sign(&self, data: &[u8]) -> Vec<u8>;
}

pub struct Es256Authenticator(SigningKey);

impl Es256Authenticator {
    pub fn new(seed: u8) -> Self {
        Self(SigningKey::from_bytes(&[seed; 32].into()).unwrap())
    }
}

impl TestAuthenticator for Es256Authenticator {
    fn public_key(&self) -> CredentialPublicKey {
        CredentialPublicKey::es256(self.0.verifying_key().to_encoded_point(false).as_bytes())
            .unwrap()
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let sig: DerSignature = self.0.sign(data);
        sig.as_bytes().to_vec()
    }
}

pub struct Rs256Authenticator(&'static RsaPrivateKey);

impl Rs256Authenticator {
    /// RSA key generation is slow; every test in a binary shares one key.
    pub fn shared() -> Self {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        Self(KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap()))
    }
}

impl TestAuthenticator for Rs256Authenticator {
    fn public_key(&self) -> CredentialPublicKey {
        let der = RsaPublicKey::from(self.0).to_pkcs1_der().unwrap();
        CredentialPublicKey::rs256(der.as_bytes()).unwrap()
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let sk = rsa::pkcs1v15::SigningKey::<Sha256>::new(self.0.clone());
        sk.sign(data).to_vec()
    }
}

pub fn credential(
    authenticator: &dyn TestAuthenticator,
    credential_id: &[u8],
    user_id: &[u8],
) -> Credential {
    Credential::new(credential_id.to_vec(), user_id.to_vec(), authenticator.public_key())
}

/// Everything an authenticator and browser put into one assertion.
#[derive(Debug, Clone)]
pub struct Ceremony {
    pub ceremony_type: String,
    pub challenge: String,
    pub origin: String,
    pub cross_origin: bool,
    pub rp_id: String,
    pub flags: u8,
    pub sign_count: u32,
    pub user_handle: Option<Vec<u8>>,
}

impl Ceremony {
    pub fn new(sign_count: u32) -> Self {
        Self {
            ceremony_type: "webauthn.get".into(),
            challenge: CHALLENGE.into(),
            origin: ORIGIN.into(),
            cross_origin: false,
            rp_id: RP_ID.into(),
            flags: FLAG_UP | FLAG_UV,
            sign_count,
            user_handle: None,
        }
    }

    pub fn client_data(&self) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "type": self.ceremony_type,
            "challenge": self.challenge,
            "origin": self.origin,
            "crossOrigin": self.cross_origin,
        }))
        .unwrap()
    }

    pub fn sign(&self, authenticator: &dyn TestAuthenticator, credential_id: &[u8]) -> Assertion {
        let rp_id_hash: [u8; 32] = Sha256::digest(self.rp_id.as_bytes()).into();
        let authenticator_data =
            build_assertion_auth_data(&rp_id_hash, self.flags, self.sign_count);
        let client_data = self.client_data();

        let mut signed = authenticator_data.clone();
        signed.extend_from_slice(&Sha256::digest(&client_data));

        Assertion {
            credential_id: credential_id.to_vec(),
            client_data,
            authenticator_data,
            signature: authenticator.sign(&signed),
            user_handle: self.user_handle.clone(),
        }
    }
}
