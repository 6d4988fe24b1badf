use serde::{Deserialize, Serialize};

use crate::algorithm::CredentialPublicKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Usb,
    Nfc,
    Ble,
    Internal,
    Hybrid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(with = "crate::encoding::base64url")]
    pub credential_id: Vec<u8>,
    #[serde(with = "crate::encoding::base64url")]
    pub user_id: Vec<u8>,
    pub public_key: CredentialPublicKey,
    pub sign_count: u32,
    #[serde(default)]
    pub device_name: Option<String>,
    pub created_at: u64, // Unix timestamp
    pub updated_at: u64,
    #[serde(default)]
    pub transports: Vec<Transport>,
}

impl Credential {
    /// A freshly registered credential: counter 0, both timestamps now.
    pub fn new(credential_id: Vec<u8>, user_id: Vec<u8>, public_key: CredentialPublicKey) -> Self {
        let now = unix_now();
        Self {
            credential_id,
            user_id,
            public_key,
            sign_count: 0,
            device_name: None,
            created_at: now,
            updated_at: now,
            transports: Vec::new(),
        }
    }

    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    pub fn with_transports(mut self, transports: Vec<Transport>) -> Self {
        self.transports = transports;
        self
    }
}

/// The sign-counter acceptance rule shared by the verifier and the store:
/// the presented value must be strictly greater than the stored one, except
/// that an authenticator without counter support reports 0 forever.
pub fn sign_count_advances(stored: u32, presented: u32) -> bool {
    presented > stored || (stored == 0 && presented == 0)
}

pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
