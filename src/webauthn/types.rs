use serde::{Deserialize, Serialize};

use crate::algorithm::Algorithm;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("credential not found")]          CredentialNotFound,
    #[error("user handle does not match")]    OwnershipMismatch,
    #[error("unexpected ceremony type {0:?}")] UnexpectedCeremonyType(String),
    #[error("challenge mismatch")]            ChallengeMismatch,
    #[error("origin mismatch: {0:?}")]        OriginMismatch(String),
    #[error("rp id hash mismatch")]           RpIdMismatch,
    #[error("user not present")]              UserNotPresent,
    #[error("user verification required")]    UserVerificationRequired,
    #[error("counter rollback: stored {stored}, presented {presented}")]
    CounterRollback { stored: u32, presented: u32 },
    #[error("signature invalid")]             SignatureInvalid,
    #[error("unsupported algorithm {0}")]     UnsupportedAlgorithm(Algorithm),
    #[error("malformed input: {0}")]          MalformedInput(String),
    #[error("verification cancelled")]        Cancelled,
}

/// An authentication assertion as decoded by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    #[serde(with = "crate::encoding::base64url")]
    pub credential_id: Vec<u8>,
    /// Raw `clientDataJSON` bytes, exactly as signed.
    #[serde(with = "crate::encoding::base64url")]
    pub client_data: Vec<u8>,
    #[serde(with = "crate::encoding::base64url")]
    pub authenticator_data: Vec<u8>,
    #[serde(with = "crate::encoding::base64url")]
    pub signature: Vec<u8>,
    #[serde(default, with = "crate::encoding::base64url_option")]
    pub user_handle: Option<Vec<u8>>,
}

/// What the caller's session and configuration say the assertion must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectations {
    /// base64url challenge issued for this ceremony.
    pub challenge: String,
    pub origin: String,
    pub rp_id: String,
    pub require_user_verification: bool,
}

/// A successful verification. The store has not been touched; the caller
/// commits `new_sign_count` through `update_sign_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAssertion {
    pub credential_id: Vec<u8>,
    pub user_id: Vec<u8>,
    pub new_sign_count: u32,
    pub user_verified: bool,
    pub backup_eligible: bool,
    pub backup_state: bool,
}
