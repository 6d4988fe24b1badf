use crate::algorithm::KeyError;
use crate::store::StoreError;
use crate::webauthn::VerifyError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Store: {0}")]
    Store(#[from] StoreError),
    #[error("Verify: {0}")]
    Verify(#[from] VerifyError),
    #[error("Key: {0}")]
    Key(#[from] KeyError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Flat classification of every failure, for callers that alert or count by
/// kind rather than match on the nested enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    CredentialNotFound,
    OwnershipMismatch,
    UnexpectedCeremonyType,
    ChallengeMismatch,
    OriginMismatch,
    RpIdMismatch,
    UserNotPresent,
    UserVerificationRequired,
    CounterRollback,
    SignatureInvalid,
    UnsupportedAlgorithm,
    MalformedInput,
    DuplicateId,
    CounterRegression,
    Cancelled,
}

impl ErrorKind {
    /// Counter failures point at a cloned authenticator or a replayed
    /// assertion and warrant review of the credential.
    pub fn is_security_incident(self) -> bool {
        matches!(self, Self::CounterRollback | Self::CounterRegression)
    }
}

impl VerifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CredentialNotFound => ErrorKind::CredentialNotFound,
            Self::OwnershipMismatch => ErrorKind::OwnershipMismatch,
            Self::UnexpectedCeremonyType(_) => ErrorKind::UnexpectedCeremonyType,
            Self::ChallengeMismatch => ErrorKind::ChallengeMismatch,
            Self::OriginMismatch(_) => ErrorKind::OriginMismatch,
            Self::RpIdMismatch => ErrorKind::RpIdMismatch,
            Self::UserNotPresent => ErrorKind::UserNotPresent,
            Self::UserVerificationRequired => ErrorKind::UserVerificationRequired,
            Self::CounterRollback { .. } => ErrorKind::CounterRollback,
            Self::SignatureInvalid => ErrorKind::SignatureInvalid,
            Self::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            Self::MalformedInput(_) => ErrorKind::MalformedInput,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateId => ErrorKind::DuplicateId,
            Self::NotFound => ErrorKind::CredentialNotFound,
            Self::CounterRegression { .. } => ErrorKind::CounterRegression,
        }
    }
}

impl KeyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            Self::InvalidKey(_) | Self::Cose(_) => ErrorKind::MalformedInput,
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(e) => e.kind(),
            Self::Verify(e) => e.kind(),
            Self::Key(e) => e.kind(),
        }
    }
}
