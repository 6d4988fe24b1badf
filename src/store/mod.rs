pub mod credential;
pub mod index;

pub use credential::{sign_count_advances, Credential, Transport};
pub use index::CredentialStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Duplicate credential id")]
    DuplicateId,
    #[error("Not found")]
    NotFound,
    #[error("Counter regression: stored {stored}, attempted {attempted}")]
    CounterRegression { stored: u32, attempted: u32 },
}

/// The storage contract the authentication flow is written against.
///
/// [`CredentialStore`] is the in-memory reference implementation; a
/// database-backed store implements the same operations with the same
/// guarantees (unique ids, ownership-checked lookup, monotonic
/// `update_sign_count`).
pub trait CredentialRepository: Send + Sync {
    fn store_credential(&self, credential: Credential) -> Result<(), StoreError>;

    fn get_credential(&self, credential_id: &[u8]) -> Option<Credential>;

    fn get_credentials_by_user(&self, user_id: &[u8]) -> Vec<Credential>;

    fn get_credential_by_user_and_id(
        &self,
        user_id: &[u8],
        credential_id: &[u8],
    ) -> Option<Credential>;

    fn update_sign_count(&self, credential_id: &[u8], new_count: u32) -> Result<(), StoreError>;

    fn delete_credential(&self, credential_id: &[u8]) -> Result<(), StoreError>;

    fn count(&self) -> usize;
}
