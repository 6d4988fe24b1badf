//! Caller-side authentication flow: ownership lookup, verification, counter
//! commit. The verifier stays side-effect free; this is the one place that
//! writes the verified counter back.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::store::{CredentialRepository, StoreError};
use crate::webauthn::{Assertion, AssertionVerifier, Expectations, VerifiedAssertion, VerifyError};

/// Authenticate `user_id` with `assertion`.
///
/// A credential owned by another user is reported as `CredentialNotFound`.
/// If another request committed a newer counter for the same credential
/// between verification and commit, the store's `CounterRegression` is
/// returned and the attempt must be treated as failed.
pub fn authenticate<R>(
    store: &R,
    verifier: &AssertionVerifier,
    user_id: &[u8],
    assertion: &Assertion,
    expected: &Expectations,
) -> Result<VerifiedAssertion>
where
    R: CredentialRepository + ?Sized,
{
    let credential = store
        .get_credential_by_user_and_id(user_id, &assertion.credential_id)
        .ok_or(VerifyError::CredentialNotFound)?;
    let verified = verifier.verify(assertion, &credential, expected)?;
    commit(store, &verified)?;
    Ok(verified)
}

/// [`authenticate`] with the signature check on tokio's blocking pool,
/// bounded by `limit`.
pub async fn authenticate_in_pool<R>(
    store: &R,
    verifier: Arc<AssertionVerifier>,
    user_id: &[u8],
    assertion: Assertion,
    expected: Expectations,
    limit: std::time::Duration,
) -> Result<VerifiedAssertion>
where
    R: CredentialRepository + ?Sized,
{
    let credential = store
        .get_credential_by_user_and_id(user_id, &assertion.credential_id)
        .ok_or(VerifyError::CredentialNotFound)?;
    let verified = verifier
        .verify_in_pool(assertion, credential, expected, limit)
        .await?;
    commit(store, &verified)?;
    Ok(verified)
}

fn commit<R>(store: &R, verified: &VerifiedAssertion) -> Result<(), Error>
where
    R: CredentialRepository + ?Sized,
{
    store
        .update_sign_count(&verified.credential_id, verified.new_sign_count)
        .map_err(|e| {
            if let StoreError::CounterRegression { stored, attempted } = e {
                tracing::warn!(
                    credential_id = %crate::encoding::hex(&verified.credential_id),
                    stored,
                    attempted,
                    "Lost counter commit race; rejecting authentication"
                );
            }
            Error::from(e)
        })
}
