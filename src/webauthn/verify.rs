use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::authenticator_data::{AuthenticatorData, MIN_AUTH_DATA_LEN};
use super::client_data::{CollectedClientData, CEREMONY_GET};
use super::types::{Assertion, Expectations, VerifiedAssertion, VerifyError};
use crate::algorithm::AlgorithmProvider;
use crate::config::{RelyingParty, MAX_CONFIGURABLE_INPUT_LEN, MAX_INPUT_LEN};
use crate::encoding::hex;
use crate::store::{sign_count_advances, Credential};

/// Stateless assertion verification.
///
/// Holds only configuration, so one instance can be shared by any number of
/// concurrent requests. Never writes to a store.
#[derive(Debug, Clone)]
pub struct AssertionVerifier {
    provider: AlgorithmProvider,
    max_input_len: usize,
    allow_cross_origin: bool,
}

impl Default for AssertionVerifier {
    fn default() -> Self {
        Self {
            provider: AlgorithmProvider::default(),
            max_input_len: MAX_INPUT_LEN,
            allow_cross_origin: false,
        }
    }
}

impl AssertionVerifier {
    /// `rp.max_input_len` is clamped to `MIN_AUTH_DATA_LEN..=MAX_CONFIGURABLE_INPUT_LEN`.
    pub fn new(rp: &RelyingParty) -> Self {
        Self {
            provider: AlgorithmProvider::default(),
            max_input_len: rp
                .max_input_len
                .clamp(MIN_AUTH_DATA_LEN, MAX_CONFIGURABLE_INPUT_LEN),
            allow_cross_origin: rp.allow_cross_origin,
        }
    }

    pub fn with_provider(mut self, provider: AlgorithmProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn verify(
        &self,
        assertion: &Assertion,
        credential: &Credential,
        expected: &Expectations,
    ) -> Result<VerifiedAssertion, VerifyError> {
        self.verify_with_cancel(assertion, credential, expected, &AtomicBool::new(false))
    }

    /// Same as [`verify`](Self::verify), giving up with `Cancelled` at the next
    /// stage boundary once `cancel` is set.
    pub fn verify_with_cancel(
        &self,
        assertion: &Assertion,
        credential: &Credential,
        expected: &Expectations,
        cancel: &AtomicBool,
    ) -> Result<VerifiedAssertion, VerifyError> {
        let result = self.run_pipeline(assertion, credential, expected, cancel);
        match &result {
            Ok(v) => tracing::debug!(
                credential_id = %hex(&credential.credential_id),
                count = v.new_sign_count,
                "Assertion verified"
            ),
            Err(e @ VerifyError::CounterRollback { .. }) => tracing::warn!(
                credential_id = %hex(&credential.credential_id),
                error = %e,
                "Possible cloned authenticator"
            ),
            Err(e) => tracing::info!(
                credential_id = %hex(&credential.credential_id),
                error = %e,
                "Assertion rejected"
            ),
        }
        result
    }

    /// Run verification on tokio's blocking pool. If `limit` elapses first the
    /// worker is signalled to stop and `Cancelled` is returned. A worker that
    /// panics is reported as `SignatureInvalid`.
    pub async fn verify_in_pool(
        self: Arc<Self>,
        assertion: Assertion,
        credential: Credential,
        expected: Expectations,
        limit: Duration,
    ) -> Result<VerifiedAssertion, VerifyError> {
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel2 = Arc::clone(&cancel);
        let join = tokio::task::spawn_blocking(move || {
            self.verify_with_cancel(&assertion, &credential, &expected, &cancel2)
        });

        match tokio::time::timeout(limit, join).await {
            Err(_) => {
                cancel.store(true, Ordering::Relaxed);
                tracing::warn!(limit_ms = limit.as_millis() as u64, "Verification timed out");
                Err(VerifyError::Cancelled)
            }
            Ok(Err(e)) => {
                // A worker that died never confirmed the signature.
                tracing::error!(error = %e, "Verification worker failed");
                Err(VerifyError::SignatureInvalid)
            }
            Ok(Ok(result)) => result,
        }
    }

    fn run_pipeline(
        &self,
        assertion: &Assertion,
        credential: &Credential,
        expected: &Expectations,
        cancel: &AtomicBool,
    ) -> Result<VerifiedAssertion, VerifyError> {
        let checkpoint = || {
            if cancel.load(Ordering::Relaxed) {
                Err(VerifyError::Cancelled)
            } else {
                Ok(())
            }
        };

        // Size bound before any parsing.
        for (name, field) in [
            ("credential id", assertion.credential_id.as_slice()),
            ("client data", assertion.client_data.as_slice()),
            ("authenticator data", assertion.authenticator_data.as_slice()),
            ("signature", assertion.signature.as_slice()),
            ("user handle", assertion.user_handle.as_deref().unwrap_or_default()),
        ] {
            if field.len() > self.max_input_len {
                return Err(VerifyError::MalformedInput(format!(
                    "{name} is {} bytes, limit {}",
                    field.len(),
                    self.max_input_len
                )));
            }
        }
        if assertion.credential_id != credential.credential_id {
            return Err(VerifyError::CredentialNotFound);
        }
        if let Some(handle) = &assertion.user_handle {
            if *handle != credential.user_id {
                return Err(VerifyError::OwnershipMismatch);
            }
        }
        checkpoint()?;

        // 1. ceremony type
        let client_data = CollectedClientData::parse(&assertion.client_data)?;
        if client_data.ceremony != CEREMONY_GET {
            return Err(VerifyError::UnexpectedCeremonyType(client_data.ceremony));
        }

        // 2. challenge, constant time
        let challenge_ok: bool = client_data
            .challenge
            .as_bytes()
            .ct_eq(expected.challenge.as_bytes())
            .into();
        if !challenge_ok {
            return Err(VerifyError::ChallengeMismatch);
        }

        // 3. origin, exact
        if client_data.origin != expected.origin {
            return Err(VerifyError::OriginMismatch(client_data.origin));
        }
        if client_data.cross_origin && !self.allow_cross_origin {
            return Err(VerifyError::OriginMismatch(
                client_data.top_origin.unwrap_or(client_data.origin),
            ));
        }
        checkpoint()?;

        // 4. rp id hash
        let auth_data = AuthenticatorData::parse(&assertion.authenticator_data)?;
        let rp_id_hash: [u8; 32] = Sha256::digest(expected.rp_id.as_bytes()).into();
        if auth_data.rp_id_hash != &rp_id_hash {
            return Err(VerifyError::RpIdMismatch);
        }

        // 5. flags
        auth_data.check_flags()?;
        if !auth_data.flags.user_present() {
            return Err(VerifyError::UserNotPresent);
        }
        if expected.require_user_verification && !auth_data.flags.user_verified() {
            return Err(VerifyError::UserVerificationRequired);
        }

        // 6. sign counter
        if !sign_count_advances(credential.sign_count, auth_data.sign_count) {
            return Err(VerifyError::CounterRollback {
                stored: credential.sign_count,
                presented: auth_data.sign_count,
            });
        }
        checkpoint()?;

        // 7. signature over authenticatorData || SHA-256(clientDataJSON)
        let algorithm = credential.public_key.algorithm();
        let verifier = self
            .provider
            .get(algorithm)
            .ok_or(VerifyError::UnsupportedAlgorithm(algorithm))?;
        let client_data_hash = Sha256::digest(&assertion.client_data);
        let mut signed_data =
            Vec::with_capacity(assertion.authenticator_data.len() + client_data_hash.len());
        signed_data.extend_from_slice(&assertion.authenticator_data);
        signed_data.extend_from_slice(&client_data_hash);
        if !verifier.verify(&signed_data, &assertion.signature, credential.public_key.as_bytes()) {
            return Err(VerifyError::SignatureInvalid);
        }

        Ok(VerifiedAssertion {
            credential_id: credential.credential_id.clone(),
            user_id: credential.user_id.clone(),
            new_sign_count: auth_data.sign_count,
            user_verified: auth_data.flags.user_verified(),
            backup_eligible: auth_data.flags.backup_eligible(),
            backup_state: auth_data.flags.backup_state(),
        })
    }
}
