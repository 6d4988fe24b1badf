pub mod algorithm;
pub mod ceremony;
pub mod challenge;
pub mod config;
pub mod diagnostics;
pub mod encoding;
pub mod error;
pub mod store;
pub mod webauthn;

pub use ceremony::{authenticate, authenticate_in_pool};
pub use error::{Error, ErrorKind, Result};

use std::sync::Arc;

use store::{Credential, CredentialStore};
use webauthn::{Assertion, AssertionVerifier, VerifiedAssertion};

pub async fn run(cfg: config::Config) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;
    let level = match cfg.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();

    let verified = verify_files(&cfg).await?;
    println!(
        "OK user={} credential={} sign_count={} uv={}",
        encoding::to_base64url(&verified.user_id),
        encoding::to_base64url(&verified.credential_id),
        verified.new_sign_count,
        verified.user_verified,
    );
    Ok(())
}

/// Load the credential and assertion named by `cfg` and run one full
/// authentication against a fresh store.
pub async fn verify_files(cfg: &config::Config) -> anyhow::Result<VerifiedAssertion> {
    let rp = cfg.relying_party();

    // Preflight checks
    diagnostics::check(&rp)?;

    let credential: Credential = serde_json::from_slice(&std::fs::read(&cfg.credential)?)
        .map_err(|e| anyhow::anyhow!("invalid credential file {}: {e}", cfg.credential.display()))?;
    let assertion: Assertion = serde_json::from_slice(&std::fs::read(&cfg.assertion)?)
        .map_err(|e| anyhow::anyhow!("invalid assertion file {}: {e}", cfg.assertion.display()))?;
    tracing::info!(
        credential_id = %encoding::hex(&credential.credential_id),
        alg = %credential.public_key.algorithm(),
        sign_count = credential.sign_count,
        "Credential loaded"
    );

    let store = CredentialStore::new();
    let user_id = credential.user_id.clone();
    store.store_credential(credential)?;

    let verifier = Arc::new(AssertionVerifier::new(&rp));
    let expected = rp.expectations(cfg.challenge.clone());
    authenticate_in_pool(&store, verifier, &user_id, assertion, expected, rp.verify_timeout())
        .await
        .map_err(|e| {
            let kind = e.kind();
            if kind.is_security_incident() {
                tracing::error!(?kind, "Security incident: {e}");
            }
            anyhow::anyhow!("authentication failed ({kind:?}): {e}")
        })
}
