use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::webauthn::Expectations;

/// Upper bound on each byte field of an assertion, checked before parsing.
pub const MAX_INPUT_LEN: usize = 4096;
/// Largest value `max_input_len` may be configured to.
pub const MAX_CONFIGURABLE_INPUT_LEN: usize = 64 * 1024;
pub const VERIFY_TIMEOUT_SECS: u64 = 5;

/// Static relying-party settings: who we are and how strict verification is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelyingParty {
    pub rp_id: String,
    pub origin: String,
    #[serde(default)]
    pub require_user_verification: bool,
    #[serde(default)]
    pub allow_cross_origin: bool,
    #[serde(default = "default_max_input_len")]
    pub max_input_len: usize,
    #[serde(default = "default_verify_timeout_secs")]
    pub verify_timeout_secs: u64,
}

fn default_max_input_len() -> usize {
    MAX_INPUT_LEN
}

fn default_verify_timeout_secs() -> u64 {
    VERIFY_TIMEOUT_SECS
}

impl RelyingParty {
    pub fn new(rp_id: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            rp_id: rp_id.into(),
            origin: origin.into(),
            require_user_verification: false,
            allow_cross_origin: false,
            max_input_len: MAX_INPUT_LEN,
            verify_timeout_secs: VERIFY_TIMEOUT_SECS,
        }
    }

    pub fn require_user_verification(mut self, required: bool) -> Self {
        self.require_user_verification = required;
        self
    }

    pub fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify_timeout_secs)
    }

    /// Expectations for one ceremony, bound to the session's challenge
    /// (base64url, as it appears in client data).
    pub fn expectations(&self, challenge: impl Into<String>) -> Expectations {
        Expectations {
            challenge: challenge.into(),
            origin: self.origin.clone(),
            rp_id: self.rp_id.clone(),
            require_user_verification: self.require_user_verification,
        }
    }
}

#[derive(clap::Parser, Debug, Clone)]
pub struct Config {
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Relying party id, e.g. "example.com".
    #[arg(long)]
    pub rp_id: String,
    /// Expected origin, e.g. "https://login.example.com".
    #[arg(long)]
    pub origin: String,
    /// Require the user-verified flag (PIN/biometric), not just presence.
    #[arg(long)]
    pub require_uv: bool,
    #[arg(long)]
    pub allow_cross_origin: bool,
    #[arg(long, default_value_t = MAX_INPUT_LEN)]
    pub max_input_len: usize,
    #[arg(long, default_value_t = VERIFY_TIMEOUT_SECS)]
    pub timeout_secs: u64,
    /// Challenge issued for this ceremony, base64url.
    #[arg(long)]
    pub challenge: String,
    /// JSON file holding the stored credential.
    #[arg(long)]
    pub credential: PathBuf,
    /// JSON file holding the assertion (byte fields base64url).
    #[arg(long)]
    pub assertion: PathBuf,
}

impl Config {
    pub fn relying_party(&self) -> RelyingParty {
        RelyingParty {
            rp_id: self.rp_id.clone(),
            origin: self.origin.clone(),
            require_user_verification: self.require_uv,
            allow_cross_origin: self.allow_cross_origin,
            max_input_len: self.max_input_len,
            verify_timeout_secs: self.timeout_secs,
        }
    }
}
