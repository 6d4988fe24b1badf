use std::fmt;

use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::encoding::{from_base64url, to_base64url};

pub const CHALLENGE_LEN: usize = 32;

/// Server-issued random nonce for one authentication attempt.
#[derive(Clone)]
pub struct Challenge([u8; CHALLENGE_LEN]);

impl Challenge {
    pub fn generate() -> Self {
        let mut bytes = [0u8; CHALLENGE_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Decode a challenge previously handed out with [`Challenge::to_base64url`].
    pub fn from_base64url(text: &str) -> Option<Self> {
        let bytes = from_base64url(text).ok()?;
        Some(Self(bytes.try_into().ok()?))
    }

    pub fn as_bytes(&self) -> &[u8; CHALLENGE_LEN] {
        &self.0
    }

    /// The form the browser echoes back in `clientDataJSON.challenge`.
    pub fn to_base64url(&self) -> String {
        to_base64url(&self.0)
    }
}

impl PartialEq for Challenge {
    fn eq(&self, other: &Self) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl Eq for Challenge {}

impl fmt::Debug for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Challenge(..)")
    }
}
