use serde::Deserialize;

use super::VerifyError;

pub const CEREMONY_GET: &str = "webauthn.get";

/// The fields of `clientDataJSON` the verifier looks at. Unknown members
/// (e.g. `tokenBinding`, vendor additions) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedClientData {
    #[serde(rename = "type")]
    pub ceremony: String,
    pub challenge: String,
    pub origin: String,
    #[serde(default)]
    pub cross_origin: bool,
    #[serde(default)]
    pub top_origin: Option<String>,
}

impl CollectedClientData {
    pub fn parse(data: &[u8]) -> Result<Self, VerifyError> {
        serde_json::from_slice(data)
            .map_err(|e| VerifyError::MalformedInput(format!("client data: {e}")))
    }
}
