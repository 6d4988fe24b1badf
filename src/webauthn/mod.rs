pub mod authenticator_data;
pub mod client_data;
pub mod types;
pub mod verify;

pub use authenticator_data::{build_assertion_auth_data, AuthenticatorData, Flags};
pub use client_data::CollectedClientData;
pub use types::{Assertion, Expectations, VerifiedAssertion, VerifyError};
pub use verify::AssertionVerifier;
