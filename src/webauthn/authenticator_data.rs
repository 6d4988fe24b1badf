use super::VerifyError;

pub const FLAG_UP: u8 = 0x01;
pub const FLAG_UV: u8 = 0x04;
pub const FLAG_BE: u8 = 0x08;
pub const FLAG_BS: u8 = 0x10;
pub const FLAG_AT: u8 = 0x40;
pub const FLAG_ED: u8 = 0x80;

/// rpIdHash (32) | flags (1) | signCount (4)
pub const MIN_AUTH_DATA_LEN: usize = 37;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags(pub u8);

impl Flags {
    pub fn user_present(self) -> bool {
        self.0 & FLAG_UP != 0
    }

    pub fn user_verified(self) -> bool {
        self.0 & FLAG_UV != 0
    }

    pub fn backup_eligible(self) -> bool {
        self.0 & FLAG_BE != 0
    }

    pub fn backup_state(self) -> bool {
        self.0 & FLAG_BS != 0
    }

    pub fn attested_credential_data(self) -> bool {
        self.0 & FLAG_AT != 0
    }

    pub fn extension_data(self) -> bool {
        self.0 & FLAG_ED != 0
    }
}

/// Borrowed view of assertion authenticator data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatorData<'a> {
    pub rp_id_hash: &'a [u8; 32],
    pub flags: Flags,
    pub sign_count: u32,
    /// Everything after the fixed header (CBOR extension outputs when ED is set).
    pub trailing: &'a [u8],
}

impl<'a> AuthenticatorData<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, VerifyError> {
        if data.len() < MIN_AUTH_DATA_LEN {
            return Err(VerifyError::MalformedInput(format!(
                "authenticator data is {} bytes, need at least {MIN_AUTH_DATA_LEN}",
                data.len()
            )));
        }
        let (rp_id_hash, rest) = data.split_at(32);
        let rp_id_hash: &[u8; 32] = rp_id_hash
            .try_into()
            .map_err(|_| VerifyError::MalformedInput("rp id hash".into()))?;
        let flags = Flags(rest[0]);
        let sign_count = u32::from_be_bytes([rest[1], rest[2], rest[3], rest[4]]);
        let trailing = &rest[5..];

        Ok(Self {
            rp_id_hash,
            flags,
            sign_count,
            trailing,
        })
    }

    /// Flag combinations no conforming authenticator emits. Kept out of
    /// [`parse`](Self::parse) so a wrong rp id is reported before these.
    pub fn check_flags(&self) -> Result<(), VerifyError> {
        if self.flags.backup_state() && !self.flags.backup_eligible() {
            return Err(VerifyError::MalformedInput(
                "backup state set without backup eligibility".into(),
            ));
        }
        if self.flags.extension_data() && self.trailing.is_empty() {
            return Err(VerifyError::MalformedInput(
                "extension flag set without extension data".into(),
            ));
        }
        Ok(())
    }
}

/// Build authenticatorData as an authenticator does for GetAssertion
/// (no attested credential data, no extensions).
pub fn build_assertion_auth_data(rp_id_hash: &[u8; 32], flags: u8, sign_count: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(MIN_AUTH_DATA_LEN);
    data.extend_from_slice(rp_id_hash);
    data.push(flags);
    data.extend_from_slice(&sign_count.to_be_bytes());
    data
}
