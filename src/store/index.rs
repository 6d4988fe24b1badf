use std::collections::HashMap;

use parking_lot::RwLock;

use super::credential::{sign_count_advances, unix_now, Credential, Transport};
use super::{CredentialRepository, StoreError};
use crate::encoding::hex;

#[derive(Default)]
struct Indexes {
    by_id: HashMap<Vec<u8>, Credential>,
    by_user: HashMap<Vec<u8>, Vec<Vec<u8>>>,
}

/// In-memory credential store.
///
/// Both indexes live behind one lock, so a reader never sees a credential in
/// `by_id` that is missing from its user's bucket or the reverse. Every read
/// returns a clone.
#[derive(Default)]
pub struct CredentialStore {
    inner: RwLock<Indexes>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new credential. An existing id is never overwritten.
    pub fn store_credential(&self, credential: Credential) -> Result<(), StoreError> {
        let mut guard = self.inner.write();
        if guard.by_id.contains_key(&credential.credential_id) {
            tracing::warn!(
                credential_id = %hex(&credential.credential_id),
                "Rejected duplicate credential id"
            );
            return Err(StoreError::DuplicateId);
        }
        let id = credential.credential_id.clone();
        guard
            .by_user
            .entry(credential.user_id.clone())
            .or_default()
            .push(id.clone());
        tracing::debug!(credential_id = %hex(&id), "Credential stored");
        guard.by_id.insert(id, credential);
        Ok(())
    }

    pub fn get_credential(&self, credential_id: &[u8]) -> Option<Credential> {
        self.inner.read().by_id.get(credential_id).cloned()
    }

    /// All credentials of `user_id`, most recently created first.
    ///
    /// Sorted on every call, O(k log k) in the bucket size. Buckets are kept in
    /// insertion order and `created_at` need not follow it.
    pub fn get_credentials_by_user(&self, user_id: &[u8]) -> Vec<Credential> {
        let guard = self.inner.read();
        let Some(ids) = guard.by_user.get(user_id) else {
            return Vec::new();
        };
        let mut records: Vec<Credential> = ids
            .iter()
            .filter_map(|id| guard.by_id.get(id).cloned())
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    /// Lookup that also checks ownership. A credential owned by someone else
    /// is reported exactly like a missing one.
    pub fn get_credential_by_user_and_id(
        &self,
        user_id: &[u8],
        credential_id: &[u8],
    ) -> Option<Credential> {
        self.inner
            .read()
            .by_id
            .get(credential_id)
            .filter(|c| c.user_id == user_id)
            .cloned()
    }

    /// Commit a verified counter. The monotonicity check runs under the write
    /// lock, so of two racing commits the stale one always loses.
    pub fn update_sign_count(
        &self,
        credential_id: &[u8],
        new_count: u32,
    ) -> Result<(), StoreError> {
        let mut guard = self.inner.write();
        let record = guard
            .by_id
            .get_mut(credential_id)
            .ok_or(StoreError::NotFound)?;
        if !sign_count_advances(record.sign_count, new_count) {
            tracing::warn!(
                credential_id = %hex(credential_id),
                stored = record.sign_count,
                attempted = new_count,
                "Sign counter regression"
            );
            return Err(StoreError::CounterRegression {
                stored: record.sign_count,
                attempted: new_count,
            });
        }
        record.sign_count = new_count;
        record.updated_at = unix_now();
        tracing::debug!(
            credential_id = %hex(credential_id),
            count = new_count,
            "Sign counter updated"
        );
        Ok(())
    }

    /// Replace descriptive metadata. Never touches `sign_count`.
    pub fn update_metadata(
        &self,
        credential_id: &[u8],
        device_name: Option<String>,
        transports: Vec<Transport>,
    ) -> Result<(), StoreError> {
        let mut guard = self.inner.write();
        let record = guard
            .by_id
            .get_mut(credential_id)
            .ok_or(StoreError::NotFound)?;
        record.device_name = device_name;
        record.transports = transports;
        record.updated_at = unix_now();
        Ok(())
    }

    /// Remove from both indexes under one write guard.
    pub fn delete_credential(&self, credential_id: &[u8]) -> Result<(), StoreError> {
        let mut guard = self.inner.write();
        let record = guard
            .by_id
            .remove(credential_id)
            .ok_or(StoreError::NotFound)?;
        if let Some(ids) = guard.by_user.get_mut(&record.user_id) {
            ids.retain(|i| i.as_slice() != credential_id);
            if ids.is_empty() {
                guard.by_user.remove(&record.user_id);
            }
        }
        tracing::debug!(credential_id = %hex(credential_id), "Credential deleted");
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.inner.read().by_id.len()
    }
}

impl CredentialRepository for CredentialStore {
    fn store_credential(&self, credential: Credential) -> Result<(), StoreError> {
        CredentialStore::store_credential(self, credential)
    }

    fn get_credential(&self, credential_id: &[u8]) -> Option<Credential> {
        CredentialStore::get_credential(self, credential_id)
    }

    fn get_credentials_by_user(&self, user_id: &[u8]) -> Vec<Credential> {
        CredentialStore::get_credentials_by_user(self, user_id)
    }

    fn get_credential_by_user_and_id(
        &self,
        user_id: &[u8],
        credential_id: &[u8],
    ) -> Option<Credential> {
        CredentialStore::get_credential_by_user_and_id(self, user_id, credential_id)
    }

    fn update_sign_count(&self, credential_id: &[u8], new_count: u32) -> Result<(), StoreError> {
        CredentialStore::update_sign_count(self, credential_id, new_count)
    }

    fn delete_credential(&self, credential_id: &[u8]) -> Result<(), StoreError> {
        CredentialStore::delete_credential(self, credential_id)
    }

    fn count(&self) -> usize {
        CredentialStore::count(self)
    }
}
