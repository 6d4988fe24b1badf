mod common;

use std::sync::Barrier;

use common::{Es256Authenticator, TestAuthenticator};
use passkey_verify::store::{Credential, CredentialStore, StoreError};

const THREADS: u32 = 8;
const PER_THREAD: u32 = 1_250;

fn cred_id(thread: u32, i: u32) -> Vec<u8> {
    let mut id = thread.to_be_bytes().to_vec();
    id.extend_from_slice(&i.to_be_bytes());
    id
}

#[test]
fn test_parallel_inserts_all_visible() {
    let store = CredentialStore::new();
    let key = Es256Authenticator::new(3).public_key();

    std::thread::scope(|s| {
        for t in 0..THREADS {
            let store = &store;
            let key = &key;
            s.spawn(move || {
                for i in 0..PER_THREAD {
                    let user = format!("user-{}", i % 50).into_bytes();
                    store
                        .store_credential(Credential::new(cred_id(t, i), user, key.clone()))
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(store.count(), (THREADS * PER_THREAD) as usize);
    for t in 0..THREADS {
        for i in 0..PER_THREAD {
            let loaded = store.get_credential(&cred_id(t, i)).expect("lost insert");
            assert_eq!(loaded.user_id, format!("user-{}", i % 50).into_bytes());
        }
    }
    let per_user: usize = (0..50)
        .map(|u| store.get_credentials_by_user(format!("user-{u}").as_bytes()).len())
        .sum();
    assert_eq!(per_user, store.count());
}

#[test]
fn test_indexes_agree_after_churn() {
    let store = CredentialStore::new();
    let key = Es256Authenticator::new(4).public_key();
    let users: Vec<Vec<u8>> = (0..5).map(|u| vec![u; 4]).collect();

    std::thread::scope(|s| {
        for t in 0..THREADS {
            let store = &store;
            let key = &key;
            let users = &users;
            s.spawn(move || {
                for i in 0..400u32 {
                    let id = cred_id(t, i);
                    let user = users[(i as usize) % users.len()].clone();
                    store
                        .store_credential(Credential::new(id.clone(), user, key.clone()))
                        .unwrap();
                    if i % 3 == 0 {
                        store.delete_credential(&id).unwrap();
                    } else {
                        store.update_sign_count(&id, i + 1).unwrap();
                    }
                    // Readers interleave with writers on other threads.
                    let _ = store.get_credentials_by_user(&users[t as usize % users.len()]);
                }
            });
        }
    });

    let bucketed: usize = users
        .iter()
        .map(|u| store.get_credentials_by_user(u).len())
        .sum();
    assert_eq!(bucketed, store.count());
    assert_eq!(store.count(), (THREADS * (400 - 134)) as usize);

    for user in &users {
        for c in store.get_credentials_by_user(user) {
            assert_eq!(&c.user_id, user);
            assert_eq!(store.get_credential(&c.credential_id).as_ref(), Some(&c));
        }
    }
}

#[test]
fn test_out_of_order_commit_is_rejected() {
    let store = CredentialStore::new();
    let id = b"racy".to_vec();
    let key = Es256Authenticator::new(5).public_key();
    let mut record = Credential::new(id.clone(), b"user".to_vec(), key);
    record.sign_count = 4;
    store.store_credential(record).unwrap();

    // Two verifications both passed against a snapshot at 4; the one carrying
    // 6 commits first.
    store.update_sign_count(&id, 6).unwrap();
    assert_eq!(
        store.update_sign_count(&id, 5),
        Err(StoreError::CounterRegression { stored: 6, attempted: 5 })
    );
    assert_eq!(store.get_credential(&id).unwrap().sign_count, 6);
}

#[test]
fn test_concurrent_commits_keep_maximum() {
    let store = CredentialStore::new();
    let id = b"contended".to_vec();
    store
        .store_credential(Credential::new(
            id.clone(),
            b"user".to_vec(),
            Es256Authenticator::new(6).public_key(),
        ))
        .unwrap();

    let barrier = Barrier::new(THREADS as usize);
    let accepted: Vec<Vec<u32>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let store = &store;
                let id = &id;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    // Each thread owns every THREADS-th value in 1..=64.
                    (1..=64u32)
                        .filter(|v| v % THREADS == t)
                        .filter(|v| store.update_sign_count(id, *v).is_ok())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(store.get_credential(&id).unwrap().sign_count, 64);

    // Accepted commits across all threads are strictly increasing in commit
    // order, so no value can have been accepted twice.
    let mut all: Vec<u32> = accepted.into_iter().flatten().collect();
    let before = all.len();
    all.sort_unstable();
    all.dedup();
    assert_eq!(all.len(), before);
    assert!(all.contains(&64));
}
