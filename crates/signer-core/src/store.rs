//! Secure-storage seam.
//!
//! The host application owns real secure storage (keychain, keystore,
//! encrypted file). This pipeline only ever needs two operations from it,
//! so that is the whole trait.

use std::collections::HashMap;

/// Host-provided secret storage.
pub trait SecretStore {
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn set(&mut self, key: &str, value: &[u8]);
}

/// In-memory store for tests and short-lived tools. Not durable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &[u8]) {
        self.entries.insert(key.to_owned(), value.to_vec());
    }
}
