//! Party identity resolution.
//!
//! A party is a payer identity keyed by bank account number. Resolution is
//! idempotent: a known account always maps to its existing code, and a new
//! account receives a freshly generated candidate that only becomes durable
//! when its first cheque is persisted.

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::error::StoreError;
use crate::models::StoreConfig;
use crate::store::ChequeStore;

/// Alphabet for generated party codes.
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a random fixed-length party code.
pub fn random_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

/// Maps account numbers to stable party identifiers.
pub struct PartyResolver {
    store: Arc<dyn ChequeStore>,
    code_len: usize,
    max_attempts: u32,
    code_gen: fn(usize) -> String,
}

impl PartyResolver {
    pub fn new(store: Arc<dyn ChequeStore>, config: &StoreConfig) -> Self {
        Self {
            store,
            code_len: config.party_code_len,
            max_attempts: config.max_code_attempts,
            code_gen: random_code,
        }
    }

    /// Override code generation (used by tests to force collisions).
    pub fn with_code_gen(mut self, code_gen: fn(usize) -> String) -> Self {
        self.code_gen = code_gen;
        self
    }

    /// Resolve an account number to a party code.
    ///
    /// A blank account is accepted but left without a code for manual
    /// assignment downstream. For a new account this returns a
    /// collision-checked candidate; durable uniqueness is enforced again by
    /// the store when the cheque is inserted.
    pub fn resolve(&self, account_number: &str) -> Result<Option<String>, StoreError> {
        let account = account_number.trim();
        if account.is_empty() {
            return Ok(None);
        }

        if let Some(existing) = self.store.find_party_by_account(account)? {
            debug!(account, code = %existing, "resolved existing party");
            return Ok(Some(existing));
        }

        for _ in 0..self.max_attempts {
            let candidate = (self.code_gen)(self.code_len);
            if self.store.find_party_by_code(&candidate)?.is_none() {
                debug!(account, code = %candidate, "minted candidate party code");
                return Ok(Some(candidate));
            }
        }
        Err(StoreError::PartyCodeSpaceExhausted(self.max_attempts))
    }
}
