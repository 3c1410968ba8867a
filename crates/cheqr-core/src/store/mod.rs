//! Persistence for cheque records and party identities.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::models::{NewCheque, PartyRecord, StoredCheque};

/// A keyed record store with one uniqueness constraint: at most one party
/// per account number. The cheque table is append-only from this
/// pipeline's perspective.
pub trait ChequeStore: Send + Sync {
    /// Party code for an account, if the account has been seen before.
    fn find_party_by_account(&self, account_number: &str) -> Result<Option<String>, StoreError>;

    /// Party record for a code, used to collision-check candidates.
    fn find_party_by_code(&self, party_code: &str) -> Result<Option<PartyRecord>, StoreError>;

    /// Persist a cheque, creating its party record in the same transaction
    /// when this is the first cheque for the account. Must be atomic with
    /// respect to the account-number uniqueness constraint: concurrent
    /// writers for the same new account converge to the earlier writer's
    /// code.
    fn insert_cheque_and_maybe_party(&self, cheque: &NewCheque) -> Result<i64, StoreError>;

    /// All persisted cheques, newest first.
    fn list_cheques(&self) -> Result<Vec<StoredCheque>, StoreError>;
}
