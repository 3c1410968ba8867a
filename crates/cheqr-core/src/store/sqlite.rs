//! SQLite-backed record store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction, params};
use tracing::debug;

use super::ChequeStore;
use crate::error::StoreError;
use crate::models::{ChequeField, NewCheque, PartyRecord, StoredCheque, StoreConfig};
use crate::party::random_code;

/// Record store over a single SQLite connection.
///
/// The account-number uniqueness constraint lives in the schema, so the
/// check-then-insert for new parties is race-tolerant: a losing writer hits
/// the constraint and converges to the earlier writer's code.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    code_len: usize,
    max_code_attempts: u32,
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS parties (
        party_code TEXT PRIMARY KEY,
        account_number TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS cheques (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        bank_name TEXT NOT NULL DEFAULT '',
        date TEXT NOT NULL DEFAULT '',
        ifsc_code TEXT NOT NULL DEFAULT '',
        amount_in_words TEXT NOT NULL DEFAULT '',
        amount_in_digits TEXT NOT NULL DEFAULT '',
        payer TEXT NOT NULL DEFAULT '',
        account_number TEXT NOT NULL DEFAULT '',
        cheque_number TEXT NOT NULL DEFAULT '',
        transaction_id TEXT NOT NULL DEFAULT '',
        transaction_message TEXT NOT NULL DEFAULT '',
        party_code TEXT REFERENCES parties(party_code),
        image_reference TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_cheques_created ON cheques(created_at);
";

impl SqliteStore {
    /// Open (creating if needed) the store at the configured path.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&config.db_path)?;
        Self::with_connection(conn, config)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?, config)
    }

    fn with_connection(conn: Connection, config: &StoreConfig) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            code_len: config.party_code_len,
            max_code_attempts: config.max_code_attempts,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ChequeStore for SqliteStore {
    fn find_party_by_account(&self, account_number: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock();
        party_code_for_account(&conn, account_number).map_err(Into::into)
    }

    fn find_party_by_code(&self, party_code: &str) -> Result<Option<PartyRecord>, StoreError> {
        let conn = self.lock();
        let record = conn
            .query_row(
                "SELECT party_code, account_number FROM parties WHERE party_code = ?1",
                params![party_code],
                |row| {
                    Ok(PartyRecord {
                        party_code: row.get(0)?,
                        account_number: row.get(1)?,
                    })
                },
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        Ok(record)
    }

    fn insert_cheque_and_maybe_party(&self, cheque: &NewCheque) -> Result<i64, StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let account = cheque
            .fields
            .value(ChequeField::AccountNumber)
            .unwrap_or("")
            .trim()
            .to_string();

        let party_code = if account.is_empty() {
            None
        } else {
            Some(self.party_code_in_tx(&tx, &account, cheque.party_code.as_deref())?)
        };

        let field = |f: ChequeField| cheque.fields.value(f).unwrap_or("");
        tx.execute(
            "INSERT INTO cheques (
                bank_name, date, ifsc_code, amount_in_words, amount_in_digits,
                payer, account_number, cheque_number, transaction_id,
                transaction_message, party_code, image_reference, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                field(ChequeField::BankName),
                field(ChequeField::Date),
                field(ChequeField::IfscCode),
                field(ChequeField::AmountInWords),
                field(ChequeField::AmountInDigits),
                field(ChequeField::Payer),
                account,
                field(ChequeField::ChequeNumber),
                field(ChequeField::TransactionId),
                field(ChequeField::TransactionMessage),
                party_code,
                cheque.image_reference,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!(id, party_code = ?party_code, "persisted cheque");
        Ok(id)
    }

    fn list_cheques(&self) -> Result<Vec<StoredCheque>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, bank_name, date, ifsc_code, amount_in_words, amount_in_digits,
                    payer, account_number, cheque_number, transaction_id,
                    transaction_message, party_code, image_reference, created_at
             FROM cheques ORDER BY created_at DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            let mut fields = BTreeMap::new();
            for (i, field) in ChequeField::ALL.iter().enumerate() {
                fields.insert(*field, row.get::<_, String>(1 + i)?);
            }
            let created: String = row.get(13)?;
            let created_at = DateTime::parse_from_rfc3339(&created)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        13,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
            Ok(StoredCheque {
                id: row.get(0)?,
                fields,
                party_code: row.get(11)?,
                image_reference: row.get(12)?,
                created_at,
            })
        })?;

        let mut cheques = Vec::new();
        for row in rows {
            cheques.push(row?);
        }
        Ok(cheques)
    }
}

impl SqliteStore {
    /// Resolve-or-create the party for an account inside the cheque's
    /// transaction. The caller's candidate code is tried first; collisions
    /// on the code regenerate, a lost race on the account converges to the
    /// earlier writer's code.
    fn party_code_in_tx(
        &self,
        tx: &Transaction<'_>,
        account: &str,
        candidate: Option<&str>,
    ) -> Result<String, StoreError> {
        if let Some(existing) = party_code_for_account(tx, account)? {
            return Ok(existing);
        }

        let mut code = candidate
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| random_code(self.code_len));

        for _ in 0..self.max_code_attempts {
            let inserted = tx.execute(
                "INSERT INTO parties (party_code, account_number, created_at) VALUES (?1, ?2, ?3)",
                params![code, account, Utc::now().to_rfc3339()],
            );
            match inserted {
                Ok(_) => return Ok(code),
                Err(e) if constraint_on(&e, "parties.account_number") => {
                    // Lost the race for this account; converge to the
                    // earlier writer's code.
                    return party_code_for_account(tx, account)?.ok_or(StoreError::Database(e));
                }
                Err(e) if constraint_on(&e, "parties.party_code") => {
                    debug!(code = %code, "party code collision, regenerating");
                    code = random_code(self.code_len);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(StoreError::PartyCodeSpaceExhausted(self.max_code_attempts))
    }
}

fn party_code_for_account(
    conn: &Connection,
    account: &str,
) -> Result<Option<String>, rusqlite::Error> {
    conn.query_row(
        "SELECT party_code FROM parties WHERE account_number = ?1",
        params![account],
        |row| row.get(0),
    )
    .map(Some)
    .or_else(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => Ok(None),
        other => Err(other),
    })
}

fn constraint_on(err: &rusqlite::Error, column: &str) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, Some(msg))
            if e.code == rusqlite::ErrorCode::ConstraintViolation && msg.contains(column)
    )
}
