//! SQLite implementation of the ClaimLedger trait.
//!
//! The persistent backend. Uses rusqlite with bundled SQLite; every
//! transition runs inside one immediate transaction.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use claimdrop_core::{Amount, ClaimKey};

use crate::error::{LedgerError, Result};
use crate::migration::{self, now_millis};
use crate::traits::{begin_outcome, BeginOutcome, ClaimLedger, ClaimState, LedgerEntry};

/// SQLite-based ledger. Thread-safe via internal Mutex.
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(LedgerError::poisoned)?;
        f(&conn)
    }

    fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(LedgerError::poisoned)?;
        f(&mut conn)
    }
}

fn decode_amount(bytes: Vec<u8>, column: &str) -> Result<Amount> {
    let arr: [u8; 16] = bytes.try_into().map_err(|b: Vec<u8>| {
        LedgerError::InvalidData(format!("{} is {} bytes, expected 16", column, b.len()))
    })?;
    Ok(Amount::from_be_bytes(arr))
}

fn read_entry(conn: &Connection, key: &ClaimKey) -> Result<Option<LedgerEntry>> {
    let row = conn
        .query_row(
            "SELECT state, amount, previous FROM claims WHERE claim_key = ?1",
            params![&key.0[..]],
            |row| {
                Ok((
                    row.get::<_, u8>(0)?,
                    row.get::<_, Vec<u8>>(1)?,
                    row.get::<_, Option<Vec<u8>>>(2)?,
                ))
            },
        )
        .optional()?;

    let Some((state, amount, previous)) = row else {
        return Ok(None);
    };

    let state = ClaimState::from_u8(state)
        .ok_or_else(|| LedgerError::InvalidData(format!("unknown claim state {}", state)))?;
    Ok(Some(LedgerEntry {
        state,
        amount: decode_amount(amount, "amount")?,
        previous: previous.map(|p| decode_amount(p, "previous")).transpose()?,
    }))
}

fn write_entry(conn: &Connection, key: &ClaimKey, entry: &LedgerEntry) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO claims (claim_key, state, amount, previous, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            &key.0[..],
            entry.state.as_u8(),
            entry.amount.to_be_bytes().to_vec(),
            entry.previous.map(|p| p.to_be_bytes().to_vec()),
            now_millis(),
        ],
    )?;
    Ok(())
}

impl ClaimLedger for SqliteLedger {
    fn get(&self, key: &ClaimKey) -> Result<Option<LedgerEntry>> {
        self.with_conn(|conn| read_entry(conn, key))
    }

    fn begin(&self, key: &ClaimKey, amount: Amount) -> Result<BeginOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let current = read_entry(&tx, key)?;
            let outcome = begin_outcome(current.as_ref(), amount);
            if let BeginOutcome::Started { previous } = outcome {
                write_entry(
                    &tx,
                    key,
                    &LedgerEntry {
                        state: ClaimState::Pending,
                        amount,
                        previous,
                    },
                )?;
                tracing::debug!(key = %key, amount, ?previous, "ledger entry pending");
            }
            tx.commit()?;
            Ok(outcome)
        })
    }

    fn commit(&self, key: &ClaimKey) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            match read_entry(&tx, key)? {
                Some(entry) if entry.state == ClaimState::Pending => {
                    write_entry(
                        &tx,
                        key,
                        &LedgerEntry {
                            state: ClaimState::Redeemed,
                            amount: entry.amount,
                            previous: None,
                        },
                    )?;
                    tx.commit()?;
                    tracing::debug!(key = %key, amount = entry.amount, "ledger entry redeemed");
                    Ok(())
                }
                _ => Err(LedgerError::NotPending(*key)),
            }
        })
    }

    fn rollback(&self, key: &ClaimKey) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let entry = match read_entry(&tx, key)? {
                Some(entry) if entry.state == ClaimState::Pending => entry,
                _ => return Err(LedgerError::NotPending(*key)),
            };
            match entry.previous {
                Some(previous) => write_entry(
                    &tx,
                    key,
                    &LedgerEntry {
                        state: ClaimState::Redeemed,
                        amount: previous,
                        previous: None,
                    },
                )?,
                None => {
                    tx.execute("DELETE FROM claims WHERE claim_key = ?1", params![&key.0[..]])?;
                }
            }
            tx.commit()?;
            tracing::debug!(key = %key, restored = ?entry.previous, "ledger entry rolled back");
            Ok(())
        })
    }

    fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM claims", [], |row| row.get(0))?;
            Ok(n as usize)
        })
    }
}
