//! SQLite pending-transaction store implementation.

use crate::{PendingId, PendingTransaction, Result};
use crate::error::Error;
use rusqlite::{Connection, params};
use std::path::Path;

/// SQLite-backed pending-transaction store.
pub struct PendingStore {
    conn: Connection,
}

impl PendingStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS pending (
                id TEXT PRIMARY KEY,
                description TEXT NOT NULL,
                transaction_hex TEXT NOT NULL,
                key_list TEXT NOT NULL,
                signed_keys TEXT NOT NULL,
                threshold INTEGER NOT NULL,
                network TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_pending_created
                ON pending(created_at);
            "#,
        )?;
        Ok(())
    }

    /// Store a new pending transaction.
    pub fn create(&self, record: &PendingTransaction) -> Result<()> {
        self.conn.execute(
            "INSERT INTO pending (id, description, transaction_hex, key_list, signed_keys,
             threshold, network, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.id.to_string(),
                record.description,
                record.transaction,
                serde_json::to_string(&record.key_list)?,
                serde_json::to_string(&record.signed_keys)?,
                record.threshold,
                record.network,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Fetch one pending transaction by id.
    pub fn get(&self, id: PendingId) -> Result<PendingTransaction> {
        let mut stmt = self.conn.prepare(
            "SELECT id, description, transaction_hex, key_list, signed_keys, threshold,
             network, created_at FROM pending WHERE id = ?1",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => row_to_record(row),
            None => Err(Error::NotFound(id.to_string())),
        }
    }

    /// List all pending transactions, oldest first.
    pub fn list(&self) -> Result<Vec<PendingTransaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, description, transaction_hex, key_list, signed_keys, threshold,
             network, created_at FROM pending ORDER BY created_at",
        )?;
        let mut records = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            records.push(row_to_record(row)?);
        }
        Ok(records)
    }

    /// Persist newly collected signatures for an existing record.
    pub fn update(&self, record: &PendingTransaction) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE pending SET signed_keys = ?2 WHERE id = ?1",
            params![
                record.id.to_string(),
                serde_json::to_string(&record.signed_keys)?,
            ],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(record.id.to_string()));
        }
        Ok(())
    }

    /// Remove a pending transaction (after out-of-band submission, or on
    /// abandonment).
    pub fn delete(&self, id: PendingId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM pending WHERE id = ?1", [id.to_string()])?;
        if deleted == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> Result<PendingTransaction> {
    let id: String = row.get(0)?;
    let key_list: String = row.get(3)?;
    let signed_keys: String = row.get(4)?;
    let created_at: String = row.get(7)?;
    Ok(PendingTransaction {
        id: PendingId(id.parse().map_err(|_| Error::NotFound(id.clone()))?),
        description: row.get(1)?,
        transaction: row.get(2)?,
        key_list: serde_json::from_str(&key_list)?,
        signed_keys: serde_json::from_str(&signed_keys)?,
        threshold: row.get(5)?,
        network: row.get(6)?,
        created_at: created_at
            .parse()
            .map_err(|_| Error::NotFound(id.clone()))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PendingTransaction {
        PendingTransaction::new(
            "wipe 3.00 from 0.0.400",
            "0a0b0c",
            vec!["aa".into(), "bb".into(), "cc".into()],
            2,
            "testnet",
        )
    }

    #[test]
    fn create_get_roundtrip() {
        let store = PendingStore::in_memory().unwrap();
        let rec = record();
        store.create(&rec).unwrap();

        let loaded = store.get(rec.id).unwrap();
        assert_eq!(loaded.description, rec.description);
        assert_eq!(loaded.transaction, rec.transaction);
        assert_eq!(loaded.key_list, rec.key_list);
        assert_eq!(loaded.threshold, 2);
    }

    #[test]
    fn list_returns_all_records() {
        let store = PendingStore::in_memory().unwrap();
        store.create(&record()).unwrap();
        store.create(&record()).unwrap();
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn update_persists_signatures() {
        let store = PendingStore::in_memory().unwrap();
        let mut rec = record();
        store.create(&rec).unwrap();

        rec.sign("aa", "deadbeef");
        store.update(&rec).unwrap();
        let loaded = store.get(rec.id).unwrap();
        assert_eq!(
            loaded.signed_keys.get("aa").map(String::as_str),
            Some("deadbeef")
        );

        store.delete(rec.id).unwrap();
        assert!(matches!(store.update(&rec), Err(Error::NotFound(_))));
    }

    #[test]
    fn delete_removes_record() {
        let store = PendingStore::in_memory().unwrap();
        let rec = record();
        store.create(&rec).unwrap();
        store.delete(rec.id).unwrap();
        assert!(matches!(store.get(rec.id), Err(Error::NotFound(_))));
        assert!(matches!(store.delete(rec.id), Err(Error::NotFound(_))));
    }
}
