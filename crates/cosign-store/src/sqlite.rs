//! SQLite implementation of the RecordStore trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use cosign_core::{DocumentId, DocumentRecord, Email, SignState, SlotAssignment};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::{CreateResult, RecordStore};

const SELECT_COLUMNS: &str =
    "document_id, title, url, party_a_email, party_b_email, signed_a, signed_b";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|e| {
                StoreError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                    Some(format!("mutex poisoned: {}", e)),
                ))
            })?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

/// Raw column values of a `documents` row.
struct RecordRow {
    document_id: String,
    title: String,
    url: String,
    party_a_email: String,
    party_b_email: Option<String>,
    signed_a: i64,
    signed_b: i64,
}

impl RecordRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            document_id: row.get("document_id")?,
            title: row.get("title")?,
            url: row.get("url")?,
            party_a_email: row.get("party_a_email")?,
            party_b_email: row.get("party_b_email")?,
            signed_a: row.get("signed_a")?,
            signed_b: row.get("signed_b")?,
        })
    }

    fn into_record(self) -> Result<DocumentRecord> {
        let counter = |value: i64, column: &str| {
            u32::try_from(value).map_err(|_| {
                StoreError::InvalidData(format!(
                    "{column} out of range for {}: {value}",
                    self.document_id
                ))
            })
        };
        let signed_a = counter(self.signed_a, "signed_a")?;
        let signed_b = counter(self.signed_b, "signed_b")?;

        DocumentRecord::from_columns(
            &self.document_id,
            self.title,
            self.url,
            &self.party_a_email,
            self.party_b_email.as_deref(),
            signed_a,
            signed_b,
        )
        .map_err(|e| StoreError::InvalidData(format!("{}: {e}", self.document_id)))
    }
}

fn select_record(conn: &Connection, document_id: &str) -> Result<Option<DocumentRecord>> {
    conn.query_row(
        &format!("SELECT {SELECT_COLUMNS} FROM documents WHERE document_id = ?1"),
        params![document_id],
        RecordRow::from_row,
    )
    .optional()?
    .map(RecordRow::into_record)
    .transpose()
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn create(&self, record: &DocumentRecord) -> Result<CreateResult> {
        let record = record.clone();

        self.blocking(move |conn| {
            let now = now_millis();
            let (signed_a, signed_b) = record.signatures.raw();
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO documents (
                    document_id, title, url, party_a_email, party_b_email,
                    signed_a, signed_b, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                params![
                    record.document_id.as_str(),
                    record.title,
                    record.url,
                    record.party_a_email().as_str(),
                    record.party_b_email().map(Email::as_str),
                    signed_a,
                    signed_b,
                    now,
                ],
            )?;

            if inserted == 0 {
                Ok(CreateResult::AlreadyExists)
            } else {
                tracing::debug!(document_id = %record.document_id, "record created");
                Ok(CreateResult::Created)
            }
        })
        .await
    }

    async fn get(&self, document_id: &DocumentId) -> Result<Option<DocumentRecord>> {
        let document_id = document_id.clone();
        self.blocking(move |conn| select_record(conn, document_id.as_str()))
            .await
    }

    async fn list_by_email(&self, email: &Email) -> Result<Vec<DocumentRecord>> {
        let email = email.clone();

        self.blocking(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM documents
                 WHERE party_a_email = ?1 OR party_b_email = ?1
                 ORDER BY document_id"
            ))?;

            let rows = stmt
                .query_map(params![email.as_str()], RecordRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter().map(RecordRow::into_record).collect()
        })
        .await
    }

    async fn set_party_b(&self, document_id: &DocumentId, email: &Email) -> Result<DocumentRecord> {
        let document_id = document_id.clone();
        let email = email.clone();

        self.blocking(move |conn| {
            let tx = conn.transaction()?;

            let record = select_record(&tx, document_id.as_str())?
                .ok_or_else(|| StoreError::NotFound(document_id.clone()))?;

            match record.parties.check_b(&email) {
                SlotAssignment::AlreadyParty(_) => return Ok(record),
                SlotAssignment::Full => return Err(StoreError::SlotsFull(document_id)),
                SlotAssignment::Assigned => {}
            }

            tx.execute(
                "UPDATE documents SET party_b_email = ?1, updated_at = ?2
                 WHERE document_id = ?3 AND party_b_email IS NULL",
                params![email.as_str(), now_millis(), document_id.as_str()],
            )?;
            let updated = select_record(&tx, document_id.as_str())?
                .ok_or_else(|| StoreError::NotFound(document_id.clone()))?;
            tx.commit()?;

            tracing::debug!(document_id = %document_id, email = %email, "party b assigned");
            Ok(updated)
        })
        .await
    }

    async fn update_signatures(
        &self,
        document_id: &DocumentId,
        signatures: SignState,
    ) -> Result<DocumentRecord> {
        let document_id = document_id.clone();

        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            let (signed_a, signed_b) = signatures.raw();

            let changed = tx.execute(
                "UPDATE documents SET signed_a = ?1, signed_b = ?2, updated_at = ?3
                 WHERE document_id = ?4",
                params![signed_a, signed_b, now_millis(), document_id.as_str()],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(document_id));
            }

            let updated = select_record(&tx, document_id.as_str())?
                .ok_or_else(|| StoreError::NotFound(document_id.clone()))?;
            tx.commit()?;
            Ok(updated)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RecordStoreExt;
    use cosign_core::Party;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    fn record(id: &str) -> DocumentRecord {
        DocumentRecord::new(
            DocumentId::parse(id).unwrap(),
            "Lease",
            format!("https://docs.google.com/document/d/{id}/"),
            email("a@x.com"),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_record() {
        let store = SqliteStore::open_memory().unwrap();
        let rec = record("d1");

        assert_eq!(store.create(&rec).await.unwrap(), CreateResult::Created);
        assert_eq!(store.create(&rec).await.unwrap(), CreateResult::AlreadyExists);

        let got = store.get(&rec.document_id).await.unwrap().unwrap();
        assert_eq!(got, rec);

        let missing = DocumentId::parse("d404").unwrap();
        assert!(store.get(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_party_b_assignment() {
        let store = SqliteStore::open_memory().unwrap();
        let rec = record("d1");
        store.create(&rec).await.unwrap();

        let updated = store.set_party_b(&rec.document_id, &email("b@x.com")).await.unwrap();
        assert_eq!(updated.party_b_email(), Some(&email("b@x.com")));

        let again = store.set_party_b(&rec.document_id, &email("b@x.com")).await.unwrap();
        assert_eq!(again, updated);

        let err = store
            .set_party_b(&rec.document_id, &email("c@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::SlotsFull(_)));

        let missing = DocumentId::parse("d404").unwrap();
        assert!(matches!(
            store.set_party_b(&missing, &email("b@x.com")).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_signatures() {
        let store = SqliteStore::open_memory().unwrap();
        let rec = record("d1");
        store.create(&rec).await.unwrap();

        let updated = store
            .update_signatures(&rec.document_id, SignState::from_raw(1, 0))
            .await
            .unwrap();
        assert_eq!(updated.signatures.raw(), (1, 0));

        let updated = store.increment_sign(&rec.document_id, Party::B).await.unwrap();
        assert_eq!(updated.signatures.raw(), (1, 1));

        let missing = DocumentId::parse("d404").unwrap();
        assert!(matches!(
            store.update_signatures(&missing, SignState::INITIAL).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_by_email() {
        let store = SqliteStore::open_memory().unwrap();
        for id in ["d3", "d1", "d2"] {
            store.create(&record(id)).await.unwrap();
        }
        store
            .set_party_b(&DocumentId::parse("d2").unwrap(), &email("b@x.com"))
            .await
            .unwrap();

        let for_a = store.list_by_email(&email("a@x.com")).await.unwrap();
        let ids: Vec<&str> = for_a.iter().map(|r| r.document_id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2", "d3"]);

        let for_b = store.list_by_email(&email("b@x.com")).await.unwrap();
        assert_eq!(for_b.len(), 1);
        assert_eq!(for_b[0].document_id.as_str(), "d2");

        assert!(store.list_by_email(&email("z@x.com")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cosign.db");
        let rec = record("d1");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.create(&rec).await.unwrap();
            store.set_party_b(&rec.document_id, &email("b@x.com")).await.unwrap();
            store
                .update_signatures(&rec.document_id, SignState::from_raw(0, 1))
                .await
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let got = store.get(&rec.document_id).await.unwrap().unwrap();
        assert_eq!(got.party_b_email(), Some(&email("b@x.com")));
        assert_eq!(got.signatures.raw(), (0, 1));
    }
}
