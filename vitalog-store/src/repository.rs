use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use dotenv::dotenv;
use itertools::Itertools;
use log::{debug, info};
use tokio::sync::Mutex;
use vitalog_model::record::Record;

use crate::table;

const TABLE_PATH_VAR: &str = "VITALOG_TABLE";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{TABLE_PATH_VAR} must be set")]
    Config(#[from] env::VarError),
    #[error("failed to access table file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed table row: {0}")]
    Format(#[from] csv::Error),
}

type Result<T> = std::result::Result<T, Error>;

/// Ordered record storage, one row per measurement event. Append-only
/// except for the explicit per-user deletions.
#[mockall::automock]
#[async_trait]
pub trait RecordRepository: Send + Sync {
    async fn append(&self, record: Record) -> Result<()>;
    /// Remove the user's most recent row (by date, last occurrence on
    /// ties). Returns false when the user has no rows.
    async fn delete_latest(&self, user: &str) -> Result<bool>;
    /// Remove every row for the user, returning how many were removed.
    async fn delete_all(&self, user: &str) -> Result<u64>;
    /// The user's rows, date ascending.
    async fn query(&self, user: &str) -> Result<Vec<Record>>;
    /// Sorted, de-duplicated user names across the whole table.
    async fn users(&self) -> Result<Vec<String>>;
}

/// Repository backed by a single delimited table file, read in full on
/// every query and rewritten in full on every mutation.
#[derive(Clone)]
pub struct FileRecordRepository {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileRecordRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Build a repository from the `VITALOG_TABLE` environment variable,
    /// loading `.env` first.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let path = env::var(TABLE_PATH_VAR)?;
        info!("Using table file {}", path);
        Ok(Self::new(path))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordRepository for FileRecordRepository {
    async fn append(&self, record: Record) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut records = table::read_records(self.path())?;
        debug!("Appending record for {}", record.name);
        records.push(record);
        records.sort_by(|a, b| a.date.cmp(&b.date));
        table::write_records(self.path(), &records)
    }

    async fn delete_latest(&self, user: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut records = table::read_records(self.path())?;

        // read_records sorts by date, so the last matching index is the
        // user's most recent row.
        let Some(index) = records.iter().rposition(|r| r.name == user) else {
            return Ok(false);
        };
        records.remove(index);
        table::write_records(self.path(), &records)?;
        Ok(true)
    }

    async fn delete_all(&self, user: &str) -> Result<u64> {
        let _guard = self.lock.lock().await;
        let records = table::read_records(self.path())?;

        let (removed, kept): (Vec<Record>, Vec<Record>) =
            records.into_iter().partition(|r| r.name == user);
        if removed.is_empty() {
            return Ok(0);
        }
        table::write_records(self.path(), &kept)?;
        Ok(removed.len() as u64)
    }

    async fn query(&self, user: &str) -> Result<Vec<Record>> {
        let _guard = self.lock.lock().await;
        let records = table::read_records(self.path())?;
        Ok(records.into_iter().filter(|r| r.name == user).collect())
    }

    async fn users(&self) -> Result<Vec<String>> {
        let _guard = self.lock.lock().await;
        let records = table::read_records(self.path())?;
        Ok(records
            .into_iter()
            .map(|r| r.name)
            .sorted()
            .dedup()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;
    use vitalog_model::measurement::Sex;

    use super::*;

    fn record(date: (i32, u32, u32), name: &str, weight_kg: f64) -> Record {
        let metrics = vitalog_metrics::compute_for_key(weight_kg, 175.0, 40, Sex::Male, "moderate")
            .unwrap();
        Record::new(
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            name.to_owned(),
            weight_kg,
            &metrics,
        )
    }

    fn repository(dir: &TempDir) -> FileRecordRepository {
        FileRecordRepository::new(dir.path().join("table.csv"))
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty_table() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);

        assert_eq!(repo.users().await.unwrap(), Vec::<String>::new());
        assert!(repo.query("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn appended_records_survive_a_full_rewrite_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);

        let first = record((2026, 8, 1), "alice", 70.0);
        let second = record((2026, 8, 15), "alice", 69.2);
        repo.append(first.clone()).await.unwrap();
        repo.append(second.clone()).await.unwrap();

        // A fresh repository over the same file sees the same rows.
        let reopened = repository(&dir);
        assert_eq!(reopened.query("alice").await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn query_returns_rows_ordered_by_date() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);

        repo.append(record((2026, 8, 15), "alice", 69.2)).await.unwrap();
        repo.append(record((2026, 7, 1), "alice", 71.0)).await.unwrap();
        repo.append(record((2026, 8, 1), "bob", 82.0)).await.unwrap();

        let dates: Vec<NaiveDate> = repo
            .query("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.date)
            .collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 8, 15).unwrap(),
            ]
        );
    }

    #[tokio::test]
    async fn users_are_sorted_and_deduplicated() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);

        repo.append(record((2026, 8, 1), "carol", 58.0)).await.unwrap();
        repo.append(record((2026, 8, 2), "alice", 70.0)).await.unwrap();
        repo.append(record((2026, 8, 3), "carol", 57.5)).await.unwrap();

        assert_eq!(repo.users().await.unwrap(), vec!["alice", "carol"]);
    }

    #[tokio::test]
    async fn delete_latest_removes_the_most_recent_row_only() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);

        repo.append(record((2026, 8, 1), "alice", 71.0)).await.unwrap();
        repo.append(record((2026, 8, 15), "alice", 69.2)).await.unwrap();
        repo.append(record((2026, 8, 10), "bob", 82.0)).await.unwrap();

        assert!(repo.delete_latest("alice").await.unwrap());

        let remaining = repo.query("alice").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(
            remaining[0].date,
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
        );
        assert_eq!(repo.query("bob").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_latest_on_tied_dates_removes_the_last_appended_row() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);

        repo.append(record((2026, 8, 1), "alice", 70.0)).await.unwrap();
        repo.append(record((2026, 8, 1), "alice", 69.0)).await.unwrap();

        assert!(repo.delete_latest("alice").await.unwrap());

        let remaining = repo.query("alice").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].weight_kg, 70.0);
    }

    #[tokio::test]
    async fn delete_latest_for_unknown_user_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);

        repo.append(record((2026, 8, 1), "alice", 71.0)).await.unwrap();
        assert!(!repo.delete_latest("bob").await.unwrap());
        assert_eq!(repo.query("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_all_removes_only_the_named_user() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);

        repo.append(record((2026, 8, 1), "alice", 71.0)).await.unwrap();
        repo.append(record((2026, 8, 2), "alice", 70.4)).await.unwrap();
        repo.append(record((2026, 8, 3), "bob", 82.0)).await.unwrap();

        assert_eq!(repo.delete_all("alice").await.unwrap(), 2);
        assert_eq!(repo.delete_all("alice").await.unwrap(), 0);
        assert_eq!(repo.users().await.unwrap(), vec!["bob"]);
    }
}
