//! SQLite-backed [`JobFairRepository`] over the `job_fairs` table.

use rusqlite::{params, OptionalExtension, Row};

use super::domain::{JobFair, JobFairId, NewJobFair};
use super::repository::{JobFairRepository, RepositoryError};
use crate::db::{Database, DatabaseError};

const SELECT_COLUMNS: &str =
    "SELECT job_fair_id, district, date_of_job_fair, date_of_creation, qr_code FROM job_fairs";

#[derive(Clone)]
pub struct SqliteJobFairRepository {
    db: Database,
}

impl SqliteJobFairRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn job_fair_from_row(row: &Row<'_>) -> Result<JobFair, rusqlite::Error> {
    Ok(JobFair {
        id: JobFairId(row.get("job_fair_id")?),
        district: row.get("district")?,
        fair_date: row.get("date_of_job_fair")?,
        created_at: row.get("date_of_creation")?,
        qr_image: row.get("qr_code")?,
    })
}

impl From<DatabaseError> for RepositoryError {
    fn from(value: DatabaseError) -> Self {
        RepositoryError::Unavailable(value.to_string())
    }
}

enum AttachOutcome {
    Attached,
    AlreadyIssued,
    Missing,
}

impl JobFairRepository for SqliteJobFairRepository {
    fn insert(&self, record: NewJobFair) -> Result<JobFair, RepositoryError> {
        let id = self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO job_fairs (district, date_of_job_fair, date_of_creation)
                 VALUES (?1, ?2, ?3)",
                params![record.district, record.fair_date, record.created_at],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        Ok(JobFair {
            id: JobFairId(id),
            district: record.district,
            fair_date: record.fair_date,
            created_at: record.created_at,
            qr_image: None,
        })
    }

    fn attach_qr_image(&self, id: JobFairId, image: &[u8]) -> Result<(), RepositoryError> {
        let outcome = self.db.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE job_fairs SET qr_code = ?2 WHERE job_fair_id = ?1 AND qr_code IS NULL",
                params![id.0, image],
            )?;
            if updated == 1 {
                return Ok(AttachOutcome::Attached);
            }

            let exists = conn
                .query_row(
                    "SELECT 1 FROM job_fairs WHERE job_fair_id = ?1",
                    params![id.0],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            Ok(if exists {
                AttachOutcome::AlreadyIssued
            } else {
                AttachOutcome::Missing
            })
        })?;

        match outcome {
            AttachOutcome::Attached => Ok(()),
            AttachOutcome::AlreadyIssued => Err(RepositoryError::Conflict),
            AttachOutcome::Missing => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: JobFairId) -> Result<Option<JobFair>, RepositoryError> {
        let record = self.db.with_conn(|conn| {
            let record = conn
                .query_row(
                    &format!("{SELECT_COLUMNS} WHERE job_fair_id = ?1"),
                    params![id.0],
                    job_fair_from_row,
                )
                .optional()?;
            Ok(record)
        })?;
        Ok(record)
    }

    fn pending_qr(&self, limit: usize) -> Result<Vec<JobFair>, RepositoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE qr_code IS NULL ORDER BY job_fair_id LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], job_fair_from_row)?;
            let records = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })?;
        Ok(records)
    }
}
