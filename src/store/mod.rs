//! Storage port for the portal and its adapters.
//!
//! Both adapters enforce the (email, date) idempotency key themselves:
//! `insert_punch_in` only inserts when no record exists for the day and
//! `complete_punch_out` only writes while the punch-out is still empty.

pub mod mysql;
pub mod row;
pub mod sheet;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::{
    attendance::{AttendanceRecord, PunchOut},
    employee::Employee,
    shift_rule::ShiftRule,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Sheet error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sheet task failed: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),

    #[error("Sheet {sheet} is missing column {column}")]
    MissingColumn { sheet: String, column: String },

    #[error("Malformed row {row} in {sheet}: {reason}")]
    MalformedRow {
        sheet: String,
        row: usize,
        reason: String,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of an insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

/// Result of an update-if-still-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// No record for that email and day.
    Missing,
    /// The record already carries a punch-out.
    AlreadyClosed,
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Employee directory lookup by exact email.
    async fn find_employee(&self, email: &str) -> StoreResult<Option<Employee>>;

    async fn find_shift(&self, shift_name: &str) -> StoreResult<Option<ShiftRule>>;

    async fn list_shifts(&self) -> StoreResult<Vec<ShiftRule>>;

    /// First record in log order for this email whose date is `date`.
    async fn find_daily_record(
        &self,
        email: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>>;

    async fn insert_punch_in(&self, record: &AttendanceRecord) -> StoreResult<InsertOutcome>;

    async fn complete_punch_out(
        &self,
        email: &str,
        date: NaiveDate,
        punch_out: &PunchOut,
    ) -> StoreResult<UpdateOutcome>;
}
