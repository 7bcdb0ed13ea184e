use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{FromRow, MySqlPool};
use tracing::warn;

use super::{AttendanceStore, InsertOutcome, StoreResult, UpdateOutcome};
use crate::model::{
    attendance::{AttendanceRecord, AttendanceStatus, PunchOut},
    employee::{Employee, EmployeeStatus},
    shift_rule::ShiftRule,
};

#[derive(FromRow)]
struct EmployeeRow {
    employee_id: String,
    employee_name: String,
    email: String,
    shift_name: String,
    status: String,
}

impl From<EmployeeRow> for Employee {
    fn from(r: EmployeeRow) -> Self {
        Self {
            employee_id: r.employee_id,
            employee_name: r.employee_name,
            email: r.email,
            shift_name: r.shift_name,
            status: EmployeeStatus::from_cell(&r.status),
        }
    }
}

#[derive(FromRow)]
struct ShiftRow {
    shift_name: String,
    full_day_hrs: f64,
    half_day_hrs: f64,
}

impl From<ShiftRow> for ShiftRule {
    fn from(r: ShiftRow) -> Self {
        ShiftRule::new(r.shift_name, r.full_day_hrs, r.half_day_hrs)
    }
}

#[derive(FromRow)]
struct AttendanceRow {
    date: NaiveDate,
    employee_id: String,
    employee_name: String,
    email: String,
    shift_name: String,
    punch_in: NaiveDateTime,
    punch_out: Option<NaiveDateTime>,
    work_hours: Option<f64>,
    attendance_status: Option<String>,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(r: AttendanceRow) -> Self {
        let attendance_status = r.attendance_status.as_deref().and_then(|s| {
            s.parse::<AttendanceStatus>()
                .map_err(|_| warn!(status = s, email = %r.email, "Unknown attendance status in table"))
                .ok()
        });

        Self {
            date: r.date,
            employee_id: r.employee_id,
            employee_name: r.employee_name,
            email: r.email,
            shift_name: r.shift_name,
            punch_in: r.punch_in,
            punch_out: r.punch_out,
            work_hours: r.work_hours,
            attendance_status,
        }
    }
}

/// Tables with the (email, date) key enforced by `uq_attendance_email_date`.
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn find_employee(&self, email: &str) -> StoreResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT employee_id, employee_name, email, shift_name, status
            FROM employees
            WHERE email = ?
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Employee::from))
    }

    async fn find_shift(&self, shift_name: &str) -> StoreResult<Option<ShiftRule>> {
        let row = sqlx::query_as::<_, ShiftRow>(
            r#"
            SELECT shift_name, full_day_hrs, half_day_hrs
            FROM shift_rules
            WHERE shift_name = ?
            "#,
        )
        .bind(shift_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ShiftRule::from))
    }

    async fn list_shifts(&self) -> StoreResult<Vec<ShiftRule>> {
        let rows = sqlx::query_as::<_, ShiftRow>(
            "SELECT shift_name, full_day_hrs, half_day_hrs FROM shift_rules ORDER BY shift_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ShiftRule::from).collect())
    }

    async fn find_daily_record(
        &self,
        email: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let row = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT date, employee_id, employee_name, email, shift_name,
                   punch_in, punch_out, work_hours, attendance_status
            FROM attendance_log
            WHERE email = ?
            AND date = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AttendanceRecord::from))
    }

    async fn insert_punch_in(&self, record: &AttendanceRecord) -> StoreResult<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_log
                (date, employee_id, employee_name, email, shift_name, punch_in)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.date)
        .bind(&record.employee_id)
        .bind(&record.employee_name)
        .bind(&record.email)
        .bind(&record.shift_name)
        .bind(record.punch_in)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) => {
                // Duplicate punch-in for the same day
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.code().as_deref() == Some("23000") {
                        return Ok(InsertOutcome::AlreadyExists);
                    }
                }
                Err(e.into())
            }
        }
    }

    async fn complete_punch_out(
        &self,
        email: &str,
        date: NaiveDate,
        punch_out: &PunchOut,
    ) -> StoreResult<UpdateOutcome> {
        let result = sqlx::query(
            r#"
            UPDATE attendance_log
            SET punch_out = ?, work_hours = ?, attendance_status = ?
            WHERE email = ?
            AND date = ?
            AND punch_out IS NULL
            "#,
        )
        .bind(punch_out.punch_out)
        .bind(punch_out.work_hours)
        .bind(punch_out.attendance_status.as_ref())
        .bind(email)
        .bind(date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(UpdateOutcome::Updated);
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM attendance_log WHERE email = ? AND date = ? LIMIT 1)",
        )
        .bind(email)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(if exists {
            UpdateOutcome::AlreadyClosed
        } else {
            UpdateOutcome::Missing
        })
    }
}
