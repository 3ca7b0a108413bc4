use crate::core::ports::{AttendanceStore, InsertOutcome};
use crate::model::attendance::AttendanceRecord;
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

/// MySQL-backed attendance store. Atomicity per (employee, day) rests on the
/// schema: a UNIQUE KEY over (employee_id, date) makes the second concurrent
/// check-in fail, and check-out is a single UPDATE guarded by
/// `check_out IS NULL`.
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

/// MySQL reports unique-key violations under SQLSTATE 23000.
fn is_duplicate_key(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000"))
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn find(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> anyhow::Result<Option<AttendanceRecord>> {
        sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, employee_id, date, check_in, check_out,
                   check_in_latitude, check_in_longitude, check_in_accuracy_m,
                   check_out_latitude, check_out_longitude, check_out_accuracy_m,
                   office_id, work_hours, status
            FROM attendance
            WHERE employee_id = ? AND date = ?
            "#,
        )
        .bind(employee_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch attendance record")
    }

    async fn insert_new(&self, mut record: AttendanceRecord) -> anyhow::Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance
                (employee_id, date, check_in,
                 check_in_latitude, check_in_longitude, check_in_accuracy_m,
                 office_id, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.employee_id)
        .bind(record.date)
        .bind(record.check_in)
        .bind(record.check_in_latitude)
        .bind(record.check_in_longitude)
        .bind(record.check_in_accuracy_m)
        .bind(record.office_id)
        .bind(record.status)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                record.id = done.last_insert_id();
                Ok(InsertOutcome::Inserted(record))
            }
            Err(e) if is_duplicate_key(&e) => Ok(InsertOutcome::DuplicateDay),
            Err(e) => Err(e).context("failed to insert attendance record"),
        }
    }

    async fn close_open(&self, record: &AttendanceRecord) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET check_out = ?,
                check_out_latitude = ?,
                check_out_longitude = ?,
                check_out_accuracy_m = ?,
                work_hours = ?,
                status = ?
            WHERE employee_id = ?
            AND date = ?
            AND check_out IS NULL
            "#,
        )
        .bind(record.check_out)
        .bind(record.check_out_latitude)
        .bind(record.check_out_longitude)
        .bind(record.check_out_accuracy_m)
        .bind(record.work_hours)
        .bind(record.status)
        .bind(record.employee_id)
        .bind(record.date)
        .execute(&self.pool)
        .await
        .context("failed to close attendance record")?;

        Ok(result.rows_affected() > 0)
    }
}
