use crate::model::attendance::AttendanceRecord;
use crate::model::office::OfficeGeofence;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Read side of the office registry. The returned list is a point-in-time
/// snapshot: an edit mid-validation does not retroactively change a decision
/// already made.
#[async_trait]
pub trait OfficeRegistry: Send + Sync {
    async fn active_geofences(&self) -> anyhow::Result<Vec<OfficeGeofence>>;
}

/// Result of inserting the day's first record.
#[derive(Debug)]
pub enum InsertOutcome {
    /// Inserted; the record now carries its storage id.
    Inserted(AttendanceRecord),
    /// A record for this (employee, day) already exists — the uniqueness
    /// guarantee fired, e.g. under a concurrent double check-in.
    DuplicateDay,
}

/// Storage contract for attendance records. Implementations must make both
/// writes atomic per (employee, day): `insert_new` enforces uniqueness and
/// `close_open` only applies while the record is still open.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> anyhow::Result<Option<AttendanceRecord>>;

    async fn insert_new(&self, record: AttendanceRecord) -> anyhow::Result<InsertOutcome>;

    /// Write the closed record over the open one; compare-and-swap style,
    /// guarded on check-out still being unset. Returns false when the record
    /// was no longer open (lost race or already closed).
    async fn close_open(&self, record: &AttendanceRecord) -> anyhow::Result<bool>;
}
