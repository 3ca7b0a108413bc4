use crate::core::geo::Coordinate;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Daily attendance status. `late` and `absent` are reserved for external
/// policy jobs (lateness classifier, end-of-day rollup) and are never set by
/// the check-in/check-out flow itself.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    HalfDay,
    Late,
    Absent,
}

/// One attendance record per employee per calendar day (local midnight
/// boundary). Created by check-in, closed by check-out, never reopened.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 1000,
        "date": "2026-01-05",
        "check_in": "2026-01-05T09:00:00",
        "check_out": "2026-01-05T17:30:00",
        "check_in_latitude": 12.9716,
        "check_in_longitude": 77.5946,
        "check_in_accuracy_m": 12.5,
        "office_id": 1,
        "work_hours": 8.5,
        "status": "present"
    })
)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,

    #[schema(example = "2026-01-05T09:00:00", format = "date-time", value_type = String)]
    pub check_in: NaiveDateTime,

    #[schema(example = "2026-01-05T17:30:00", format = "date-time", value_type = String, nullable = true)]
    pub check_out: Option<NaiveDateTime>,

    #[schema(example = 12.9716)]
    pub check_in_latitude: f64,

    #[schema(example = 77.5946)]
    pub check_in_longitude: f64,

    /// Reported GPS uncertainty at check-in. Audit only, never a rejection
    /// criterion.
    #[schema(example = 12.5)]
    pub check_in_accuracy_m: f64,

    #[schema(example = 12.9716, nullable = true)]
    pub check_out_latitude: Option<f64>,

    #[schema(example = 77.5946, nullable = true)]
    pub check_out_longitude: Option<f64>,

    #[schema(example = 8.0, nullable = true)]
    pub check_out_accuracy_m: Option<f64>,

    /// Office the check-in resolved to. Null means the punch was accepted
    /// without a geofence match (manual override path).
    #[schema(example = 1, nullable = true)]
    pub office_id: Option<u64>,

    /// (check_out - check_in) in hours, two decimal places. Computed only at
    /// check-out.
    #[schema(example = 8.5, nullable = true)]
    pub work_hours: Option<f64>,

    #[schema(example = "present")]
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    /// An open record has a check-in but no check-out yet.
    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }
}

/// A single check-in or check-out attempt as submitted by the device.
/// Transient: consumed to create or close an [`AttendanceRecord`], never
/// persisted on its own.
#[derive(Debug, Clone)]
pub struct AttendancePunch {
    pub coordinate: Coordinate,
    /// Reported uncertainty radius in meters; may be large for network-based
    /// positioning.
    pub accuracy_m: f64,
    /// Client-side timestamp, recorded for audit only. Server time is
    /// authoritative for the record itself.
    pub recorded_at: Option<DateTime<Utc>>,
    /// Device/source tag ("android", "ios", ...).
    pub source: Option<String>,
}

impl AttendancePunch {
    pub fn new(coordinate: Coordinate, accuracy_m: f64) -> Self {
        Self {
            coordinate,
            accuracy_m,
            recorded_at: None,
            source: None,
        }
    }
}
