use crate::core::error::PunchError;
use crate::model::attendance::{AttendancePunch, AttendanceRecord, AttendanceStatus};
use chrono::{NaiveDate, NaiveDateTime};

/// Below this many work-hours a day is downgraded from `present` to
/// `half-day` at check-out.
pub const HALF_DAY_THRESHOLD_HOURS: f64 = 4.0;

/// Extension point for an attendance-policy job that classifies late
/// arrivals (e.g. check-in past a shift-start threshold). The check-in flow
/// consults it but ships no built-in policy.
pub trait LatenessClassifier: Send + Sync {
    /// Return `Some(status)` to override the default `present` status at
    /// check-in, or `None` to leave it untouched.
    fn classify(&self, day: NaiveDate, check_in: NaiveDateTime) -> Option<AttendanceStatus>;
}

/// `NoRecord -> CheckedIn`: build the day's record from an approved punch.
/// The caller has already resolved the office (nullable) and enforced the
/// one-record-per-day rule; persistence assigns the id.
pub fn open_record(
    employee_id: u64,
    day: NaiveDate,
    now: NaiveDateTime,
    punch: &AttendancePunch,
    office_id: Option<u64>,
) -> AttendanceRecord {
    AttendanceRecord {
        id: 0,
        employee_id,
        date: day,
        check_in: now,
        check_out: None,
        check_in_latitude: punch.coordinate.latitude,
        check_in_longitude: punch.coordinate.longitude,
        check_in_accuracy_m: punch.accuracy_m,
        check_out_latitude: None,
        check_out_longitude: None,
        check_out_accuracy_m: None,
        office_id,
        work_hours: None,
        status: AttendanceStatus::Present,
    }
}

/// `CheckedIn -> CheckedOut`: close an open record. Fails with
/// `NoOpenCheckIn` if the record is already closed. Location approval is the
/// validator's job — this function assumes the punch was already accepted.
pub fn close_record(
    record: &AttendanceRecord,
    now: NaiveDateTime,
    punch: &AttendancePunch,
) -> Result<AttendanceRecord, PunchError> {
    if !record.is_open() {
        return Err(PunchError::NoOpenCheckIn);
    }

    let hours = work_hours_between(record.check_in, now);

    let mut closed = record.clone();
    closed.check_out = Some(now);
    closed.check_out_latitude = Some(punch.coordinate.latitude);
    closed.check_out_longitude = Some(punch.coordinate.longitude);
    closed.check_out_accuracy_m = Some(punch.accuracy_m);
    closed.work_hours = Some(hours);

    // Status only ever moves forward within the day; the sole transition
    // owned by this core is the half-day downgrade.
    if closed.status == AttendanceStatus::Present && hours < HALF_DAY_THRESHOLD_HOURS {
        closed.status = AttendanceStatus::HalfDay;
    }

    Ok(closed)
}

/// Elapsed hours between two timestamps, rounded to two decimal places and
/// clamped at zero (a backwards clock never yields negative work-hours).
pub fn work_hours_between(check_in: NaiveDateTime, check_out: NaiveDateTime) -> f64 {
    let seconds = (check_out - check_in).num_seconds().max(0) as f64;
    (seconds / 3600.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Coordinate;
    use chrono::NaiveDate;

    fn punch() -> AttendancePunch {
        AttendancePunch::new(Coordinate::new(12.9716, 77.5946), 10.0)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn open_at(hour: u32, minute: u32) -> AttendanceRecord {
        let now = day().and_hms_opt(hour, minute, 0).unwrap();
        open_record(1000, day(), now, &punch(), Some(1))
    }

    #[test]
    fn check_in_creates_open_present_record() {
        let record = open_at(9, 0);
        assert!(record.is_open());
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.office_id, Some(1));
        assert_eq!(record.work_hours, None);
    }

    #[test]
    fn short_day_downgrades_to_half_day() {
        // Check-in 09:00, check-out 12:30 -> 3.5h, below the 4h threshold.
        let record = open_at(9, 0);
        let out = day().and_hms_opt(12, 30, 0).unwrap();

        let closed = close_record(&record, out, &punch()).unwrap();
        assert_eq!(closed.work_hours, Some(3.5));
        assert_eq!(closed.status, AttendanceStatus::HalfDay);
        assert!(!closed.is_open());
    }

    #[test]
    fn full_day_stays_present() {
        let record = open_at(9, 0);
        let out = day().and_hms_opt(17, 30, 0).unwrap();

        let closed = close_record(&record, out, &punch()).unwrap();
        assert_eq!(closed.work_hours, Some(8.5));
        assert_eq!(closed.status, AttendanceStatus::Present);
    }

    #[test]
    fn closing_a_closed_record_fails() {
        let record = open_at(9, 0);
        let out = day().and_hms_opt(17, 0, 0).unwrap();
        let closed = close_record(&record, out, &punch()).unwrap();

        let again = close_record(&closed, out, &punch());
        assert!(matches!(again, Err(PunchError::NoOpenCheckIn)));
    }

    #[test]
    fn work_hours_round_to_two_decimals_and_never_go_negative() {
        let a = day().and_hms_opt(9, 0, 0).unwrap();
        let b = day().and_hms_opt(9, 10, 0).unwrap();
        assert_eq!(work_hours_between(a, b), 0.17);
        assert_eq!(work_hours_between(b, a), 0.0);
        assert_eq!(work_hours_between(a, a), 0.0);
    }
}
