use crate::core::error::PunchError;
use crate::core::geo::Coordinate;
use crate::core::lifecycle::{self, LatenessClassifier};
use crate::core::matcher::{self, MatchResult};
use crate::core::ports::{AttendanceStore, InsertOutcome, OfficeRegistry};
use crate::model::attendance::{AttendancePunch, AttendanceRecord};
use chrono::Local;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Check-out accepts a punch up to radius × this factor away from the
/// nearest office. Deliberately more lenient than check-in: the user already
/// proved presence once that day and GPS drift while leaving is common.
pub const CHECKOUT_LENIENCY_FACTOR: f64 = 1.5;

/// Reason code attached to a rejected punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    /// Punch is outside every geofence (and outside the check-out leniency
    /// window, for check-out). The user can move closer and retry.
    OutOfRange,
    /// No active geofences exist at all — an administrator problem, not a
    /// "move closer" problem.
    NoGeofencesConfigured,
}

/// Diagnostic payload for a rejected punch, meant for the end user to
/// self-correct. Never conflated with fatal failures.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(
    example = json!({
        "reason": "out-of-range",
        "message": "You are 350 m from Head Office; allowed radius is 200 m",
        "nearest_office": "Head Office",
        "distance_m": 350,
        "allowed_radius_m": 200.0,
        "office_coordinate": { "latitude": 12.9716, "longitude": 77.5946 },
        "submitted_coordinate": { "latitude": 12.9747, "longitude": 77.5946 }
    })
)]
pub struct RejectionDetail {
    pub reason: RejectReason,
    #[schema(example = "You are 350 m from Head Office; allowed radius is 200 m")]
    pub message: String,
    #[schema(example = "Head Office", nullable = true)]
    pub nearest_office: Option<String>,
    /// Distance to the nearest office, rounded to whole meters.
    #[schema(example = 350, nullable = true)]
    pub distance_m: Option<u64>,
    #[schema(example = 200.0, nullable = true)]
    pub allowed_radius_m: Option<f64>,
    pub office_coordinate: Option<Coordinate>,
    pub submitted_coordinate: Coordinate,
}

impl RejectionDetail {
    fn out_of_range(
        nearest: &crate::model::office::OfficeGeofence,
        distance_m: f64,
        submitted: Coordinate,
    ) -> Self {
        let rounded = distance_m.round() as u64;
        Self {
            reason: RejectReason::OutOfRange,
            message: format!(
                "You are {} m from {}; allowed radius is {} m",
                rounded, nearest.name, nearest.radius_m
            ),
            nearest_office: Some(nearest.name.clone()),
            distance_m: Some(rounded),
            allowed_radius_m: Some(nearest.radius_m),
            office_coordinate: Some(nearest.center()),
            submitted_coordinate: submitted,
        }
    }

    fn no_geofences(submitted: Coordinate) -> Self {
        Self {
            reason: RejectReason::NoGeofencesConfigured,
            message: "No office locations are configured; contact an administrator".to_string(),
            nearest_office: None,
            distance_m: None,
            allowed_radius_m: None,
            office_coordinate: None,
            submitted_coordinate: submitted,
        }
    }
}

/// Outcome of an accepted-or-rejected punch decision. Both variants are
/// successful request handling; errors are reserved for invalid input, state
/// conflicts and backend faults.
#[derive(Debug)]
pub enum PunchOutcome {
    Accepted(AttendanceRecord),
    Rejected(RejectionDetail),
}

/// Orchestrates punch acceptance: input validation, the per-day state
/// machine, office matching and the asymmetric check-in/check-out tolerance.
/// Storage and registry are injected so the core stays storage-agnostic.
pub struct AttendanceValidator {
    registry: Arc<dyn OfficeRegistry>,
    store: Arc<dyn AttendanceStore>,
    lateness: Option<Arc<dyn LatenessClassifier>>,
}

impl AttendanceValidator {
    pub fn new(registry: Arc<dyn OfficeRegistry>, store: Arc<dyn AttendanceStore>) -> Self {
        Self {
            registry,
            store,
            lateness: None,
        }
    }

    /// Attach a lateness policy. None ships by default; the core itself
    /// never assigns `late`.
    pub fn with_lateness(mut self, classifier: Arc<dyn LatenessClassifier>) -> Self {
        self.lateness = Some(classifier);
        self
    }

    /// Strict check-in: the punch must land inside a geofence.
    pub async fn check_in(
        &self,
        employee_id: u64,
        punch: &AttendancePunch,
    ) -> Result<PunchOutcome, PunchError> {
        validate_punch(punch)?;

        let now = Local::now().naive_local();
        let day = now.date();

        // Cheap failure path: a record for today, open or closed, means no
        // second cycle — geofences are not consulted at all.
        if self.store.find(employee_id, day).await?.is_some() {
            return Err(PunchError::AlreadyCheckedIn);
        }

        let geofences = self.registry.active_geofences().await?;

        let (office, distance_m) = match matcher::match_office(punch.coordinate, &geofences) {
            MatchResult::Matched { office, distance_m } => (office, distance_m),
            MatchResult::OutOfRange {
                nearest,
                distance_m,
                ..
            } => {
                tracing::info!(
                    employee_id,
                    nearest_office = %nearest.name,
                    distance_m = distance_m.round(),
                    "Check-in rejected: outside geofence"
                );
                return Ok(PunchOutcome::Rejected(RejectionDetail::out_of_range(
                    &nearest,
                    distance_m,
                    punch.coordinate,
                )));
            }
            MatchResult::NoGeofences => {
                tracing::warn!(employee_id, "Check-in rejected: no active geofences");
                return Ok(PunchOutcome::Rejected(RejectionDetail::no_geofences(
                    punch.coordinate,
                )));
            }
        };

        let mut record = lifecycle::open_record(employee_id, day, now, punch, Some(office.id));
        if let Some(classifier) = &self.lateness {
            if let Some(status) = classifier.classify(day, now) {
                record.status = status;
            }
        }

        match self.store.insert_new(record).await? {
            InsertOutcome::Inserted(record) => {
                tracing::info!(
                    employee_id,
                    office = %office.name,
                    distance_m = distance_m.round(),
                    accuracy_m = punch.accuracy_m,
                    source = punch.source.as_deref().unwrap_or("unknown"),
                    "Checked in"
                );
                Ok(PunchOutcome::Accepted(record))
            }
            // Lost a concurrent race; same answer as the short-circuit above.
            InsertOutcome::DuplicateDay => Err(PunchError::AlreadyCheckedIn),
        }
    }

    /// Lenient check-out: a near-miss within radius × 1.5 of the nearest
    /// office is still accepted.
    pub async fn check_out(
        &self,
        employee_id: u64,
        punch: &AttendancePunch,
    ) -> Result<PunchOutcome, PunchError> {
        validate_punch(punch)?;

        let now = Local::now().naive_local();
        let day = now.date();

        let record = match self.store.find(employee_id, day).await? {
            Some(record) if record.is_open() => record,
            _ => return Err(PunchError::NoOpenCheckIn),
        };

        let geofences = self.registry.active_geofences().await?;

        match matcher::match_office(punch.coordinate, &geofences) {
            MatchResult::Matched { .. } => {}
            MatchResult::OutOfRange {
                nearest,
                distance_m,
                ..
            } => {
                if distance_m <= nearest.radius_m * CHECKOUT_LENIENCY_FACTOR {
                    tracing::info!(
                        employee_id,
                        nearest_office = %nearest.name,
                        distance_m = distance_m.round(),
                        "Check-out accepted within leniency window"
                    );
                } else {
                    tracing::info!(
                        employee_id,
                        nearest_office = %nearest.name,
                        distance_m = distance_m.round(),
                        "Check-out rejected: outside geofence and leniency window"
                    );
                    return Ok(PunchOutcome::Rejected(RejectionDetail::out_of_range(
                        &nearest,
                        distance_m,
                        punch.coordinate,
                    )));
                }
            }
            MatchResult::NoGeofences => {
                tracing::warn!(employee_id, "Check-out rejected: no active geofences");
                return Ok(PunchOutcome::Rejected(RejectionDetail::no_geofences(
                    punch.coordinate,
                )));
            }
        }

        let closed = lifecycle::close_record(&record, now, punch)?;

        if !self.store.close_open(&closed).await? {
            // Another request closed it between our read and write.
            return Err(PunchError::NoOpenCheckIn);
        }

        tracing::info!(
            employee_id,
            work_hours = closed.work_hours.unwrap_or(0.0),
            status = %closed.status,
            accuracy_m = punch.accuracy_m,
            source = punch.source.as_deref().unwrap_or("unknown"),
            "Checked out"
        );
        Ok(PunchOutcome::Accepted(closed))
    }
}

/// Input errors are rejected before any geofence or storage work. Accuracy
/// must be a finite non-negative reading but is otherwise never a rejection
/// reason.
fn validate_punch(punch: &AttendancePunch) -> Result<(), PunchError> {
    if !punch.coordinate.in_valid_range() {
        return Err(PunchError::InvalidCoordinate {
            latitude: punch.coordinate.latitude,
            longitude: punch.coordinate.longitude,
        });
    }
    if !punch.accuracy_m.is_finite() || punch.accuracy_m < 0.0 {
        return Err(PunchError::InvalidAccuracy(punch.accuracy_m));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::EARTH_RADIUS_M;
    use crate::model::office::OfficeGeofence;
    use crate::store::memory::{InMemoryAttendanceStore, InMemoryOfficeRegistry};

    fn office(id: u64, name: &str, latitude: f64, longitude: f64, radius_m: f64) -> OfficeGeofence {
        OfficeGeofence {
            id,
            name: name.to_string(),
            latitude,
            longitude,
            radius_m,
            active: true,
        }
    }

    fn head_office() -> OfficeGeofence {
        office(1, "Head Office", 12.9716, 77.5946, 200.0)
    }

    fn punch_at_distance(from: &OfficeGeofence, meters: f64) -> AttendancePunch {
        let latitude = from.latitude + (meters / EARTH_RADIUS_M).to_degrees();
        AttendancePunch::new(Coordinate::new(latitude, from.longitude), 15.0)
    }

    fn validator_with(
        offices: Vec<OfficeGeofence>,
    ) -> (AttendanceValidator, Arc<InMemoryAttendanceStore>) {
        let store = Arc::new(InMemoryAttendanceStore::default());
        let validator = AttendanceValidator::new(
            Arc::new(InMemoryOfficeRegistry::new(offices)),
            store.clone(),
        );
        (validator, store)
    }

    #[actix_web::test]
    async fn check_in_inside_radius_is_accepted_and_matched() {
        let (validator, _) = validator_with(vec![head_office()]);
        let punch = punch_at_distance(&head_office(), 150.0);

        match validator.check_in(1000, &punch).await.unwrap() {
            PunchOutcome::Accepted(record) => {
                assert_eq!(record.office_id, Some(1));
                assert!(record.is_open());
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn check_in_at_350m_is_rejected_with_diagnostics() {
        let (validator, _) = validator_with(vec![head_office()]);
        let punch = punch_at_distance(&head_office(), 350.0);

        match validator.check_in(1000, &punch).await.unwrap() {
            PunchOutcome::Rejected(detail) => {
                assert_eq!(detail.reason, RejectReason::OutOfRange);
                assert_eq!(detail.distance_m, Some(350));
                assert_eq!(detail.allowed_radius_m, Some(200.0));
                assert_eq!(detail.nearest_office.as_deref(), Some("Head Office"));
                assert!(detail.office_coordinate.is_some());
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn check_out_within_leniency_window_is_accepted() {
        let (validator, _) = validator_with(vec![head_office()]);

        let inside = punch_at_distance(&head_office(), 150.0);
        validator.check_in(1000, &inside).await.unwrap();

        // 280m > 200m radius but within 200 * 1.5 = 300m.
        let near_miss = punch_at_distance(&head_office(), 280.0);
        match validator.check_out(1000, &near_miss).await.unwrap() {
            PunchOutcome::Accepted(record) => assert!(!record.is_open()),
            other => panic!("expected lenient acceptance, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn check_out_beyond_leniency_window_is_rejected() {
        let (validator, _) = validator_with(vec![head_office()]);

        let inside = punch_at_distance(&head_office(), 150.0);
        validator.check_in(1000, &inside).await.unwrap();

        let far = punch_at_distance(&head_office(), 350.0);
        match validator.check_out(1000, &far).await.unwrap() {
            PunchOutcome::Rejected(detail) => {
                assert_eq!(detail.reason, RejectReason::OutOfRange);
                assert_eq!(detail.distance_m, Some(350));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn same_distance_rejects_check_in_but_passes_check_out() {
        let (validator, _) = validator_with(vec![head_office()]);

        let inside = punch_at_distance(&head_office(), 100.0);
        validator.check_in(1000, &inside).await.unwrap();

        let near_miss = punch_at_distance(&head_office(), 250.0);
        // A second user checking in from 250m is rejected...
        match validator.check_in(2000, &near_miss).await.unwrap() {
            PunchOutcome::Rejected(_) => {}
            other => panic!("expected check-in rejection, got {other:?}"),
        }
        // ...while the first user checking out from 250m is accepted.
        match validator.check_out(1000, &near_miss).await.unwrap() {
            PunchOutcome::Accepted(_) => {}
            other => panic!("expected check-out acceptance, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn second_check_in_same_day_fails_without_mutation() {
        let (validator, store) = validator_with(vec![head_office()]);
        let punch = punch_at_distance(&head_office(), 50.0);

        validator.check_in(1000, &punch).await.unwrap();
        let first = store.snapshot();

        let second = validator.check_in(1000, &punch).await;
        assert!(matches!(second, Err(PunchError::AlreadyCheckedIn)));
        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(first.len(), 1);
    }

    #[actix_web::test]
    async fn concurrent_check_ins_yield_exactly_one_record() {
        let (validator, store) = validator_with(vec![head_office()]);
        let punch = punch_at_distance(&head_office(), 50.0);

        let (a, b) = futures::join!(
            validator.check_in(1000, &punch),
            validator.check_in(1000, &punch)
        );

        let accepted = [&a, &b]
            .iter()
            .filter(|r| matches!(r, Ok(PunchOutcome::Accepted(_))))
            .count();
        let conflicts = [&a, &b]
            .iter()
            .filter(|r| matches!(r, Err(PunchError::AlreadyCheckedIn)))
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(conflicts, 1);
        assert_eq!(store.snapshot().len(), 1);
    }

    #[actix_web::test]
    async fn check_out_before_check_in_fails() {
        let (validator, _) = validator_with(vec![head_office()]);
        let punch = punch_at_distance(&head_office(), 50.0);

        let result = validator.check_out(1000, &punch).await;
        assert!(matches!(result, Err(PunchError::NoOpenCheckIn)));
    }

    #[actix_web::test]
    async fn second_check_out_fails() {
        let (validator, _) = validator_with(vec![head_office()]);
        let punch = punch_at_distance(&head_office(), 50.0);

        validator.check_in(1000, &punch).await.unwrap();
        validator.check_out(1000, &punch).await.unwrap();

        let again = validator.check_out(1000, &punch).await;
        assert!(matches!(again, Err(PunchError::NoOpenCheckIn)));
    }

    #[actix_web::test]
    async fn empty_geofence_set_is_a_configuration_fault() {
        let (validator, _) = validator_with(vec![]);
        let punch = AttendancePunch::new(Coordinate::new(12.9716, 77.5946), 15.0);

        match validator.check_in(1000, &punch).await.unwrap() {
            PunchOutcome::Rejected(detail) => {
                assert_eq!(detail.reason, RejectReason::NoGeofencesConfigured);
                assert!(detail.nearest_office.is_none());
                assert!(detail.distance_m.is_none());
            }
            other => panic!("expected configuration rejection, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn lateness_classifier_can_override_status_at_check_in() {
        use crate::core::lifecycle::LatenessClassifier;
        use crate::model::attendance::AttendanceStatus;
        use chrono::{NaiveDate, NaiveDateTime};

        struct AlwaysLate;
        impl LatenessClassifier for AlwaysLate {
            fn classify(&self, _: NaiveDate, _: NaiveDateTime) -> Option<AttendanceStatus> {
                Some(AttendanceStatus::Late)
            }
        }

        let store = Arc::new(InMemoryAttendanceStore::default());
        let validator = AttendanceValidator::new(
            Arc::new(InMemoryOfficeRegistry::new(vec![head_office()])),
            store.clone(),
        )
        .with_lateness(Arc::new(AlwaysLate));

        let punch = punch_at_distance(&head_office(), 50.0);
        match validator.check_in(1000, &punch).await.unwrap() {
            PunchOutcome::Accepted(record) => {
                assert_eq!(record.status, AttendanceStatus::Late)
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn poor_accuracy_inside_geofence_is_still_accepted() {
        let (validator, _) = validator_with(vec![head_office()]);
        let mut punch = punch_at_distance(&head_office(), 50.0);
        punch.accuracy_m = 900.0; // network positioning; coordinate still inside

        match validator.check_in(1000, &punch).await.unwrap() {
            PunchOutcome::Accepted(record) => {
                assert_eq!(record.check_in_accuracy_m, 900.0)
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn malformed_coordinates_fail_before_geofence_logic() {
        let (validator, store) = validator_with(vec![head_office()]);
        let punch = AttendancePunch::new(Coordinate::new(95.0, 77.5946), 10.0);

        let result = validator.check_in(1000, &punch).await;
        assert!(matches!(
            result,
            Err(PunchError::InvalidCoordinate { .. })
        ));
        assert!(store.snapshot().is_empty());

        let bad_accuracy = AttendancePunch::new(Coordinate::new(12.9716, 77.5946), -1.0);
        let result = validator.check_in(1000, &bad_accuracy).await;
        assert!(matches!(result, Err(PunchError::InvalidAccuracy(_))));
    }
}
