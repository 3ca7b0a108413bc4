use crate::core::geo::{Coordinate, distance_meters};
use crate::model::office::OfficeGeofence;

/// Outcome of matching a punch coordinate against the active geofence set.
#[derive(Debug, Clone)]
pub enum MatchResult {
    /// The point lies inside at least one geofence; `office` is the closest
    /// accepting one.
    Matched {
        office: OfficeGeofence,
        distance_m: f64,
    },
    /// No geofence accepts the point. `nearest` is the closest geofence and
    /// `shortfall_m` how far outside its radius the point is, for the
    /// diagnostic payload shown to the user.
    OutOfRange {
        nearest: OfficeGeofence,
        distance_m: f64,
        shortfall_m: f64,
    },
    /// The active geofence set is empty — a configuration fault, distinct
    /// from a distance-based rejection.
    NoGeofences,
}

/// Deterministic ordering for candidates: smallest distance wins, ties broken
/// by smallest office id.
fn closer(distance: f64, id: u64, best_distance: f64, best_id: u64) -> bool {
    distance < best_distance || (distance == best_distance && id < best_id)
}

/// Decide which office (if any) accepts `point`.
///
/// Pure function: no accuracy- or time-based filtering happens here, that is
/// the caller's policy. Inactive geofences are skipped.
pub fn match_office(point: Coordinate, geofences: &[OfficeGeofence]) -> MatchResult {
    let mut matched: Option<(&OfficeGeofence, f64)> = None;
    let mut nearest: Option<(&OfficeGeofence, f64)> = None;

    for office in geofences.iter().filter(|o| o.active) {
        let distance = distance_meters(point, office.center());

        match nearest {
            Some((best, best_d)) if !closer(distance, office.id, best_d, best.id) => {}
            _ => nearest = Some((office, distance)),
        }

        if distance <= office.radius_m {
            match matched {
                Some((best, best_d)) if !closer(distance, office.id, best_d, best.id) => {}
                _ => matched = Some((office, distance)),
            }
        }
    }

    if let Some((office, distance_m)) = matched {
        return MatchResult::Matched {
            office: office.clone(),
            distance_m,
        };
    }

    match nearest {
        Some((office, distance_m)) => MatchResult::OutOfRange {
            nearest: office.clone(),
            distance_m,
            shortfall_m: distance_m - office.radius_m,
        },
        None => MatchResult::NoGeofences,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::EARTH_RADIUS_M;

    fn office(id: u64, name: &str, center: Coordinate, radius_m: f64) -> OfficeGeofence {
        OfficeGeofence {
            id,
            name: name.to_string(),
            latitude: center.latitude,
            longitude: center.longitude,
            radius_m,
            active: true,
        }
    }

    /// Move a coordinate due north by `meters`; exact under haversine.
    fn offset_north(c: Coordinate, meters: f64) -> Coordinate {
        Coordinate::new(c.latitude + (meters / EARTH_RADIUS_M).to_degrees(), c.longitude)
    }

    fn head_office_center() -> Coordinate {
        Coordinate::new(12.9716, 77.5946)
    }

    #[test]
    fn point_inside_radius_matches() {
        let offices = vec![office(1, "Head Office", head_office_center(), 200.0)];
        let punch = offset_north(head_office_center(), 150.0);

        match match_office(punch, &offices) {
            MatchResult::Matched { office, distance_m } => {
                assert_eq!(office.id, 1);
                assert!((distance_m - 150.0).abs() < 0.01);
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn point_outside_every_radius_reports_nearest_and_shortfall() {
        let offices = vec![office(1, "Head Office", head_office_center(), 200.0)];
        let punch = offset_north(head_office_center(), 350.0);

        match match_office(punch, &offices) {
            MatchResult::OutOfRange {
                nearest,
                distance_m,
                shortfall_m,
            } => {
                assert_eq!(nearest.id, 1);
                assert!((distance_m - 350.0).abs() < 0.01);
                assert!((shortfall_m - 150.0).abs() < 0.01);
            }
            other => panic!("expected out-of-range, got {other:?}"),
        }
    }

    #[test]
    fn overlapping_geofences_closer_office_wins() {
        let punch = head_office_center();
        // Office X is 100m away, office Y 80m away; both radii contain the punch.
        let offices = vec![
            office(10, "Office X", offset_north(punch, 100.0), 500.0),
            office(20, "Office Y", offset_north(punch, -80.0), 500.0),
        ];

        match match_office(punch, &offices) {
            MatchResult::Matched { office, .. } => assert_eq!(office.name, "Office Y"),
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn equidistant_tie_breaks_on_smallest_id() {
        let punch = head_office_center();
        let center = offset_north(punch, 50.0);
        let offices = vec![
            office(7, "Branch B", center, 300.0),
            office(3, "Branch A", center, 300.0),
        ];

        match match_office(punch, &offices) {
            MatchResult::Matched { office, .. } => assert_eq!(office.id, 3),
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn inactive_geofences_are_ignored() {
        let mut inactive = office(1, "Closed Office", head_office_center(), 500.0);
        inactive.active = false;
        let offices = vec![inactive];

        assert!(matches!(
            match_office(head_office_center(), &offices),
            MatchResult::NoGeofences
        ));
    }

    #[test]
    fn empty_set_is_a_distinct_rejection() {
        assert!(matches!(
            match_office(head_office_center(), &[]),
            MatchResult::NoGeofences
        ));
    }
}
