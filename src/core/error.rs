use thiserror::Error;

/// Failures of a validate-and-mutate punch operation.
///
/// Geofence rejections are NOT errors — they are normal decision outcomes
/// carried by [`crate::core::validator::PunchOutcome::Rejected`]. This enum
/// covers input errors (rejected before any geofence logic), per-day state
/// conflicts (user-correctable, surfaced verbatim), and fatal backend
/// failures (no retry inside the core).
#[derive(Debug, Error)]
pub enum PunchError {
    #[error("coordinate ({latitude}, {longitude}) out of valid range")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("accuracy {0} m is not a valid non-negative reading")]
    InvalidAccuracy(f64),

    #[error("already checked in today")]
    AlreadyCheckedIn,

    #[error("no active check-in found for today")]
    NoOpenCheckIn,

    /// Store or registry failure. Fatal for the request; no partial state is
    /// left behind.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl PunchError {
    /// True for errors the end user can correct themselves (as opposed to
    /// malformed input or backend faults).
    pub fn is_state_conflict(&self) -> bool {
        matches!(self, Self::AlreadyCheckedIn | Self::NoOpenCheckIn)
    }

    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCoordinate { .. } | Self::InvalidAccuracy(_)
        )
    }
}
