use crate::core::geo::Coordinate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A registered office geofence: circular zone used to test punch proximity.
/// Created/edited by admins, read-only to the attendance core.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Head Office",
        "latitude": 12.9716,
        "longitude": 77.5946,
        "radius_m": 200.0,
        "active": true
    })
)]
pub struct OfficeGeofence {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Head Office")]
    pub name: String,

    #[schema(example = 12.9716)]
    pub latitude: f64,

    #[schema(example = 77.5946)]
    pub longitude: f64,

    /// Allowed punch radius around the center, in meters.
    #[schema(example = 200.0)]
    pub radius_m: f64,

    #[schema(example = true)]
    pub active: bool,
}

impl OfficeGeofence {
    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}
