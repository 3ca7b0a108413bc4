use crate::api::attendance::{
    AttendanceFilter, AttendanceListResponse, PunchAccepted, PunchRequest,
};
use crate::api::office::{CreateOffice, OfficeFilter, OfficeListResponse, UpdateOffice};
use crate::core::geo::Coordinate;
use crate::core::validator::{RejectReason, RejectionDetail};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::office::OfficeGeofence;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Office Management System API",
        version = "1.0.0",
        description = r#"
## Office Management System (OMS)

This API powers an office-management backend whose core is **geofenced
time-and-attendance tracking**.

### 🔹 Key Features
- **Attendance Tracking**
  - Mobile check-in/check-out validated against registered office geofences
  - Work-hours and attendance status derived automatically at check-out
  - Lenient check-out window (radius × 1.5) for GPS drift while leaving
- **Office Geofences**
  - Admin-managed office locations with center coordinate and allowed radius
- **Attendance Review**
  - Paginated listing for HR/Admin

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Office administration requires the **Admin** role.

### 📦 Response Format
- JSON-based RESTful responses
- Rejected punches return a diagnostic payload (nearest office, distance,
  allowed radius) so the user can self-correct

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::attendance_list,

        crate::api::office::create_office,
        crate::api::office::update_office,
        crate::api::office::deactivate_office,
        crate::api::office::get_office,
        crate::api::office::list_offices
    ),
    components(
        schemas(
            Coordinate,
            PunchRequest,
            PunchAccepted,
            RejectReason,
            RejectionDetail,
            AttendanceStatus,
            AttendanceRecord,
            AttendanceFilter,
            AttendanceListResponse,
            OfficeGeofence,
            CreateOffice,
            UpdateOffice,
            OfficeFilter,
            OfficeListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Geofenced check-in/check-out APIs"),
        (name = "Office", description = "Office geofence administration APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
