use crate::auth::auth::AuthUser;
use crate::core::error::PunchError;
use crate::core::geo::Coordinate;
use crate::core::validator::{AttendanceValidator, PunchOutcome, RejectionDetail};
use crate::model::attendance::{AttendancePunch, AttendanceRecord};
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

/// Punch payload sent by the mobile client.
#[derive(Deserialize, ToSchema)]
pub struct PunchRequest {
    #[schema(example = 12.9716)]
    pub latitude: f64,
    #[schema(example = 77.5946)]
    pub longitude: f64,
    /// Reported GPS uncertainty in meters. Recorded for audit, never a
    /// rejection reason by itself.
    #[schema(example = 15.0)]
    pub accuracy_m: f64,
    /// Client-side timestamp, audit only.
    #[schema(example = "2026-01-05T09:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub recorded_at: Option<DateTime<Utc>>,
    #[schema(example = "android", nullable = true)]
    pub source: Option<String>,
}

impl PunchRequest {
    fn into_punch(self) -> AttendancePunch {
        let mut punch =
            AttendancePunch::new(Coordinate::new(self.latitude, self.longitude), self.accuracy_m);
        punch.recorded_at = self.recorded_at;
        punch.source = self.source;
        punch
    }
}

#[derive(Serialize, ToSchema)]
pub struct PunchAccepted {
    #[schema(example = "Checked in successfully")]
    pub message: String,
    pub record: AttendanceRecord,
}

fn respond(
    result: Result<PunchOutcome, PunchError>,
    employee_id: u64,
    accepted_message: &str,
    operation: &str,
) -> actix_web::Result<HttpResponse> {
    match result {
        Ok(PunchOutcome::Accepted(record)) => Ok(HttpResponse::Ok().json(PunchAccepted {
            message: accepted_message.to_string(),
            record,
        })),
        Ok(PunchOutcome::Rejected(detail)) => Ok(HttpResponse::UnprocessableEntity().json(detail)),
        Err(e) if e.is_input_error() => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": e.to_string()
        }))),
        Err(e) if e.is_state_conflict() => Ok(HttpResponse::Conflict().json(serde_json::json!({
            "message": e.to_string()
        }))),
        Err(e) => {
            tracing::error!(error = %e, employee_id, operation, "Punch failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Check-in endpoint: strict geofence validation.
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body(
        content = PunchRequest,
        description = "Check-in punch (coordinate + accuracy)",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Checked in successfully", body = PunchAccepted),
        (status = 400, description = "Malformed coordinate or accuracy"),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "message": "already checked in today"
        })),
        (status = 422, description = "Punch outside every office geofence", body = RejectionDetail),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    validator: web::Data<AttendanceValidator>,
    payload: web::Json<PunchRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let punch = payload.into_inner().into_punch();
    let result = validator.check_in(employee_id, &punch).await;

    respond(result, employee_id, "Checked in successfully", "check-in")
}

/// Check-out endpoint: lenient geofence validation (radius × 1.5 window).
#[utoipa::path(
    put,
    path = "/api/v1/attendance",
    request_body(
        content = PunchRequest,
        description = "Check-out punch (coordinate + accuracy)",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Checked out successfully", body = PunchAccepted),
        (status = 400, description = "Malformed coordinate or accuracy"),
        (status = 409, description = "No active check-in found for today", body = Object, example = json!({
            "message": "no active check-in found for today"
        })),
        (status = 422, description = "Punch outside geofence and leniency window", body = RejectionDetail),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    validator: web::Data<AttendanceValidator>,
    payload: web::Json<PunchRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let punch = payload.into_inner().into_punch();
    let result = validator.check_out(employee_id, &punch).await;

    respond(result, employee_id, "Checked out successfully", "check-out")
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceFilter {
    #[schema(example = 1000)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = "2026-01-01", value_type = String)]
    /// Earliest day to include
    pub date_from: Option<NaiveDate>,
    #[schema(example = "2026-01-31", value_type = String)]
    /// Latest day to include
    pub date_to: Option<NaiveDate>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Date(NaiveDate),
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRecord>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

/// Attendance listing for HR/Admin review.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/records",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Paginated attendance list", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(from) = query.date_from {
        where_sql.push_str(" AND date >= ?");
        args.push(FilterValue::Date(from));
    }

    if let Some(to) = query.date_to {
        where_sql.push_str(" AND date <= ?");
        args.push(FilterValue::Date(to));
    }

    let count_sql = format!("SELECT COUNT(*) FROM attendance{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count attendance records");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, date, check_in, check_out,
               check_in_latitude, check_in_longitude, check_in_accuracy_m,
               check_out_latitude, check_out_longitude, check_out_accuracy_m,
               office_id, work_hours, status
        FROM attendance
        {}
        ORDER BY date DESC, employee_id
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, AttendanceRecord>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let records = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch attendance list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let response = AttendanceListResponse {
        data: records,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}
