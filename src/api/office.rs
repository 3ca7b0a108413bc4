use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::core::geo::Coordinate;
use crate::model::office::OfficeGeofence;
use crate::store::office::MySqlOfficeRegistry;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateOffice {
    #[schema(example = "Head Office")]
    pub name: String,
    #[schema(example = 12.9716)]
    pub latitude: f64,
    #[schema(example = 77.5946)]
    pub longitude: f64,
    #[schema(example = 200.0)]
    pub radius_m: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateOffice {
    #[schema(example = "Head Office", nullable = true)]
    pub name: Option<String>,
    #[schema(example = 12.9716, nullable = true)]
    pub latitude: Option<f64>,
    #[schema(example = 77.5946, nullable = true)]
    pub longitude: Option<f64>,
    #[schema(example = 200.0, nullable = true)]
    pub radius_m: Option<f64>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct OfficeFilter {
    #[schema(example = true)]
    /// Filter by active flag
    pub active: Option<bool>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct OfficeListResponse {
    pub data: Vec<OfficeGeofence>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

fn validate_center(latitude: f64, longitude: f64) -> Result<(), String> {
    if !Coordinate::new(latitude, longitude).in_valid_range() {
        return Err(format!(
            "Coordinate ({latitude}, {longitude}) out of valid range"
        ));
    }
    Ok(())
}

fn validate_latitude(latitude: f64) -> Result<(), String> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("Latitude {latitude} out of valid range"));
    }
    Ok(())
}

fn validate_longitude(longitude: f64) -> Result<(), String> {
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("Longitude {longitude} out of valid range"));
    }
    Ok(())
}

fn validate_radius(radius_m: f64, config: &Config) -> Result<(), String> {
    if !radius_m.is_finite()
        || radius_m < config.geofence_min_radius_m
        || radius_m > config.geofence_max_radius_m
    {
        return Err(format!(
            "Radius must be between {} and {} meters",
            config.geofence_min_radius_m, config.geofence_max_radius_m
        ));
    }
    Ok(())
}

/* =========================
Create office geofence (Admin)
========================= */
/// Swagger doc for create_office endpoint
#[utoipa::path(
    post,
    path = "/api/v1/office",
    request_body(
        content = CreateOffice,
        description = "Office geofence payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Office created", body = Object, example = json!({
            "message": "Office created",
            "id": 1
        })),
        (status = 400, description = "Invalid coordinate or radius"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Office"
)]
pub async fn create_office(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    registry: web::Data<MySqlOfficeRegistry>,
    config: web::Data<Config>,
    payload: web::Json<CreateOffice>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if payload.name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Office name must not be empty"
        })));
    }

    if let Err(message) = validate_center(payload.latitude, payload.longitude)
        .and_then(|_| validate_radius(payload.radius_m, &config))
    {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({ "message": message })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO office_geofences (name, latitude, longitude, radius_m, active)
        VALUES (?, ?, ?, ?, 1)
        "#,
    )
    .bind(payload.name.trim())
    .bind(payload.latitude)
    .bind(payload.longitude)
    .bind(payload.radius_m)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to create office geofence");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    registry.invalidate().await;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Office created",
        "id": result.last_insert_id()
    })))
}

/* =========================
Update office geofence (Admin)
========================= */
/// Swagger doc for update_office endpoint
#[utoipa::path(
    put,
    path = "/api/v1/office/{office_id}",
    params(
        ("office_id" = u64, Path, description = "ID of the office to update")
    ),
    request_body(
        content = UpdateOffice,
        description = "Fields to update; omitted fields are left unchanged",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Office updated", body = Object, example = json!({
            "message": "Office updated"
        })),
        (status = 400, description = "Invalid payload or office not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Office"
)]
pub async fn update_office(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    registry: web::Data<MySqlOfficeRegistry>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    payload: web::Json<UpdateOffice>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let office_id = path.into_inner();

    // Helper enum for typed SQLx binding
    enum FieldValue {
        Str(String),
        F64(f64),
    }

    let mut set_sql: Vec<&str> = Vec::new();
    let mut args: Vec<FieldValue> = Vec::new();

    if let Some(name) = payload.name.as_deref() {
        if name.trim().is_empty() {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Office name must not be empty"
            })));
        }
        set_sql.push("name = ?");
        args.push(FieldValue::Str(name.trim().to_string()));
    }

    if let Some(latitude) = payload.latitude {
        if let Err(message) = validate_latitude(latitude) {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({ "message": message })));
        }
        set_sql.push("latitude = ?");
        args.push(FieldValue::F64(latitude));
    }

    if let Some(longitude) = payload.longitude {
        if let Err(message) = validate_longitude(longitude) {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({ "message": message })));
        }
        set_sql.push("longitude = ?");
        args.push(FieldValue::F64(longitude));
    }

    if let Some(radius_m) = payload.radius_m {
        if let Err(message) = validate_radius(radius_m, &config) {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({ "message": message })));
        }
        set_sql.push("radius_m = ?");
        args.push(FieldValue::F64(radius_m));
    }

    if set_sql.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "No fields provided for update"
        })));
    }

    let sql = format!(
        "UPDATE office_geofences SET {} WHERE id = ?",
        set_sql.join(", ")
    );

    let mut query = sqlx::query(&sql);
    for arg in args {
        query = match arg {
            FieldValue::Str(v) => query.bind(v),
            FieldValue::F64(v) => query.bind(v),
        };
    }

    let result = query
        .bind(office_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, office_id, "Failed to update office geofence");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Office not found"
        })));
    }

    registry.invalidate().await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Office updated"
    })))
}

/* =========================
Deactivate office geofence (Admin)
========================= */
/// Swagger doc for deactivate_office endpoint
#[utoipa::path(
    put,
    path = "/api/v1/office/{office_id}/deactivate",
    params(
        ("office_id" = u64, Path, description = "ID of the office to deactivate")
    ),
    responses(
        (status = 200, description = "Office deactivated", body = Object, example = json!({
            "message": "Office deactivated"
        })),
        (status = 400, description = "Office not found or already inactive", body = Object, example = json!({
            "message": "Office not found or already inactive"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Office"
)]
pub async fn deactivate_office(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    registry: web::Data<MySqlOfficeRegistry>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let office_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE office_geofences
        SET active = 0
        WHERE id = ?
        AND active = 1
        "#,
    )
    .bind(office_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, office_id, "Failed to deactivate office geofence");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Office not found or already inactive"
        })));
    }

    registry.invalidate().await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Office deactivated"
    })))
}

/// for getting an office geofence details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/office/{office_id}",
    params(
        ("office_id" = u64, Path, description = "ID of the office to fetch")
    ),
    responses(
        (status = 200, description = "Office found", body = OfficeGeofence),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Office not found", body = Object, example = json!({
            "message": "Office not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Office"
)]
pub async fn get_office(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let office_id = path.into_inner();

    let office = sqlx::query_as::<_, OfficeGeofence>(
        r#"
        SELECT id, name, latitude, longitude, radius_m, active
        FROM office_geofences
        WHERE id = ?
        "#,
    )
    .bind(office_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, office_id, "Failed to fetch office geofence");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match office {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Office not found"
        }))),
    }
}

/// for getting office geofences endpoint
#[utoipa::path(
    get,
    path = "/api/v1/office",
    params(OfficeFilter),
    responses(
        (status = 200, description = "Paginated office list", body = OfficeListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Office"
)]
pub async fn list_offices(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<OfficeFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    if query.active.is_some() {
        where_sql.push_str(" AND active = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM office_geofences{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(active) = query.active {
        count_q = count_q.bind(active);
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count office geofences");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, name, latitude, longitude, radius_m, active
        FROM office_geofences
        {}
        ORDER BY id
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, OfficeGeofence>(&data_sql);
    if let Some(active) = query.active {
        data_q = data_q.bind(active);
    }

    let offices = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch office list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let response = OfficeListResponse {
        data: offices,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}
