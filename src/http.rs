use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::backend::SchedulingBackend;
use crate::error::SchedulingError;
use crate::profile::{CounselorProfile, ProfileDirectory};
use crate::types::{is_canonical_hour, Appointment, Principal, Role, SlotView};

lazy_static! {
    static ref DATE_FORMAT: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
}

#[derive(Clone)]
pub struct AppState<B: SchedulingBackend> {
    backend: B,
    profiles: ProfileDirectory,
}

/// Field validator: only the hours of the counselling-day grid are
/// addressable, so the lunch hour fails here just like 7 or 17 does.
fn validate_grid_hour(hour: u8) -> Result<(), ValidationError> {
    if is_canonical_hour(hour) {
        Ok(())
    } else {
        Err(ValidationError::new("hour_outside_grid"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct BookRequest {
    counselor_id: i64,
    #[validate(regex(path = *DATE_FORMAT, message = "Date must be YYYY-MM-DD"))]
    date: String,
    #[validate(custom(function = validate_grid_hour, message = "Hour must be one of the grid hours"))]
    hour: u8,
    program: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct ToggleAvailabilityRequest {
    #[validate(regex(path = *DATE_FORMAT, message = "Date must be YYYY-MM-DD"))]
    date: String,
    #[validate(custom(function = validate_grid_hour, message = "Hour must be one of the grid hours"))]
    hour: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct RescheduleRequest {
    #[validate(regex(path = *DATE_FORMAT, message = "Date must be YYYY-MM-DD"))]
    date: String,
    #[validate(custom(function = validate_grid_hour, message = "Hour must be one of the grid hours"))]
    hour: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CounselorListQuery {
    college: Option<String>,
}

pub fn create_app<B: SchedulingBackend>(backend: B, profiles: ProfileDirectory) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let shared = Router::new()
        .route("/counselors", get(list_counselors))
        .route("/slots/:counselor_id/:date", get(get_availability_grid))
        .route("/appointments", get(get_appointments))
        .route("/book", post(book_appointment))
        .route("/appointments/:id/cancel", post(cancel_appointment));

    let counselor = Router::new()
        .route("/availability/toggle", post(toggle_availability))
        .route("/appointments/:id/confirm", post(confirm_appointment))
        .route("/appointments/:id/complete", post(complete_appointment))
        .route("/appointments/:id/reschedule", post(reschedule_appointment))
        .route_layer(middleware::from_fn(counselor_only));

    Router::new()
        .merge(shared)
        .merge(counselor)
        .layer(middleware::from_fn(principal_auth))
        .with_state(AppState { backend, profiles })
        .layer(cors)
}

fn principal_from_headers(headers: &HeaderMap) -> Option<Principal> {
    let id = headers
        .get("x-user-id")?
        .to_str()
        .ok()?
        .parse::<i64>()
        .ok()?;
    let role = match headers.get("x-user-role")?.to_str().ok()? {
        "student" => Role::Student,
        "counselor" => Role::Counselor,
        _ => return None,
    };
    Some(Principal { id, role })
}

/// Stand-in for the session layer: the authenticated principal arrives as
/// headers and is stashed in request extensions for the handlers.
async fn principal_auth(
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    match principal_from_headers(request.headers()) {
        Some(principal) => {
            request.extensions_mut().insert(principal);
            Ok(next.run(request).await)
        }
        None => Err((
            StatusCode::UNAUTHORIZED,
            "Missing or invalid identity headers".to_string(),
        )),
    }
}

async fn counselor_only(request: Request, next: Next) -> Result<Response, (StatusCode, String)> {
    match request.extensions().get::<Principal>() {
        Some(principal) if principal.role == Role::Counselor => Ok(next.run(request).await),
        _ => Err((
            StatusCode::FORBIDDEN,
            "Counselor role required".to_string(),
        )),
    }
}

fn api_error(err: SchedulingError) -> (StatusCode, String) {
    (err.status_code(), err.to_string())
}

fn validated<T: Validate>(request: T) -> Result<T, (StatusCode, String)> {
    match request.validate() {
        Ok(()) => Ok(request),
        Err(errors) => Err((StatusCode::BAD_REQUEST, errors.to_string())),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, (StatusCode, String)> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| (StatusCode::UNPROCESSABLE_ENTITY, format!("Invalid date: {value}")))
}

async fn list_counselors<B: SchedulingBackend>(
    State(state): State<AppState<B>>,
    Query(query): Query<CounselorListQuery>,
) -> Json<Vec<CounselorProfile>> {
    Json(state.profiles.counselors(query.college.as_deref()))
}

async fn get_availability_grid<B: SchedulingBackend>(
    State(state): State<AppState<B>>,
    Extension(principal): Extension<Principal>,
    Path((counselor_id, date)): Path<(i64, String)>,
) -> Result<Json<Vec<SlotView>>, (StatusCode, String)> {
    let date = parse_date(&date)?;
    // Students see never-materialized hours as open, matching the booking
    // default; counselors see their own unopened grid as closed.
    let baseline = principal.role == Role::Student;
    state
        .backend
        .list_slots_for_date(counselor_id, date, baseline)
        .map(Json)
        .map_err(api_error)
}

async fn get_appointments<B: SchedulingBackend>(
    State(state): State<AppState<B>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Appointment>>, (StatusCode, String)> {
    state
        .backend
        .appointments_for(principal)
        .map(Json)
        .map_err(api_error)
}

async fn book_appointment<B: SchedulingBackend>(
    State(state): State<AppState<B>>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<BookRequest>,
) -> Result<Json<Appointment>, (StatusCode, String)> {
    let request = validated(request)?;
    if principal.role != Role::Student {
        return Err((
            StatusCode::FORBIDDEN,
            "Only students can book appointments".to_string(),
        ));
    }
    let date = parse_date(&request.date)?;
    let program = request
        .program
        .filter(|p| !p.trim().is_empty())
        .or_else(|| state.profiles.student(principal.id).map(|p| p.program))
        .unwrap_or_else(|| "Not Specified".to_string());

    state
        .backend
        .book(principal.id, request.counselor_id, date, request.hour, program)
        .map(Json)
        .map_err(api_error)
}

async fn cancel_appointment<B: SchedulingBackend>(
    State(state): State<AppState<B>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, (StatusCode, String)> {
    state.backend.cancel(id, principal).map(Json).map_err(api_error)
}

async fn toggle_availability<B: SchedulingBackend>(
    State(state): State<AppState<B>>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<ToggleAvailabilityRequest>,
) -> Result<Json<SlotView>, (StatusCode, String)> {
    let request = validated(request)?;
    let date = parse_date(&request.date)?;
    // Grid-path slots materialize closed; the toggle below opens them.
    let slot = state
        .backend
        .get_or_create_slot(principal.id, date, request.hour, false)
        .map_err(api_error)?;
    let available = state
        .backend
        .toggle_slot(slot.id, principal.id)
        .map_err(api_error)?;
    Ok(Json(SlotView {
        slot_id: Some(slot.id),
        start_hour: request.hour,
        available,
    }))
}

async fn confirm_appointment<B: SchedulingBackend>(
    State(state): State<AppState<B>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, (StatusCode, String)> {
    state.backend.confirm(id, principal).map(Json).map_err(api_error)
}

async fn complete_appointment<B: SchedulingBackend>(
    State(state): State<AppState<B>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, (StatusCode, String)> {
    state.backend.complete(id, principal).map(Json).map_err(api_error)
}

async fn reschedule_appointment<B: SchedulingBackend>(
    State(state): State<AppState<B>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(request): Json<RescheduleRequest>,
) -> Result<Json<Appointment>, (StatusCode, String)> {
    let request = validated(request)?;
    let date = parse_date(&request.date)?;
    state
        .backend
        .reschedule(id, principal, date, request.hour)
        .map(Json)
        .map_err(api_error)
}
