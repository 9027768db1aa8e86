//! Reservation HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;

use crate::application::{ReservationOutcome, ReservationService};
use crate::interfaces::http::common::{ApiError, ErrorResponse, ValidatedJson};

use super::dto::*;

/// Application state for reservation handlers.
#[derive(Clone)]
pub struct ReservationAppState {
    pub service: Arc<ReservationService>,
}

/// The `Authorization` header wins over a `userToken` body field.
fn credential<'a>(headers: &'a HeaderMap, body_token: Option<&'a str>) -> &'a str {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .or(body_token)
        .unwrap_or_default()
}

fn outcome_response(outcome: ReservationOutcome) -> StatusResponse {
    StatusResponse {
        status: outcome.status().to_string(),
        reservation: outcome.into_reservation().map(ReservationDto::from),
    }
}

#[utoipa::path(
    post,
    path = "/reservations",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    request_body = CreateReservationRequest,
    responses(
        (status = 200, description = "Reservation created, or authorization failed", body = StatusResponse),
        (status = 400, description = "Malformed JSON or identifier", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn create_reservation(
    State(state): State<ReservationAppState>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<CreateReservationRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let credential = credential(&headers, request.user_token.as_deref());
    let outcome = state
        .service
        .create_reservation(&request.from, &request.to, credential, &request.charger_id)
        .await?;
    Ok(Json(outcome_response(outcome)))
}

#[utoipa::path(
    post,
    path = "/reservations/closest",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    request_body = ReservationClosestRequest,
    responses(
        (status = 200, description = "Nearest charger reserved, or authorization failed", body = StatusResponse),
        (status = 422, description = "Validation failed or no charger available", body = ErrorResponse),
        (status = 502, description = "Charger directory unavailable", body = ErrorResponse),
        (status = 504, description = "Charger directory timed out", body = ErrorResponse)
    )
)]
pub async fn create_reservation_closest(
    State(state): State<ReservationAppState>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<ReservationClosestRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let credential = credential(&headers, request.user_token.as_deref());
    let outcome = state
        .service
        .create_reservation_at_nearest(credential, &request.from, &request.to, (&request.location).into())
        .await?;
    Ok(Json(outcome_response(outcome)))
}

#[utoipa::path(
    get,
    path = "/reservations",
    tag = "Reservations",
    responses(
        (status = 200, description = "All reservations", body = ReservationsResponse),
        (status = 504, description = "Store timed out", body = ErrorResponse)
    )
)]
pub async fn list_reservations(
    State(state): State<ReservationAppState>,
) -> Result<Json<ReservationsResponse>, ApiError> {
    let reservations = state.service.get_reservations().await?;
    Ok(Json(reservations.into()))
}

#[utoipa::path(
    get,
    path = "/reservations/",
    tag = "Reservations",
    params(FilterParams),
    responses(
        (status = 200, description = "Reservations matching the filter", body = ReservationsResponse),
        (status = 400, description = "Malformed charger or user id", body = ErrorResponse)
    )
)]
pub async fn filter_reservations(
    State(state): State<ReservationAppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<ReservationsResponse>, ApiError> {
    let reservations = state
        .service
        .get_reservations_filter(params.charger.as_deref(), params.user.as_deref())
        .await?;
    Ok(Json(reservations.into()))
}

#[utoipa::path(
    get,
    path = "/reservations/{id}",
    tag = "Reservations",
    params(("id" = String, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation", body = ReservationDto),
        (status = 404, description = "Reservation not found", body = ErrorResponse)
    )
)]
pub async fn get_reservation(
    State(state): State<ReservationAppState>,
    Path(id): Path<String>,
) -> Result<Json<ReservationDto>, ApiError> {
    let reservation = state.service.get_reservation(&id).await?;
    Ok(Json(reservation.into()))
}

#[utoipa::path(
    put,
    path = "/reservations/{id}",
    tag = "Reservations",
    params(("id" = String, Path, description = "Reservation id")),
    request_body = UpdateReservationRequest,
    responses(
        (status = 200, description = "Reservation rescheduled", body = StatusResponse),
        (status = 404, description = "Reservation not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn update_reservation(
    State(state): State<ReservationAppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateReservationRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state
        .service
        .update_reservation(&id, &request.from, &request.to)
        .await?;
    Ok(Json(StatusResponse::status(status)))
}

#[utoipa::path(
    delete,
    path = "/reservations/{id}",
    tag = "Reservations",
    params(("id" = String, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation deleted", body = StatusResponse),
        (status = 404, description = "Reservation not found", body = ErrorResponse)
    )
)]
pub async fn delete_reservation(
    State(state): State<ReservationAppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state.service.delete_reservation(&id).await?;
    Ok(Json(StatusResponse::status(status)))
}
