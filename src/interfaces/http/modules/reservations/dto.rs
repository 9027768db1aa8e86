//! Reservation DTOs

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::domain::{Location, Reservation};

/// Rejects time-window boundaries that are not RFC3339.
fn validate_rfc3339(value: &str) -> Result<(), ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|_| {
            let mut err = ValidationError::new("rfc3339");
            err.message = Some("must be an RFC3339 timestamp".into());
            err
        })
}

/// Reserve a specific charger
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReservationRequest {
    #[serde(rename = "chargerID")]
    #[validate(length(min = 1, message = "chargerID is required"))]
    pub charger_id: String,
    /// Start of the slot (RFC3339)
    #[validate(custom(function = "validate_rfc3339"))]
    pub from: String,
    /// End of the slot (RFC3339)
    #[validate(custom(function = "validate_rfc3339"))]
    pub to: String,
    /// Credential used when no `Authorization` header is sent
    #[serde(rename = "userToken")]
    pub user_token: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LocationDto {
    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be within ±180"))]
    pub longitude: f64,
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be within ±90"))]
    pub latitude: f64,
}

impl From<&LocationDto> for Location {
    fn from(dto: &LocationDto) -> Self {
        Location::new(dto.latitude, dto.longitude)
    }
}

/// Reserve whichever charger is closest to `location`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReservationClosestRequest {
    #[validate(custom(function = "validate_rfc3339"))]
    pub from: String,
    #[validate(custom(function = "validate_rfc3339"))]
    pub to: String,
    #[validate(nested)]
    pub location: LocationDto,
    #[serde(rename = "userToken")]
    pub user_token: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReservationRequest {
    #[validate(custom(function = "validate_rfc3339"))]
    pub from: String,
    #[validate(custom(function = "validate_rfc3339"))]
    pub to: String,
}

/// Query for `GET /reservations/`. Empty values are ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilterParams {
    /// Charger id (24 hex characters)
    pub charger: Option<String>,
    /// User id (24 hex characters)
    pub user: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationDto {
    pub id: String,
    #[serde(rename = "chargerID")]
    pub charger_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub from: String,
    pub to: String,
    pub created: String,
    pub modified: String,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id.to_hex(),
            charger_id: r.charger_id.to_hex(),
            user_id: r.user_id.to_hex(),
            from: r.from,
            to: r.to,
            created: r.created,
            modified: r.modified,
        }
    }
}

/// `"Ok"` or `"Authorization failed"`; `reservation` only on creation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation: Option<ReservationDto>,
}

impl StatusResponse {
    pub fn status(status: &str) -> Self {
        Self {
            status: status.to_string(),
            reservation: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReservationsResponse {
    pub reservations: Vec<ReservationDto>,
}

impl From<Vec<Reservation>> for ReservationsResponse {
    fn from(reservations: Vec<Reservation>) -> Self {
        Self {
            reservations: reservations.into_iter().map(ReservationDto::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_boundaries_are_enforced() {
        let ok = UpdateReservationRequest {
            from: "2024-05-01T10:00:00Z".into(),
            to: "2024-05-01T11:00:00+02:00".into(),
        };
        assert!(ok.validate().is_ok());

        let bad = UpdateReservationRequest {
            from: "tomorrow".into(),
            to: "2024-05-01T11:00:00Z".into(),
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("from"));
    }

    #[test]
    fn location_ranges_are_checked() {
        let req: ReservationClosestRequest = serde_json::from_value(serde_json::json!({
            "from": "2024-05-01T10:00:00Z",
            "to": "2024-05-01T11:00:00Z",
            "location": {"longitude": -3.0, "latitude": 95.0}
        }))
        .unwrap();
        assert!(req.validate().is_err());
        assert!(req.user_token.is_none());
    }

    #[test]
    fn create_request_uses_wire_names() {
        let req: CreateReservationRequest = serde_json::from_value(serde_json::json!({
            "chargerID": "aaaaaaaaaaaaaaaaaaaaaaaa",
            "from": "2024-05-01T10:00:00Z",
            "to": "2024-05-01T11:00:00Z",
            "userToken": "Bearer abc"
        }))
        .unwrap();
        assert_eq!(req.charger_id, "aaaaaaaaaaaaaaaaaaaaaaaa");
        assert_eq!(req.user_token.as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn status_without_reservation_omits_the_field() {
        let body = serde_json::to_value(StatusResponse::status("Ok")).unwrap();
        assert_eq!(body, serde_json::json!({"status": "Ok"}));
    }
}
