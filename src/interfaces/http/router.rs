//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::ReservationService;

use super::common::ErrorResponse;
use super::modules::health::{self, HealthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::request_id::request_id_middleware;
use super::modules::reservations::{self, ReservationAppState};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("HS256 token carrying a user_id claim"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        reservations::create_reservation,
        reservations::create_reservation_closest,
        reservations::list_reservations,
        reservations::filter_reservations,
        reservations::get_reservation,
        reservations::update_reservation,
        reservations::delete_reservation,
    ),
    components(
        schemas(
            ErrorResponse,
            health::HealthResponse,
            health::ComponentHealth,
            reservations::CreateReservationRequest,
            reservations::ReservationClosestRequest,
            reservations::LocationDto,
            reservations::UpdateReservationRequest,
            reservations::ReservationDto,
            reservations::StatusResponse,
            reservations::ReservationsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database reachability"),
        (name = "Reservations", description = "Charging slot reservations, explicit or at the nearest charger"),
    ),
    info(
        title = "EV Charging Reservations API",
        version = "1.0.0",
        description = "Reserve charging slots on a specific charger or on the charger closest to a location",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the full HTTP surface. `/metrics` is mounted only when a
/// Prometheus recorder has been installed.
pub fn create_api_router(
    service: Arc<ReservationService>,
    db: Option<DatabaseConnection>,
    metrics_handle: Option<PrometheusHandle>,
) -> Router {
    let reservation_routes = Router::new()
        .route(
            "/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route("/reservations/", get(reservations::filter_reservations))
        .route("/reservations/closest", post(reservations::create_reservation_closest))
        .route(
            "/reservations/{id}",
            get(reservations::get_reservation)
                .put(reservations::update_reservation)
                .delete(reservations::delete_reservation),
        )
        .with_state(ReservationAppState { service });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(HealthState {
            db,
            started_at: Arc::new(Instant::now()),
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(health_routes)
        .merge(reservation_routes);

    if let Some(handle) = metrics_handle {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
