use axum::http::HeaderValue;
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{auth::AuthenticatedUser, state::AppState};

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod hire_outs;
pub mod maintenances;
pub mod reports;
pub mod transactions;
pub mod trucks;

fn cors_layer(allowed: Option<&str>) -> CorsLayer {
    let allow_origin = match allowed {
        Some(origins) => {
            let headers: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .filter_map(|value| match value.parse::<HeaderValue>() {
                    Ok(header) => Some(header),
                    Err(_) => {
                        tracing::warn!(origin = %value, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(headers)
        }
        None => AllowOrigin::mirror_request(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn create_router(state: AppState) -> Router<()> {
    let cors = cors_layer(state.config.cors_allowed_origin.as_deref());

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    let trucks_routes = Router::new()
        .route("/", get(trucks::list_trucks).post(trucks::create_truck))
        .route("/:id", get(trucks::get_truck))
        .route("/:id/status", patch(trucks::update_truck_status));

    let hire_outs_routes = Router::new()
        .route(
            "/",
            get(hire_outs::list_hire_outs).post(hire_outs::create_hire_out),
        )
        .route(
            "/:id",
            get(hire_outs::get_hire_out).patch(hire_outs::update_hire_out),
        )
        .route("/:id/end", post(hire_outs::end_hire_out));

    let maintenances_routes = Router::new()
        .route(
            "/",
            get(maintenances::list_maintenances).post(maintenances::create_maintenance),
        )
        .route("/summary", get(maintenances::maintenance_stats));

    let transactions_routes = Router::new()
        .route(
            "/",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route("/summary", get(transactions::transaction_summary));

    let reports_routes = Router::new()
        .route("/fleet", get(reports::get_fleet_report))
        .route("/fleet/download", get(reports::download_fleet_report))
        .route("/trucks/:id", get(reports::get_truck_report))
        .route("/trucks/:id/download", get(reports::download_truck_report))
        .route("/trips/:id", get(reports::get_trip_report))
        .route("/trips/:id/download", get(reports::download_trip_report));

    let protected_state = state.clone();
    let protected_routes = Router::new()
        .nest("/api/trucks", trucks_routes)
        .nest("/api/hire-outs", hire_outs_routes)
        .nest("/api/maintenances", maintenances_routes)
        .nest("/api/transactions", transactions_routes)
        .nest("/api/reports", reports_routes)
        .route("/api/dashboard", get(dashboard::dashboard))
        .layer(middleware::from_extractor_with_state::<AuthenticatedUser, _>(protected_state));

    Router::new()
        .merge(protected_routes)
        .nest("/api/auth", auth_routes)
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
