use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::{AppError, AppResult};
use crate::export::{
    build_fleet_report, build_trip_ledger, build_truck_statement, content_disposition,
    fleet_file_name, trip_file_name, truck_file_name, FleetReport, ReportFormat, TripLedger,
};
use crate::fleet::{
    derive_status, trip_maintenance_cost, trip_profit, truck_financials, ManualStatus,
    TruckFinancials, TruckStatus,
};
use crate::state::AppState;
use crate::store;

use super::hire_outs::hire_out_response;
use super::trucks::TripSummary;

#[derive(Serialize)]
pub struct TruckReport {
    pub generated_on: NaiveDate,
    pub truck_id: Uuid,
    pub name: String,
    pub plate: String,
    #[serde(flatten)]
    pub status: TruckStatus,
    pub financials: TruckFinancials,
    pub trips: Vec<TripSummary>,
}

#[derive(Deserialize, Default)]
pub struct DownloadQuery {
    #[serde(default)]
    pub format: ReportFormat,
}

async fn fleet_report(state: &AppState) -> AppResult<FleetReport> {
    let trucks = store::trucks(state).await?;
    let hire_outs = store::hire_outs(state).await?;
    let maintenances = store::maintenances(state).await?;
    Ok(build_fleet_report(
        &trucks,
        &hire_outs,
        &maintenances,
        state.now().date(),
    ))
}

async fn trip_ledger(state: &AppState, hire_out_id: Uuid) -> AppResult<TripLedger> {
    let hire_outs = store::hire_outs(state).await?;
    let trip = store::find_hire_out(&hire_outs, hire_out_id).ok_or_else(AppError::not_found)?;
    let trucks = store::trucks(state).await?;
    let truck = store::find_truck(&trucks, trip.truck_id).ok_or_else(AppError::not_found)?;
    let maintenances = store::maintenances(state).await?;
    Ok(build_trip_ledger(truck, trip, &maintenances, state.now().date()))
}

fn attachment(content_type: &str, file_name: &str, body: Vec<u8>) -> AppResult<impl IntoResponse> {
    let content_type = HeaderValue::from_str(content_type).map_err(AppError::internal)?;
    let disposition =
        HeaderValue::from_str(&content_disposition(file_name)).map_err(AppError::internal)?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

pub async fn get_fleet_report(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<Json<FleetReport>> {
    Ok(Json(fleet_report(&state).await?))
}

pub async fn download_fleet_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<DownloadQuery>,
) -> AppResult<impl IntoResponse> {
    let report = fleet_report(&state).await?;
    let renderer = query.format.renderer();
    let body = renderer.render_fleet(&report)?;
    let file_name = fleet_file_name(report.generated_on, renderer.extension());

    tracing::info!(user_id = %user.user_id, file_name = %file_name, "fleet report exported");
    attachment(renderer.content_type(), &file_name, body)
}

pub async fn get_truck_report(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(truck_id): Path<Uuid>,
) -> AppResult<Json<TruckReport>> {
    let trucks = store::trucks(&state).await?;
    let truck = store::find_truck(&trucks, truck_id).ok_or_else(AppError::not_found)?;
    let hire_outs = store::hire_outs(&state).await?;
    let maintenances = store::maintenances(&state).await?;
    let now = state.now();

    let manual = ManualStatus::from_column(truck.manual_status.as_deref());
    let mut trips: Vec<TripSummary> = hire_outs
        .iter()
        .filter(|trip| trip.truck_id == truck.id)
        .map(|trip| TripSummary {
            trip: hire_out_response(trip, now),
            maintenance_cost: trip_maintenance_cost(trip, &maintenances),
            profit: trip_profit(trip, &maintenances),
        })
        .collect();
    // RFC 3339 strings in UTC sort chronologically
    trips.sort_by(|a, b| a.trip.start_date.cmp(&b.trip.start_date));

    Ok(Json(TruckReport {
        generated_on: now.date(),
        truck_id: truck.id,
        name: truck.name.clone(),
        plate: truck.plate.clone(),
        status: derive_status(truck.id, manual, hire_outs.iter(), now),
        financials: truck_financials(truck.id, &hire_outs, &maintenances),
        trips,
    }))
}

pub async fn download_truck_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(truck_id): Path<Uuid>,
    Query(query): Query<DownloadQuery>,
) -> AppResult<impl IntoResponse> {
    let trucks = store::trucks(&state).await?;
    let truck = store::find_truck(&trucks, truck_id).ok_or_else(AppError::not_found)?;
    let hire_outs = store::hire_outs(&state).await?;
    let maintenances = store::maintenances(&state).await?;
    let statement = build_truck_statement(truck, &hire_outs, &maintenances, state.now().date());

    let renderer = query.format.renderer();
    let body = renderer.render_truck(&statement)?;
    let file_name = truck_file_name(&statement.name, statement.generated_on, renderer.extension());

    tracing::info!(
        user_id = %user.user_id,
        truck_id = %truck_id,
        file_name = %file_name,
        "truck report exported"
    );
    attachment(renderer.content_type(), &file_name, body)
}

pub async fn get_trip_report(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(hire_out_id): Path<Uuid>,
) -> AppResult<Json<TripLedger>> {
    Ok(Json(trip_ledger(&state, hire_out_id).await?))
}

pub async fn download_trip_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(hire_out_id): Path<Uuid>,
    Query(query): Query<DownloadQuery>,
) -> AppResult<impl IntoResponse> {
    let ledger = trip_ledger(&state, hire_out_id).await?;
    let renderer = query.format.renderer();
    let body = renderer.render_trip(&ledger)?;
    let file_name = trip_file_name(
        &ledger.truck_name,
        &ledger.customer_name,
        ledger.generated_on,
        renderer.extension(),
    );

    tracing::info!(
        user_id = %user.user_id,
        hire_out_id = %hire_out_id,
        file_name = %file_name,
        "trip report exported"
    );
    attachment(renderer.content_type(), &file_name, body)
}
