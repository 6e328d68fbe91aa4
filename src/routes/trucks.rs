use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::{AppError, AppResult};
use crate::fleet::{
    derive_status, parse_status_filter, trip_maintenance_cost, trip_profit, truck_financials,
    truck_statuses, ManualStatus, StatusChange, TruckFinancials, TruckStatus,
};
use crate::models::{NewTruck, Truck};
use crate::schema::trucks;
use crate::state::AppState;
use crate::store;
use crate::utils::json::{optional_text, required_text};
use crate::utils::money::checked_amount;
use crate::utils::time::to_iso;

use super::hire_outs::{hire_out_response, HireOutResponse};
use super::maintenances::{maintenance_response, MaintenanceResponse};

#[derive(Deserialize)]
pub struct CreateTruckRequest {
    pub name: String,
    pub plate: String,
    pub capacity: Decimal,
    pub status: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub vin: Option<String>,
    pub owner: Option<String>,
    pub owner_phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct TruckListQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Serialize)]
pub struct TruckResponse {
    pub id: Uuid,
    pub name: String,
    pub plate: String,
    pub capacity: Decimal,
    #[serde(flatten)]
    pub status: TruckStatus,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub vin: Option<String>,
    pub owner: Option<String>,
    pub owner_phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct TripSummary {
    #[serde(flatten)]
    pub trip: HireOutResponse,
    pub maintenance_cost: Decimal,
    pub profit: Decimal,
}

#[derive(Serialize)]
pub struct TruckDetailResponse {
    pub truck: TruckResponse,
    pub trips: Vec<TripSummary>,
    pub maintenances: Vec<MaintenanceResponse>,
    pub totals: TruckFinancials,
}

pub(crate) fn truck_response(truck: &Truck, status: TruckStatus) -> TruckResponse {
    TruckResponse {
        id: truck.id,
        name: truck.name.clone(),
        plate: truck.plate.clone(),
        capacity: truck.capacity,
        status,
        make: truck.make.clone(),
        model: truck.model.clone(),
        year: truck.year,
        color: truck.color.clone(),
        vin: truck.vin.clone(),
        owner: truck.owner.clone(),
        owner_phone: truck.owner_phone.clone(),
        notes: truck.notes.clone(),
        created_at: to_iso(truck.created_at),
        updated_at: to_iso(truck.updated_at),
    }
}

pub async fn list_trucks(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<TruckListQuery>,
) -> AppResult<Json<Vec<TruckResponse>>> {
    let wanted = query
        .status
        .as_deref()
        .map(parse_status_filter)
        .transpose()
        .map_err(|err| AppError::bad_request(err.to_string()))?
        .flatten();

    let trucks = store::trucks(&state).await?;
    let hire_outs = store::hire_outs(&state).await?;
    let now = state.now();

    let response = truck_statuses(&trucks, &hire_outs, now)
        .filter(|(_, status)| wanted.map_or(true, |name| status.as_str() == name))
        .map(|(truck, status)| truck_response(truck, status))
        .collect();

    Ok(Json(response))
}

pub async fn create_truck(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateTruckRequest>,
) -> AppResult<(StatusCode, Json<TruckResponse>)> {
    user.require_admin()?;

    let name = required_text(&payload.name, "name").map_err(AppError::bad_request)?;
    let plate = required_text(&payload.plate, "plate").map_err(AppError::bad_request)?;
    let capacity = checked_amount(payload.capacity, "capacity").map_err(AppError::bad_request)?;
    let initial = match payload.status.as_deref() {
        None => StatusChange::Clear,
        Some(raw) => raw
            .parse::<StatusChange>()
            .map_err(|err| AppError::bad_request(err.to_string()))?,
    };

    let new_truck = NewTruck {
        id: Uuid::new_v4(),
        name,
        plate,
        capacity,
        manual_status: initial.column_value().map(str::to_string),
        make: optional_text(payload.make),
        model: optional_text(payload.model),
        year: payload.year,
        color: optional_text(payload.color),
        vin: optional_text(payload.vin),
        owner: optional_text(payload.owner),
        owner_phone: optional_text(payload.owner_phone),
        notes: optional_text(payload.notes),
    };

    let truck: Truck = {
        let mut conn = state.db()?;
        diesel::insert_into(trucks::table)
            .values(&new_truck)
            .get_result(&mut conn)?
    };
    state.cache.trucks.invalidate().await;

    tracing::info!(truck_id = %truck.id, plate = %truck.plate, user_id = %user.user_id, "truck registered");

    let status = match ManualStatus::from_column(truck.manual_status.as_deref()) {
        Some(ManualStatus::Maintenance) => TruckStatus::Maintenance,
        Some(ManualStatus::Retired) => TruckStatus::Retired,
        None => TruckStatus::Available,
    };
    Ok((StatusCode::CREATED, Json(truck_response(&truck, status))))
}

pub async fn get_truck(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(truck_id): Path<Uuid>,
) -> AppResult<Json<TruckDetailResponse>> {
    let trucks = store::trucks(&state).await?;
    let truck = store::find_truck(&trucks, truck_id).ok_or_else(AppError::not_found)?;
    let hire_outs = store::hire_outs(&state).await?;
    let maintenances = store::maintenances(&state).await?;
    let now = state.now();

    let manual = ManualStatus::from_column(truck.manual_status.as_deref());
    let status = derive_status(truck.id, manual, hire_outs.iter(), now);

    let trips = hire_outs
        .iter()
        .filter(|trip| trip.truck_id == truck.id)
        .map(|trip| TripSummary {
            trip: hire_out_response(trip, now),
            maintenance_cost: trip_maintenance_cost(trip, &maintenances),
            profit: trip_profit(trip, &maintenances),
        })
        .collect();

    let truck_maintenances = maintenances
        .iter()
        .filter(|m| m.truck_id == truck.id)
        .map(maintenance_response)
        .collect();

    Ok(Json(TruckDetailResponse {
        truck: truck_response(truck, status),
        trips,
        maintenances: truck_maintenances,
        totals: truck_financials(truck.id, &hire_outs, &maintenances),
    }))
}

pub async fn update_truck_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(truck_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<TruckResponse>> {
    user.require_admin()?;

    let change = payload
        .status
        .parse::<StatusChange>()
        .map_err(|err| AppError::bad_request(err.to_string()))?;

    let truck: Truck = {
        let mut conn = state.db()?;
        diesel::update(trucks::table.find(truck_id))
            .set((
                trucks::manual_status.eq(change.column_value()),
                trucks::updated_at.eq(state.now()),
            ))
            .get_result(&mut conn)?
    };
    state.cache.trucks.invalidate().await;

    tracing::info!(
        truck_id = %truck.id,
        status = change.column_value().unwrap_or("derived"),
        user_id = %user.user_id,
        "truck status changed"
    );

    let hire_outs = store::hire_outs(&state).await?;
    let manual = ManualStatus::from_column(truck.manual_status.as_deref());
    let status = derive_status(truck.id, manual, hire_outs.iter(), state.now());
    Ok(Json(truck_response(&truck, status)))
}
