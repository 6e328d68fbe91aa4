use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::{AppError, AppResult};
use crate::fleet::{
    derive_status, is_ongoing, trip_maintenance, trip_maintenance_cost, trip_profit, ManualStatus,
};
use crate::models::{HireOut, NewHireOut};
use crate::schema::{hire_outs, trucks};
use crate::state::AppState;
use crate::store;
use crate::utils::json::{classify_nullable, optional_text, required_text, NullableValue};
use crate::utils::money::checked_amount;
use crate::utils::time::{parse_timestamp, to_iso};

use super::maintenances::{maintenance_response, MaintenanceResponse};
use super::trucks::{truck_response, TruckResponse};

#[derive(Deserialize, Default)]
pub struct HireOutListQuery {
    pub truck_id: Option<Uuid>,
    pub ongoing: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateHireOutRequest {
    pub truck_id: Uuid,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub load_amount: Decimal,
    pub load_type: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub advance_payment: Option<Decimal>,
    pub payment_method: Option<String>,
    pub total_earnings: Decimal,
}

#[derive(Serialize)]
pub struct HireOutResponse {
    pub id: Uuid,
    pub truck_id: Uuid,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub ongoing: bool,
    pub load_amount: Decimal,
    pub load_type: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub advance_payment: Option<Decimal>,
    pub payment_method: Option<String>,
    pub total_earnings: Decimal,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct HireOutDetailResponse {
    pub hire_out: HireOutResponse,
    pub truck: TruckResponse,
    pub maintenances: Vec<MaintenanceResponse>,
    pub maintenance_cost: Decimal,
    pub profit: Decimal,
}

pub(crate) fn hire_out_response(trip: &HireOut, now: NaiveDateTime) -> HireOutResponse {
    HireOutResponse {
        id: trip.id,
        truck_id: trip.truck_id,
        customer_name: trip.customer_name.clone(),
        customer_phone: trip.customer_phone.clone(),
        customer_email: trip.customer_email.clone(),
        origin: trip.origin.clone(),
        destination: trip.destination.clone(),
        start_date: to_iso(trip.start_date),
        end_date: trip.end_date.map(to_iso),
        ongoing: is_ongoing(trip, now),
        load_amount: trip.load_amount,
        load_type: trip.load_type.clone(),
        driver_name: trip.driver_name.clone(),
        driver_phone: trip.driver_phone.clone(),
        advance_payment: trip.advance_payment,
        payment_method: trip.payment_method.clone(),
        total_earnings: trip.total_earnings,
        created_at: to_iso(trip.created_at),
        updated_at: to_iso(trip.updated_at),
    }
}

fn ensure_end_after_start(start: NaiveDateTime, end: Option<NaiveDateTime>) -> AppResult<()> {
    match end {
        Some(end) if end < start => Err(AppError::bad_request(
            "end_date must not be before start_date",
        )),
        _ => Ok(()),
    }
}

pub async fn list_hire_outs(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<HireOutListQuery>,
) -> AppResult<Json<Vec<HireOutResponse>>> {
    let hire_outs = store::hire_outs(&state).await?;
    let now = state.now();

    let response = hire_outs
        .iter()
        .filter(|trip| query.truck_id.map_or(true, |id| trip.truck_id == id))
        .filter(|trip| query.ongoing.map_or(true, |want| is_ongoing(trip, now) == want))
        .map(|trip| hire_out_response(trip, now))
        .collect();

    Ok(Json(response))
}

pub async fn create_hire_out(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateHireOutRequest>,
) -> AppResult<(StatusCode, Json<HireOutResponse>)> {
    let customer_name =
        required_text(&payload.customer_name, "customer_name").map_err(AppError::bad_request)?;
    let start_date = parse_timestamp(&payload.start_date).map_err(AppError::bad_request)?;
    let end_date = payload
        .end_date
        .as_deref()
        .map(parse_timestamp)
        .transpose()
        .map_err(AppError::bad_request)?;
    ensure_end_after_start(start_date, end_date)?;

    let load_amount =
        checked_amount(payload.load_amount, "load_amount").map_err(AppError::bad_request)?;
    let total_earnings =
        checked_amount(payload.total_earnings, "total_earnings").map_err(AppError::bad_request)?;
    let advance_payment = payload
        .advance_payment
        .map(|value| checked_amount(value, "advance_payment"))
        .transpose()
        .map_err(AppError::bad_request)?;

    let trip: HireOut = {
        let mut conn = state.db()?;

        let truck_exists = trucks::table
            .find(payload.truck_id)
            .select(trucks::id)
            .first::<Uuid>(&mut conn)
            .optional()?
            .is_some();
        if !truck_exists {
            return Err(AppError::bad_request("truck does not exist"));
        }

        let new_trip = NewHireOut {
            id: Uuid::new_v4(),
            truck_id: payload.truck_id,
            customer_name,
            customer_phone: optional_text(payload.customer_phone),
            customer_email: optional_text(payload.customer_email),
            origin: optional_text(payload.origin),
            destination: optional_text(payload.destination),
            start_date,
            end_date,
            load_amount,
            load_type: optional_text(payload.load_type),
            driver_name: optional_text(payload.driver_name),
            driver_phone: optional_text(payload.driver_phone),
            advance_payment,
            payment_method: optional_text(payload.payment_method),
            total_earnings,
        };

        diesel::insert_into(hire_outs::table)
            .values(&new_trip)
            .get_result(&mut conn)?
    };
    state.cache.hire_outs.invalidate().await;

    tracing::info!(
        hire_out_id = %trip.id,
        truck_id = %trip.truck_id,
        user_id = %user.user_id,
        "hire-out recorded"
    );

    Ok((StatusCode::CREATED, Json(hire_out_response(&trip, state.now()))))
}

pub async fn get_hire_out(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(hire_out_id): Path<Uuid>,
) -> AppResult<Json<HireOutDetailResponse>> {
    let hire_outs = store::hire_outs(&state).await?;
    let trip = store::find_hire_out(&hire_outs, hire_out_id).ok_or_else(AppError::not_found)?;
    let trucks = store::trucks(&state).await?;
    let truck = store::find_truck(&trucks, trip.truck_id).ok_or_else(AppError::not_found)?;
    let maintenances = store::maintenances(&state).await?;
    let now = state.now();

    let manual = ManualStatus::from_column(truck.manual_status.as_deref());
    let status = derive_status(truck.id, manual, hire_outs.iter(), now);

    Ok(Json(HireOutDetailResponse {
        hire_out: hire_out_response(trip, now),
        truck: truck_response(truck, status),
        maintenances: trip_maintenance(trip, &maintenances)
            .map(maintenance_response)
            .collect(),
        maintenance_cost: trip_maintenance_cost(trip, &maintenances),
        profit: trip_profit(trip, &maintenances),
    }))
}

/// `PATCH /api/hire-outs/:id` with `{"end_date": "<rfc3339>"}` or `{"end_date": null}` to
/// reopen the trip.
pub async fn update_hire_out(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(hire_out_id): Path<Uuid>,
    Json(body): Json<Value>,
) -> AppResult<Json<HireOutResponse>> {
    let end_date = match classify_nullable(body.get("end_date")).map_err(AppError::bad_request)? {
        NullableValue::Omitted => return Err(AppError::bad_request("end_date is required")),
        NullableValue::Null => None,
        NullableValue::String(raw) => Some(parse_timestamp(&raw).map_err(AppError::bad_request)?),
    };

    set_end_date(&state, &user, hire_out_id, end_date).await
}

/// Ends a trip now.
pub async fn end_hire_out(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(hire_out_id): Path<Uuid>,
) -> AppResult<Json<HireOutResponse>> {
    let now = state.now();
    {
        let mut conn = state.db()?;
        let trip: HireOut = hire_outs::table.find(hire_out_id).first(&mut conn)?;
        if !is_ongoing(&trip, now) {
            return Err(AppError::bad_request("trip has already ended"));
        }
        if trip.start_date > now {
            return Err(AppError::bad_request("trip has not started yet"));
        }
    }

    set_end_date(&state, &user, hire_out_id, Some(now)).await
}

async fn set_end_date(
    state: &AppState,
    user: &AuthenticatedUser,
    hire_out_id: Uuid,
    end_date: Option<NaiveDateTime>,
) -> AppResult<Json<HireOutResponse>> {
    let trip: HireOut = {
        let mut conn = state.db()?;
        let existing: HireOut = hire_outs::table.find(hire_out_id).first(&mut conn)?;
        ensure_end_after_start(existing.start_date, end_date)?;

        diesel::update(hire_outs::table.find(hire_out_id))
            .set((
                hire_outs::end_date.eq(end_date),
                hire_outs::updated_at.eq(state.now()),
            ))
            .get_result(&mut conn)?
    };
    state.cache.hire_outs.invalidate().await;

    tracing::info!(
        hire_out_id = %trip.id,
        ended = trip.end_date.is_some(),
        user_id = %user.user_id,
        "hire-out end date updated"
    );

    Ok(Json(hire_out_response(&trip, state.now())))
}
