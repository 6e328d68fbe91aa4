use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::error::AppResult;
use crate::fleet::{fleet_overview, truck_statuses, FleetOverview};
use crate::state::AppState;
use crate::store;

use super::trucks::{truck_response, TruckResponse};

#[derive(Serialize)]
pub struct DashboardResponse {
    pub totals: FleetOverview,
    pub available_trucks: Vec<TruckResponse>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<Json<DashboardResponse>> {
    let trucks = store::trucks(&state).await?;
    let hire_outs = store::hire_outs(&state).await?;
    let maintenances = store::maintenances(&state).await?;
    let transactions = store::transactions(&state).await?;
    let now = state.now();

    let totals = fleet_overview(&trucks, &hire_outs, &maintenances, &transactions, now);
    let available_trucks = truck_statuses(&trucks, &hire_outs, now)
        .filter(|(_, status)| status.is_available())
        .map(|(truck, status)| truck_response(truck, status))
        .collect();

    Ok(Json(DashboardResponse {
        totals,
        available_trucks,
    }))
}
