use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::{AppError, AppResult};
use crate::fleet::{maintenance_summary, MaintenanceSummary};
use crate::models::{Maintenance, NewMaintenance};
use crate::schema::{hire_outs, maintenances, trucks};
use crate::state::AppState;
use crate::store;
use crate::utils::json::{optional_text, required_text};
use crate::utils::money::checked_amount;
use crate::utils::time::{parse_timestamp, to_iso};

#[derive(Deserialize, Default)]
pub struct MaintenanceListQuery {
    pub truck_id: Option<Uuid>,
    pub hire_out_id: Option<Uuid>,
    /// `true` keeps only rows with no trip attached, `false` only trip-linked rows.
    pub general: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateMaintenanceRequest {
    pub truck_id: Uuid,
    pub hire_out_id: Option<Uuid>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub maintenance_type: String,
    pub cost: Decimal,
    pub date: Option<String>,
    pub details: Option<String>,
}

#[derive(Serialize)]
pub struct MaintenanceResponse {
    pub id: Uuid,
    pub truck_id: Uuid,
    pub hire_out_id: Option<Uuid>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub maintenance_type: String,
    pub cost: Decimal,
    pub date: String,
    pub details: Option<String>,
    pub created_at: String,
}

pub(crate) fn maintenance_response(row: &Maintenance) -> MaintenanceResponse {
    MaintenanceResponse {
        id: row.id,
        truck_id: row.truck_id,
        hire_out_id: row.hire_out_id,
        name: row.name.clone(),
        maintenance_type: row.maintenance_type.clone(),
        cost: row.cost,
        date: to_iso(row.date),
        details: row.details.clone(),
        created_at: to_iso(row.created_at),
    }
}

impl MaintenanceListQuery {
    fn matches(&self, row: &Maintenance) -> bool {
        self.truck_id.map_or(true, |id| row.truck_id == id)
            && self.hire_out_id.map_or(true, |id| row.hire_out_id == Some(id))
            && self
                .general
                .map_or(true, |general| row.hire_out_id.is_none() == general)
    }
}

pub async fn list_maintenances(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<MaintenanceListQuery>,
) -> AppResult<Json<Vec<MaintenanceResponse>>> {
    let rows = store::maintenances(&state).await?;

    let response = rows
        .iter()
        .filter(|m| query.matches(m))
        .map(maintenance_response)
        .collect();

    Ok(Json(response))
}

/// Count, total and average cost over the rows the list filters select.
pub async fn maintenance_stats(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<MaintenanceListQuery>,
) -> AppResult<Json<MaintenanceSummary>> {
    let rows = store::maintenances(&state).await?;
    Ok(Json(maintenance_summary(
        rows.iter().filter(|m| query.matches(m)),
    )))
}

pub async fn create_maintenance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateMaintenanceRequest>,
) -> AppResult<(StatusCode, Json<MaintenanceResponse>)> {
    let maintenance_type =
        required_text(&payload.maintenance_type, "type").map_err(AppError::bad_request)?;
    let cost = checked_amount(payload.cost, "cost").map_err(AppError::bad_request)?;
    let date = match payload.date.as_deref() {
        Some(raw) => parse_timestamp(raw).map_err(AppError::bad_request)?,
        None => state.now(),
    };

    let row: Maintenance = {
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

        // a trip link must stay on the same truck
        if let Some(hire_out_id) = payload.hire_out_id {
            let trip_truck: Option<Uuid> = hire_outs::table
                .find(hire_out_id)
                .select(hire_outs::truck_id)
                .first(&mut conn)
                .optional()?;
            match trip_truck {
                None => return Err(AppError::bad_request("hire-out does not exist")),
                Some(truck_id) if truck_id != payload.truck_id => {
                    return Err(AppError::bad_request(
                        "hire-out belongs to a different truck",
                    ))
                }
                Some(_) => {}
            }
        }

        let new_row = NewMaintenance {
            id: Uuid::new_v4(),
            truck_id: payload.truck_id,
            hire_out_id: payload.hire_out_id,
            name: optional_text(payload.name),
            maintenance_type,
            cost,
            date,
            details: optional_text(payload.details),
        };

        diesel::insert_into(maintenances::table)
            .values(&new_row)
            .get_result(&mut conn)?
    };
    state.cache.maintenances.invalidate().await;

    tracing::info!(
        maintenance_id = %row.id,
        truck_id = %row.truck_id,
        hire_out_id = ?row.hire_out_id,
        user_id = %user.user_id,
        "maintenance recorded"
    );

    Ok((StatusCode::CREATED, Json(maintenance_response(&row))))
}
