//! List queries and their cached accessors.
//!
//! Reads of whole lists go through the per-list cache on `AppState`; writes call the matching
//! `invalidate_*` before they return so the next read sees them.

use std::sync::Arc;

use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::error::AppResult;
use crate::models::{HireOut, Maintenance, Transaction, Truck};
use crate::schema::{hire_outs, maintenances, transactions, trucks};
use crate::state::AppState;

pub fn load_trucks(conn: &mut PgConnection) -> QueryResult<Vec<Truck>> {
    trucks::table
        .order((trucks::created_at.desc(), trucks::id.asc()))
        .load(conn)
}

pub fn load_hire_outs(conn: &mut PgConnection) -> QueryResult<Vec<HireOut>> {
    hire_outs::table
        .order((hire_outs::created_at.desc(), hire_outs::id.asc()))
        .load(conn)
}

pub fn load_maintenances(conn: &mut PgConnection) -> QueryResult<Vec<Maintenance>> {
    maintenances::table
        .order((maintenances::created_at.desc(), maintenances::id.asc()))
        .load(conn)
}

pub fn load_transactions(conn: &mut PgConnection) -> QueryResult<Vec<Transaction>> {
    transactions::table
        .order((transactions::created_at.desc(), transactions::id.asc()))
        .load(conn)
}

pub async fn trucks(state: &AppState) -> AppResult<Arc<Vec<Truck>>> {
    state
        .cache
        .trucks
        .get_or_load(|| {
            let mut conn = state.db()?;
            Ok(load_trucks(&mut conn)?)
        })
        .await
}

pub async fn hire_outs(state: &AppState) -> AppResult<Arc<Vec<HireOut>>> {
    state
        .cache
        .hire_outs
        .get_or_load(|| {
            let mut conn = state.db()?;
            Ok(load_hire_outs(&mut conn)?)
        })
        .await
}

pub async fn maintenances(state: &AppState) -> AppResult<Arc<Vec<Maintenance>>> {
    state
        .cache
        .maintenances
        .get_or_load(|| {
            let mut conn = state.db()?;
            Ok(load_maintenances(&mut conn)?)
        })
        .await
}

pub async fn transactions(state: &AppState) -> AppResult<Arc<Vec<Transaction>>> {
    state
        .cache
        .transactions
        .get_or_load(|| {
            let mut conn = state.db()?;
            Ok(load_transactions(&mut conn)?)
        })
        .await
}

pub fn find_truck(trucks: &[Truck], id: uuid::Uuid) -> Option<&Truck> {
    trucks.iter().find(|truck| truck.id == id)
}

pub fn find_hire_out(hire_outs: &[HireOut], id: uuid::Uuid) -> Option<&HireOut> {
    hire_outs.iter().find(|trip| trip.id == id)
}
