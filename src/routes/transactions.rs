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
use crate::fleet::{cash_summary, CashSummary, TransactionKind};
use crate::models::{NewTransaction, Transaction};
use crate::schema::transactions;
use crate::state::AppState;
use crate::store;
use crate::utils::json::optional_text;
use crate::utils::money::checked_amount;
use crate::utils::time::{parse_timestamp, to_iso};

#[derive(Deserialize, Default)]
pub struct TransactionListQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: String,
    pub created_at: String,
}

fn transaction_response(tx: &Transaction) -> TransactionResponse {
    TransactionResponse {
        id: tx.id,
        kind: tx.kind.clone(),
        amount: tx.amount,
        description: tx.description.clone(),
        category: tx.category.clone(),
        date: to_iso(tx.date),
        created_at: to_iso(tx.created_at),
    }
}

pub async fn list_transactions(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<TransactionListQuery>,
) -> AppResult<Json<Vec<TransactionResponse>>> {
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<TransactionKind>)
        .transpose()
        .map_err(AppError::bad_request)?;

    let rows = store::transactions(&state).await?;
    let response = rows
        .iter()
        .filter(|tx| kind.map_or(true, |kind| tx.kind == kind.as_str()))
        .map(transaction_response)
        .collect();

    Ok(Json(response))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateTransactionRequest>,
) -> AppResult<(StatusCode, Json<TransactionResponse>)> {
    let kind = payload
        .kind
        .parse::<TransactionKind>()
        .map_err(AppError::bad_request)?;
    let amount = checked_amount(payload.amount, "amount").map_err(AppError::bad_request)?;
    let date = match payload.date.as_deref() {
        Some(raw) => parse_timestamp(raw).map_err(AppError::bad_request)?,
        None => state.now(),
    };

    let new_tx = NewTransaction {
        id: Uuid::new_v4(),
        kind: kind.as_str().to_string(),
        amount,
        description: optional_text(payload.description),
        category: optional_text(payload.category),
        date,
    };

    let tx: Transaction = {
        let mut conn = state.db()?;
        diesel::insert_into(transactions::table)
            .values(&new_tx)
            .get_result(&mut conn)?
    };
    state.cache.transactions.invalidate().await;

    tracing::info!(transaction_id = %tx.id, kind = %kind, user_id = %user.user_id, "transaction recorded");

    Ok((StatusCode::CREATED, Json(transaction_response(&tx))))
}

pub async fn transaction_summary(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<Json<CashSummary>> {
    let rows = store::transactions(&state).await?;
    Ok(Json(cash_summary(&rows)))
}
