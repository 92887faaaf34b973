//! Report handlers

use axum::{
    extract::{Query, State},
    Json,
};

use crate::dto::accounts::AsOfQuery;
use crate::dto::reports::TrialBalanceResponse;
use crate::handlers::today;
use crate::{error::ApiError, AppState};

/// Trial balance as of `?asOf=`, defaulting to today
pub async fn trial_balance(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<TrialBalanceResponse>, ApiError> {
    let as_of = query.as_of.unwrap_or_else(today);
    let report = state.ledger.reporter().trial_balance(as_of).await?;
    Ok(Json(report.into()))
}
