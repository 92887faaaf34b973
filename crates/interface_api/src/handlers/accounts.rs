//! Chart of accounts handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use domain_ledger::Account;

use crate::dto::accounts::*;
use crate::handlers::today;
use crate::{error::ApiError, AppState};

/// Lists active accounts, or all with `?includeInactive=true`
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let registry = state.ledger.registry();
    let accounts = if query.include_inactive {
        registry.list_all().await?
    } else {
        registry.list_active().await?
    };
    Ok(Json(accounts.into_iter().map(AccountResponse::from).collect()))
}

/// Registers an account
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    request.validate()?;

    let mut account = Account::new(request.number, request.name, request.account_type);
    if let Some(description) = request.description {
        account = account.with_description(description);
    }
    let account = state.ledger.registry().register(account).await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.ledger.registry().get_account(&number).await?;
    Ok(Json(account.into()))
}

/// Deactivates an account; it keeps its history and stays in reports
pub async fn deactivate_account(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.ledger.registry().deactivate(&number).await?;
    Ok(Json(account.into()))
}

/// Balance as of `?asOf=`, defaulting to today
pub async fn account_balance(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let as_of = query.as_of.unwrap_or_else(today);
    let balance = state.ledger.balances().balance_as_of(&number, as_of).await?;

    Ok(Json(BalanceResponse {
        account_number: number,
        as_of,
        balance: balance.to_decimal(),
        currency: balance.currency().code().to_string(),
    }))
}
