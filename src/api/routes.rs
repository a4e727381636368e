//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::extract;
use crate::audit::ChainVerification;
use crate::domain::{AccountId, Balance, TransactionKind, TransactionRecord};
use crate::error::{AppError, AppResult};
use crate::handlers::TransferCommand;
use crate::ledger::Ledger;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct AmountRequest {
    pub amount: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub account_id: AccountId,
    pub balance: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: String,
    #[serde(default)]
    pub memo: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<Uuid>,
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Decimal,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub transaction_id: i64,
    pub transaction_type: TransactionKind,
    pub amount: Decimal,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<TransactionRecord> for HistoryEntry {
    fn from(record: TransactionRecord) -> Self {
        Self {
            transaction_id: record.id,
            transaction_type: record.kind,
            amount: record.amount.value(),
            description: record.description,
            transfer_id: record.transfer_id,
            created_at: record.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub account_id: AccountId,
    pub entries: Vec<HistoryEntry>,
}

fn account_response(account_id: AccountId, balance: Balance) -> AccountResponse {
    AccountResponse {
        account_id,
        balance: balance.value(),
    }
}

fn parse_amount(raw: &str) -> AppResult<Decimal> {
    Decimal::from_str(raw.trim())
        .map_err(|e| AppError::InvalidRequest(format!("Invalid amount: {}", e)))
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<Ledger> {
    Router::new()
        .route("/accounts", post(open_account))
        .route("/accounts/:account_id", get(get_account))
        .route("/accounts/:account_id/balance", get(get_balance))
        .route("/accounts/:account_id/credit", post(credit))
        .route("/accounts/:account_id/debit", post(debit))
        .route("/accounts/:account_id/transactions", get(get_history))
        .route(
            "/accounts/:account_id/transactions/verify",
            get(verify_history),
        )
        .route("/transfers", post(transfer))
}

// =========================================================================
// Accounts
// =========================================================================

/// POST /accounts
async fn open_account(
    State(ledger): State<Ledger>,
) -> AppResult<(StatusCode, Json<AccountResponse>)> {
    let account_id = ledger.open_account().await?;
    Ok((
        StatusCode::CREATED,
        Json(account_response(account_id, Balance::zero())),
    ))
}

/// GET /accounts/:account_id
async fn get_account(
    State(ledger): State<Ledger>,
    extract::Path(account_id): extract::Path<AccountId>,
) -> AppResult<Json<AccountResponse>> {
    let account = ledger.account(account_id).await?;
    Ok(Json(account_response(account.id, account.balance)))
}

/// GET /accounts/:account_id/balance
async fn get_balance(
    State(ledger): State<Ledger>,
    extract::Path(account_id): extract::Path<AccountId>,
) -> AppResult<Json<AccountResponse>> {
    let balance = ledger.balance_of(account_id).await?;
    Ok(Json(account_response(account_id, balance)))
}

/// POST /accounts/:account_id/credit
async fn credit(
    State(ledger): State<Ledger>,
    extract::Path(account_id): extract::Path<AccountId>,
    extract::Json(request): extract::Json<AmountRequest>,
) -> AppResult<Json<AccountResponse>> {
    let amount = parse_amount(&request.amount)?;
    let balance = ledger.credit(account_id, amount).await?;
    Ok(Json(account_response(account_id, balance)))
}

/// POST /accounts/:account_id/debit
async fn debit(
    State(ledger): State<Ledger>,
    extract::Path(account_id): extract::Path<AccountId>,
    extract::Json(request): extract::Json<AmountRequest>,
) -> AppResult<Json<AccountResponse>> {
    let amount = parse_amount(&request.amount)?;
    let balance = ledger.debit(account_id, amount).await?;
    Ok(Json(account_response(account_id, balance)))
}

// =========================================================================
// History
// =========================================================================

/// GET /accounts/:account_id/transactions
async fn get_history(
    State(ledger): State<Ledger>,
    extract::Path(account_id): extract::Path<AccountId>,
) -> AppResult<Json<HistoryResponse>> {
    let records = ledger.history(account_id).collect().await?;
    Ok(Json(HistoryResponse {
        account_id,
        entries: records.into_iter().map(HistoryEntry::from).collect(),
    }))
}

/// GET /accounts/:account_id/transactions/verify
async fn verify_history(
    State(ledger): State<Ledger>,
    extract::Path(account_id): extract::Path<AccountId>,
) -> AppResult<Json<ChainVerification>> {
    let verification = ledger.verify_chain(account_id).await?;
    if !verification.is_valid {
        tracing::error!(
            account_id = %account_id,
            first_invalid_entry = ?verification.first_invalid_entry,
            "Transaction log hash chain is broken"
        );
    }
    Ok(Json(verification))
}

// =========================================================================
// Transfers
// =========================================================================

/// POST /transfers
async fn transfer(
    State(ledger): State<Ledger>,
    extract::Json(request): extract::Json<TransferRequest>,
) -> AppResult<Json<TransferResponse>> {
    let amount = parse_amount(&request.amount)?;
    let command = TransferCommand::new(request.from_account_id, request.to_account_id, amount);
    let command = match request.memo {
        Some(memo) => command.with_memo(memo),
        None => command,
    };

    let receipt = ledger.execute_transfer(command).await?;

    Ok(Json(TransferResponse {
        transfer_id: receipt.transfer_id,
        from_account_id: receipt.from_account_id,
        to_account_id: receipt.to_account_id,
        amount: receipt.amount,
        status: "completed".to_string(),
    }))
}
