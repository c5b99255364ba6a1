//! Wallet API handlers.
//!
//! - Looking up a wallet's balance
//! - Creating an empty wallet
//! - Applying a deposit or withdrawal
//!
//! # Examples
//!
//! Create a wallet:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/wallets/create
//! ```
//!
//! Deposit into it:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/wallets/<uuid>/operation \
//!   -H "Content-Type: application/json" \
//!   -d '{"operation_type": "DEPOSIT", "amount": 1000}'
//! ```

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::time::Instant;
use uuid::Uuid;
use wallet_ledger::wallet::{Wallet, WalletError, WalletOperation};

use super::{AppState, middleware::RequestId};
use crate::{logging, metrics};

#[derive(Debug, Serialize)]
pub struct CreateWalletResponse {
    pub uuid: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

/// Error returned by wallet handlers, rendered as `{"error", "code"}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn validation(message: String) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ErrorResponse {
                error: message,
                code: "validation_error",
            },
        }
    }
}

/// Map each wallet error to its HTTP status
pub fn status_for(err: &WalletError) -> StatusCode {
    match err {
        WalletError::WalletNotFound(_) => StatusCode::NOT_FOUND,
        WalletError::InsufficientBalance { .. } | WalletError::BalanceOverflow => {
            StatusCode::BAD_REQUEST
        }
        WalletError::ConcurrencyConflict => StatusCode::CONFLICT,
        WalletError::InvalidAmount(_) | WalletError::InvalidOperation(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        WalletError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<WalletError> for ApiError {
    fn from(err: WalletError) -> Self {
        Self {
            status: status_for(&err),
            body: ErrorResponse {
                error: err.client_message(),
                code: err.code(),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Get a wallet's current balance.
///
/// No lock is taken; the committed balance is returned.
///
/// # Response
///
/// ```json
/// { "uuid": "f47ac10b-58cc-4372-a567-0e02b2c3d479", "balance": 1000 }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: unknown or malformed wallet identifier
pub async fn get_wallet(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<Wallet>, ApiError> {
    let wallet = state.wallet_manager.get_wallet(&uuid).await?;
    Ok(Json(wallet))
}

/// Create an empty wallet and return its identifier.
pub async fn create_wallet(
    State(state): State<AppState>,
) -> Result<Json<CreateWalletResponse>, ApiError> {
    let wallet = state.wallet_manager.create_wallet().await?;
    metrics::wallets_created_total();
    Ok(Json(CreateWalletResponse { uuid: wallet.uuid }))
}

/// Apply one deposit or withdrawal.
///
/// # Request Body
///
/// ```json
/// { "operation_type": "WITHDRAW", "amount": 500 }
/// ```
///
/// `operation_type` is case-insensitive; `amount` must not be negative.
///
/// # Errors
///
/// - `404 Not Found`: unknown wallet
/// - `400 Bad Request`: withdrawal exceeds the balance
/// - `409 Conflict`: wallet is locked by a concurrent operation, try again
/// - `422 Unprocessable Entity`: malformed operation type, amount or body
pub async fn wallet_operation(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(uuid): Path<String>,
    payload: Result<Json<WalletOperation>, JsonRejection>,
) -> Result<Json<Wallet>, ApiError> {
    let Json(operation) = payload?;
    let started = Instant::now();

    let result = state.wallet_manager.apply_operation(&uuid, operation).await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(err) => err.code(),
    };
    let kind = operation.operation_type.as_str();
    metrics::wallet_operations_total(kind, outcome);
    logging::log_wallet_operation(
        &uuid,
        kind,
        operation.amount,
        outcome,
        logging::elapsed_ms(started.elapsed()),
    );
    tracing::debug!(request_id = request_id.as_str(), wallet = %uuid, outcome, "Operation handled");

    Ok(Json(result?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallet_ledger::db::StoreError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&WalletError::WalletNotFound(String::new())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&WalletError::InsufficientBalance {
                available: 0,
                required: 1
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&WalletError::ConcurrencyConflict),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&WalletError::InvalidAmount(-1)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&WalletError::Storage(StoreError::UniqueViolation)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_body() {
        let err = ApiError::from(WalletError::ConcurrencyConflict);
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.body.error, "Resource busy, try again!");
        assert_eq!(err.body.code, "concurrency_conflict");
    }
}
