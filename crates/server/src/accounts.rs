//! Accounts API endpoints

use api_types::account::{AccountCreated, AccountNew, AccountView};
use axum::{Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<AccountView>>, ServerError> {
    let accounts = state.ledger.accounts().await?;

    Ok(Json(
        accounts
            .into_iter()
            .map(|account| AccountView {
                id: account.id,
                name: account.name,
                balance_minor: account.balance_minor,
            })
            .collect(),
    ))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountCreated>), ServerError> {
    let id = state.ledger.create_account(&payload.name).await?;

    Ok((StatusCode::CREATED, Json(AccountCreated { id })))
}
