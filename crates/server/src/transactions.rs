//! Transactions API endpoints

use api_types::transaction::{
    TransactionCreated, TransactionKind as ApiKind, TransactionListResponse, TransactionNew,
    TransactionQuery, TransactionView, TransferCreated, TransferNew,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use ledger::{RecordCmd, TransactionFilter, TransferCmd};

fn map_kind(kind: ledger::TransactionKind) -> ApiKind {
    match kind {
        ledger::TransactionKind::Income => ApiKind::Income,
        ledger::TransactionKind::Expense => ApiKind::Expense,
    }
}

fn ledger_kind(kind: ApiKind) -> ledger::TransactionKind {
    match kind {
        ApiKind::Income => ledger::TransactionKind::Income,
        ApiKind::Expense => ledger::TransactionKind::Expense,
    }
}

pub async fn record(
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let mut cmd = RecordCmd::new(
        payload.date,
        ledger_kind(payload.kind),
        payload.amount_minor,
        payload.account_id,
        payload.category_id,
    );
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }

    let id = state.ledger.record(cmd).await?;

    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(payload): Query<TransactionQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let filter = TransactionFilter {
        start_date: payload.start_date,
        end_date: payload.end_date,
        account_id: payload.account_id,
        category_id: payload.category_id,
    };

    let rows = state.ledger.transactions(&filter).await?;
    let transactions = rows
        .into_iter()
        .map(|row| TransactionView {
            id: row.id,
            date: row.date,
            kind: map_kind(row.kind),
            amount_minor: row.amount_minor,
            account: row.account,
            category: row.category,
            note: row.note,
        })
        .collect();

    Ok(Json(TransactionListResponse { transactions }))
}

pub async fn transfer(
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<(StatusCode, Json<TransferCreated>), ServerError> {
    // The ledger stores calendar dates only; transfers are dated today.
    let date = Utc::now().date_naive();
    let (expense_id, income_id) = state
        .ledger
        .transfer(TransferCmd::new(
            payload.from_account_id,
            payload.to_account_id,
            payload.amount_minor,
            date,
        ))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransferCreated {
            expense_id,
            income_id,
        }),
    ))
}

pub async fn delete_tx(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_transaction(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
