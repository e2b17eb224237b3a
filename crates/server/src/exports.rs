//! Handlers for the export/backup byte-stream surface.
//!
//! Both endpoints are pass-through: the CSV document is the full unfiltered
//! transaction listing, the backup is the raw SQLite file.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{Error, ServerError, server::ServerState};
use ledger::TransactionFilter;

pub async fn csv(State(state): State<ServerState>) -> Result<Response, ServerError> {
    let rows = state
        .ledger
        .transactions(&TransactionFilter::default())
        .await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["id", "date", "type", "amount_minor", "account", "category", "note"])
        .map_err(csv_error)?;
    for row in rows {
        writer
            .write_record([
                row.id.to_string(),
                row.date.to_string(),
                row.kind.as_str().to_string(),
                row.amount_minor.to_string(),
                row.account,
                row.category,
                row.note.unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ServerError::Generic(err.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        bytes,
    )
        .into_response())
}

pub async fn backup(State(state): State<ServerState>) -> Result<Response, ServerError> {
    let Some(path) = state.database_path.clone() else {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(Error {
                error: "no database file to back up".to_string(),
            }),
        )
            .into_response());
    };

    let bytes = tokio::fs::read(&path).await.map_err(|err| {
        tracing::error!("failed to read database file: {err}");
        ServerError::Generic("failed to read database file".to_string())
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"pocketbook.db\"",
            ),
        ],
        bytes,
    )
        .into_response())
}

fn csv_error(err: csv::Error) -> ServerError {
    ServerError::Generic(err.to_string())
}
