use axum::{
    Router,
    routing::{delete, get, post},
};

use std::path::PathBuf;
use std::sync::Arc;

use crate::{accounts, categories, exports, statistics, transactions};
use ledger::Ledger;

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger>,
    /// Path of the SQLite file, when the store is file-backed. The backup
    /// endpoint serves these bytes; in-memory databases have nothing to serve.
    pub database_path: Option<PathBuf>,
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::record),
        )
        .route("/transactions/{id}", delete(transactions::delete_tx))
        .route("/transfer", post(transactions::transfer))
        .route("/stats", get(statistics::get_stats))
        .route("/export/csv", get(exports::csv))
        .route("/backup", get(exports::backup))
        .with_state(state)
}

pub async fn run(ledger: Ledger, database_path: Option<PathBuf>) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(ledger, database_path, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    ledger: Ledger,
    database_path: Option<PathBuf>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        ledger: Arc::new(ledger),
        database_path,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    ledger: Ledger,
    database_path: Option<PathBuf>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(ledger, database_path, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
