//! Statistics API endpoints

use api_types::stats::{CategoryTotal, Statistic};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

/// Handle requests for dashboard statistics
pub async fn get_stats(State(state): State<ServerState>) -> Result<Json<Statistic>, ServerError> {
    let stats = state.ledger.statistics().await?;

    Ok(Json(Statistic {
        balance_minor: stats.balance_minor,
        total_income_minor: stats.total_income_minor,
        total_expenses_minor: stats.total_expenses_minor,
        expense_by_category: stats
            .expense_by_category
            .into_iter()
            .map(|total| CategoryTotal {
                category: total.category,
                total_minor: total.total_minor,
            })
            .collect(),
    }))
}
