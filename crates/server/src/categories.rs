//! Categories API endpoints

use api_types::category::{CategoryCreated, CategoryNew, CategoryView};
use axum::{Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState};

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.ledger.categories().await?;

    Ok(Json(
        categories
            .into_iter()
            .map(|category| CategoryView {
                id: category.id,
                name: category.name,
            })
            .collect(),
    ))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryCreated>), ServerError> {
    let id = state.ledger.create_category(&payload.name).await?;

    Ok((StatusCode::CREATED, Json(CategoryCreated { id })))
}
