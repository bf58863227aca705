// src/handlers/documents.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{common::error::AppError, config::AppState, handlers::resource::ListParams};

// GET /api/categorias-documento/com-relacoes
pub async fn list_categories_with_relations(
    State(app_state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state
        .document_service
        .list_with_relations(params.busca.as_deref())
        .await?;
    Ok(Json(categories))
}
