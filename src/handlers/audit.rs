// src/handlers/audit.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{common::error::AppError, config::AppState, handlers::resource::ListParams};

// GET /api/logs-auditoria?parentId=
// Com parentId: histórico de um registro. Sem: o log inteiro, com busca.
pub async fn list_logs(
    State(app_state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let logs = match params.parent_id {
        Some(registro_id) => app_state.audit_service.history(registro_id).await?,
        None => app_state.audit_service.list(params.busca.as_deref()).await?,
    };
    Ok(Json(logs))
}
