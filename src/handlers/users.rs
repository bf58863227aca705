// src/handlers/users.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    db::Entity,
    models::{
        audit::AuditAction,
        users::{User, UserInvite},
    },
};

// POST /api/usuarios/convites
// Identidade + usuário + lotações; em caso de falha nada fica gravado.
pub async fn invite_user(
    State(app_state): State<AppState>,
    Json(payload): Json<UserInvite>,
) -> Result<impl IntoResponse, AppError> {
    let created = app_state.user_service.invite_user(payload).await?;

    app_state
        .audit_service
        .record::<User, _>(created.usuario.id, AuditAction::Criacao, Some(&created))
        .await;

    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/usuarios/{id}/lotacoes
pub async fn get_with_assignments(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state
        .user_service
        .with_assignments(id)
        .await?
        .ok_or(AppError::NotFound(User::LABEL))?;
    Ok(Json(user))
}
