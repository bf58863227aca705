// src/handlers/resource.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    db::{Coded, Entity, Scoped},
    models::{
        audit::AuditAction,
        documents::*,
        finance::*,
        organization::*,
        users::*,
    },
};

/// Uma entidade exposta como recurso REST: os payloads de criação e de
/// atualização parcial que ela aceita.
pub trait Resource: Entity {
    type New: DeserializeOwned + Serialize + Validate + Send + Sync + 'static;
    type Patch: DeserializeOwned + Serialize + Validate + Send + Sync + 'static;
}

macro_rules! resource {
    ($entity:ty, $new:ty, $patch:ty) => {
        impl Resource for $entity {
            type New = $new;
            type Patch = $patch;
        }
    };
}

resource!(Institution, NewInstitution, InstitutionPatch);
resource!(Organ, NewOrgan, OrganPatch);
resource!(ManagementUnit, NewManagementUnit, ManagementUnitPatch);
resource!(Sector, NewSector, SectorPatch);
resource!(Position, NewPosition, PositionPatch);
resource!(User, NewUser, UserPatch);
resource!(Assignment, NewAssignment, AssignmentPatch);
resource!(RolePermission, NewRolePermission, RolePermissionPatch);
resource!(Bank, NewBank, BankPatch);
resource!(Agency, NewAgency, AgencyPatch);
resource!(Creditor, NewCreditor, CreditorPatch);
resource!(FinancialYear, NewFinancialYear, FinancialYearPatch);
resource!(Law, NewLaw, LawPatch);
resource!(Title, NewTitle, TitlePatch);
resource!(DocumentCategory, NewDocumentCategory, DocumentCategoryPatch);
resource!(DocumentSubcategory, NewDocumentSubcategory, DocumentSubcategoryPatch);

// ---
// Query string comum às listagens
// ---
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub busca: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NextCode {
    pub codigo: String,
}

// GET /api/{recurso}
pub async fn list<T: Resource>(
    State(app_state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state
        .repository::<T>()
        .list(params.busca.as_deref())
        .await?;
    Ok(Json(items))
}

// GET /api/{recurso}?parentId=
pub async fn list_scoped<T: Resource + Scoped>(
    State(app_state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let repo = app_state.repository::<T>();
    let items = match params.parent_id {
        Some(parent_id) => {
            repo.list_by_parent_matching(parent_id, params.busca.as_deref())
                .await?
        }
        None => repo.list(params.busca.as_deref()).await?,
    };
    Ok(Json(items))
}

// GET /api/{recurso}/{id}
pub async fn get_one<T: Resource>(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state
        .repository::<T>()
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound(T::LABEL))?;
    Ok(Json(item))
}

// POST /api/{recurso}
pub async fn create<T: Resource>(
    State(app_state): State<AppState>,
    Json(payload): Json<T::New>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let created = app_state.repository::<T>().create(&payload).await?;
    app_state
        .audit_service
        .record::<T, _>(created.id(), AuditAction::Criacao, Some(&created))
        .await;

    Ok((StatusCode::CREATED, Json(created)))
}

// PATCH /api/{recurso}/{id}
pub async fn update<T: Resource>(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<T::Patch>,
) -> Result<impl IntoResponse, AppError> {
    patch.validate()?;

    let updated = app_state.repository::<T>().update(id, &patch).await?;
    app_state
        .audit_service
        .record::<T, _>(id, AuditAction::Atualizacao, Some(&patch))
        .await;

    Ok(Json(updated))
}

// DELETE /api/{recurso}/{id}
pub async fn delete<T: Resource>(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    // Só audita quando um registro ativo mudou de estado
    if app_state.repository::<T>().soft_delete(id).await? {
        app_state
            .audit_service
            .record::<T, serde_json::Value>(id, AuditAction::Exclusao, None)
            .await;
    }

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/{recurso}/proximo-codigo?parentId=
pub async fn next_code<T: Coded>(
    State(app_state): State<AppState>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let codigo = app_state
        .code_generator
        .next_code_for::<T>(params.parent_id)
        .await;
    Json(NextCode { codigo })
}

// ---
// Montagem dos routers por recurso
// ---
pub fn crud<T: Resource>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<T>).post(create::<T>))
        .route(
            "/{id}",
            get(get_one::<T>).patch(update::<T>).delete(delete::<T>),
        )
}

pub fn scoped_crud<T: Resource + Scoped>() -> Router<AppState> {
    Router::new()
        .route("/", get(list_scoped::<T>).post(create::<T>))
        .route(
            "/{id}",
            get(get_one::<T>).patch(update::<T>).delete(delete::<T>),
        )
}

/// Acrescenta `/proximo-codigo`. A rota estática tem precedência sobre `/{id}`.
pub fn with_next_code<T: Coded>(router: Router<AppState>) -> Router<AppState> {
    router.route("/proximo-codigo", get(next_code::<T>))
}
