// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::identity::IdentityError;

// ---
// 1. Erros do Backend (a fronteira de persistência)
// ---
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("registro não encontrado")]
    NotFound,

    #[error("violação de restrição: {0}")]
    Constraint(String),

    #[error("identificador inválido: '{0}'")]
    InvalidIdentifier(String),

    #[error("backend indisponível: {0}")]
    Unavailable(String),

    #[error("formato de registro inesperado")]
    UnexpectedShape,

    #[error("erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("erro de banco de dados: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for BackendError {
    fn from(e: sqlx::Error) -> Self {
        // Converte violações de restrição em um erro mais amigável
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation()
                || db_err.is_foreign_key_violation()
                || db_err.is_check_violation()
            {
                return BackendError::Constraint(db_err.message().to_string());
            }
        }
        BackendError::Database(e)
    }
}

// ---
// 2. Erro de Persistência (o contrato dos repositórios)
// ---
// "Não encontrado" no get_by_id nunca chega aqui: vira `None`.
#[derive(Debug, Error)]
#[error("falha ao {operation} {entity}: {source}")]
pub struct PersistenceError {
    pub entity: &'static str,
    pub operation: &'static str,
    #[source]
    pub source: BackendError,
}

impl PersistenceError {
    pub fn new(entity: &'static str, operation: &'static str, source: BackendError) -> Self {
        tracing::error!(
            entidade = entity,
            operacao = operation,
            "Erro de persistência: {}",
            source
        );
        Self { entity, operation, source }
    }
}

// ---
// 3. Erro da Aplicação (a superfície HTTP)
// ---
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::NotFound(entity) => {
                (StatusCode::NOT_FOUND, format!("{} não encontrado(a).", entity))
            }
            AppError::Persistence(PersistenceError {
                entity,
                source: BackendError::NotFound,
                ..
            }) => (StatusCode::NOT_FOUND, format!("{} não encontrado(a).", entity)),
            AppError::Persistence(PersistenceError {
                source: BackendError::Constraint(detail),
                ..
            }) => (
                StatusCode::CONFLICT,
                format!("O registro viola uma restrição do banco: {}", detail),
            ),
            AppError::Identity(IdentityError::NotConfigured) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "O provedor de identidade não está configurado.".to_string(),
            ),
            AppError::Identity(ref e) => {
                tracing::error!("Erro no provedor de identidade: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Falha ao comunicar com o provedor de identidade.".to_string(),
                )
            }

            // Todos os outros erros viram 500; o detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
