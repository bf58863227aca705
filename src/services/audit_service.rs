// src/services/audit_service.rs

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::common::error::PersistenceError;
use crate::db::{Backend, Entity, Repository};
use crate::models::audit::{AuditAction, AuditLog, NewAuditLog};

#[derive(Clone)]
pub struct AuditService {
    repo: Repository<AuditLog>,
}

impl AuditService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            repo: Repository::new(backend),
        }
    }

    /// Registra uma alteração em `T`. Nunca falha: se a gravação do log
    /// der erro, ele só aparece no tracing e a operação original segue.
    pub async fn record<T: Entity, D: Serialize>(&self, registro_id: Uuid, acao: AuditAction, dados: Option<&D>) {
        let dados = dados.and_then(|d| serde_json::to_value(d).ok());
        let entry = NewAuditLog {
            tabela: T::TABLE,
            registro_id,
            acao,
            dados,
        };

        if let Err(e) = self.repo.create(&entry).await {
            tracing::warn!(
                tabela = T::TABLE,
                registro = %registro_id,
                "Não foi possível gravar o log de auditoria: {}",
                e
            );
        }
    }

    pub async fn list(&self, search: Option<&str>) -> Result<Vec<AuditLog>, PersistenceError> {
        self.repo.list(search).await
    }

    /// Histórico de um registro, mais recente primeiro.
    pub async fn history(&self, registro_id: Uuid) -> Result<Vec<AuditLog>, PersistenceError> {
        self.repo.list_by_parent(registro_id).await
    }
}
