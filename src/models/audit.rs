// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::db::backend::Direction;
use crate::db::repository::{Entity, Scoped};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Criacao,
    Atualizacao,
    Exclusao,
}

/// Entrada do log de auditoria. Só é inserida, nunca alterada.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLog {
    pub id: Uuid,
    pub tabela: String,
    pub registro_id: Uuid,
    pub acao: AuditAction,
    pub dados: Option<Value>,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for AuditLog {
    const TABLE: &'static str = "logs_auditoria";
    const LABEL: &'static str = "log de auditoria";
    const SEARCH_COLUMNS: &'static [&'static str] = &["tabela", "acao"];
    const ORDER_COLUMN: &'static str = "created_at";
    const ORDER_DIRECTION: Direction = Direction::Desc;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Scoped for AuditLog {
    const PARENT_COLUMN: &'static str = "registro_id";
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAuditLog<'a> {
    pub tabela: &'a str,
    pub registro_id: Uuid,
    pub acao: AuditAction,
    pub dados: Option<Value>,
}
