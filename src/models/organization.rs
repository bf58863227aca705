// src/models/organization.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::repository::{Coded, Entity, Scoped};
use crate::models::{default_active, nullable};

// Hierarquia: Instituição → Órgão → Unidade Gestora → Setor → Cargo.
// Cada filho guarda o id do pai; só a instituição não tem pai.

// ---
// 1. Instituição
// ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Institution {
    pub id: Uuid,
    pub codigo: String,
    pub nome: String,
    pub sigla: Option<String>,
    pub cnpj: Option<String>,
    pub ativo: bool,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Institution {
    const TABLE: &'static str = "instituicoes";
    const LABEL: &'static str = "instituição";
    const SEARCH_COLUMNS: &'static [&'static str] = &["nome", "sigla", "codigo"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Coded for Institution {
    const CODE_WIDTH: usize = 3;
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewInstitution {
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    pub codigo: String,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    pub nome: String,
    pub sigla: Option<String>,
    pub cnpj: Option<String>,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct InstitutionPatch {
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub sigla: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}

// ---
// 2. Órgão
// ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organ {
    pub id: Uuid,
    pub instituicao_id: Uuid,
    pub codigo: String,
    pub nome: String,
    pub sigla: Option<String>,
    pub ativo: bool,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Organ {
    const TABLE: &'static str = "orgaos";
    const LABEL: &'static str = "órgão";
    const SEARCH_COLUMNS: &'static [&'static str] = &["nome", "sigla", "codigo"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Scoped for Organ {
    const PARENT_COLUMN: &'static str = "instituicao_id";
}

impl Coded for Organ {
    const CODE_WIDTH: usize = 4;
    const CODE_SCOPE: Option<&'static str> = Some("instituicao_id");
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewOrgan {
    pub instituicao_id: Uuid,
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    pub codigo: String,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    pub nome: String,
    pub sigla: Option<String>,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OrganPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instituicao_id: Option<Uuid>,
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub sigla: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}

// ---
// 3. Unidade Gestora
// ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManagementUnit {
    pub id: Uuid,
    pub orgao_id: Uuid,
    pub codigo: String,
    pub nome: String,
    pub sigla: Option<String>,
    pub ativo: bool,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for ManagementUnit {
    const TABLE: &'static str = "unidades_gestoras";
    const LABEL: &'static str = "unidade gestora";
    const SEARCH_COLUMNS: &'static [&'static str] = &["nome", "sigla", "codigo"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Scoped for ManagementUnit {
    const PARENT_COLUMN: &'static str = "orgao_id";
}

impl Coded for ManagementUnit {
    const CODE_WIDTH: usize = 6;
    const CODE_SCOPE: Option<&'static str> = Some("orgao_id");
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewManagementUnit {
    pub orgao_id: Uuid,
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    pub codigo: String,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    pub nome: String,
    pub sigla: Option<String>,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ManagementUnitPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orgao_id: Option<Uuid>,
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub sigla: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}

// ---
// 4. Setor
// ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sector {
    pub id: Uuid,
    pub unidade_gestora_id: Uuid,
    pub codigo: String,
    pub nome: String,
    pub sigla: Option<String>,
    pub ativo: bool,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Sector {
    const TABLE: &'static str = "setores";
    const LABEL: &'static str = "setor";
    const SEARCH_COLUMNS: &'static [&'static str] = &["nome", "sigla", "codigo"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Scoped for Sector {
    const PARENT_COLUMN: &'static str = "unidade_gestora_id";
}

impl Coded for Sector {
    const CODE_WIDTH: usize = 4;
    const CODE_SCOPE: Option<&'static str> = Some("unidade_gestora_id");
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewSector {
    pub unidade_gestora_id: Uuid,
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    pub codigo: String,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    pub nome: String,
    pub sigla: Option<String>,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SectorPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unidade_gestora_id: Option<Uuid>,
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub sigla: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}

// ---
// 5. Cargo
// ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub id: Uuid,
    pub setor_id: Uuid,
    pub codigo: String,
    pub nome: String,
    pub descricao: Option<String>,
    pub ativo: bool,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Position {
    const TABLE: &'static str = "cargos";
    const LABEL: &'static str = "cargo";
    const SEARCH_COLUMNS: &'static [&'static str] = &["nome", "codigo"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Scoped for Position {
    const PARENT_COLUMN: &'static str = "setor_id";
}

impl Coded for Position {
    const CODE_WIDTH: usize = 4;
    const CODE_SCOPE: Option<&'static str> = Some("setor_id");
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewPosition {
    pub setor_id: Uuid,
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    pub codigo: String,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    pub nome: String,
    pub descricao: Option<String>,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PositionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setor_id: Option<Uuid>,
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub descricao: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}
