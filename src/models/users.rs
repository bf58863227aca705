// src/models/users.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::backend::Direction;
use crate::db::repository::{Entity, Scoped};
use crate::models::{default_active, nullable};

// ---
// 1. Usuário
// ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
    pub cpf: Option<String>,
    // Id da identidade no provedor de autenticação externo
    pub identidade_id: Option<String>,
    pub ativo: bool,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for User {
    const TABLE: &'static str = "usuarios";
    const LABEL: &'static str = "usuário";
    const SEARCH_COLUMNS: &'static [&'static str] = &["nome", "email", "cpf"];

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    pub nome: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    pub cpf: Option<String>,
    pub identidade_id: Option<String>,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserPatch {
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub cpf: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}

// ---
// 2. Lotação (a "ponte" usuário → ponto da hierarquia)
// ---
// Um usuário pode ter várias lotações independentes, em ramos diferentes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub instituicao_id: Uuid,
    pub orgao_id: Uuid,
    pub unidade_gestora_id: Uuid,
    pub setor_id: Uuid,
    pub cargo_id: Option<Uuid>,
    pub perfil: String,
    pub ativo: bool,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Assignment {
    const TABLE: &'static str = "lotacoes";
    const LABEL: &'static str = "lotação";
    const SEARCH_COLUMNS: &'static [&'static str] = &["perfil"];
    const ORDER_COLUMN: &'static str = "created_at";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Scoped for Assignment {
    const PARENT_COLUMN: &'static str = "usuario_id";
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewAssignment {
    pub usuario_id: Uuid,
    pub instituicao_id: Uuid,
    pub orgao_id: Uuid,
    pub unidade_gestora_id: Uuid,
    pub setor_id: Uuid,
    pub cargo_id: Option<Uuid>,
    #[validate(length(min = 1, max = 50, message = "O perfil é obrigatório."))]
    pub perfil: String,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AssignmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instituicao_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orgao_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unidade_gestora_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setor_id: Option<Uuid>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub cargo_id: Option<Option<Uuid>>,
    #[validate(length(min = 1, max = 50, message = "O perfil é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perfil: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}

// ---
// 3. Convite de usuário (usuário + identidade + lotações, numa saga)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDraft {
    pub instituicao_id: Uuid,
    pub orgao_id: Uuid,
    pub unidade_gestora_id: Uuid,
    pub setor_id: Uuid,
    pub cargo_id: Option<Uuid>,
    #[validate(length(min = 1, max = 50, message = "O perfil é obrigatório."))]
    pub perfil: String,
}

impl AssignmentDraft {
    pub fn for_user(&self, usuario_id: Uuid) -> NewAssignment {
        NewAssignment {
            usuario_id,
            instituicao_id: self.instituicao_id,
            orgao_id: self.orgao_id,
            unidade_gestora_id: self.unidade_gestora_id,
            setor_id: self.setor_id,
            cargo_id: self.cargo_id,
            perfil: self.perfil.clone(),
            ativo: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserInvite {
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    pub nome: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    pub cpf: Option<String>,
    #[validate(nested)]
    #[serde(default)]
    pub lotacoes: Vec<AssignmentDraft>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithAssignments {
    pub usuario: User,
    pub lotacoes: Vec<Assignment>,
}

// ---
// 4. Permissões por perfil
// ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RolePermission {
    pub id: Uuid,
    pub perfil: String,
    pub permissao: String,
    pub ativo: bool,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for RolePermission {
    const TABLE: &'static str = "perfil_permissoes";
    const LABEL: &'static str = "permissão de perfil";
    const SEARCH_COLUMNS: &'static [&'static str] = &["perfil", "permissao"];
    const ORDER_COLUMN: &'static str = "permissao";
    const ORDER_DIRECTION: Direction = Direction::Asc;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewRolePermission {
    #[validate(length(min = 1, max = 50, message = "O perfil é obrigatório."))]
    pub perfil: String,
    #[validate(length(min = 1, max = 100, message = "A permissão é obrigatória."))]
    pub permissao: String,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RolePermissionPatch {
    #[validate(length(min = 1, max = 50, message = "O perfil é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perfil: Option<String>,
    #[validate(length(min = 1, max = 100, message = "A permissão é obrigatória."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}
