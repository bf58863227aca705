// src/models/documents.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::repository::{Coded, Entity, Scoped};
use crate::models::{default_active, nullable};
use crate::models::organization::Organ;

// ---
// 1. Lei e Título (o título pertence a uma lei)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Law {
    pub id: Uuid,
    pub codigo: String,
    pub numero: String,
    pub ano: Option<i32>,
    pub nome: String,
    pub ativo: bool,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Law {
    const TABLE: &'static str = "leis";
    const LABEL: &'static str = "lei";
    const SEARCH_COLUMNS: &'static [&'static str] = &["nome", "numero", "codigo"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Coded for Law {
    const CODE_WIDTH: usize = 4;
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewLaw {
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    pub codigo: String,
    #[validate(length(min = 1, max = 30, message = "O número da lei é obrigatório."))]
    pub numero: String,
    pub ano: Option<i32>,
    #[validate(length(min = 1, max = 300, message = "O nome é obrigatório."))]
    pub nome: String,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LawPatch {
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[validate(length(min = 1, max = 30, message = "O número da lei é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub ano: Option<Option<i32>>,
    #[validate(length(min = 1, max = 300, message = "O nome é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Title {
    pub id: Uuid,
    pub lei_id: Uuid,
    pub codigo: String,
    pub nome: String,
    pub ativo: bool,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Title {
    const TABLE: &'static str = "titulos";
    const LABEL: &'static str = "título";
    const SEARCH_COLUMNS: &'static [&'static str] = &["nome", "codigo"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Scoped for Title {
    const PARENT_COLUMN: &'static str = "lei_id";
}

impl Coded for Title {
    const CODE_WIDTH: usize = 3;
    const CODE_SCOPE: Option<&'static str> = Some("lei_id");
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTitle {
    pub lei_id: Uuid,
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    pub codigo: String,
    #[validate(length(min = 1, max = 300, message = "O nome é obrigatório."))]
    pub nome: String,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TitlePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lei_id: Option<Uuid>,
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[validate(length(min = 1, max = 300, message = "O nome é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}

// ---
// 2. Categoria de Documento
// ---
// Pode estar vinculada a um órgão e a um título de lei; os dois são opcionais.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentCategory {
    pub id: Uuid,
    pub codigo: String,
    pub nome: String,
    pub descricao: Option<String>,
    pub orgao_id: Option<Uuid>,
    pub titulo_id: Option<Uuid>,
    pub ativo: bool,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for DocumentCategory {
    const TABLE: &'static str = "categorias_documento";
    const LABEL: &'static str = "categoria de documento";
    const SEARCH_COLUMNS: &'static [&'static str] = &["nome", "codigo"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Coded for DocumentCategory {
    const CODE_WIDTH: usize = 3;
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewDocumentCategory {
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    pub codigo: String,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    pub nome: String,
    pub descricao: Option<String>,
    pub orgao_id: Option<Uuid>,
    pub titulo_id: Option<Uuid>,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DocumentCategoryPatch {
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub descricao: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub orgao_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub titulo_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}

/// Categoria com o órgão e o título vinculados já resolvidos.
/// Vínculos apontando para registros excluídos saem como `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWithRelations {
    #[serde(flatten)]
    pub categoria: DocumentCategory,
    pub orgao: Option<Organ>,
    pub titulo: Option<Title>,
}

// ---
// 3. Subcategoria de Documento
// ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSubcategory {
    pub id: Uuid,
    pub categoria_id: Uuid,
    pub codigo: String,
    pub nome: String,
    pub descricao: Option<String>,
    pub ativo: bool,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for DocumentSubcategory {
    const TABLE: &'static str = "subcategorias_documento";
    const LABEL: &'static str = "subcategoria de documento";
    const SEARCH_COLUMNS: &'static [&'static str] = &["nome", "codigo"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Scoped for DocumentSubcategory {
    const PARENT_COLUMN: &'static str = "categoria_id";
}

impl Coded for DocumentSubcategory {
    const CODE_WIDTH: usize = 3;
    const CODE_SCOPE: Option<&'static str> = Some("categoria_id");
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewDocumentSubcategory {
    pub categoria_id: Uuid,
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    pub codigo: String,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    pub nome: String,
    pub descricao: Option<String>,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DocumentSubcategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria_id: Option<Uuid>,
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
