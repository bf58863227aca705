// src/models/finance.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::backend::Direction;
use crate::db::repository::{Coded, Entity, Scoped};
use crate::models::{default_active, nullable};

// ---
// 1. Banco
// ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bank {
    pub id: Uuid,
    pub codigo: String,
    pub nome: String,
    pub sigla: Option<String>,
    pub ativo: bool,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Bank {
    const TABLE: &'static str = "bancos";
    const LABEL: &'static str = "banco";
    const SEARCH_COLUMNS: &'static [&'static str] = &["nome", "codigo"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Coded for Bank {
    const CODE_WIDTH: usize = 3;
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewBank {
    #[validate(length(min = 1, max = 10, message = "O código é obrigatório."))]
    pub codigo: String,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    pub nome: String,
    pub sigla: Option<String>,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BankPatch {
    #[validate(length(min = 1, max = 10, message = "O código é obrigatório."))]
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
// 2. Agência (filha do banco)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agency {
    pub id: Uuid,
    pub banco_id: Uuid,
    pub codigo: String,
    pub digito: Option<String>,
    pub nome: String,
    pub ativo: bool,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Agency {
    const TABLE: &'static str = "agencias";
    const LABEL: &'static str = "agência";
    const SEARCH_COLUMNS: &'static [&'static str] = &["nome", "codigo"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Scoped for Agency {
    const PARENT_COLUMN: &'static str = "banco_id";
}

impl Coded for Agency {
    const CODE_WIDTH: usize = 4;
    const CODE_SCOPE: Option<&'static str> = Some("banco_id");
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewAgency {
    pub banco_id: Uuid,
    #[validate(length(min = 1, max = 10, message = "O código é obrigatório."))]
    pub codigo: String,
    #[validate(length(max = 2, message = "O dígito tem no máximo 2 caracteres."))]
    pub digito: Option<String>,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    pub nome: String,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AgencyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banco_id: Option<Uuid>,
    #[validate(length(min = 1, max = 10, message = "O código é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[validate(length(max = 2, message = "O dígito tem no máximo 2 caracteres."))]
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub digito: Option<Option<String>>,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}

// ---
// 3. Credor
// ---
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TipoPessoa {
    #[serde(rename = "PF")]
    Fisica,
    #[serde(rename = "PJ")]
    Juridica,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Creditor {
    pub id: Uuid,
    pub codigo: String,
    pub nome: String,
    pub tipo_pessoa: TipoPessoa,
    // CPF ou CNPJ, conforme o tipo de pessoa
    pub documento: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub ativo: bool,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Creditor {
    const TABLE: &'static str = "credores";
    const LABEL: &'static str = "credor";
    const SEARCH_COLUMNS: &'static [&'static str] = &["nome", "documento", "codigo"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Coded for Creditor {
    const CODE_WIDTH: usize = 6;
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCreditor {
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    pub codigo: String,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    pub nome: String,
    pub tipo_pessoa: TipoPessoa,
    pub documento: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub telefone: Option<String>,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreditorPatch {
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_pessoa: Option<TipoPessoa>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub documento: Option<Option<String>>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub telefone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}

// ---
// 4. Exercício Financeiro (um por ano, por instituição)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialYear {
    pub id: Uuid,
    pub instituicao_id: Uuid,
    pub ano: i32,
    pub descricao: Option<String>,
    pub aberto: bool,
    pub ativo: bool,
    pub excluido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for FinancialYear {
    const TABLE: &'static str = "exercicios_financeiros";
    const LABEL: &'static str = "exercício financeiro";
    const SEARCH_COLUMNS: &'static [&'static str] = &["descricao"];
    // Mais recente primeiro
    const ORDER_COLUMN: &'static str = "ano";
    const ORDER_DIRECTION: Direction = Direction::Desc;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Scoped for FinancialYear {
    const PARENT_COLUMN: &'static str = "instituicao_id";
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewFinancialYear {
    pub instituicao_id: Uuid,
    #[validate(range(min = 1900, max = 2200, message = "Ano inválido."))]
    pub ano: i32,
    pub descricao: Option<String>,
    #[serde(default = "default_active")]
    pub aberto: bool,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FinancialYearPatch {
    #[validate(range(min = 1900, max = 2200, message = "Ano inválido."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ano: Option<i32>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub descricao: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aberto: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}
