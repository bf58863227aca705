// src/db/backend.rs

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::common::error::BackendError;

/// Uma linha de tabela, como trafega entre repositório e backend.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Uuid(Uuid),
    Bool(bool),
    Text(String),
}

impl FilterValue {
    pub fn to_json(&self) -> Value {
        match self {
            FilterValue::Uuid(id) => Value::String(id.to_string()),
            FilterValue::Bool(b) => Value::Bool(*b),
            FilterValue::Text(s) => Value::String(s.clone()),
        }
    }
}

impl From<Uuid> for FilterValue {
    fn from(id: Uuid) -> Self {
        FilterValue::Uuid(id)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `coluna = valor`
    Eq(String, FilterValue),
    /// `coluna IN (ids)`
    In(String, Vec<Uuid>),
    /// Busca textual sem distinção de maiúsculas em qualquer uma das colunas.
    Search { columns: Vec<String>, term: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
    /// Ordena texto numérico pelo comprimento antes do valor ("10000" > "9999").
    pub numeric_text: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<i64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value.into()));
        self
    }

    pub fn any_of(mut self, column: &str, ids: &[Uuid]) -> Self {
        self.filters.push(Filter::In(column.to_string(), ids.to_vec()));
        self
    }

    /// Termos vazios (ou só com espaços) não filtram nada.
    pub fn search(mut self, columns: &[&str], term: Option<&str>) -> Self {
        if let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) {
            self.filters.push(Filter::Search {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                term: term.to_string(),
            });
        }
        self
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            direction,
            numeric_text: false,
        });
        self
    }

    pub fn order_by_numeric_text(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            direction,
            numeric_text: true,
        });
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A fronteira com o armazenamento. Repositórios e o gerador de códigos
/// dependem apenas disto, então o backend pode ser trocado (Postgres,
/// memória) sem tocar neles.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Lista linhas filtradas/ordenadas. Lista vazia não é erro.
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Record>, BackendError>;

    /// Busca uma linha pelo id, incluindo linhas excluídas logicamente.
    /// Retorna `BackendError::NotFound` quando o id não existe.
    async fn find(&self, table: &str, id: Uuid) -> Result<Record, BackendError>;

    /// Insere e devolve a linha persistida (com id e timestamps gerados).
    async fn insert(&self, table: &str, record: Record) -> Result<Record, BackendError>;

    /// Atualização parcial; o backend é responsável por `updated_at`.
    async fn update(&self, table: &str, id: Uuid, patch: Record) -> Result<Record, BackendError>;
}

/// Nomes de tabelas e colunas são interpolados no SQL; só aceitamos
/// identificadores simples em minúsculas.
pub fn ensure_identifier(name: &str) -> Result<(), BackendError> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid_start && valid_rest && name.len() <= 63 {
        Ok(())
    } else {
        Err(BackendError::InvalidIdentifier(name.to_string()))
    }
}

pub(crate) fn ensure_query_identifiers(table: &str, query: &Query) -> Result<(), BackendError> {
    ensure_identifier(table)?;
    for filter in &query.filters {
        match filter {
            Filter::Eq(column, _) | Filter::In(column, _) => ensure_identifier(column)?,
            Filter::Search { columns, .. } => {
                for column in columns {
                    ensure_identifier(column)?;
                }
            }
        }
    }
    if let Some(order) = &query.order {
        ensure_identifier(&order.column)?;
    }
    Ok(())
}

pub(crate) fn into_record(value: Value) -> Result<Record, BackendError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(BackendError::UnexpectedShape),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_snake_case_identifiers() {
        assert!(ensure_identifier("unidades_gestoras").is_ok());
        assert!(ensure_identifier("_interno2").is_ok());
    }

    #[test]
    fn rejects_identifiers_that_could_inject_sql() {
        for bad in ["", "Orgaos", "orgaos; DROP TABLE x", "nome--", "1tabela", "a b"] {
            assert!(
                matches!(ensure_identifier(bad), Err(BackendError::InvalidIdentifier(_))),
                "deveria rejeitar '{}'",
                bad
            );
        }
    }

    #[test]
    fn blank_search_terms_do_not_add_filters() {
        let query = Query::new().search(&["nome"], Some("   "));
        assert!(query.filters.is_empty());

        let query = Query::new().search(&["nome"], Some(" saúde "));
        assert_eq!(
            query.filters,
            vec![Filter::Search {
                columns: vec!["nome".to_string()],
                term: "saúde".to_string()
            }]
        );
    }
}
