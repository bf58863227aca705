// src/db/memory_backend.rs

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::common::error::BackendError;
use crate::db::backend::{
    ensure_identifier, ensure_query_identifiers, Backend, Direction, Filter, Order, Query, Record,
};

/// Backend em memória com a mesma semântica do `PgBackend`: gera id e
/// timestamps, atualiza `updated_at` e nunca remove linhas. Usado nos
/// testes e para rodar o servidor sem banco (`BACKEND=memory`).
#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<HashMap<String, Vec<Record>>>,
    failing: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enquanto ligado, toda operação falha com `BackendError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    fn check_available(&self) -> Result<(), BackendError> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(BackendError::Unavailable("falha simulada".into()));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<Record>>>, BackendError> {
        self.tables
            .lock()
            .map_err(|_| BackendError::Unavailable("estado interno corrompido".into()))
    }
}

fn id_of(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

fn matches(record: &Record, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(column, value) => record.get(column) == Some(&value.to_json()),
        Filter::In(column, ids) => record
            .get(column)
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .is_some_and(|id| ids.contains(&id)),
        Filter::Search { columns, term } => {
            let term = term.to_lowercase();
            columns.iter().any(|column| match record.get(column) {
                Some(Value::String(s)) => s.to_lowercase().contains(&term),
                Some(Value::Number(n)) => n.to_string().contains(&term),
                _ => false,
            })
        }
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>, numeric_text: bool) -> Ordering {
    match (a, b) {
        (Some(Value::String(x)), Some(Value::String(y))) => {
            if numeric_text {
                x.len().cmp(&y.len()).then_with(|| x.cmp(y))
            } else {
                x.to_lowercase().cmp(&y.to_lowercase())
            }
        }
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        // Nulos por último, como no Postgres em ordem ascendente.
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn sort(rows: &mut [Record], order: &Order) {
    rows.sort_by(|a, b| {
        let ordering = compare(a.get(&order.column), b.get(&order.column), order.numeric_text);
        match order.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    });
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Record>, BackendError> {
        self.check_available()?;
        ensure_query_identifiers(table, query)?;

        let tables = self.lock()?;
        let mut rows: Vec<Record> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| matches(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            sort(&mut rows, order);
        }
        if let Some(limit) = query.limit {
            rows.truncate(usize::try_from(limit).unwrap_or(0));
        }

        Ok(rows)
    }

    async fn find(&self, table: &str, id: Uuid) -> Result<Record, BackendError> {
        self.check_available()?;
        ensure_identifier(table)?;

        let id = id.to_string();
        let tables = self.lock()?;
        tables
            .get(table)
            .and_then(|rows| rows.iter().find(|row| id_of(row) == Some(id.as_str())))
            .cloned()
            .ok_or(BackendError::NotFound)
    }

    async fn insert(&self, table: &str, mut record: Record) -> Result<Record, BackendError> {
        self.check_available()?;
        ensure_identifier(table)?;
        for column in record.keys() {
            ensure_identifier(column)?;
        }

        let now = Value::String(Utc::now().to_rfc3339());
        record
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        record.entry("excluido").or_insert(Value::Bool(false));
        record.insert("created_at".into(), now.clone());
        record.insert("updated_at".into(), now);

        let mut tables = self.lock()?;
        let rows = tables.entry(table.to_string()).or_default();
        if rows.iter().any(|row| id_of(row) == id_of(&record)) {
            return Err(BackendError::Constraint("chave primária duplicada".into()));
        }
        rows.push(record.clone());

        Ok(record)
    }

    async fn update(&self, table: &str, id: Uuid, patch: Record) -> Result<Record, BackendError> {
        self.check_available()?;
        ensure_identifier(table)?;
        for column in patch.keys() {
            ensure_identifier(column)?;
        }

        let id = id.to_string();
        let mut tables = self.lock()?;
        let row = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|row| id_of(row) == Some(id.as_str())))
            .ok_or(BackendError::NotFound)?;

        // Patch vazio não altera nada, nem `updated_at`
        if patch.is_empty() {
            return Ok(row.clone());
        }

        for (column, value) in patch {
            row.insert(column, value);
        }
        row.insert("updated_at".into(), Value::String(Utc::now().to_rfc3339()));

        Ok(row.clone())
    }
}
