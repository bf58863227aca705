// src/db/repository.rs

use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::common::error::{BackendError, PersistenceError};
use crate::db::backend::{into_record, Backend, Direction, Query, Record};

/// Campos que nunca são aceitos do chamador em create/update.
pub const PROTECTED_FIELDS: [&str; 4] = ["id", "created_at", "updated_at", "excluido"];

/// Uma tabela de cadastro com exclusão lógica (`excluido`).
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static str;
    /// Nome usado em logs e mensagens de erro ("órgão", "setor").
    const LABEL: &'static str;
    const SEARCH_COLUMNS: &'static [&'static str] = &["nome"];
    const ORDER_COLUMN: &'static str = "nome";
    const ORDER_DIRECTION: Direction = Direction::Asc;

    fn id(&self) -> Uuid;
}

/// Entidades filhas na hierarquia, listáveis pelo id do pai.
pub trait Scoped: Entity {
    const PARENT_COLUMN: &'static str;
}

/// Entidades com `codigo` sequencial de largura fixa.
pub trait Coded: Entity {
    const CODE_WIDTH: usize;
    /// Coluna que delimita o escopo da numeração (ex.: códigos de órgão
    /// recomeçam em cada instituição).
    const CODE_SCOPE: Option<&'static str> = None;
}

// O repositório genérico: as cinco operações do contrato, iguais para
// toda tabela. Não há cache; cada chamada vai ao backend.
pub struct Repository<T> {
    backend: Arc<dyn Backend>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            _entity: PhantomData,
        }
    }

    fn fail(operation: &'static str, source: BackendError) -> PersistenceError {
        PersistenceError::new(T::LABEL, operation, source)
    }

    fn decode(operation: &'static str, record: Record) -> Result<T, PersistenceError> {
        serde_json::from_value(Value::Object(record))
            .map_err(|e| Self::fail(operation, BackendError::Serialization(e)))
    }

    /// Serializa os campos do chamador e remove os protegidos.
    fn writable_fields<P: Serialize>(
        operation: &'static str,
        fields: &P,
    ) -> Result<Record, PersistenceError> {
        let value = serde_json::to_value(fields)
            .map_err(|e| Self::fail(operation, BackendError::Serialization(e)))?;
        let mut record = into_record(value).map_err(|e| Self::fail(operation, e))?;

        for field in PROTECTED_FIELDS {
            record.remove(field);
        }
        Ok(record)
    }

    fn active_query(search: Option<&str>) -> Query {
        Query::new()
            .eq("excluido", false)
            .search(T::SEARCH_COLUMNS, search)
            .order_by(T::ORDER_COLUMN, T::ORDER_DIRECTION)
    }

    async fn fetch(&self, operation: &'static str, query: Query) -> Result<Vec<T>, PersistenceError> {
        let rows = self
            .backend
            .select(T::TABLE, &query)
            .await
            .map_err(|e| Self::fail(operation, e))?;

        rows.into_iter().map(|row| Self::decode(operation, row)).collect()
    }

    /// Lista os registros não excluídos, com busca textual opcional.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<T>, PersistenceError> {
        self.fetch("listar", Self::active_query(search)).await
    }

    /// Registros não excluídos entre os ids informados (montagem de relações).
    pub async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<T>, PersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch("listar", Self::active_query(None).any_of("id", ids))
            .await
    }

    /// `None` tanto para id inexistente quanto para registro excluído.
    /// Só erros de transporte/backend viram `Err`.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<T>, PersistenceError> {
        let record = match self.backend.find(T::TABLE, id).await {
            Ok(record) => record,
            Err(BackendError::NotFound) => return Ok(None),
            Err(e) => return Err(Self::fail("buscar", e)),
        };

        let excluded = record
            .get("excluido")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if excluded {
            return Ok(None);
        }

        Self::decode("buscar", record).map(Some)
    }

    pub async fn create<P: Serialize>(&self, fields: &P) -> Result<T, PersistenceError> {
        let mut record = Self::writable_fields("criar", fields)?;
        record.insert("excluido".into(), Value::Bool(false));

        let row = self
            .backend
            .insert(T::TABLE, record)
            .await
            .map_err(|e| Self::fail("criar", e))?;

        let entity = Self::decode("criar", row)?;
        tracing::info!(entidade = T::LABEL, id = %entity.id(), "Registro criado");
        Ok(entity)
    }

    /// Atualização parcial. `id`, timestamps e `excluido` enviados pelo
    /// chamador são descartados silenciosamente.
    pub async fn update<P: Serialize>(&self, id: Uuid, fields: &P) -> Result<T, PersistenceError> {
        let patch = Self::writable_fields("atualizar", fields)?;

        if self.get_by_id(id).await?.is_none() {
            return Err(Self::fail("atualizar", BackendError::NotFound));
        }

        let row = self
            .backend
            .update(T::TABLE, id, patch)
            .await
            .map_err(|e| Self::fail("atualizar", e))?;

        Self::decode("atualizar", row)
    }

    /// Marca `excluido = true`. Devolve `true` só quando um registro ativo
    /// foi de fato excluído; id inexistente ou já excluído devolve `false`.
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool, PersistenceError> {
        let current = match self.backend.find(T::TABLE, id).await {
            Ok(record) => record,
            Err(BackendError::NotFound) => return Ok(false),
            Err(e) => return Err(Self::fail("excluir", e)),
        };
        if current.get("excluido").and_then(Value::as_bool).unwrap_or(false) {
            return Ok(false);
        }

        let mut patch = Record::new();
        patch.insert("excluido".into(), Value::Bool(true));

        match self.backend.update(T::TABLE, id, patch).await {
            Ok(_) => {
                tracing::info!(entidade = T::LABEL, %id, "Registro excluído logicamente");
                Ok(true)
            }
            Err(BackendError::NotFound) => Ok(false),
            Err(e) => Err(Self::fail("excluir", e)),
        }
    }
}

impl<T: Scoped> Repository<T> {
    /// Filhos não excluídos de um pai, na ordem padrão da entidade.
    pub async fn list_by_parent(&self, parent_id: Uuid) -> Result<Vec<T>, PersistenceError> {
        self.list_by_parent_matching(parent_id, None).await
    }

    pub async fn list_by_parent_matching(
        &self,
        parent_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<T>, PersistenceError> {
        let query = Self::active_query(search).eq(T::PARENT_COLUMN, parent_id);
        self.fetch("listar", query).await
    }
}
