// src/services/document_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::common::error::PersistenceError;
use crate::db::{Backend, Repository};
use crate::models::documents::{CategoryWithRelations, DocumentCategory, Title};
use crate::models::organization::Organ;

#[derive(Clone)]
pub struct DocumentService {
    categories: Repository<DocumentCategory>,
    organs: Repository<Organ>,
    titles: Repository<Title>,
}

fn linked_ids(ids: impl Iterator<Item = Option<Uuid>>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.flatten().collect();
    ids.sort();
    ids.dedup();
    ids
}

impl DocumentService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            categories: Repository::new(backend.clone()),
            organs: Repository::new(backend.clone()),
            titles: Repository::new(backend),
        }
    }

    /// Categorias com órgão e título resolvidos. Três consultas no total,
    /// independente do número de categorias.
    pub async fn list_with_relations(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<CategoryWithRelations>, PersistenceError> {
        let categories = self.categories.list(search).await?;

        let organ_ids = linked_ids(categories.iter().map(|c| c.orgao_id));
        let title_ids = linked_ids(categories.iter().map(|c| c.titulo_id));

        let organs: HashMap<Uuid, Organ> = self
            .organs
            .list_by_ids(&organ_ids)
            .await?
            .into_iter()
            .map(|o| (o.id, o))
            .collect();
        let titles: HashMap<Uuid, Title> = self
            .titles
            .list_by_ids(&title_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        Ok(categories
            .into_iter()
            .map(|categoria| CategoryWithRelations {
                orgao: categoria.orgao_id.and_then(|id| organs.get(&id).cloned()),
                titulo: categoria.titulo_id.and_then(|id| titles.get(&id).cloned()),
                categoria,
            })
            .collect())
    }
}
