// src/cascade.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::common::error::PersistenceError;
use crate::db::{Backend, Repository};
use crate::models::organization::{Institution, ManagementUnit, Organ, Position, Sector};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CascadeOption {
    pub id: Uuid,
    pub label: String,
}

/// De onde vêm as opções de cada nível.
#[async_trait]
pub trait OptionSource: Send + Sync {
    fn depth(&self) -> usize;

    /// Opções do primeiro nível (não dependem de ninguém).
    async fn roots(&self) -> Result<Vec<CascadeOption>, PersistenceError>;

    /// Opções do nível `level` dado o valor escolhido no nível anterior.
    async fn children(&self, level: usize, parent_id: Uuid) -> Result<Vec<CascadeOption>, PersistenceError>;
}

/// Uma busca pendente de opções. Só é aplicada se o nível não tiver
/// mudado desde que foi emitida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub level: usize,
    pub parent_id: Uuid,
    generation: u64,
}

#[derive(Debug, Default)]
struct Level {
    selected: Option<Uuid>,
    options: Vec<CascadeOption>,
    loading: bool,
    generation: u64,
}

impl Level {
    fn reset(&mut self) {
        self.selected = None;
        self.options.clear();
        self.loading = false;
        self.generation += 1;
    }
}

// Seleção encadeada: escolher um valor num nível limpa todos os níveis
// abaixo dele e pede as opções do nível seguinte, filtradas pelo valor
// escolhido. Um nível fica desabilitado enquanto o pai não tiver seleção.
#[derive(Debug)]
pub struct CascadeChain {
    levels: Vec<Level>,
}

impl CascadeChain {
    pub fn new(depth: usize) -> Self {
        Self {
            levels: (0..depth).map(|_| Level::default()).collect(),
        }
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn set_root_options(&mut self, options: Vec<CascadeOption>) {
        if let Some(root) = self.levels.first_mut() {
            root.options = options;
            root.loading = false;
        }
    }

    /// Devolve o ticket da busca que o chamador deve fazer, ou `None`
    /// quando não há nada a buscar (valor repetido, limpeza, último nível).
    pub fn select(&mut self, level: usize, value: Option<Uuid>) -> Option<FetchTicket> {
        if level >= self.levels.len() || !self.is_enabled(level) {
            return None;
        }
        if self.levels[level].selected == value {
            return None;
        }

        self.levels[level].selected = value;
        for deeper in &mut self.levels[level + 1..] {
            deeper.reset();
        }

        let parent_id = value?;
        let next = self.levels.get_mut(level + 1)?;
        next.loading = true;

        Some(FetchTicket {
            level: level + 1,
            parent_id,
            generation: next.generation,
        })
    }

    /// Aplica o resultado de uma busca. Respostas atrasadas (de uma
    /// seleção que já mudou) são descartadas e retornam `false`.
    pub fn resolve(&mut self, ticket: FetchTicket, options: Vec<CascadeOption>) -> bool {
        let Some(level) = self.current_level(ticket) else {
            tracing::debug!(nivel = ticket.level, "Resposta obsoleta descartada");
            return false;
        };
        level.options = options;
        level.loading = false;
        true
    }

    pub fn fail(&mut self, ticket: FetchTicket) -> bool {
        let Some(level) = self.current_level(ticket) else {
            return false;
        };
        level.options.clear();
        level.loading = false;
        true
    }

    fn current_level(&mut self, ticket: FetchTicket) -> Option<&mut Level> {
        self.levels
            .get_mut(ticket.level)
            .filter(|level| level.generation == ticket.generation)
    }

    pub fn is_enabled(&self, level: usize) -> bool {
        match level {
            0 => !self.levels.is_empty(),
            n => self.levels.get(n - 1).is_some_and(|parent| parent.selected.is_some()),
        }
    }

    pub fn selected(&self, level: usize) -> Option<Uuid> {
        self.levels.get(level).and_then(|l| l.selected)
    }

    pub fn options(&self, level: usize) -> &[CascadeOption] {
        self.levels.get(level).map(|l| l.options.as_slice()).unwrap_or(&[])
    }

    pub fn is_loading(&self, level: usize) -> bool {
        self.levels.get(level).is_some_and(|l| l.loading)
    }

    /// Carrega o primeiro nível.
    pub async fn load_roots(&mut self, source: &dyn OptionSource) -> Result<(), PersistenceError> {
        let options = source.roots().await?;
        self.set_root_options(options);
        Ok(())
    }

    /// `select` + busca + `resolve`, para quem é dono exclusivo da cadeia.
    pub async fn choose(
        &mut self,
        source: &dyn OptionSource,
        level: usize,
        value: Option<Uuid>,
    ) -> Result<(), PersistenceError> {
        let Some(ticket) = self.select(level, value) else {
            return Ok(());
        };

        match source.children(ticket.level, ticket.parent_id).await {
            Ok(options) => {
                self.resolve(ticket, options);
                Ok(())
            }
            Err(e) => {
                self.fail(ticket);
                Err(e)
            }
        }
    }
}

// ---
// Hierarquia organizacional como fonte de opções
// ---
pub const NIVEL_INSTITUICAO: usize = 0;
pub const NIVEL_ORGAO: usize = 1;
pub const NIVEL_UNIDADE_GESTORA: usize = 2;
pub const NIVEL_SETOR: usize = 3;
pub const NIVEL_CARGO: usize = 4;

fn option(id: Uuid, codigo: &str, nome: &str) -> CascadeOption {
    CascadeOption {
        id,
        label: format!("{} - {}", codigo, nome),
    }
}

/// Instituição → Órgão → Unidade Gestora → Setor → Cargo.
#[derive(Clone)]
pub struct OrganizationTree {
    institutions: Repository<Institution>,
    organs: Repository<Organ>,
    units: Repository<ManagementUnit>,
    sectors: Repository<Sector>,
    positions: Repository<Position>,
}

impl OrganizationTree {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            institutions: Repository::new(backend.clone()),
            organs: Repository::new(backend.clone()),
            units: Repository::new(backend.clone()),
            sectors: Repository::new(backend.clone()),
            positions: Repository::new(backend),
        }
    }

    pub fn chain(&self) -> CascadeChain {
        CascadeChain::new(self.depth())
    }
}

#[async_trait]
impl OptionSource for OrganizationTree {
    fn depth(&self) -> usize {
        NIVEL_CARGO + 1
    }

    async fn roots(&self) -> Result<Vec<CascadeOption>, PersistenceError> {
        let rows = self.institutions.list(None).await?;
        Ok(rows.iter().map(|r| option(r.id, &r.codigo, &r.nome)).collect())
    }

    async fn children(&self, level: usize, parent_id: Uuid) -> Result<Vec<CascadeOption>, PersistenceError> {
        let options = match level {
            NIVEL_ORGAO => self
                .organs
                .list_by_parent(parent_id)
                .await?
                .iter()
                .map(|r| option(r.id, &r.codigo, &r.nome))
                .collect(),
            NIVEL_UNIDADE_GESTORA => self
                .units
                .list_by_parent(parent_id)
                .await?
                .iter()
                .map(|r| option(r.id, &r.codigo, &r.nome))
                .collect(),
            NIVEL_SETOR => self
                .sectors
                .list_by_parent(parent_id)
                .await?
                .iter()
                .map(|r| option(r.id, &r.codigo, &r.nome))
                .collect(),
            NIVEL_CARGO => self
                .positions
                .list_by_parent(parent_id)
                .await?
                .iter()
                .map(|r| option(r.id, &r.codigo, &r.nome))
                .collect(),
            _ => Vec::new(),
        };
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryBackend;
    use serde_json::json;

    fn opts(labels: &[&str]) -> Vec<CascadeOption> {
        labels
            .iter()
            .map(|l| CascadeOption {
                id: Uuid::new_v4(),
                label: l.to_string(),
            })
            .collect()
    }

    #[test]
    fn selecting_a_value_clears_deeper_levels_and_requests_the_next() {
        let mut chain = CascadeChain::new(4);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let ticket = chain.select(0, Some(a)).unwrap();
        assert_eq!(ticket.level, 1);
        assert_eq!(ticket.parent_id, a);
        assert!(chain.is_loading(1));
        assert!(chain.resolve(ticket, opts(&["x", "y"])));

        let t2 = chain.select(1, Some(b)).unwrap();
        assert!(chain.resolve(t2, opts(&["z"])));
        chain.select(2, Some(Uuid::new_v4()));

        // trocar o nível 0 zera 1, 2 e 3
        let other = Uuid::new_v4();
        let t3 = chain.select(0, Some(other)).unwrap();
        assert_eq!(chain.selected(1), None);
        assert_eq!(chain.selected(2), None);
        assert!(chain.options(2).is_empty());
        assert!(chain.options(1).is_empty());
        assert!(chain.is_loading(1));
        assert_eq!(t3.parent_id, other);
    }

    #[test]
    fn reselecting_the_same_value_is_a_no_op() {
        let mut chain = CascadeChain::new(3);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let ticket = chain.select(0, Some(a)).unwrap();
        chain.resolve(ticket, opts(&["x"]));
        let ticket = chain.select(1, Some(b)).unwrap();
        chain.resolve(ticket, opts(&["y"]));

        assert!(chain.select(0, Some(a)).is_none());
        assert_eq!(chain.selected(1), Some(b));
        assert_eq!(chain.options(1).len(), 1);
        assert_eq!(chain.options(2).len(), 1);
    }

    #[test]
    fn clearing_a_level_empties_the_next_without_fetching() {
        let mut chain = CascadeChain::new(3);
        let ticket = chain.select(0, Some(Uuid::new_v4())).unwrap();
        chain.resolve(ticket, opts(&["x"]));

        assert!(chain.select(0, None).is_none());
        assert!(chain.options(1).is_empty());
        assert!(!chain.is_loading(1));
        assert!(!chain.is_enabled(1));
    }

    #[test]
    fn levels_are_disabled_until_the_parent_has_a_selection() {
        let mut chain = CascadeChain::new(3);
        assert!(chain.is_enabled(0));
        assert!(!chain.is_enabled(1));
        assert!(chain.select(1, Some(Uuid::new_v4())).is_none());

        chain.select(0, Some(Uuid::new_v4()));
        assert!(chain.is_enabled(1));
        assert!(!chain.is_enabled(2));
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut chain = CascadeChain::new(2);
        let first = chain.select(0, Some(Uuid::new_v4())).unwrap();
        let second = chain.select(0, Some(Uuid::new_v4())).unwrap();

        assert!(chain.resolve(second, opts(&["novo"])));
        assert!(!chain.resolve(first, opts(&["antigo"])));
        assert!(!chain.fail(first));
        assert_eq!(chain.options(1)[0].label, "novo");
    }

    #[test]
    fn selecting_in_the_last_level_requests_nothing() {
        let mut chain = CascadeChain::new(2);
        chain.select(0, Some(Uuid::new_v4()));
        assert!(chain.select(1, Some(Uuid::new_v4())).is_none());
    }

    #[tokio::test]
    async fn organization_tree_drives_the_chain() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
        let institutions: Repository<Institution> = Repository::new(backend.clone());
        let organs: Repository<Organ> = Repository::new(backend.clone());

        let inst = institutions
            .create(&json!({ "codigo": "001", "nome": "Prefeitura", "ativo": true }))
            .await
            .unwrap();
        let other = institutions
            .create(&json!({ "codigo": "002", "nome": "Câmara", "ativo": true }))
            .await
            .unwrap();
        organs
            .create(&json!({ "instituicao_id": inst.id, "codigo": "0001", "nome": "Saúde", "ativo": true }))
            .await
            .unwrap();

        let tree = OrganizationTree::new(backend);
        let mut chain = tree.chain();
        chain.load_roots(&tree).await.unwrap();
        assert_eq!(chain.options(NIVEL_INSTITUICAO).len(), 2);

        chain.choose(&tree, NIVEL_INSTITUICAO, Some(inst.id)).await.unwrap();
        assert_eq!(chain.options(NIVEL_ORGAO)[0].label, "0001 - Saúde");
        assert!(!chain.is_loading(NIVEL_ORGAO));

        chain.choose(&tree, NIVEL_INSTITUICAO, Some(other.id)).await.unwrap();
        assert!(chain.options(NIVEL_ORGAO).is_empty());
        assert!(!chain.is_enabled(NIVEL_UNIDADE_GESTORA));
    }
}
