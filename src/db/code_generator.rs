// src/db/code_generator.rs

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::db::backend::{Backend, Direction, Query};
use crate::db::repository::Coded;

/// Completa com zeros à esquerda até `width`. Valores mais longos saem
/// sem corte.
pub fn pad_code(value: u64, width: usize) -> String {
    format!("{:0>width$}", value, width = width)
}

fn parse_code(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

// Sugere o próximo código de um escopo: maior código existente + 1.
//
// É só uma sugestão para o formulário: não reserva nada, e duas criações
// simultâneas no mesmo escopo podem receber o mesmo código. Qualquer
// falha vira "1" com zeros à esquerda.
#[derive(Clone)]
pub struct CodeGenerator {
    backend: Arc<dyn Backend>,
}

impl CodeGenerator {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn next_code(
        &self,
        table: &str,
        width: usize,
        parent_field: Option<&str>,
        parent_id: Option<Uuid>,
    ) -> String {
        let first = pad_code(1, width);

        let mut query = Query::new().eq("excluido", false);
        if let (Some(field), Some(id)) = (parent_field, parent_id) {
            query = query.eq(field, id);
        }
        let query = query
            .order_by_numeric_text("codigo", Direction::Desc)
            .limit(1);

        let rows = match self.backend.select(table, &query).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(tabela = table, "Falha ao gerar próximo código: {}", e);
                return first;
            }
        };

        let Some(highest) = rows.first().and_then(|row| row.get("codigo")) else {
            return first;
        };

        match parse_code(highest).and_then(|n| n.checked_add(1)) {
            Some(next) => pad_code(next, width),
            None => {
                tracing::warn!(
                    tabela = table,
                    codigo = %highest,
                    "Código existente não é numérico; reiniciando sugestão"
                );
                first
            }
        }
    }

    /// Atalho tipado: tabela, largura e coluna de escopo vêm da entidade.
    pub async fn next_code_for<T: Coded>(&self, parent_id: Option<Uuid>) -> String {
        self.next_code(T::TABLE, T::CODE_WIDTH, T::CODE_SCOPE, parent_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_backend::MemoryBackend;
    use crate::db::repository::Repository;
    use crate::models::organization::{Institution, Organ};
    use serde_json::json;

    fn setup() -> (Arc<MemoryBackend>, CodeGenerator, Arc<dyn Backend>) {
        let backend = Arc::new(MemoryBackend::new());
        let dyn_backend: Arc<dyn Backend> = backend.clone();
        (backend, CodeGenerator::new(dyn_backend.clone()), dyn_backend)
    }

    #[test]
    fn pads_to_width_without_truncating() {
        assert_eq!(pad_code(1, 4), "0001");
        assert_eq!(pad_code(42, 3), "042");
        assert_eq!(pad_code(12345, 4), "12345");
        assert_eq!(pad_code(7, 0), "7");
    }

    #[tokio::test]
    async fn empty_scope_starts_at_one() {
        let (_, generator, _) = setup();
        assert_eq!(generator.next_code("orgaos", 4, None, None).await, "0001");
    }

    #[tokio::test]
    async fn each_persisted_code_advances_the_next_suggestion() {
        let (_, generator, backend) = setup();
        let repo: Repository<Institution> = Repository::new(backend);

        let mut previous = 0;
        for _ in 0..3 {
            let code = generator.next_code_for::<Institution>(None).await;
            let value: u64 = code.parse().unwrap();
            assert!(value > previous);
            assert_eq!(code.len(), 3);
            previous = value;

            repo.create(&json!({ "codigo": code, "nome": "Instituição", "ativo": true }))
                .await
                .unwrap();
        }

        assert_eq!(generator.next_code("instituicoes", 3, None, None).await, "004");
    }

    #[tokio::test]
    async fn scopes_are_isolated_by_parent() {
        let (_, generator, backend) = setup();
        let organs: Repository<Organ> = Repository::new(backend);
        let parent_a = Uuid::new_v4();
        let parent_b = Uuid::new_v4();

        organs
            .create(&json!({ "instituicao_id": parent_a, "codigo": "0005", "nome": "A", "ativo": true }))
            .await
            .unwrap();

        assert_eq!(generator.next_code_for::<Organ>(Some(parent_b)).await, "0001");
        assert_eq!(generator.next_code_for::<Organ>(Some(parent_a)).await, "0006");
        // sem escopo, a tabela inteira conta
        assert_eq!(generator.next_code("orgaos", 4, None, None).await, "0006");
    }

    #[tokio::test]
    async fn deleted_records_do_not_count() {
        let (_, generator, backend) = setup();
        let repo: Repository<Institution> = Repository::new(backend);

        repo.create(&json!({ "codigo": "001", "nome": "A", "ativo": true }))
            .await
            .unwrap();
        let removed = repo
            .create(&json!({ "codigo": "002", "nome": "B", "ativo": true }))
            .await
            .unwrap();
        repo.soft_delete(removed.id).await.unwrap();

        assert_eq!(generator.next_code_for::<Institution>(None).await, "002");
    }

    #[tokio::test]
    async fn degrades_to_first_code_when_backend_fails() {
        let (memory, generator, _) = setup();
        memory.set_failing(true);

        assert_eq!(generator.next_code("setores", 4, None, None).await, "0001");
        assert_eq!(generator.next_code("bancos", 3, None, None).await, "001");
    }

    #[tokio::test]
    async fn degrades_to_first_code_when_highest_code_is_not_numeric() {
        let (_, generator, backend) = setup();
        let repo: Repository<Institution> = Repository::new(backend);
        repo.create(&json!({ "codigo": "ABC1", "nome": "A", "ativo": true }))
            .await
            .unwrap();

        assert_eq!(generator.next_code("instituicoes", 4, None, None).await, "0001");
    }

    #[tokio::test]
    async fn codes_that_outgrow_the_width_keep_increasing() {
        let (_, generator, backend) = setup();
        let repo: Repository<Institution> = Repository::new(backend);
        for codigo in ["998", "999"] {
            repo.create(&json!({ "codigo": codigo, "nome": "A", "ativo": true }))
                .await
                .unwrap();
        }

        let next = generator.next_code_for::<Institution>(None).await;
        assert_eq!(next, "1000");
        repo.create(&json!({ "codigo": next, "nome": "A", "ativo": true }))
            .await
            .unwrap();

        assert_eq!(generator.next_code_for::<Institution>(None).await, "1001");
    }

    #[tokio::test]
    async fn wider_code_ranks_above_a_shorter_one_typed_by_hand() {
        let (_, generator, backend) = setup();
        let organs: Repository<Organ> = Repository::new(backend);
        let parent = Uuid::new_v4();

        // "12" foi digitado sem zeros à esquerda; o comprimento decide antes do valor
        for codigo in ["0005", "12"] {
            organs
                .create(&json!({ "instituicao_id": parent, "codigo": codigo, "nome": "A", "ativo": true }))
                .await
                .unwrap();
        }

        assert_eq!(generator.next_code_for::<Organ>(Some(parent)).await, "0006");
    }
}
