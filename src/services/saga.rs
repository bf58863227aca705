// src/services/saga.rs

use std::fmt::Display;
use std::future::Future;

use async_trait::async_trait;

/// Desfaz o efeito de um passo já concluído.
#[async_trait]
pub trait Compensation: Send + Sync {
    fn describe(&self) -> String;
    async fn compensate(&self) -> anyhow::Result<()>;
}

// Uma operação de várias etapas sem transação: cada passo concluído
// registra sua compensação, e uma falha desfaz os anteriores em ordem
// inversa. Falha ao compensar só vai para o log; o erro devolvido é
// sempre o do passo que falhou.
pub struct Saga {
    name: &'static str,
    completed: Vec<Box<dyn Compensation>>,
}

impl Saga {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            completed: Vec::new(),
        }
    }

    /// Executa `action`. Em caso de sucesso a compensação é montada a
    /// partir do resultado e empilhada; em caso de erro a saga é desfeita.
    pub async fn step<T, E, Fut, C, F>(
        &mut self,
        step: &'static str,
        action: Fut,
        compensation: F,
    ) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        C: Compensation + 'static,
        F: FnOnce(&T) -> C,
    {
        match action.await {
            Ok(value) => {
                self.completed.push(Box::new(compensation(&value)));
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(saga = self.name, passo = step, "Passo falhou: {}", e);
                self.unwind().await;
                Err(e)
            }
        }
    }

    pub async fn unwind(&mut self) {
        if self.completed.is_empty() {
            return;
        }
        tracing::warn!(
            saga = self.name,
            passos = self.completed.len(),
            "Desfazendo passos concluídos"
        );

        while let Some(compensation) = self.completed.pop() {
            if let Err(e) = compensation.compensate().await {
                tracing::error!(
                    saga = self.name,
                    "Falha ao compensar '{}': {}",
                    compensation.describe(),
                    e
                );
            }
        }
    }

    pub fn commit(mut self) {
        tracing::info!(saga = self.name, passos = self.completed.len(), "Saga concluída");
        self.completed.clear();
    }

    pub fn pending(&self) -> usize {
        self.completed.len()
    }
}

impl Drop for Saga {
    fn drop(&mut self) {
        if !self.completed.is_empty() {
            // Não dá para compensar de forma assíncrona aqui.
            tracing::error!(
                saga = self.name,
                passos = self.completed.len(),
                "Saga descartada sem commit nem unwind"
            );
        }
    }
}
