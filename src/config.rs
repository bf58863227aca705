// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{Backend, CodeGenerator, Entity, MemoryBackend, PgBackend, Repository},
    services::{
        identity::{DisabledIdentityProvider, GoTrueIdentityProvider, IdentityProvider},
        AuditService, DocumentService, UserService,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Postgres,
    // Sem banco: útil para desenvolvimento local e testes
    Memory,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: BackendKind,
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub identity_url: Option<String>,
    pub identity_service_key: Option<String>,
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = match non_empty("BACKEND").as_deref() {
            None | Some("postgres") => BackendKind::Postgres,
            Some("memory") => BackendKind::Memory,
            Some(other) => anyhow::bail!("BACKEND inválido: '{}' (use 'postgres' ou 'memory')", other),
        };

        let database_url = non_empty("DATABASE_URL");
        if backend == BackendKind::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL deve ser definida");
        }

        let db_max_connections = match non_empty("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: '{}'", v))?,
            None => 5,
        };

        Ok(Self {
            backend,
            database_url,
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections,
            identity_url: non_empty("IDENTITY_URL"),
            identity_service_key: non_empty("IDENTITY_SERVICE_KEY"),
        })
    }

    fn identity_provider(&self) -> Arc<dyn IdentityProvider> {
        match (&self.identity_url, &self.identity_service_key) {
            (Some(url), Some(key)) => Arc::new(GoTrueIdentityProvider::new(url, key.clone())),
            _ => {
                tracing::warn!("⚠️ Provedor de identidade não configurado; convites de usuário ficam indisponíveis");
                Arc::new(DisabledIdentityProvider)
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub code_generator: CodeGenerator,
    pub audit_service: AuditService,
    pub user_service: UserService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let backend: Arc<dyn Backend> = match settings.backend {
            BackendKind::Memory => {
                tracing::warn!("⚠️ Usando backend em memória: os dados somem ao encerrar");
                Arc::new(MemoryBackend::new())
            }
            BackendKind::Postgres => {
                let database_url = settings
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL deve ser definida")?;

                // Conecta ao banco de dados, usando '?' para propagar erros
                let db_pool = PgPoolOptions::new()
                    .max_connections(settings.db_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!()
                    .run(&db_pool)
                    .await
                    .context("Falha ao rodar as migrações do banco de dados")?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(PgBackend::new(db_pool))
            }
        };

        Ok(Self::with_backend(backend, settings.identity_provider()))
    }

    // --- Monta o gráfico de dependências ---
    // Um único backend, compartilhado por todos os repositórios e serviços.
    pub fn with_backend(backend: Arc<dyn Backend>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            code_generator: CodeGenerator::new(backend.clone()),
            audit_service: AuditService::new(backend.clone()),
            user_service: UserService::new(backend.clone(), identity),
            document_service: DocumentService::new(backend.clone()),
            backend,
        }
    }

    pub fn repository<T: Entity>(&self) -> Repository<T> {
        Repository::new(self.backend.clone())
    }
}
