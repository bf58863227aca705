// src/services/identity.rs

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("provedor de identidade não configurado")]
    NotConfigured,

    #[error("falha de comunicação com o provedor de identidade: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provedor de identidade recusou a operação ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// O serviço externo de autenticação. Só o que a criação de usuários
/// precisa: convidar um e-mail e remover a identidade criada.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Convida o e-mail e devolve o id da identidade criada.
    async fn invite(&self, email: &str, nome: &str) -> Result<String, IdentityError>;

    async fn remove(&self, identity_id: &str) -> Result<(), IdentityError>;
}

// Cliente da API administrativa de um servidor compatível com GoTrue.
// Usa a chave de serviço nos dois cabeçalhos que o servidor exige.
#[derive(Clone)]
pub struct GoTrueIdentityProvider {
    base_url: String,
    service_key: String,
    client: reqwest::Client,
}

impl GoTrueIdentityProvider {
    pub fn new(base_url: &str, service_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            client: reqwest::Client::new(),
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, IdentityError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(IdentityError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[derive(Deserialize)]
struct InvitedUser {
    id: String,
}

#[async_trait]
impl IdentityProvider for GoTrueIdentityProvider {
    async fn invite(&self, email: &str, nome: &str) -> Result<String, IdentityError> {
        let response = self
            .client
            .post(format!("{}/invite", self.base_url))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&serde_json::json!({
                "email": email,
                "data": { "nome": nome }
            }))
            .send()
            .await?;

        let invited: InvitedUser = Self::check(response).await?.json().await?;
        tracing::info!(identidade = %invited.id, "Convite enviado ao provedor de identidade");
        Ok(invited.id)
    }

    async fn remove(&self, identity_id: &str) -> Result<(), IdentityError> {
        let response = self
            .client
            .delete(format!("{}/admin/users/{}", self.base_url, identity_id))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await?;

        Self::check(response).await?;
        tracing::info!(identidade = identity_id, "Identidade removida do provedor");
        Ok(())
    }
}

/// Usado quando IDENTITY_URL não está definido: convites falham sem
/// efeito colateral.
#[derive(Clone, Default)]
pub struct DisabledIdentityProvider;

#[async_trait]
impl IdentityProvider for DisabledIdentityProvider {
    async fn invite(&self, _email: &str, _nome: &str) -> Result<String, IdentityError> {
        Err(IdentityError::NotConfigured)
    }

    async fn remove(&self, _identity_id: &str) -> Result<(), IdentityError> {
        Err(IdentityError::NotConfigured)
    }
}
