// src/services/user_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;
use crate::db::{Backend, Entity, Repository};
use crate::models::users::{Assignment, NewUser, User, UserInvite, UserWithAssignments};
use crate::services::identity::IdentityProvider;
use crate::services::saga::{Compensation, Saga};

// ---
// Compensações da saga de criação de usuário
// ---
struct RemoveIdentity {
    provider: Arc<dyn IdentityProvider>,
    identity_id: String,
}

#[async_trait]
impl Compensation for RemoveIdentity {
    fn describe(&self) -> String {
        format!("remover identidade {}", self.identity_id)
    }

    async fn compensate(&self) -> anyhow::Result<()> {
        self.provider.remove(&self.identity_id).await?;
        Ok(())
    }
}

struct SoftDeleteRecord<T> {
    repo: Repository<T>,
    id: Uuid,
}

#[async_trait]
impl<T: Entity> Compensation for SoftDeleteRecord<T> {
    fn describe(&self) -> String {
        format!("excluir {} {}", T::LABEL, self.id)
    }

    async fn compensate(&self) -> anyhow::Result<()> {
        self.repo.soft_delete(self.id).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct UserService {
    users: Repository<User>,
    assignments: Repository<Assignment>,
    identity: Arc<dyn IdentityProvider>,
}

impl UserService {
    pub fn new(backend: Arc<dyn Backend>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            users: Repository::new(backend.clone()),
            assignments: Repository::new(backend),
            identity,
        }
    }

    /// Cria identidade, usuário e lotações. Se qualquer passo falhar, os
    /// anteriores são desfeitos e nada fica visível nas listas.
    pub async fn invite_user(&self, invite: UserInvite) -> Result<UserWithAssignments, AppError> {
        invite.validate()?;

        let mut saga = Saga::new("convite de usuário");

        let identity_id = saga
            .step(
                "convidar identidade",
                async {
                    self.identity
                        .invite(&invite.email, &invite.nome)
                        .await
                        .map_err(AppError::from)
                },
                |id: &String| RemoveIdentity {
                    provider: self.identity.clone(),
                    identity_id: id.clone(),
                },
            )
            .await?;

        let new_user = NewUser {
            nome: invite.nome.clone(),
            email: invite.email.clone(),
            cpf: invite.cpf.clone(),
            identidade_id: Some(identity_id),
            ativo: true,
        };
        let usuario = saga
            .step(
                "criar usuário",
                async { self.users.create(&new_user).await.map_err(AppError::from) },
                |user: &User| SoftDeleteRecord {
                    repo: self.users.clone(),
                    id: user.id,
                },
            )
            .await?;

        let mut lotacoes = Vec::with_capacity(invite.lotacoes.len());
        for draft in &invite.lotacoes {
            let new_assignment = draft.for_user(usuario.id);
            let lotacao = saga
                .step(
                    "criar lotação",
                    async {
                        self.assignments
                            .create(&new_assignment)
                            .await
                            .map_err(AppError::from)
                    },
                    |a: &Assignment| SoftDeleteRecord {
                        repo: self.assignments.clone(),
                        id: a.id,
                    },
                )
                .await?;
            lotacoes.push(lotacao);
        }

        saga.commit();
        tracing::info!(usuario = %usuario.id, lotacoes = lotacoes.len(), "✅ Usuário convidado");

        Ok(UserWithAssignments { usuario, lotacoes })
    }

    pub async fn with_assignments(&self, usuario_id: Uuid) -> Result<Option<UserWithAssignments>, AppError> {
        let Some(usuario) = self.users.get_by_id(usuario_id).await? else {
            return Ok(None);
        };
        let lotacoes = self.assignments.list_by_parent(usuario_id).await?;
        Ok(Some(UserWithAssignments { usuario, lotacoes }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryBackend;
    use crate::models::users::AssignmentDraft;
    use crate::services::identity::IdentityError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeIdentity {
        invited: Mutex<Vec<String>>,
        removed: Mutex<Vec<String>>,
        reject: bool,
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentity {
        async fn invite(&self, email: &str, _nome: &str) -> Result<String, IdentityError> {
            if self.reject {
                return Err(IdentityError::Rejected {
                    status: 422,
                    body: "e-mail já cadastrado".into(),
                });
            }
            let id = format!("id-{}", email);
            self.invited.lock().unwrap().push(id.clone());
            Ok(id)
        }

        async fn remove(&self, identity_id: &str) -> Result<(), IdentityError> {
            self.removed.lock().unwrap().push(identity_id.to_string());
            Ok(())
        }
    }

    fn draft(perfil: &str) -> AssignmentDraft {
        AssignmentDraft {
            instituicao_id: Uuid::new_v4(),
            orgao_id: Uuid::new_v4(),
            unidade_gestora_id: Uuid::new_v4(),
            setor_id: Uuid::new_v4(),
            cargo_id: None,
            perfil: perfil.to_string(),
        }
    }

    fn invite(lotacoes: Vec<AssignmentDraft>) -> UserInvite {
        UserInvite {
            nome: "Maria Souza".into(),
            email: "maria@prefeitura.gov.br".into(),
            cpf: None,
            lotacoes,
        }
    }

    #[tokio::test]
    async fn creates_user_with_assignments() {
        let backend = Arc::new(MemoryBackend::new());
        let identity = Arc::new(FakeIdentity::default());
        let service = UserService::new(backend, identity.clone());

        let created = service
            .invite_user(invite(vec![draft("ADMIN"), draft("OPERADOR")]))
            .await
            .unwrap();

        assert_eq!(created.lotacoes.len(), 2);
        assert_eq!(
            created.usuario.identidade_id.as_deref(),
            Some("id-maria@prefeitura.gov.br")
        );
        assert!(identity.removed.lock().unwrap().is_empty());

        let reloaded = service.with_assignments(created.usuario.id).await.unwrap().unwrap();
        assert_eq!(reloaded.lotacoes.len(), 2);
    }

    #[tokio::test]
    async fn identity_rejection_writes_nothing() {
        let backend = Arc::new(MemoryBackend::new());
        let identity = Arc::new(FakeIdentity {
            reject: true,
            ..Default::default()
        });
        let service = UserService::new(backend.clone(), identity);

        let err = service.invite_user(invite(vec![draft("ADMIN")])).await.unwrap_err();
        assert!(matches!(err, AppError::Identity(IdentityError::Rejected { .. })));

        let users: Repository<User> = Repository::new(backend);
        assert!(users.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_invite_is_rejected_before_any_side_effect() {
        let backend = Arc::new(MemoryBackend::new());
        let identity = Arc::new(FakeIdentity::default());
        let service = UserService::new(backend, identity.clone());

        let mut bad = invite(vec![draft("")]);
        bad.email = "não é email".into();

        let err = service.invite_user(bad).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(identity.invited.lock().unwrap().is_empty());
    }

    // Backend que aceita N inserções e depois passa a falhar.
    struct FailAfter {
        inner: MemoryBackend,
        inserts_left: Mutex<usize>,
    }

    #[async_trait]
    impl Backend for FailAfter {
        async fn select(
            &self,
            table: &str,
            query: &crate::db::Query,
        ) -> Result<Vec<crate::db::Record>, crate::common::error::BackendError> {
            self.inner.select(table, query).await
        }

        async fn find(
            &self,
            table: &str,
            id: Uuid,
        ) -> Result<crate::db::Record, crate::common::error::BackendError> {
            self.inner.find(table, id).await
        }

        async fn insert(
            &self,
            table: &str,
            record: crate::db::Record,
        ) -> Result<crate::db::Record, crate::common::error::BackendError> {
            {
                let mut left = self.inserts_left.lock().unwrap();
                if *left == 0 {
                    return Err(crate::common::error::BackendError::Constraint(
                        "lotação inválida".into(),
                    ));
                }
                *left -= 1;
            }
            self.inner.insert(table, record).await
        }

        async fn update(
            &self,
            table: &str,
            id: Uuid,
            patch: crate::db::Record,
        ) -> Result<crate::db::Record, crate::common::error::BackendError> {
            self.inner.update(table, id, patch).await
        }
    }

    #[tokio::test]
    async fn failed_assignment_rolls_back_user_and_identity() {
        // usuário + primeira lotação passam, a segunda falha
        let backend = Arc::new(FailAfter {
            inner: MemoryBackend::new(),
            inserts_left: Mutex::new(2),
        });
        let identity = Arc::new(FakeIdentity::default());
        let service = UserService::new(backend.clone(), identity.clone());

        let err = service
            .invite_user(invite(vec![draft("ADMIN"), draft("OPERADOR")]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));

        let users: Repository<User> = Repository::new(backend.clone());
        let assignments: Repository<Assignment> = Repository::new(backend);
        assert!(users.list(None).await.unwrap().is_empty());
        assert!(assignments.list(None).await.unwrap().is_empty());
        assert_eq!(
            *identity.removed.lock().unwrap(),
            vec!["id-maria@prefeitura.gov.br".to_string()]
        );
    }
}
