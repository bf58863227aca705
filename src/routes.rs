// src/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    config::AppState,
    handlers::{
        self,
        resource::{crud, scoped_crud, with_next_code},
    },
    models::{documents::*, finance::*, organization::*, users::*},
};

pub fn router(app_state: AppState) -> Router {
    // Hierarquia organizacional (todos aceitam ?parentId= exceto a raiz)
    let institution_routes = with_next_code::<Institution>(crud::<Institution>());
    let organ_routes = with_next_code::<Organ>(scoped_crud::<Organ>());
    let unit_routes = with_next_code::<ManagementUnit>(scoped_crud::<ManagementUnit>());
    let sector_routes = with_next_code::<Sector>(scoped_crud::<Sector>());
    let position_routes = with_next_code::<Position>(scoped_crud::<Position>());

    let user_routes = crud::<User>()
        .route("/convites", post(handlers::users::invite_user))
        .route("/{id}/lotacoes", get(handlers::users::get_with_assignments));

    let category_routes = with_next_code::<DocumentCategory>(crud::<DocumentCategory>()).route(
        "/com-relacoes",
        get(handlers::documents::list_categories_with_relations),
    );

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/logs-auditoria", get(handlers::audit::list_logs))
        .nest("/api/instituicoes", institution_routes)
        .nest("/api/orgaos", organ_routes)
        .nest("/api/unidades-gestoras", unit_routes)
        .nest("/api/setores", sector_routes)
        .nest("/api/cargos", position_routes)
        .nest("/api/usuarios", user_routes)
        .nest("/api/lotacoes", scoped_crud::<Assignment>())
        .nest("/api/perfil-permissoes", crud::<RolePermission>())
        .nest("/api/bancos", with_next_code::<Bank>(crud::<Bank>()))
        .nest("/api/agencias", with_next_code::<Agency>(scoped_crud::<Agency>()))
        .nest("/api/credores", with_next_code::<Creditor>(crud::<Creditor>()))
        .nest("/api/exercicios-financeiros", scoped_crud::<FinancialYear>())
        .nest("/api/leis", with_next_code::<Law>(crud::<Law>()))
        .nest("/api/titulos", with_next_code::<Title>(scoped_crud::<Title>()))
        .nest("/api/categorias-documento", category_routes)
        .nest(
            "/api/subcategorias-documento",
            with_next_code::<DocumentSubcategory>(scoped_crud::<DocumentSubcategory>()),
        )
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Backend, MemoryBackend};
    use crate::services::identity::DisabledIdentityProvider;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
        router(AppState::with_backend(backend, Arc::new(DisabledIdentityProvider)))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_check_responds() {
        let app = app();
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn institution_to_organ_lifecycle() {
        let app = app();

        let (status, code) = send(&app, Method::GET, "/api/instituicoes/proximo-codigo", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(code["codigo"], "001");

        let (status, inst) = send(
            &app,
            Method::POST,
            "/api/instituicoes",
            Some(json!({ "codigo": "001", "nome": "Prefeitura de Palmas" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(inst["ativo"], true);
        let inst_id = inst["id"].as_str().unwrap().to_string();

        let (_, code) = send(
            &app,
            Method::GET,
            &format!("/api/orgaos/proximo-codigo?parentId={}", inst_id),
            None,
        )
        .await;
        assert_eq!(code["codigo"], "0001");

        let (status, organ) = send(
            &app,
            Method::POST,
            "/api/orgaos",
            Some(json!({ "instituicao_id": inst_id, "codigo": "0001", "nome": "Secretaria de Saúde" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let organ_id = organ["id"].as_str().unwrap().to_string();

        let list_uri = format!("/api/orgaos?parentId={}", inst_id);
        let (_, listed) = send(&app, Method::GET, &list_uri, None).await;
        assert_eq!(listed.as_array().map(Vec::len), Some(1));
        assert_eq!(listed[0]["id"], organ_id.as_str());

        let (status, _) = send(&app, Method::DELETE, &format!("/api/orgaos/{}", organ_id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, listed) = send(&app, Method::GET, &list_uri, None).await;
        assert_eq!(listed, json!([]));

        let (status, _) = send(&app, Method::GET, &format!("/api/orgaos/{}", organ_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // criação e exclusão ficam no log do órgão
        let (_, history) = send(
            &app,
            Method::GET,
            &format!("/api/logs-auditoria?parentId={}", organ_id),
            None,
        )
        .await;
        assert_eq!(history.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn patch_updates_only_writable_fields() {
        let app = app();
        let (_, bank) = send(
            &app,
            Method::POST,
            "/api/bancos",
            Some(json!({ "codigo": "001", "nome": "Banco do Brasil" })),
        )
        .await;
        let id = bank["id"].as_str().unwrap().to_string();

        let (status, updated) = send(
            &app,
            Method::PATCH,
            &format!("/api/bancos/{}", id),
            Some(json!({ "nome": "Banco do Brasil S.A.", "id": "00000000-0000-0000-0000-000000000000" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["nome"], "Banco do Brasil S.A.");
        assert_eq!(updated["id"], id.as_str());
        assert_eq!(updated["codigo"], "001");
    }

    #[tokio::test]
    async fn patch_with_null_clears_optional_field() {
        let app = app();
        let (_, inst) = send(
            &app,
            Method::POST,
            "/api/instituicoes",
            Some(json!({ "codigo": "001", "nome": "Prefeitura de Palmas", "sigla": "PMP", "cnpj": "123" })),
        )
        .await;
        let uri = format!("/api/instituicoes/{}", inst["id"].as_str().unwrap());

        let (status, updated) = send(&app, Method::PATCH, &uri, Some(json!({ "sigla": null }))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(updated["sigla"].is_null());
        // campo ausente continua como estava
        assert_eq!(updated["cnpj"], "123");

        let (_, reloaded) = send(&app, Method::GET, &uri, None).await;
        assert!(reloaded["sigla"].is_null());
        assert_eq!(reloaded["nome"], "Prefeitura de Palmas");
    }

    #[tokio::test]
    async fn patch_with_empty_name_is_rejected() {
        let app = app();
        let (_, bank) = send(
            &app,
            Method::POST,
            "/api/bancos",
            Some(json!({ "codigo": "001", "nome": "Banco do Brasil" })),
        )
        .await;
        let uri = format!("/api/bancos/{}", bank["id"].as_str().unwrap());

        let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "nome": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["nome"].is_array());

        let (_, reloaded) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(reloaded["nome"], "Banco do Brasil");
    }

    #[tokio::test]
    async fn delete_only_audits_records_that_were_active() {
        let app = app();

        let ghost = uuid::Uuid::new_v4();
        let (status, _) = send(&app, Method::DELETE, &format!("/api/bancos/{}", ghost), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, history) = send(
            &app,
            Method::GET,
            &format!("/api/logs-auditoria?parentId={}", ghost),
            None,
        )
        .await;
        assert_eq!(history, json!([]));

        let (_, bank) = send(
            &app,
            Method::POST,
            "/api/bancos",
            Some(json!({ "codigo": "001", "nome": "Banco do Brasil" })),
        )
        .await;
        let id = bank["id"].as_str().unwrap().to_string();
        for _ in 0..2 {
            let (status, _) = send(&app, Method::DELETE, &format!("/api/bancos/{}", id), None).await;
            assert_eq!(status, StatusCode::NO_CONTENT);
        }

        let (_, history) = send(
            &app,
            Method::GET,
            &format!("/api/logs-auditoria?parentId={}", id),
            None,
        )
        .await;
        let actions: Vec<&str> = history
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|entry| entry["acao"].as_str())
            .collect();
        assert_eq!(actions.iter().filter(|a| **a == "EXCLUSAO").count(), 1);
        assert_eq!(actions.len(), 2);
    }

    #[tokio::test]
    async fn invalid_payload_is_a_bad_request() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/setores",
            Some(json!({ "unidade_gestora_id": uuid::Uuid::new_v4(), "codigo": "", "nome": "" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["nome"].is_array());
        assert!(body["details"]["codigo"].is_array());
    }

    #[tokio::test]
    async fn patching_unknown_record_is_not_found() {
        let app = app();
        let (status, _) = send(
            &app,
            Method::PATCH,
            &format!("/api/cargos/{}", uuid::Uuid::new_v4()),
            Some(json!({ "nome": "X" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn search_filters_listing() {
        let app = app();
        for nome in ["Fornecedor Alfa", "Fornecedor Beta"] {
            send(
                &app,
                Method::POST,
                "/api/credores",
                Some(json!({ "codigo": "000001", "nome": nome, "tipo_pessoa": "PJ" })),
            )
            .await;
        }

        let (_, found) = send(&app, Method::GET, "/api/credores?busca=beta", None).await;
        assert_eq!(found.as_array().map(Vec::len), Some(1));
        assert_eq!(found[0]["tipo_pessoa"], "PJ");
    }

    #[tokio::test]
    async fn invite_without_identity_provider_is_unavailable() {
        let app = app();
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/usuarios/convites",
            Some(json!({ "nome": "Ana", "email": "ana@orgao.gov.br", "lotacoes": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (_, users) = send(&app, Method::GET, "/api/usuarios", None).await;
        assert_eq!(users, json!([]));
    }

    #[tokio::test]
    async fn categories_with_relations_are_listed() {
        let app = app();
        send(
            &app,
            Method::POST,
            "/api/categorias-documento",
            Some(json!({ "codigo": "001", "nome": "Contratos" })),
        )
        .await;

        let (status, listed) = send(&app, Method::GET, "/api/categorias-documento/com-relacoes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed[0]["nome"], "Contratos");
        assert!(listed[0]["orgao"].is_null());
    }
}
