// ============================================================================
// TopSteel API - Router
// File: crates/topsteel-api/src/routes.rs
// ============================================================================

use axum::{
    http::{header, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use topsteel_shared::constants::API_PREFIX;

use crate::handlers::{admin_menu, health, menu, parameters, preferences};
use crate::middleware::{inject_tenant, resolve_principal};
use crate::state::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        // Menu resolution
        .route("/menu", get(menu::get_user_menu))
        // User preferences
        .route(
            "/user/menu-preferences",
            get(preferences::list_preferences).put(preferences::upsert_preference),
        )
        .route(
            "/user/menu-preferences/selected-pages",
            get(preferences::selected_pages).post(preferences::save_selected_pages),
        )
        .route("/user/menu-preferences/toggle-page", post(preferences::toggle_page))
        .route("/user/menu-preferences/menu-visibility", put(preferences::set_visibility))
        .route("/user/menu-preferences/menu-order", put(preferences::set_order))
        .route("/user/menu-preferences/reset", post(preferences::reset))
        .route(
            "/user/menu-preferences/custom-menu",
            get(preferences::get_custom_menu).post(preferences::save_custom_menu),
        )
        .route("/user/menu-preferences/export", get(preferences::export_preferences))
        .route("/user/menu-preferences/import", post(preferences::import_preferences))
        .route("/user/menu-preferences/actions", post(preferences::execute_action))
        .route("/user/menu-preferences/custom-item", put(preferences::update_custom_item))
        .route("/user/menu-preferences/favorites", get(preferences::favorites))
        .route(
            "/user/menu-settings",
            get(preferences::get_settings).put(preferences::update_settings),
        )
        .route("/user/menu-settings/template", post(preferences::apply_template))
        .route("/user/menu-settings/shortcuts", post(preferences::add_shortcut))
        .route("/user/menu-settings/shortcuts/{key}", delete(preferences::remove_shortcut))
        .route("/user/menu-data-views", post(preferences::add_data_view))
        // Menu administration
        .route(
            "/admin/menu-configurations",
            get(admin_menu::list_configurations).post(admin_menu::create_configuration),
        )
        .route("/admin/menu-configurations/import", post(admin_menu::import_configuration))
        .route("/admin/menu-configurations/default", post(admin_menu::create_default_configuration))
        .route("/admin/menu-configurations/active/tree", get(admin_menu::active_tree))
        .route(
            "/admin/menu-configurations/{id}",
            get(admin_menu::get_configuration)
                .put(admin_menu::update_configuration)
                .delete(admin_menu::delete_configuration),
        )
        .route("/admin/menu-configurations/{id}/activate", post(admin_menu::activate_configuration))
        .route("/admin/menu-configurations/{id}/tree", get(admin_menu::configuration_tree))
        .route("/admin/menu-configurations/{id}/export", get(admin_menu::export_configuration))
        .route(
            "/admin/menu-configurations/{id}/items",
            get(admin_menu::list_items).post(admin_menu::add_item),
        )
        .route("/admin/menu-configurations/{id}/items/{item_id}", delete(admin_menu::remove_item))
        .route("/admin/menu-configurations/{id}/data-views", post(admin_menu::add_data_view_item))
        // Parameters
        .route("/parameters/client", get(parameters::client_preferences))
        .route(
            "/parameters/{scope}/{group}",
            get(parameters::get_group).post(parameters::create_parameter),
        )
        .route(
            "/parameters/{scope}/{group}/{key}",
            get(parameters::get_parameter).put(parameters::update_parameter),
        )
        .route("/parameters/{scope}/{group}/{key}/typed", get(parameters::get_typed))
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .nest(API_PREFIX, api_routes())
        // Innermost first: tenant injection needs the resolved principal
        .layer(from_fn(inject_tenant))
        .layer(from_fn_with_state(state.clone(), resolve_principal))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use topsteel_core::domain::{Principal, TenantContext};
    use topsteel_infrastructure::{MemoryMenuStore, MemoryParameterStore, MemoryPreferenceStore};
    use topsteel_security::JwtService;

    use crate::state::{Repositories, StateOptions};

    const SECRET: &str = "test-secret";

    fn app() -> Router {
        let menus = Arc::new(MemoryMenuStore::new());
        let repos = Repositories {
            configurations: menus.clone(),
            items: menus,
            preferences: Arc::new(MemoryPreferenceStore::new()),
            parameters: Arc::new(MemoryParameterStore::new()),
        };
        let state = AppState::new(repos, None, JwtService::new(SECRET.to_string()), StateOptions::default());
        create_router(state)
    }

    fn principal(roles: &[&str], permissions: &[&str], tenant: Option<TenantContext>) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            tenant,
        }
    }

    fn token(principal: &Principal) -> String {
        JwtService::new(SECRET.to_string())
            .generate_token(principal, 3600)
            .unwrap()
    }

    fn request(method: Method, uri: &str, principal: Option<&Principal>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(principal) = principal {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(principal)));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn titles(menu: &Value) -> Vec<String> {
        menu["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|node| node["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app().oneshot(request(Method::GET, "/health", None, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_menu_requires_authentication() {
        let response = app()
            .oneshot(request(Method::GET, "/api/v1/menu", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_menu_falls_back_to_default_tree() {
        let app = app();
        let user = principal(&[], &[], None);

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/v1/menu", Some(&user), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(titles(&json_body(response).await), vec!["Tableau de bord", "Query Builder"]);
    }

    #[tokio::test]
    async fn test_admin_folder_needs_role_and_a_visible_child() {
        let app = app();
        let admin_without_permissions = principal(&["ADMIN"], &[], None);
        let admin = principal(&["ADMIN"], &["USER_MANAGEMENT_VIEW"], None);

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/v1/menu", Some(&admin_without_permissions), None))
            .await
            .unwrap();
        assert!(!titles(&json_body(response).await).contains(&"Administration".to_string()));

        let response = app
            .oneshot(request(Method::GET, "/api/v1/menu", Some(&admin), None))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(titles(&body), vec!["Tableau de bord", "Query Builder", "Administration"]);
        assert_eq!(body["data"][2]["children"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_hidden_preference_removes_menu_entry() {
        let app = app();
        let user = principal(&[], &[], None);

        let response = app
            .clone()
            .oneshot(request(
                Method::PUT,
                "/api/v1/user/menu-preferences/menu-visibility",
                Some(&user),
                Some(json!({ "menuId": "dashboard", "isVisible": false })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(request(Method::GET, "/api/v1/menu", Some(&user), None))
            .await
            .unwrap();
        assert_eq!(titles(&json_body(response).await), vec!["Query Builder"]);
    }

    #[tokio::test]
    async fn test_selected_pages_round_trip() {
        let app = app();
        let user = principal(&[], &[], None);

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/user/menu-preferences/selected-pages",
                Some(&user),
                Some(json!({ "selectedPages": ["b", "a"] })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(request(Method::GET, "/api/v1/user/menu-preferences/selected-pages", Some(&user), None))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["data"], json!(["b", "a"]));
    }

    #[tokio::test]
    async fn test_selected_pages_accepts_preference_envelope() {
        let app = app();
        let user = principal(&[], &[], None);
        let rows = json!([
            { "menuId": "stock", "isVisible": true, "order": 2 },
            { "menuId": "ventes", "isVisible": true, "order": 1 },
            { "menuId": "achats", "isVisible": false }
        ]);

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/user/menu-preferences/selected-pages",
                Some(&user),
                Some(json!({ "success": true, "data": rows })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"], json!(["ventes", "stock"]));
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin_role() {
        let app = app();
        let user = principal(&["USER"], &[], None);
        let admin = principal(&["SUPER_ADMIN"], &[], None);

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/v1/admin/menu-configurations", Some(&user), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(request(Method::POST, "/api/v1/admin/menu-configurations/default", Some(&admin), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(request(Method::GET, "/api/v1/admin/menu-configurations", Some(&admin), None))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["isActive"], true);
        assert_eq!(body["data"][0]["isSystem"], true);
    }

    #[tokio::test]
    async fn test_activate_unknown_configuration_is_not_found() {
        let admin = principal(&["ADMIN"], &[], None);
        let uri = format!("/api/v1/admin/menu-configurations/{}/activate", Uuid::new_v4());

        let response = app()
            .oneshot(request(Method::POST, &uri, Some(&admin), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_client_parameter_takes_tenant_from_context() {
        let app = app();
        let tenant = TenantContext::new(Uuid::new_v4(), None);
        let user = principal(&[], &[], Some(tenant));
        let outsider = principal(&[], &[], Some(TenantContext::new(Uuid::new_v4(), None)));

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/parameters/client/display",
                Some(&user),
                Some(json!({ "key": "theme", "value": "dark" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["tenantId"], tenant.societe_id.to_string());

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/v1/parameters/client/display/theme", Some(&user), None))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["data"]["value"], "dark");

        let response = app
            .oneshot(request(Method::GET, "/api/v1/parameters/client/display/theme", Some(&outsider), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_societe_is_filled_but_never_overwritten() {
        let app = app();
        let tenant = TenantContext::new(Uuid::new_v4(), Some(Uuid::new_v4()));
        let user = principal(&[], &[], Some(tenant));

        // No societeId in the body: the interceptor supplies the caller's
        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/parameters/client/layout",
                Some(&user),
                Some(json!({ "key": "density", "value": "compact" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["tenantId"], tenant.societe_id.to_string());

        // A foreign societeId is kept as sent, so the handler refuses it
        let response = app
            .oneshot(request(
                Method::POST,
                "/api/v1/parameters/client/layout",
                Some(&user),
                Some(json!({ "key": "sidebar", "value": "left", "societeId": Uuid::new_v4() })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_fallback_menu_ids_accept_preferences() {
        let app = app();
        let user = principal(&[], &[], None);

        let first = json_body(
            app.clone()
                .oneshot(request(Method::GET, "/api/v1/menu", Some(&user), None))
                .await
                .unwrap(),
        )
        .await;
        let dashboard_id = first["data"][0]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(request(
                Method::PUT,
                "/api/v1/user/menu-preferences/menu-visibility",
                Some(&user),
                Some(json!({ "menuId": dashboard_id, "isVisible": false })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let second = json_body(
            app.oneshot(request(Method::GET, "/api/v1/menu", Some(&user), None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(titles(&second), vec!["Query Builder"]);
        assert_eq!(second["data"][0]["id"], first["data"][1]["id"]);
    }

    #[tokio::test]
    async fn test_pinned_favorite_leads_the_menu() {
        let app = app();
        let user = principal(&[], &[], None);

        for action in ["pin", "favorite"] {
            let response = app
                .clone()
                .oneshot(request(
                    Method::POST,
                    "/api/v1/user/menu-preferences/actions",
                    Some(&user),
                    Some(json!({ "menuId": "query_builder", "action": action })),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let menu = json_body(
            app.clone()
                .oneshot(request(Method::GET, "/api/v1/menu", Some(&user), None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(titles(&menu), vec!["Query Builder", "Tableau de bord"]);
        assert_eq!(menu["data"][0]["isPinned"], true);
        assert_eq!(menu["data"][0]["isFavorite"], true);

        let response = app
            .oneshot(request(Method::GET, "/api/v1/user/menu-preferences/favorites", Some(&user), None))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["data"], json!(["query_builder"]));
    }

    #[tokio::test]
    async fn test_unknown_action_is_rejected() {
        let user = principal(&[], &[], None);

        let response = app()
            .oneshot(request(
                Method::POST,
                "/api/v1/user/menu-preferences/actions",
                Some(&user),
                Some(json!({ "menuId": "dashboard", "action": "explode" })),
            ))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_template_then_shortcuts() {
        let app = app();
        let user = principal(&[], &[], None);

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/user/menu-settings/template",
                Some(&user),
                Some(json!({ "template": "minimal" })),
            ))
            .await
            .unwrap();
        let settings = json_body(response).await;
        assert_eq!(settings["data"]["layoutType"], "compact");
        assert_eq!(settings["data"]["showIcons"], false);

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/user/menu-settings/shortcuts",
                Some(&user),
                Some(json!({ "key": "g-s", "href": "/stock", "title": "Stock" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(request(Method::DELETE, "/api/v1/user/menu-settings/shortcuts/g-s", Some(&user), None))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["data"]["shortcuts"], json!([]));

        let response = app
            .oneshot(request(Method::GET, "/api/v1/user/menu-settings", Some(&user), None))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["data"]["layoutType"], "compact");
    }

    #[tokio::test]
    async fn test_user_data_views_share_a_personal_configuration() {
        let app = app();
        let user = principal(&[], &[], None);
        let mut config_ids = Vec::new();

        for query_builder_id in ["qb-1", "qb-2"] {
            let response = app
                .clone()
                .oneshot(request(
                    Method::POST,
                    "/api/v1/user/menu-data-views",
                    Some(&user),
                    Some(json!({ "queryBuilderId": query_builder_id, "title": "Marges" })),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = json_body(response).await;
            assert_eq!(body["data"]["icon"], "BarChart3");
            config_ids.push(body["data"]["configId"].clone());
        }

        assert_eq!(config_ids[0], config_ids[1]);
    }

    #[tokio::test]
    async fn test_system_parameters_are_admin_writable_only() {
        let user = principal(&[], &[], None);

        let response = app()
            .oneshot(request(
                Method::POST,
                "/api/v1/parameters/system/company",
                Some(&user),
                Some(json!({ "key": "name", "value": "TopSteel" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
