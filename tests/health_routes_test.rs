mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::TestApp;
use tienda360_api::{api_v1_routes, config::AppConfig, AppState};
use tower::ServiceExt;

fn config_de_prueba() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret-long-enough-for-validation-0123456789-0123456789-0123456789"
            .to_string(),
        jwt_expiration: 3600,
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        log_level: "warn".to_string(),
        log_json: false,
        auto_migrate: false,
        cors_allowed_origins: None,
        db_max_connections: 1,
        db_min_connections: 1,
        db_connect_timeout_secs: 5,
        db_idle_timeout_secs: 60,
        db_acquire_timeout_secs: 5,
        trial_days: 30,
        subscription_price: 9999.0,
        mercadopago_access_token: None,
        mercadopago_webhook_secret: None,
        mercadopago_webhook_tolerance_secs: None,
        site_url: "http://localhost:3000".to_string(),
        admin_emails: None,
    }
}

fn router(app: &TestApp) -> Router {
    let state = Arc::new(AppState::new(
        app.db.clone(),
        config_de_prueba(),
        app.event_sender.clone(),
    ));
    api_v1_routes(state, app.auth.clone())
}

#[tokio::test]
async fn health_y_status_responden_bajo_api_v1() {
    let app = TestApp::new().await;
    let router = router(&app);

    let res = router
        .clone()
        .oneshot(
            Request::get("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = router
        .clone()
        .oneshot(
            Request::get("/api/v1/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // no unversioned alias
    let res = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn las_rutas_de_tienda_requieren_token() {
    let app = TestApp::new().await;
    let router = router(&app);

    let res = router
        .oneshot(
            Request::get("/api/v1/productos")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn la_busqueda_por_codigo_es_una_query() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("rutas@test.com").await;
    let producto_id = common::sembrar_producto(&app, &uid, "Yerba", 10).await;

    let login = app
        .auth
        .login(tienda360_api::auth::LoginRequest {
            email: "rutas@test.com".to_string(),
            password: "contrasena-segura".to_string(),
        })
        .await
        .unwrap();

    let codigo = format!("COD-{}", producto_id);
    let res = router(&app)
        .oneshot(
            Request::get(format!("/api/v1/productos/buscar?codigo={}", codigo))
                .header("Authorization", format!("Bearer {}", login.access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
