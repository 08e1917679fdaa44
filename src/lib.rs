pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod services;

use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::{AuthRouterExt, AuthService};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
    pub started_at: std::time::Instant,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let services = handlers::AppServices::new(db.clone(), event_sender.clone(), &config);
        Self {
            db,
            config,
            event_sender,
            services,
            started_at: std::time::Instant::now(),
        }
    }
}

// Common response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

/// Versioned API surface.
///
/// Three rings around the tenant data:
///   - public: auth and the payment webhook
///   - authenticated only: subscription status and payment endpoints, so a
///     lapsed tenant can still see their state and pay
///   - authenticated + subscription gate: everything that touches the store
pub fn api_v1_routes(state: Arc<AppState>, auth_service: Arc<AuthService>) -> Router {
    let admin_emails = Arc::new(
        state
            .config
            .admin_email_list()
            .into_iter()
            .map(|e| e.to_ascii_lowercase())
            .collect::<Vec<_>>(),
    );

    let gated = Router::new()
        .nest("/productos", handlers::productos::producto_routes())
        .nest(
            "/productos-peso",
            handlers::productos::producto_peso_routes(),
        )
        .nest("/ventas", handlers::ventas::venta_routes())
        .nest("/caja", handlers::caja::caja_routes())
        .nest("/proveedores", handlers::proveedores::proveedor_routes())
        .nest("/pedidos", handlers::proveedores::pedido_routes())
        .nest("/categorias", handlers::configuracion::categoria_routes())
        .nest("/medios-pago", handlers::configuracion::medio_pago_routes())
        .nest(
            "/datos-comercio",
            handlers::configuracion::datos_comercio_routes(),
        )
        .nest("/reportes", handlers::reportes::reporte_routes())
        .layer(middleware::from_fn_with_state(
            state.services.suscripciones.clone(),
            middleware_helpers::subscription_gate_middleware,
        ));

    // Reachable with a lapsed subscription: status checks and payment flow.
    let ungated = Router::new()
        .nest(
            "/suscripcion",
            handlers::suscripciones::suscripcion_routes(),
        )
        .nest("/pagos", handlers::pagos::pago_routes());

    let admin = Router::new()
        .nest(
            "/admin/suscripciones",
            handlers::suscripciones::admin_suscripcion_routes(),
        )
        .layer(middleware::from_fn_with_state(
            admin_emails,
            auth::admin_guard_middleware,
        ));

    let authed = gated
        .merge(ungated)
        .merge(admin)
        .with_auth()
        .layer(Extension(auth_service.clone()));

    let public = Router::new()
        .nest(
            "/auth",
            auth::auth_routes().with_state(auth_service),
        )
        .nest("/pagos", handlers::pagos::webhook_routes().with_state(state.clone()))
        .route("/health", get(health_check).with_state(state.clone()))
        .route("/status", get(status_info).with_state(state.clone()));

    Router::new()
        .nest("/api/v1", authed.with_state(state))
        .nest("/api/v1", public)
}

async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

async fn status_info(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "environment": state.config.environment,
    })))
}
