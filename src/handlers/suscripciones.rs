use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, patch},
    Extension, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    entities::suscripcion::EstadoSuscripcion,
    errors::ServiceError,
    handlers::common::{success_response, PaginatedResponse, PaginationParams},
    AppState,
};

#[derive(Debug, Deserialize)]
struct CambioEstado {
    estado: EstadoSuscripcion,
}

/// Current tenant's subscription status with trial countdown.
async fn estado_suscripcion(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ServiceError> {
    let estado = state.services.suscripciones.estado_acceso(&user.uid).await?;
    Ok(success_response(estado))
}

// ---- admin ----

async fn listar_suscripciones(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .suscripciones
        .listar_todas(pagination.page, pagination.per_page)
        .await?;
    Ok(success_response(PaginatedResponse::new(
        items,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

async fn forzar_estado(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(cambio): Json<CambioEstado>,
) -> Result<impl IntoResponse, ServiceError> {
    let sub = state
        .services
        .suscripciones
        .forzar_estado(id, cambio.estado)
        .await?;
    Ok(success_response(sub))
}

pub fn suscripcion_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(estado_suscripcion))
}

pub fn admin_suscripcion_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(listar_suscripciones))
        .route("/:id/estado", patch(forzar_estado))
}
