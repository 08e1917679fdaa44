use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::common::{created_response, no_content_response, success_response},
    services::configuracion::{DatosComercioInput, NombreInput},
    AppState,
};

async fn crear_categoria(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<NombreInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let categoria = state
        .services
        .configuracion
        .crear_categoria(&user.uid, input)
        .await?;
    Ok(created_response(categoria))
}

async fn listar_categorias(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ServiceError> {
    let categorias = state
        .services
        .configuracion
        .listar_categorias(&user.uid)
        .await?;
    Ok(success_response(categorias))
}

async fn eliminar_categoria(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .configuracion
        .eliminar_categoria(&user.uid, id)
        .await?;
    Ok(no_content_response())
}

async fn crear_medio_pago(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<NombreInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let medio = state
        .services
        .configuracion
        .crear_medio_pago(&user.uid, input)
        .await?;
    Ok(created_response(medio))
}

async fn listar_medios_pago(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ServiceError> {
    let medios = state
        .services
        .configuracion
        .listar_medios_pago(&user.uid)
        .await?;
    Ok(success_response(medios))
}

async fn eliminar_medio_pago(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .configuracion
        .eliminar_medio_pago(&user.uid, id)
        .await?;
    Ok(no_content_response())
}

async fn obtener_datos_comercio(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ServiceError> {
    let datos = state
        .services
        .configuracion
        .obtener_datos_comercio(&user.uid)
        .await?;
    Ok(success_response(datos))
}

async fn guardar_datos_comercio(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<DatosComercioInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let datos = state
        .services
        .configuracion
        .guardar_datos_comercio(&user.uid, input)
        .await?;
    Ok(success_response(datos))
}

pub fn categoria_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(listar_categorias).post(crear_categoria))
        .route("/:id", axum::routing::delete(eliminar_categoria))
}

pub fn medio_pago_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(listar_medios_pago).post(crear_medio_pago))
        .route("/:id", axum::routing::delete(eliminar_medio_pago))
}

pub fn datos_comercio_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/",
        get(obtener_datos_comercio).put(guardar_datos_comercio),
    )
}
