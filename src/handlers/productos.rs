use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::common::{
        created_response, no_content_response, success_response, PaginatedResponse,
        PaginationParams,
    },
    services::productos::{NuevoProducto, NuevoProductoPeso},
    AppState,
};

#[derive(Debug, Deserialize)]
struct BusquedaParams {
    q: Option<String>,
    #[serde(flatten)]
    pagination: PaginationParams,
}

#[derive(Debug, Deserialize)]
struct CodigoParams {
    codigo: String,
}

#[derive(Debug, Deserialize)]
struct UmbralParams {
    #[serde(default = "default_umbral")]
    umbral: i32,
}

fn default_umbral() -> i32 {
    5
}

// ---- unit products ----

async fn crear_producto(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<NuevoProducto>,
) -> Result<impl IntoResponse, ServiceError> {
    let producto = state.services.productos.crear(&user.uid, input).await?;
    Ok(created_response(producto))
}

async fn listar_productos(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<BusquedaParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .productos
        .listar(
            &user.uid,
            params.q.as_deref(),
            params.pagination.page,
            params.pagination.per_page,
        )
        .await?;
    Ok(success_response(PaginatedResponse::new(
        items,
        params.pagination.page,
        params.pagination.per_page,
        total,
    )))
}

async fn obtener_producto(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let producto = state.services.productos.obtener(&user.uid, id).await?;
    Ok(success_response(producto))
}

async fn actualizar_producto(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<NuevoProducto>,
) -> Result<impl IntoResponse, ServiceError> {
    let producto = state
        .services
        .productos
        .actualizar(&user.uid, id, input)
        .await?;
    Ok(success_response(producto))
}

async fn eliminar_producto(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.productos.eliminar(&user.uid, id).await?;
    Ok(no_content_response())
}

async fn bajo_stock(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<UmbralParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let productos = state
        .services
        .productos
        .bajo_stock(&user.uid, params.umbral)
        .await?;
    Ok(success_response(productos))
}

async fn buscar_por_codigo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<CodigoParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let encontrado = state
        .services
        .productos
        .buscar_por_codigo(&user.uid, &params.codigo)
        .await?;
    Ok(success_response(encontrado))
}

// ---- weight products ----

async fn crear_producto_peso(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<NuevoProductoPeso>,
) -> Result<impl IntoResponse, ServiceError> {
    let producto = state.services.productos.crear_peso(&user.uid, input).await?;
    Ok(created_response(producto))
}

async fn listar_productos_peso(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<BusquedaParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .productos
        .listar_peso(
            &user.uid,
            params.q.as_deref(),
            params.pagination.page,
            params.pagination.per_page,
        )
        .await?;
    Ok(success_response(PaginatedResponse::new(
        items,
        params.pagination.page,
        params.pagination.per_page,
        total,
    )))
}

async fn obtener_producto_peso(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let producto = state.services.productos.obtener_peso(&user.uid, id).await?;
    Ok(success_response(producto))
}

async fn actualizar_producto_peso(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<NuevoProductoPeso>,
) -> Result<impl IntoResponse, ServiceError> {
    let producto = state
        .services
        .productos
        .actualizar_peso(&user.uid, id, input)
        .await?;
    Ok(success_response(producto))
}

async fn eliminar_producto_peso(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.productos.eliminar_peso(&user.uid, id).await?;
    Ok(no_content_response())
}

pub fn producto_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(listar_productos).post(crear_producto))
        .route("/bajo-stock", get(bajo_stock))
        .route("/buscar", get(buscar_por_codigo))
        .route(
            "/:id",
            get(obtener_producto)
                .put(actualizar_producto)
                .delete(eliminar_producto),
        )
}

pub fn producto_peso_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(listar_productos_peso).post(crear_producto_peso),
        )
        .route(
            "/:id",
            get(obtener_producto_peso)
                .put(actualizar_producto_peso)
                .delete(eliminar_producto_peso),
        )
}
