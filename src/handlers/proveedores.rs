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
    entities::pedido_proveedor::EstadoPedido,
    errors::ServiceError,
    handlers::common::{
        created_response, no_content_response, success_response, PaginatedResponse,
        PaginationParams,
    },
    services::proveedores::{NuevoPedido, NuevoProveedor},
    AppState,
};

#[derive(Debug, Deserialize)]
struct FiltroPedidos {
    proveedor_id: Option<Uuid>,
    estado: Option<EstadoPedido>,
    #[serde(flatten)]
    pagination: PaginationParams,
}

#[derive(Debug, Deserialize)]
struct CambioEstado {
    estado: EstadoPedido,
}

async fn crear_proveedor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<NuevoProveedor>,
) -> Result<impl IntoResponse, ServiceError> {
    let proveedor = state.services.proveedores.crear(&user.uid, input).await?;
    Ok(created_response(proveedor))
}

async fn listar_proveedores(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .proveedores
        .listar(&user.uid, pagination.page, pagination.per_page)
        .await?;
    Ok(success_response(PaginatedResponse::new(
        items,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

async fn obtener_proveedor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let proveedor = state.services.proveedores.obtener(&user.uid, id).await?;
    Ok(success_response(proveedor))
}

async fn actualizar_proveedor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<NuevoProveedor>,
) -> Result<impl IntoResponse, ServiceError> {
    let proveedor = state
        .services
        .proveedores
        .actualizar(&user.uid, id, input)
        .await?;
    Ok(success_response(proveedor))
}

async fn eliminar_proveedor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.proveedores.eliminar(&user.uid, id).await?;
    Ok(no_content_response())
}

async fn crear_pedido(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<NuevoPedido>,
) -> Result<impl IntoResponse, ServiceError> {
    let pedido = state.services.proveedores.crear_pedido(&user.uid, input).await?;
    Ok(created_response(pedido))
}

async fn listar_pedidos(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(filtro): Query<FiltroPedidos>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .proveedores
        .listar_pedidos(
            &user.uid,
            filtro.proveedor_id,
            filtro.estado,
            filtro.pagination.page,
            filtro.pagination.per_page,
        )
        .await?;
    Ok(success_response(PaginatedResponse::new(
        items,
        filtro.pagination.page,
        filtro.pagination.per_page,
        total,
    )))
}

async fn cambiar_estado_pedido(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(cambio): Json<CambioEstado>,
) -> Result<impl IntoResponse, ServiceError> {
    let pedido = state
        .services
        .proveedores
        .cambiar_estado_pedido(&user.uid, id, cambio.estado)
        .await?;
    Ok(success_response(pedido))
}

pub fn proveedor_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(listar_proveedores).post(crear_proveedor))
        .route(
            "/:id",
            get(obtener_proveedor)
                .put(actualizar_proveedor)
                .delete(eliminar_proveedor),
        )
}

pub fn pedido_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(listar_pedidos).post(crear_pedido))
        .route("/:id/estado", patch(cambiar_estado_pedido))
}
