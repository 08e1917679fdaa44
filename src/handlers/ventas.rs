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
        created_response, success_response, PaginatedResponse, PaginationParams, RangoFechas,
    },
    services::ventas::NuevaVenta,
    AppState,
};

#[derive(Debug, Deserialize)]
struct ListadoVentasParams {
    #[serde(flatten)]
    rango: RangoFechas,
    #[serde(flatten)]
    pagination: PaginationParams,
}

async fn registrar_venta(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<NuevaVenta>,
) -> Result<impl IntoResponse, ServiceError> {
    let venta = state.services.ventas.registrar_venta(&user.uid, input).await?;
    Ok(created_response(venta))
}

async fn listar_ventas(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListadoVentasParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .ventas
        .listar(
            &user.uid,
            params.rango.desde,
            params.rango.hasta,
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

async fn obtener_venta(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let venta = state.services.ventas.obtener(&user.uid, id).await?;
    Ok(success_response(venta))
}

pub fn venta_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(listar_ventas).post(registrar_venta))
        .route("/:id", get(obtener_venta))
}
