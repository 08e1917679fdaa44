use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::common::{
        created_response, success_response, PaginatedResponse, PaginationParams, RangoFechas,
    },
    services::caja::NuevoMovimiento,
    AppState,
};

#[derive(Debug, Deserialize)]
struct ListadoCajaParams {
    #[serde(flatten)]
    rango: RangoFechas,
    #[serde(flatten)]
    pagination: PaginationParams,
}

#[derive(Debug, Deserialize)]
struct PeriodoParams {
    desde: DateTime<Utc>,
    hasta: DateTime<Utc>,
}

async fn registrar_movimiento(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<NuevoMovimiento>,
) -> Result<impl IntoResponse, ServiceError> {
    let movimiento = state
        .services
        .caja
        .registrar_movimiento(&user.uid, input)
        .await?;
    Ok(created_response(movimiento))
}

async fn listar_movimientos(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListadoCajaParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .caja
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

async fn saldo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ServiceError> {
    let saldo = state.services.caja.saldo(&user.uid).await?;
    Ok(success_response(json!({ "saldo": saldo })))
}

async fn reporte(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<PeriodoParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let reporte = state
        .services
        .caja
        .reporte(&user.uid, params.desde, params.hasta)
        .await?;
    Ok(success_response(reporte))
}

pub fn caja_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(listar_movimientos).post(registrar_movimiento))
        .route("/saldo", get(saldo))
        .route("/reporte", get(reporte))
}
