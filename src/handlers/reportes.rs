use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    auth::AuthUser, errors::ServiceError, handlers::common::success_response, AppState,
};

#[derive(Debug, Deserialize)]
struct PeriodoParams {
    desde: DateTime<Utc>,
    hasta: DateTime<Utc>,
}

async fn reporte_ventas(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<PeriodoParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let reporte = state
        .services
        .reportes
        .ventas_periodo(&user.uid, params.desde, params.hasta)
        .await?;
    Ok(success_response(reporte))
}

pub fn reporte_routes() -> Router<Arc<AppState>> {
    Router::new().route("/ventas", get(reporte_ventas))
}
