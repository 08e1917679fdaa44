use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::{auth::AuthUser, errors::ServiceError, services::SuscripcionService};

/// Blocks tenant routes when the subscription is not trial-in-window or
/// active. Runs after the auth middleware, so the tenant is already in
/// the request extensions. Expired trials are flipped to inactive by the
/// underlying check, so the first request past `trial_fin` is the one
/// that gets the 402.
pub async fn subscription_gate_middleware(
    State(suscripciones): State<Arc<SuscripcionService>>,
    request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ServiceError::Unauthorized("no autenticado".to_string()))?;

    suscripciones.verificar_acceso(&user.uid).await?;
    debug!(uid = %user.uid, "Subscription gate passed");

    Ok(next.run(request).await)
}
