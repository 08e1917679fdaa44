use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Router,
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::common::{created_response, success_response},
    AppState,
};

type HmacSha256 = Hmac<Sha256>;

async fn crear_preferencia(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ServiceError> {
    let preferencia = state.services.pagos.crear_preferencia(&user.uid).await?;
    Ok(created_response(preferencia))
}

async fn historial_pagos(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ServiceError> {
    let pagos = state.services.pagos.historial(&user.uid).await?;
    Ok(success_response(pagos))
}

#[derive(Debug, Default, Deserialize)]
struct WebhookQuery {
    #[serde(rename = "type")]
    tipo: Option<String>,
    topic: Option<String>,
    #[serde(rename = "data.id")]
    data_id: Option<String>,
    id: Option<String>,
}

/// Mercado Pago payment notification. Always answers 200 for accepted
/// notifications regardless of the processing outcome, so the processor
/// does not retry indefinitely; only a bad signature gets a 401.
async fn webhook_pagos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WebhookQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    if let Some(secret) = state.config.mercadopago_webhook_secret.as_deref() {
        let tolerance = state
            .config
            .mercadopago_webhook_tolerance_secs
            .unwrap_or(300);
        if !verificar_firma(&headers, &query, secret, tolerance) {
            warn!("Payment webhook signature verification failed");
            return Err(ServiceError::Unauthorized(
                "firma de webhook inválida".to_string(),
            ));
        }
    }

    let es_pago = matches!(query.tipo.as_deref(), Some("payment"))
        || matches!(query.topic.as_deref(), Some("payment"));

    let payment_id = query
        .data_id
        .clone()
        .or_else(|| payment_id_del_cuerpo(&body))
        .or(query.id.clone());

    let payment_id = match payment_id {
        Some(id) if es_pago || query.tipo.is_none() && query.topic.is_none() => id,
        _ => {
            info!(tipo = ?query.tipo, topic = ?query.topic, "Ignoring non-payment notification");
            return Ok((StatusCode::OK, "ok"));
        }
    };

    match state.services.pagos.procesar_notificacion(&payment_id).await {
        Ok(resultado) => {
            info!(payment_id = %payment_id, resultado = ?resultado, "Webhook processed");
        }
        Err(e) => {
            // Processing failures are logged but still acknowledged.
            warn!(payment_id = %payment_id, error = %e, "Webhook processing failed");
        }
    }

    Ok((StatusCode::OK, "ok"))
}

fn payment_id_del_cuerpo(body: &Bytes) -> Option<String> {
    let json: Value = serde_json::from_slice(body).ok()?;
    let data_id = json.get("data")?.get("id")?;
    match data_id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Mercado Pago signature scheme: `x-signature: ts=...,v1=...` where v1
/// is an HMAC-SHA256 over `id:{data.id};request-id:{x-request-id};ts:{ts};`.
fn verificar_firma(
    headers: &HeaderMap,
    query: &WebhookQuery,
    secret: &str,
    tolerance_secs: u64,
) -> bool {
    let firma = match headers.get("x-signature").and_then(|h| h.to_str().ok()) {
        Some(s) => s,
        None => return false,
    };

    let mut ts = "";
    let mut v1 = "";
    for parte in firma.split(',') {
        match parte.trim().split_once('=') {
            Some(("ts", valor)) => ts = valor,
            Some(("v1", valor)) => v1 = valor,
            _ => {}
        }
    }
    if ts.is_empty() || v1.is_empty() {
        return false;
    }

    if let Ok(ts_i) = ts.parse::<i64>() {
        let now = chrono::Utc::now().timestamp();
        if (now - ts_i).unsigned_abs() > tolerance_secs {
            return false;
        }
    }

    let data_id = query.data_id.as_deref().unwrap_or("");
    let request_id = headers
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    let manifiesto = format!(
        "id:{};request-id:{};ts:{};",
        data_id.to_lowercase(),
        request_id,
        ts
    );

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(manifiesto.as_bytes());
    let esperado = hex::encode(mac.finalize().into_bytes());
    comparar_tiempo_constante(&esperado, v1)
}

fn comparar_tiempo_constante(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub fn pago_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/crear-preferencia", post(crear_preferencia))
        .route("/historial", get(historial_pagos))
}

pub fn webhook_routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhook", post(webhook_pagos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn firmar(secret: &str, data_id: &str, request_id: &str, ts: i64) -> String {
        let manifiesto = format!("id:{};request-id:{};ts:{};", data_id, request_id, ts);
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(manifiesto.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn firma_valida_pasa() {
        let ts = chrono::Utc::now().timestamp();
        let v1 = firmar("secreto", "12345", "req-1", ts);

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-signature",
            format!("ts={},v1={}", ts, v1).parse().unwrap(),
        );
        headers.insert("x-request-id", "req-1".parse().unwrap());

        let query = WebhookQuery {
            data_id: Some("12345".to_string()),
            ..Default::default()
        };
        assert!(verificar_firma(&headers, &query, "secreto", 300));
    }

    #[test]
    fn firma_adulterada_falla() {
        let ts = chrono::Utc::now().timestamp();
        let v1 = firmar("secreto", "12345", "req-1", ts);

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-signature",
            format!("ts={},v1={}", ts, v1).parse().unwrap(),
        );
        headers.insert("x-request-id", "req-1".parse().unwrap());

        let query = WebhookQuery {
            data_id: Some("99999".to_string()),
            ..Default::default()
        };
        assert!(!verificar_firma(&headers, &query, "secreto", 300));
    }

    #[test]
    fn timestamp_vencido_falla() {
        let ts = chrono::Utc::now().timestamp() - 3600;
        let v1 = firmar("secreto", "12345", "req-1", ts);

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-signature",
            format!("ts={},v1={}", ts, v1).parse().unwrap(),
        );
        headers.insert("x-request-id", "req-1".parse().unwrap());

        let query = WebhookQuery {
            data_id: Some("12345".to_string()),
            ..Default::default()
        };
        assert!(!verificar_firma(&headers, &query, "secreto", 300));
    }

    #[test]
    fn sin_encabezado_falla() {
        let headers = HeaderMap::new();
        let query = WebhookQuery::default();
        assert!(!verificar_firma(&headers, &query, "secreto", 300));
    }
}
