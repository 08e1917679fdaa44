use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;

const API_BASE: &str = "https://api.mercadopago.com";

/// Thin Mercado Pago REST client: create checkout preferences and fetch
/// payment details for webhook resolution.
#[derive(Clone)]
pub struct MercadoPagoClient {
    http: Client,
    access_token: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
pub struct PreferenciaRequest {
    pub titulo: String,
    pub precio: Decimal,
    pub external_reference: String,
    pub back_url: String,
    /// Where the processor posts payment notifications for this preference.
    pub notification_url: String,
}

#[derive(Debug, Deserialize)]
pub struct Preferencia {
    pub id: String,
    pub init_point: String,
}

#[derive(Debug, Deserialize)]
pub struct PagoMp {
    pub id: u64,
    pub status: String,
    pub external_reference: Option<String>,
    pub transaction_amount: Option<f64>,
    pub payment_method_id: Option<String>,
}

impl MercadoPagoClient {
    pub fn new(access_token: String) -> Self {
        Self {
            http: Client::new(),
            access_token,
            base_url: API_BASE.to_string(),
        }
    }

    /// Test constructor pointing at a local mock server.
    pub fn with_base_url(access_token: String, base_url: String) -> Self {
        Self {
            http: Client::new(),
            access_token,
            base_url,
        }
    }

    #[instrument(skip(self, req), fields(external_reference = %req.external_reference))]
    pub async fn crear_preferencia(
        &self,
        req: &PreferenciaRequest,
    ) -> Result<Preferencia, ServiceError> {
        let body = cuerpo_preferencia(req);

        let response = self
            .http
            .post(format!("{}/checkout/preferences", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ServiceError::ExternalServiceError(format!("Mercado Pago no responde: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ServiceError::ExternalServiceError(format!(
                "Mercado Pago devolvió {}: {}",
                status, detail
            )));
        }

        response.json::<Preferencia>().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!(
                "respuesta de preferencia inválida: {}",
                e
            ))
        })
    }

    #[instrument(skip(self))]
    pub async fn obtener_pago(&self, payment_id: &str) -> Result<PagoMp, ServiceError> {
        let response = self
            .http
            .get(format!("{}/v1/payments/{}", self.base_url, payment_id))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| {
                ServiceError::ExternalServiceError(format!("Mercado Pago no responde: {}", e))
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound(format!(
                "Pago {} no existe en Mercado Pago",
                payment_id
            )));
        }
        if !response.status().is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "Mercado Pago devolvió {}",
                response.status()
            )));
        }

        response.json::<PagoMp>().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("respuesta de pago inválida: {}", e))
        })
    }
}

fn cuerpo_preferencia(req: &PreferenciaRequest) -> serde_json::Value {
    json!({
        "items": [{
            "title": req.titulo,
            "quantity": 1,
            "currency_id": "ARS",
            "unit_price": req.precio,
        }],
        "external_reference": req.external_reference,
        "back_urls": {
            "success": req.back_url,
            "failure": req.back_url,
            "pending": req.back_url,
        },
        "auto_return": "approved",
        "notification_url": req.notification_url,
    })
}

/// Parsed `external_reference` carried through the payment round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenciaExterna {
    pub suscripcion_id: Option<Uuid>,
    pub uid: String,
}

static REF_ESTRUCTURADA: Lazy<Regex> = Lazy::new(|| {
    // suscripcion:{uuid}:uid:{uid}
    Regex::new(r"^suscripcion:([0-9a-fA-F-]{36}):uid:(.+)$")
        .unwrap_or_else(|e| panic!("invalid reference regex: {}", e))
});

/// Recovers the tenant from an external reference. Three formats are in
/// the wild: the structured `suscripcion:{id}:uid:{uid}`, the legacy
/// `sub_{uid}` prefix, and bare strings that are the uid itself.
pub fn parsear_external_reference(raw: &str) -> Option<ReferenciaExterna> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(caps) = REF_ESTRUCTURADA.captures(raw) {
        let id = caps.get(1).and_then(|m| Uuid::parse_str(m.as_str()).ok());
        let uid = caps.get(2)?.as_str().to_string();
        debug!(uid = %uid, "Parsed structured external reference");
        return Some(ReferenciaExterna {
            suscripcion_id: id,
            uid,
        });
    }

    if let Some(uid) = raw.strip_prefix("sub_") {
        if !uid.is_empty() {
            return Some(ReferenciaExterna {
                suscripcion_id: None,
                uid: uid.to_string(),
            });
        }
        return None;
    }

    Some(ReferenciaExterna {
        suscripcion_id: None,
        uid: raw.to_string(),
    })
}

/// Builds the structured reference for new preferences.
pub fn formatear_external_reference(suscripcion_id: Uuid, uid: &str) -> String {
    format!("suscripcion:{}:uid:{}", suscripcion_id, uid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn la_preferencia_lleva_notification_url() {
        let req = PreferenciaRequest {
            titulo: "Suscripción mensual".to_string(),
            precio: Decimal::new(999900, 2),
            external_reference: "suscripcion:x:uid:tienda-1".to_string(),
            back_url: "https://tienda.example/suscripcion".to_string(),
            notification_url: "https://tienda.example/api/v1/pagos/webhook".to_string(),
        };
        let body = cuerpo_preferencia(&req);
        assert_eq!(
            body["notification_url"],
            "https://tienda.example/api/v1/pagos/webhook"
        );
        assert_eq!(body["back_urls"]["success"], req.back_url);
        assert_eq!(body["items"][0]["quantity"], 1);
    }

    #[test]
    fn parsea_referencia_estructurada() {
        let id = Uuid::new_v4();
        let raw = formatear_external_reference(id, "tienda-1");
        let parsed = parsear_external_reference(&raw).unwrap();
        assert_eq!(parsed.suscripcion_id, Some(id));
        assert_eq!(parsed.uid, "tienda-1");
    }

    #[test]
    fn parsea_referencia_legada() {
        let parsed = parsear_external_reference("sub_abc123").unwrap();
        assert_eq!(parsed.suscripcion_id, None);
        assert_eq!(parsed.uid, "abc123");
    }

    #[test]
    fn referencia_plana_es_el_uid() {
        let parsed = parsear_external_reference("9f3a77c1").unwrap();
        assert_eq!(parsed.uid, "9f3a77c1");
    }

    #[test]
    fn referencia_vacia_es_none() {
        assert!(parsear_external_reference("").is_none());
        assert!(parsear_external_reference("   ").is_none());
        assert!(parsear_external_reference("sub_").is_none());
    }
}
