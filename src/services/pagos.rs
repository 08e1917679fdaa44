use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    entities::{
        pago::{self, Entity as Pago},
        suscripcion::{self, EstadoSuscripcion, Entity as Suscripcion},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::mercadopago::{
        formatear_external_reference, parsear_external_reference, MercadoPagoClient,
        PreferenciaRequest,
    },
};

const ESTADO_APROBADO: &str = "approved";

/// Subscription payments: checkout preference creation and webhook
/// resolution against the payment processor.
#[derive(Clone)]
pub struct PagoService {
    db: Arc<DatabaseConnection>,
    mp: MercadoPagoClient,
    event_sender: EventSender,
    precio_suscripcion: Decimal,
    site_url: String,
}

#[derive(Debug, Serialize)]
pub struct PreferenciaCreada {
    pub preference_id: String,
    pub init_point: String,
}

/// Outcome of a processor notification, reported back to the webhook
/// handler for logging only; the webhook always answers 200.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "resultado")]
pub enum ResultadoNotificacion {
    Activada { uid: String },
    Registrada { uid: String, estado: String },
    Ignorada { motivo: String },
}

impl PagoService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        mp: MercadoPagoClient,
        event_sender: EventSender,
        precio_suscripcion: Decimal,
        site_url: String,
    ) -> Self {
        Self {
            db,
            mp,
            event_sender,
            precio_suscripcion,
            site_url,
        }
    }

    /// Creates a checkout preference for the tenant's subscription. The
    /// external reference round-trips the subscription id and tenant key
    /// through the processor.
    #[instrument(skip(self), fields(uid = %uid))]
    pub async fn crear_preferencia(&self, uid: &str) -> Result<PreferenciaCreada, ServiceError> {
        let sub = Suscripcion::find()
            .filter(suscripcion::Column::Uid.eq(uid))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No existe suscripción para el comercio {}", uid))
            })?;

        if sub.estado == EstadoSuscripcion::Active {
            return Err(ServiceError::InvalidOperation(
                "la suscripción ya está activa".to_string(),
            ));
        }

        let req = PreferenciaRequest {
            titulo: "Suscripción mensual Tienda 360".to_string(),
            precio: self.precio_suscripcion,
            external_reference: formatear_external_reference(sub.id, uid),
            back_url: format!("{}/suscripcion", self.site_url),
            notification_url: format!("{}/api/v1/pagos/webhook", self.site_url),
        };
        let pref = self.mp.crear_preferencia(&req).await?;

        Ok(PreferenciaCreada {
            preference_id: pref.id,
            init_point: pref.init_point,
        })
    }

    /// Resolves a processor notification: fetches the payment, recovers
    /// the tenant from its external reference and applies it. Unknown or
    /// unparseable notifications are ignored, not errors, so the
    /// processor stops retrying.
    #[instrument(skip(self), fields(payment_id = %payment_id))]
    pub async fn procesar_notificacion(
        &self,
        payment_id: &str,
    ) -> Result<ResultadoNotificacion, ServiceError> {
        let pago_mp = match self.mp.obtener_pago(payment_id).await {
            Ok(p) => p,
            Err(ServiceError::NotFound(_)) => {
                warn!(payment_id = %payment_id, "Notified payment does not exist");
                return Ok(ResultadoNotificacion::Ignorada {
                    motivo: "pago inexistente".to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        let referencia = match pago_mp
            .external_reference
            .as_deref()
            .and_then(parsear_external_reference)
        {
            Some(r) => r,
            None => {
                warn!(payment_id = %payment_id, "Payment has no usable external reference");
                return Ok(ResultadoNotificacion::Ignorada {
                    motivo: "external_reference ausente".to_string(),
                });
            }
        };

        let monto = pago_mp
            .transaction_amount
            .and_then(Decimal::from_f64_retain)
            .unwrap_or(self.precio_suscripcion);

        self.aplicar_pago(
            &referencia.uid,
            &pago_mp.id.to_string(),
            &pago_mp.status,
            monto,
            pago_mp.payment_method_id.clone(),
        )
        .await
    }

    /// Records the payment and, when approved, activates the subscription.
    /// Both writes share one transaction; a repeated notification for an
    /// already-recorded payment is a no-op.
    pub async fn aplicar_pago(
        &self,
        uid: &str,
        external_payment_id: &str,
        estado: &str,
        monto: Decimal,
        metodo: Option<String>,
    ) -> Result<ResultadoNotificacion, ServiceError> {
        let txn = self.db.begin().await?;

        let sub = Suscripcion::find()
            .filter(suscripcion::Column::Uid.eq(uid))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No existe suscripción para el comercio {}", uid))
            })?;

        let ya_registrado = Pago::find()
            .filter(pago::Column::Uid.eq(uid))
            .filter(pago::Column::ExternalPaymentId.eq(external_payment_id))
            .one(&txn)
            .await?
            .is_some();
        if ya_registrado {
            txn.commit().await?;
            return Ok(ResultadoNotificacion::Ignorada {
                motivo: "pago ya registrado".to_string(),
            });
        }

        let pago_id = Uuid::new_v4();
        pago::ActiveModel {
            id: Set(pago_id),
            suscripcion_id: Set(sub.id),
            uid: Set(uid.to_string()),
            external_payment_id: Set(external_payment_id.to_string()),
            estado: Set(estado.to_string()),
            monto: Set(monto),
            metodo: Set(metodo),
            fecha_pago: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        let aprobado = estado == ESTADO_APROBADO;
        if aprobado {
            let mut am: suscripcion::ActiveModel = sub.into();
            am.estado = Set(EstadoSuscripcion::Active);
            am.payment_id = Set(Some(external_payment_id.to_string()));
            am.updated_at = Set(Utc::now());
            am.update(&txn).await?;
        }

        txn.commit().await?;

        self.event_sender
            .send(Event::PaymentRecorded {
                pago_id,
                uid: uid.to_string(),
                estado: estado.to_string(),
            })
            .await;

        if aprobado {
            info!(uid = %uid, payment_id = %external_payment_id, "Subscription activated by payment");
            self.event_sender
                .send(Event::SubscriptionActivated {
                    uid: uid.to_string(),
                    payment_id: external_payment_id.to_string(),
                })
                .await;
            Ok(ResultadoNotificacion::Activada {
                uid: uid.to_string(),
            })
        } else {
            Ok(ResultadoNotificacion::Registrada {
                uid: uid.to_string(),
                estado: estado.to_string(),
            })
        }
    }

    pub async fn historial(&self, uid: &str) -> Result<Vec<pago::Model>, ServiceError> {
        Ok(Pago::find()
            .filter(pago::Column::Uid.eq(uid))
            .order_by_desc(pago::Column::FechaPago)
            .all(&*self.db)
            .await?)
    }
}
