use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::suscripcion::{self, EstadoSuscripcion, Entity as Suscripcion},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Subscription lifecycle. Trial expiry is detected lazily: whenever a
/// trial row is read past its `trial_fin` it is flipped to inactive before
/// being returned, so no background sweeper is needed.
#[derive(Clone)]
pub struct SuscripcionService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

#[derive(Debug, Serialize)]
pub struct EstadoAcceso {
    pub suscripcion: suscripcion::Model,
    /// End-of-trial countdown in whole days, zero once expired
    pub dias_restantes: i64,
}

impl SuscripcionService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Fetches the tenant's subscription, applying lazy trial expiry.
    #[instrument(skip(self), fields(uid = %uid))]
    pub async fn obtener(&self, uid: &str) -> Result<suscripcion::Model, ServiceError> {
        let sub = Suscripcion::find()
            .filter(suscripcion::Column::Uid.eq(uid))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No existe suscripción para el comercio {}", uid))
            })?;

        if sub.estado == EstadoSuscripcion::Trial && Utc::now() > sub.trial_fin {
            let mut am: suscripcion::ActiveModel = sub.into();
            am.estado = Set(EstadoSuscripcion::Inactive);
            am.updated_at = Set(Utc::now());
            let expired = am.update(&*self.db).await?;

            self.event_sender
                .send(Event::TrialExpired {
                    uid: uid.to_string(),
                })
                .await;

            return Ok(expired);
        }

        Ok(sub)
    }

    pub async fn estado_acceso(&self, uid: &str) -> Result<EstadoAcceso, ServiceError> {
        let sub = self.obtener(uid).await?;
        let dias_restantes = match sub.estado {
            EstadoSuscripcion::Trial => (sub.trial_fin - Utc::now()).num_days().max(0),
            _ => 0,
        };
        Ok(EstadoAcceso {
            suscripcion: sub,
            dias_restantes,
        })
    }

    /// Gate check used by the route middleware: Ok for trial-in-window or
    /// active, payment-required error otherwise.
    pub async fn verificar_acceso(&self, uid: &str) -> Result<(), ServiceError> {
        let sub = self.obtener(uid).await?;
        match sub.estado {
            EstadoSuscripcion::Trial | EstadoSuscripcion::Active => Ok(()),
            EstadoSuscripcion::Inactive => Err(ServiceError::SubscriptionRequired(
                "la suscripción no está activa".to_string(),
            )),
        }
    }

    /// Flips the subscription to active, recording the external payment id.
    /// Idempotent for repeated notifications carrying the same payment.
    #[instrument(skip(self), fields(uid = %uid, payment_id = %payment_id))]
    pub async fn activar(
        &self,
        uid: &str,
        payment_id: &str,
    ) -> Result<suscripcion::Model, ServiceError> {
        let sub = Suscripcion::find()
            .filter(suscripcion::Column::Uid.eq(uid))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No existe suscripción para el comercio {}", uid))
            })?;

        if sub.estado == EstadoSuscripcion::Active
            && sub.payment_id.as_deref() == Some(payment_id)
        {
            return Ok(sub);
        }

        let mut am: suscripcion::ActiveModel = sub.into();
        am.estado = Set(EstadoSuscripcion::Active);
        am.payment_id = Set(Some(payment_id.to_string()));
        am.updated_at = Set(Utc::now());
        let activated = am.update(&*self.db).await?;

        info!(uid = %uid, "Subscription activated");
        self.event_sender
            .send(Event::SubscriptionActivated {
                uid: uid.to_string(),
                payment_id: payment_id.to_string(),
            })
            .await;

        Ok(activated)
    }

    // ---- admin operations ----

    pub async fn listar_todas(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<suscripcion::Model>, u64), ServiceError> {
        let paginator = Suscripcion::find()
            .order_by_desc(suscripcion::Column::UpdatedAt)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Admin override of a tenant's subscription state.
    #[instrument(skip(self), fields(id = %id, estado = ?estado))]
    pub async fn forzar_estado(
        &self,
        id: Uuid,
        estado: EstadoSuscripcion,
    ) -> Result<suscripcion::Model, ServiceError> {
        let sub = Suscripcion::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Suscripción {} no encontrada", id)))?;

        let mut am: suscripcion::ActiveModel = sub.into();
        am.estado = Set(estado);
        am.updated_at = Set(Utc::now());
        Ok(am.update(&*self.db).await?)
    }
}
