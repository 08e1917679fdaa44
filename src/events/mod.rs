use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously. Delivery is best-effort; a full or
    /// closed channel is logged and swallowed so domain flows never fail
    /// on observability.
    pub async fn send(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            warn!("Failed to send event: {}", e);
        }
    }
}

/// Domain events emitted by the services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    SaleCompleted {
        venta_id: Uuid,
        uid: String,
        numero_factura: i64,
        total: Decimal,
    },
    LowStock {
        producto_id: Uuid,
        uid: String,
        nombre: String,
        stock: i32,
    },
    CajaMovementRecorded {
        movimiento_id: i64,
        uid: String,
        monto: Decimal,
    },
    SubscriptionActivated {
        uid: String,
        payment_id: String,
    },
    TrialExpired {
        uid: String,
    },
    PaymentRecorded {
        pago_id: Uuid,
        uid: String,
        estado: String,
    },
}

/// Consumes events from the channel and logs them. A future iteration can
/// fan these out to outbound webhooks or a notification channel.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::SaleCompleted {
                venta_id,
                uid,
                numero_factura,
                total,
            } => {
                info!(
                    venta_id = %venta_id,
                    uid = %uid,
                    numero_factura = %numero_factura,
                    total = %total,
                    "Sale completed"
                );
            }
            Event::LowStock {
                producto_id,
                nombre,
                stock,
                ..
            } => {
                warn!(producto_id = %producto_id, nombre = %nombre, stock = %stock, "Low stock");
            }
            Event::TrialExpired { uid } => {
                info!(uid = %uid, "Trial expired; subscription deactivated");
            }
            Event::SubscriptionActivated { uid, payment_id } => {
                info!(uid = %uid, payment_id = %payment_id, "Subscription activated");
            }
            other => {
                info!(event = ?other, "Domain event");
            }
        }
    }
    info!("Event channel closed; processor exiting");
}
