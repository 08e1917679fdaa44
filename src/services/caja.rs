use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::movimiento_caja::{self, Entity as MovimientoCaja, TipoMovimiento},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Cash ledger service.
///
/// The ledger is append-only; the current balance is the latest entry's
/// `saldo_actual`. Every append reads that balance under an exclusive row
/// lock inside the caller's transaction, so concurrent writers cannot both
/// read the same "previous" balance and diverge.
#[derive(Clone)]
pub struct CajaService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NuevoMovimiento {
    pub tipo: TipoMovimiento,
    #[validate(length(min = 1))]
    pub motivo: String,
    pub monto: Decimal,
}

/// Period report. `total_ingresos`/`total_egresos` are independent sums over
/// `monto`; only `saldo_final` reads the running-balance column.
#[derive(Debug, serde::Serialize)]
pub struct ReporteCaja {
    pub desde: DateTime<Utc>,
    pub hasta: DateTime<Utc>,
    pub total_ingresos: Decimal,
    pub total_egresos: Decimal,
    pub cantidad_movimientos: u64,
    pub saldo_final: Decimal,
}

impl CajaService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Latest running balance for the tenant, zero on an empty ledger.
    pub async fn saldo_actual<C: ConnectionTrait>(
        conn: &C,
        uid: &str,
    ) -> Result<Decimal, ServiceError> {
        let ultimo = MovimientoCaja::find()
            .filter(movimiento_caja::Column::Uid.eq(uid))
            .order_by_desc(movimiento_caja::Column::Id)
            .lock_exclusive()
            .one(conn)
            .await?;

        Ok(ultimo.map(|m| m.saldo_actual).unwrap_or(Decimal::ZERO))
    }

    /// Appends one ledger entry, deriving the running balance from the
    /// latest entry read through `conn`. Callers wrap this in a transaction
    /// (their own or [`Self::registrar_movimiento`]'s).
    ///
    /// Egresos exceeding the current balance are rejected before any write.
    pub async fn append_movimiento<C: ConnectionTrait>(
        conn: &C,
        uid: &str,
        tipo: TipoMovimiento,
        motivo: String,
        monto: Decimal,
        venta_id: Option<Uuid>,
    ) -> Result<movimiento_caja::Model, ServiceError> {
        if monto <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "el monto debe ser mayor a cero".to_string(),
            ));
        }

        let saldo_anterior = Self::saldo_actual(conn, uid).await?;

        let saldo_actual = match tipo {
            TipoMovimiento::Ingreso => saldo_anterior + monto,
            TipoMovimiento::Egreso => {
                if monto > saldo_anterior {
                    return Err(ServiceError::InsufficientFunds(format!(
                        "el egreso de {} supera el saldo disponible de {}",
                        monto, saldo_anterior
                    )));
                }
                saldo_anterior - monto
            }
        };

        let movimiento = movimiento_caja::ActiveModel {
            id: NotSet,
            uid: Set(uid.to_string()),
            tipo: Set(tipo),
            motivo: Set(motivo),
            monto: Set(monto),
            saldo_anterior: Set(saldo_anterior),
            saldo_actual: Set(saldo_actual),
            venta_id: Set(venta_id),
            created_at: Set(Utc::now()),
        }
        .insert(conn)
        .await?;

        Ok(movimiento)
    }

    /// Records a manual ingreso/egreso entry.
    #[instrument(skip(self, input), fields(uid = %uid))]
    pub async fn registrar_movimiento(
        &self,
        uid: &str,
        input: NuevoMovimiento,
    ) -> Result<movimiento_caja::Model, ServiceError> {
        input.validate()?;

        let txn = self.db.begin().await?;
        let movimiento =
            Self::append_movimiento(&txn, uid, input.tipo, input.motivo, input.monto, None).await?;
        txn.commit().await?;

        self.event_sender
            .send(Event::CajaMovementRecorded {
                movimiento_id: movimiento.id,
                uid: uid.to_string(),
                monto: movimiento.monto,
            })
            .await;

        Ok(movimiento)
    }

    /// Lists ledger entries, newest first, optionally bounded by date range.
    pub async fn listar(
        &self,
        uid: &str,
        desde: Option<DateTime<Utc>>,
        hasta: Option<DateTime<Utc>>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<movimiento_caja::Model>, u64), ServiceError> {
        let mut query = MovimientoCaja::find().filter(movimiento_caja::Column::Uid.eq(uid));

        if let Some(desde) = desde {
            query = query.filter(movimiento_caja::Column::CreatedAt.gte(desde));
        }
        if let Some(hasta) = hasta {
            query = query.filter(movimiento_caja::Column::CreatedAt.lte(hasta));
        }

        let paginator = query
            .order_by_desc(movimiento_caja::Column::Id)
            .paginate(&*self.db, per_page);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    pub async fn saldo(&self, uid: &str) -> Result<Decimal, ServiceError> {
        Self::saldo_actual(&*self.db, uid).await
    }

    /// Re-derives period totals by summing entry amounts by type. The
    /// running-balance column is only consulted for the final saldo.
    pub async fn reporte(
        &self,
        uid: &str,
        desde: DateTime<Utc>,
        hasta: DateTime<Utc>,
    ) -> Result<ReporteCaja, ServiceError> {
        let movimientos = MovimientoCaja::find()
            .filter(movimiento_caja::Column::Uid.eq(uid))
            .filter(movimiento_caja::Column::CreatedAt.gte(desde))
            .filter(movimiento_caja::Column::CreatedAt.lte(hasta))
            .all(&*self.db)
            .await?;

        let mut total_ingresos = Decimal::ZERO;
        let mut total_egresos = Decimal::ZERO;
        for m in &movimientos {
            match m.tipo {
                TipoMovimiento::Ingreso => total_ingresos += m.monto,
                TipoMovimiento::Egreso => total_egresos += m.monto,
            }
        }

        let saldo_final = self.saldo(uid).await?;

        Ok(ReporteCaja {
            desde,
            hasta,
            total_ingresos,
            total_egresos,
            cantidad_movimientos: movimientos.len() as u64,
            saldo_final,
        })
    }
}
