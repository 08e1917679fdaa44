use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    entities::{
        detalle_venta::{self, Entity as DetalleVenta},
        venta::{self, Entity as Venta},
    },
    errors::ServiceError,
};

const TOP_PRODUCTOS: usize = 10;

/// Period sales reporting, aggregated in memory over the tenant's rows.
#[derive(Clone)]
pub struct ReporteService {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Serialize)]
pub struct ReporteVentas {
    pub desde: DateTime<Utc>,
    pub hasta: DateTime<Utc>,
    pub cantidad_ventas: u64,
    pub total_vendido: Decimal,
    pub ticket_promedio: Decimal,
    pub por_medio_pago: Vec<TotalPorMedio>,
    pub productos_mas_vendidos: Vec<ProductoVendido>,
}

#[derive(Debug, Serialize)]
pub struct TotalPorMedio {
    pub medio_pago: String,
    pub cantidad: u64,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ProductoVendido {
    pub producto_id: Uuid,
    pub nombre: String,
    pub es_peso: bool,
    /// Units or grams, matching the product kind
    pub cantidad: Decimal,
    pub total: Decimal,
}

impl ReporteService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(uid = %uid))]
    pub async fn ventas_periodo(
        &self,
        uid: &str,
        desde: DateTime<Utc>,
        hasta: DateTime<Utc>,
    ) -> Result<ReporteVentas, ServiceError> {
        if desde > hasta {
            return Err(ServiceError::ValidationError(
                "el inicio del período no puede ser posterior al fin".to_string(),
            ));
        }

        let ventas = Venta::find()
            .filter(venta::Column::Uid.eq(uid))
            .filter(venta::Column::CreatedAt.gte(desde))
            .filter(venta::Column::CreatedAt.lte(hasta))
            .all(&*self.db)
            .await?;

        let cantidad_ventas = ventas.len() as u64;
        let total_vendido: Decimal = ventas.iter().map(|v| v.total).sum();
        let ticket_promedio = if cantidad_ventas > 0 {
            total_vendido / Decimal::from(cantidad_ventas)
        } else {
            Decimal::ZERO
        };

        let mut por_medio: HashMap<String, (u64, Decimal)> = HashMap::new();
        for v in &ventas {
            let entry = por_medio
                .entry(v.medio_pago.clone())
                .or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += v.total;
        }
        let mut por_medio_pago: Vec<TotalPorMedio> = por_medio
            .into_iter()
            .map(|(medio_pago, (cantidad, total))| TotalPorMedio {
                medio_pago,
                cantidad,
                total,
            })
            .collect();
        por_medio_pago.sort_by(|a, b| b.total.cmp(&a.total));

        let productos_mas_vendidos = self.top_productos(&ventas).await?;

        Ok(ReporteVentas {
            desde,
            hasta,
            cantidad_ventas,
            total_vendido,
            ticket_promedio,
            por_medio_pago,
            productos_mas_vendidos,
        })
    }

    async fn top_productos(
        &self,
        ventas: &[venta::Model],
    ) -> Result<Vec<ProductoVendido>, ServiceError> {
        if ventas.is_empty() {
            return Ok(Vec::new());
        }

        let venta_ids: Vec<Uuid> = ventas.iter().map(|v| v.id).collect();
        let detalles = DetalleVenta::find()
            .filter(detalle_venta::Column::VentaId.is_in(venta_ids))
            .all(&*self.db)
            .await?;

        let mut por_producto: HashMap<Uuid, ProductoVendido> = HashMap::new();
        for d in detalles {
            let entry = por_producto
                .entry(d.producto_id)
                .or_insert_with(|| ProductoVendido {
                    producto_id: d.producto_id,
                    nombre: d.nombre.clone(),
                    es_peso: d.es_peso,
                    cantidad: Decimal::ZERO,
                    total: Decimal::ZERO,
                });
            entry.cantidad += d.cantidad;
            entry.total += d.subtotal;
        }

        let mut top: Vec<ProductoVendido> = por_producto.into_values().collect();
        top.sort_by(|a, b| b.total.cmp(&a.total));
        top.truncate(TOP_PRODUCTOS);
        Ok(top)
    }
}
