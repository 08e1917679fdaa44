use chrono::{DateTime, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        datos_comercio::{self, Entity as DatosComercio},
        detalle_venta::{self, Entity as DetalleVenta},
        movimiento_caja::TipoMovimiento,
        producto::{self, Entity as Producto},
        producto_peso::{self, Entity as ProductoPeso},
        venta::{self, Entity as Venta},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::caja::CajaService,
};

/// Unit products at or below this stock after a sale raise a low-stock event.
const UMBRAL_STOCK_BAJO: i32 = 5;

const MEDIO_EFECTIVO: &str = "efectivo";

/// Checkout service. The whole sale is a single database transaction: the
/// sale header, its line items, every stock decrement, the cash ledger
/// entries and the invoice-counter bump commit together or not at all.
#[derive(Clone)]
pub struct VentaService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ItemVenta {
    pub producto_id: Uuid,
    /// True when `producto_id` refers to the weight table
    pub es_peso: bool,
    /// Units for unit products, grams for weight products
    pub cantidad: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NuevaVenta {
    #[validate(length(min = 1, message = "la venta debe tener al menos un ítem"))]
    pub items: Vec<ItemVenta>,
    #[validate(length(min = 1))]
    pub medio_pago: String,
    pub monto_recibido: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct VentaCompleta {
    #[serde(flatten)]
    pub venta: venta::Model,
    pub detalles: Vec<detalle_venta::Model>,
}

/// A priced, stock-checked line ready to be written. Built while holding
/// the transaction so the stock read and the later decrement cannot race
/// with a concurrent sale.
struct LineaPlanificada {
    producto_id: Uuid,
    nombre: String,
    precio_unitario: Decimal,
    cantidad: Decimal,
    subtotal: Decimal,
    es_peso: bool,
    stock_restante_unidades: Option<i32>,
}

impl VentaService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(uid = %uid, items = input.items.len()))]
    pub async fn registrar_venta(
        &self,
        uid: &str,
        input: NuevaVenta,
    ) -> Result<VentaCompleta, ServiceError> {
        input.validate()?;
        for item in &input.items {
            if item.cantidad <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "la cantidad de cada ítem debe ser mayor a cero".to_string(),
                ));
            }
        }

        let es_efectivo = input.medio_pago.trim().to_lowercase() == MEDIO_EFECTIVO;

        let txn = self.db.begin().await?;

        // Price and stock-check every line before touching any row, so a
        // failing item aborts the sale with nothing written. Quantities are
        // accumulated per product so repeated lines for the same product
        // are checked against the stock they jointly consume.
        let mut pedido_acumulado: HashMap<(Uuid, bool), Decimal> = HashMap::new();
        let mut lineas = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let clave = (item.producto_id, item.es_peso);
            let ya_pedido = pedido_acumulado.get(&clave).copied().unwrap_or(Decimal::ZERO);
            lineas.push(planificar_linea(&txn, uid, item, ya_pedido).await?);
            *pedido_acumulado.entry(clave).or_insert(Decimal::ZERO) += item.cantidad;
        }

        let total: Decimal = lineas.iter().map(|l| l.subtotal).sum();

        let (monto_recibido, vuelto) = if es_efectivo {
            let recibido = input.monto_recibido.ok_or_else(|| {
                ServiceError::ValidationError(
                    "las ventas en efectivo requieren monto_recibido".to_string(),
                )
            })?;
            if recibido < total {
                return Err(ServiceError::ValidationError(format!(
                    "monto recibido {} insuficiente para el total {}",
                    recibido, total
                )));
            }
            (Some(recibido), Some(recibido - total))
        } else {
            (None, None)
        };

        let comercio = datos_comercio_del_tenant(&txn, uid).await?;
        let numero_factura = comercio.proximo_numero_factura;

        let venta_id = Uuid::new_v4();
        let venta = venta::ActiveModel {
            id: Set(venta_id),
            uid: Set(uid.to_string()),
            numero_factura: Set(numero_factura),
            total: Set(total),
            medio_pago: Set(input.medio_pago.clone()),
            monto_recibido: Set(monto_recibido),
            vuelto: Set(vuelto),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        let mut detalles = Vec::with_capacity(lineas.len());
        for linea in &lineas {
            let detalle = detalle_venta::ActiveModel {
                id: Set(Uuid::new_v4()),
                venta_id: Set(venta_id),
                producto_id: Set(linea.producto_id),
                nombre: Set(linea.nombre.clone()),
                precio_unitario: Set(linea.precio_unitario),
                cantidad: Set(linea.cantidad),
                subtotal: Set(linea.subtotal),
                es_peso: Set(linea.es_peso),
            }
            .insert(&txn)
            .await?;
            detalles.push(detalle);

            descontar_stock(&txn, uid, linea).await?;
        }

        // Cash sales put the tendered amount into the drawer and take the
        // change back out, so the drawer nets the sale total.
        let ingreso = monto_recibido.unwrap_or(total);
        CajaService::append_movimiento(
            &txn,
            uid,
            TipoMovimiento::Ingreso,
            format!("Venta #{}", numero_factura),
            ingreso,
            Some(venta_id),
        )
        .await?;
        if let Some(v) = vuelto {
            if v > Decimal::ZERO {
                CajaService::append_movimiento(
                    &txn,
                    uid,
                    TipoMovimiento::Egreso,
                    format!("Vuelto venta #{}", numero_factura),
                    v,
                    Some(venta_id),
                )
                .await?;
            }
        }

        let mut comercio_am: datos_comercio::ActiveModel = comercio.into();
        comercio_am.proximo_numero_factura = Set(numero_factura + 1);
        comercio_am.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send(Event::SaleCompleted {
                venta_id,
                uid: uid.to_string(),
                numero_factura,
                total,
            })
            .await;
        for linea in &lineas {
            if let Some(stock) = linea.stock_restante_unidades {
                if stock <= UMBRAL_STOCK_BAJO {
                    self.event_sender
                        .send(Event::LowStock {
                            producto_id: linea.producto_id,
                            uid: uid.to_string(),
                            nombre: linea.nombre.clone(),
                            stock,
                        })
                        .await;
                }
            }
        }

        Ok(VentaCompleta { venta, detalles })
    }

    pub async fn obtener(&self, uid: &str, id: Uuid) -> Result<VentaCompleta, ServiceError> {
        let venta = Venta::find_by_id(id)
            .filter(venta::Column::Uid.eq(uid))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Venta {} no encontrada", id)))?;

        let detalles = DetalleVenta::find()
            .filter(detalle_venta::Column::VentaId.eq(id))
            .all(&*self.db)
            .await?;

        Ok(VentaCompleta { venta, detalles })
    }

    pub async fn listar(
        &self,
        uid: &str,
        desde: Option<DateTime<Utc>>,
        hasta: Option<DateTime<Utc>>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<venta::Model>, u64), ServiceError> {
        let mut query = Venta::find().filter(venta::Column::Uid.eq(uid));

        if let Some(desde) = desde {
            query = query.filter(venta::Column::CreatedAt.gte(desde));
        }
        if let Some(hasta) = hasta {
            query = query.filter(venta::Column::CreatedAt.lte(hasta));
        }

        let paginator = query
            .order_by_desc(venta::Column::CreatedAt)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }
}

async fn planificar_linea(
    txn: &DatabaseTransaction,
    uid: &str,
    item: &ItemVenta,
    ya_pedido: Decimal,
) -> Result<LineaPlanificada, ServiceError> {
    if item.es_peso {
        let p = ProductoPeso::find_by_id(item.producto_id)
            .filter(producto_peso::Column::Uid.eq(uid))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Producto por peso {} no encontrado",
                    item.producto_id
                ))
            })?;

        let requerido = ya_pedido + item.cantidad;
        if p.stock_gramos < requerido {
            return Err(ServiceError::InsufficientStock(format!(
                "stock insuficiente de {}: hay {} g, se pidieron {} g",
                p.nombre, p.stock_gramos, requerido
            )));
        }

        Ok(LineaPlanificada {
            producto_id: p.id,
            nombre: p.nombre,
            precio_unitario: p.precio_venta_gramo,
            cantidad: item.cantidad,
            subtotal: p.precio_venta_gramo * item.cantidad,
            es_peso: true,
            stock_restante_unidades: None,
        })
    } else {
        let cantidad_unidades = decimal_a_unidades(item.cantidad)?;
        let unidades_previas = decimal_a_unidades(ya_pedido)?;
        let p = Producto::find_by_id(item.producto_id)
            .filter(producto::Column::Uid.eq(uid))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Producto {} no encontrado", item.producto_id))
            })?;

        let requerido = unidades_previas + cantidad_unidades;
        if p.stock < requerido {
            return Err(ServiceError::InsufficientStock(format!(
                "stock insuficiente de {}: hay {}, se pidieron {}",
                p.nombre, p.stock, requerido
            )));
        }

        Ok(LineaPlanificada {
            producto_id: p.id,
            nombre: p.nombre,
            precio_unitario: p.precio_venta,
            cantidad: item.cantidad,
            subtotal: p.precio_venta * item.cantidad,
            es_peso: false,
            stock_restante_unidades: Some(p.stock - requerido),
        })
    }
}

async fn descontar_stock(
    txn: &DatabaseTransaction,
    uid: &str,
    linea: &LineaPlanificada,
) -> Result<(), ServiceError> {
    if linea.es_peso {
        let p = ProductoPeso::find_by_id(linea.producto_id)
            .filter(producto_peso::Column::Uid.eq(uid))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Producto por peso {} no encontrado",
                    linea.producto_id
                ))
            })?;
        let restante = p.stock_gramos - linea.cantidad;
        if restante < Decimal::ZERO {
            return Err(ServiceError::InsufficientStock(format!(
                "stock insuficiente de {}: hay {} g, se pidieron {} g",
                p.nombre, p.stock_gramos, linea.cantidad
            )));
        }
        let mut am: producto_peso::ActiveModel = p.into();
        am.stock_gramos = Set(restante);
        am.updated_at = Set(Utc::now());
        am.update(txn).await?;
    } else {
        let cantidad = decimal_a_unidades(linea.cantidad)?;
        let p = Producto::find_by_id(linea.producto_id)
            .filter(producto::Column::Uid.eq(uid))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Producto {} no encontrado", linea.producto_id))
            })?;
        let restante = p.stock - cantidad;
        if restante < 0 {
            return Err(ServiceError::InsufficientStock(format!(
                "stock insuficiente de {}: hay {}, se pidieron {}",
                p.nombre, p.stock, cantidad
            )));
        }
        let mut am: producto::ActiveModel = p.into();
        am.stock = Set(restante);
        am.updated_at = Set(Utc::now());
        am.update(txn).await?;
    }
    Ok(())
}

/// Reads the tenant's business row inside the transaction, creating the
/// default one on first sale.
async fn datos_comercio_del_tenant<C: ConnectionTrait>(
    conn: &C,
    uid: &str,
) -> Result<datos_comercio::Model, ServiceError> {
    if let Some(existing) = DatosComercio::find()
        .filter(datos_comercio::Column::Uid.eq(uid))
        .lock_exclusive()
        .one(conn)
        .await?
    {
        return Ok(existing);
    }

    let model = datos_comercio::ActiveModel {
        id: Set(Uuid::new_v4()),
        uid: Set(uid.to_string()),
        nombre_comercio: Set("Mi Comercio".to_string()),
        direccion: Set(None),
        telefono: Set(None),
        cuit: Set(None),
        proximo_numero_factura: Set(1),
    };
    Ok(model.insert(conn).await?)
}

fn decimal_a_unidades(cantidad: Decimal) -> Result<i32, ServiceError> {
    if cantidad.fract() != Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "la cantidad de un producto por unidad debe ser entera".to_string(),
        ));
    }
    cantidad
        .to_i32()
        .ok_or_else(|| ServiceError::ValidationError("cantidad fuera de rango".to_string()))
}
