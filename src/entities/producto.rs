use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Unit-based product: priced and stocked per unit.
///
/// Invariant: `stock` never goes negative through a committed sale; the
/// checkout transaction re-reads and validates stock before decrementing.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "productos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Tenant key; every query filters on it
    pub uid: String,
    pub nombre: String,
    pub categoria: Option<String>,
    pub precio_compra: Decimal,
    pub precio_venta: Decimal,
    pub stock: i32,
    pub codigo_producto: String,
    pub codigo_barras: Option<String>,
    pub fecha_vencimiento: Option<Date>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
