use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Weight-based product (deli items): priced per gram, stocked in grams.
/// Gram quantities are fractional, hence `Decimal` instead of an integer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "productos_peso")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub uid: String,
    pub nombre: String,
    pub categoria: Option<String>,
    pub precio_compra_gramo: Decimal,
    pub precio_venta_gramo: Decimal,
    pub stock_gramos: Decimal,
    pub codigo_producto: String,
    pub codigo_barras: Option<String>,
    pub fecha_vencimiento: Option<Date>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
