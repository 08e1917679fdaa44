use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sale header. Immutable once written; there is no edit or cancel flow.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ventas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub uid: String,
    pub numero_factura: i64,
    pub total: Decimal,
    pub medio_pago: String,
    /// Cash tendered by the customer (cash sales only)
    pub monto_recibido: Option<Decimal>,
    /// Change given back (cash sales only)
    pub vuelto: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::detalle_venta::Entity")]
    Detalles,
}

impl Related<super::detalle_venta::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Detalles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
