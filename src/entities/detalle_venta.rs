use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sale line item. `cantidad` is units for unit products and grams for
/// weight products; `es_peso` tells which table `producto_id` points into.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "detalle_ventas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub venta_id: Uuid,
    pub producto_id: Uuid,
    /// Denormalized product name at sale time
    pub nombre: String,
    pub precio_unitario: Decimal,
    pub cantidad: Decimal,
    pub subtotal: Decimal,
    pub es_peso: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::venta::Entity",
        from = "Column::VentaId",
        to = "super::venta::Column::Id"
    )]
    Venta,
}

impl Related<super::venta::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venta.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
