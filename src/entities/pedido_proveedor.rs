use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase order placed with a supplier.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pedidos_proveedores")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub uid: String,
    pub proveedor_id: Uuid,
    pub descripcion: String,
    pub monto: Decimal,
    pub estado: EstadoPedido,
    pub fecha_pedido: DateTime<Utc>,
    pub fecha_entrega: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum EstadoPedido {
    #[sea_orm(string_value = "pendiente")]
    Pendiente,
    #[sea_orm(string_value = "recibido")]
    Recibido,
    #[sea_orm(string_value = "cancelado")]
    Cancelado,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::proveedor::Entity",
        from = "Column::ProveedorId",
        to = "super::proveedor::Column::Id"
    )]
    Proveedor,
}

impl Related<super::proveedor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Proveedor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
