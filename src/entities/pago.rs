use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment history row, inserted when a processor notification resolves.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pagos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub suscripcion_id: Uuid,
    pub uid: String,
    pub external_payment_id: String,
    pub estado: String,
    pub monto: Decimal,
    pub metodo: Option<String>,
    pub fecha_pago: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::suscripcion::Entity",
        from = "Column::SuscripcionId",
        to = "super::suscripcion::Column::Id"
    )]
    Suscripcion,
}

impl Related<super::suscripcion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suscripcion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
