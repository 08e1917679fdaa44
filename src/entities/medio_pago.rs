use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment method configured by the tenant ("Efectivo", "Tarjeta", ...).
/// Sales store the name denormalized, so deleting one never breaks history.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "medios_pago")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub uid: String,
    pub nombre: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
