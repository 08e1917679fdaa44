use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Business info, one row per tenant. Also carries the invoice counter the
/// checkout transaction bumps on every committed sale.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "datos_comercio")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub uid: String,
    pub nombre_comercio: String,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub cuit: Option<String>,
    pub proximo_numero_factura: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
