use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-tenant subscription row governing access.
///
/// Transitions: trial -> active (approved payment), trial -> inactive
/// (lazy expiry detected at gate-check time), inactive -> active (payment
/// or admin action).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "suscripciones")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub uid: String,
    pub estado: EstadoSuscripcion,
    pub trial_inicio: DateTime<Utc>,
    pub trial_fin: DateTime<Utc>,
    /// External payment id that activated the subscription, if any
    pub payment_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum EstadoSuscripcion {
    #[sea_orm(string_value = "trial")]
    Trial,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pago::Entity")]
    Pagos,
}

impl Related<super::pago::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pagos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
