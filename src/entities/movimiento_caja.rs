use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only cash ledger entry carrying a denormalized running balance.
///
/// The primary key is a plain sequence so "latest entry" is well defined
/// even when two entries share a timestamp. Invariant:
/// `saldo_actual == saldo_anterior + monto` for ingresos and
/// `saldo_actual == saldo_anterior - monto` for egresos.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movimientos_caja")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uid: String,
    pub tipo: TipoMovimiento,
    pub motivo: String,
    pub monto: Decimal,
    pub saldo_anterior: Decimal,
    pub saldo_actual: Decimal,
    /// Sale that produced this entry, when applicable
    pub venta_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum TipoMovimiento {
    #[sea_orm(string_value = "ingreso")]
    Ingreso,
    #[sea_orm(string_value = "egreso")]
    Egreso,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
