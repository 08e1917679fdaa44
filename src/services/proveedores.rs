use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        pedido_proveedor::{self, EstadoPedido, Entity as PedidoProveedor},
        proveedor::{self, Entity as Proveedor},
    },
    errors::ServiceError,
};

/// Suppliers and their purchase orders.
#[derive(Clone)]
pub struct ProveedorService {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NuevoProveedor {
    #[validate(length(min = 1))]
    pub nombre: String,
    pub contacto: Option<String>,
    pub telefono: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub direccion: Option<String>,
    pub notas: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NuevoPedido {
    pub proveedor_id: Uuid,
    #[validate(length(min = 1))]
    pub descripcion: String,
    pub monto: Decimal,
    pub fecha_entrega: Option<DateTime<Utc>>,
}

impl ProveedorService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input), fields(uid = %uid))]
    pub async fn crear(
        &self,
        uid: &str,
        input: NuevoProveedor,
    ) -> Result<proveedor::Model, ServiceError> {
        input.validate()?;

        let model = proveedor::ActiveModel {
            id: Set(Uuid::new_v4()),
            uid: Set(uid.to_string()),
            nombre: Set(input.nombre),
            contacto: Set(input.contacto),
            telefono: Set(input.telefono),
            email: Set(input.email),
            direccion: Set(input.direccion),
            notas: Set(input.notas),
            created_at: Set(Utc::now()),
        };
        Ok(model.insert(&*self.db).await?)
    }

    pub async fn obtener(&self, uid: &str, id: Uuid) -> Result<proveedor::Model, ServiceError> {
        Proveedor::find_by_id(id)
            .filter(proveedor::Column::Uid.eq(uid))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Proveedor {} no encontrado", id)))
    }

    pub async fn listar(
        &self,
        uid: &str,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<proveedor::Model>, u64), ServiceError> {
        let paginator = Proveedor::find()
            .filter(proveedor::Column::Uid.eq(uid))
            .order_by_asc(proveedor::Column::Nombre)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    #[instrument(skip(self, input), fields(uid = %uid, id = %id))]
    pub async fn actualizar(
        &self,
        uid: &str,
        id: Uuid,
        input: NuevoProveedor,
    ) -> Result<proveedor::Model, ServiceError> {
        input.validate()?;

        let existing = self.obtener(uid, id).await?;
        let mut model: proveedor::ActiveModel = existing.into();
        model.nombre = Set(input.nombre);
        model.contacto = Set(input.contacto);
        model.telefono = Set(input.telefono);
        model.email = Set(input.email);
        model.direccion = Set(input.direccion);
        model.notas = Set(input.notas);
        Ok(model.update(&*self.db).await?)
    }

    /// Deleting a supplier is rejected while it still has pending orders.
    /// Received and cancelled orders reference the supplier and are removed
    /// with it, in the same transaction.
    pub async fn eliminar(&self, uid: &str, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.obtener(uid, id).await?;

        let txn = self.db.begin().await?;

        let pendientes = PedidoProveedor::find()
            .filter(pedido_proveedor::Column::Uid.eq(uid))
            .filter(pedido_proveedor::Column::ProveedorId.eq(id))
            .filter(pedido_proveedor::Column::Estado.eq(EstadoPedido::Pendiente))
            .count(&txn)
            .await?;
        if pendientes > 0 {
            return Err(ServiceError::Conflict(format!(
                "el proveedor tiene {} pedidos pendientes",
                pendientes
            )));
        }

        PedidoProveedor::delete_many()
            .filter(pedido_proveedor::Column::Uid.eq(uid))
            .filter(pedido_proveedor::Column::ProveedorId.eq(id))
            .exec(&txn)
            .await?;

        let model: proveedor::ActiveModel = existing.into();
        model.delete(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    // ---- purchase orders ----

    #[instrument(skip(self, input), fields(uid = %uid))]
    pub async fn crear_pedido(
        &self,
        uid: &str,
        input: NuevoPedido,
    ) -> Result<pedido_proveedor::Model, ServiceError> {
        input.validate()?;
        if input.monto <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "el monto del pedido debe ser mayor a cero".to_string(),
            ));
        }

        // supplier must exist under this tenant
        self.obtener(uid, input.proveedor_id).await?;

        let model = pedido_proveedor::ActiveModel {
            id: Set(Uuid::new_v4()),
            uid: Set(uid.to_string()),
            proveedor_id: Set(input.proveedor_id),
            descripcion: Set(input.descripcion),
            monto: Set(input.monto),
            estado: Set(EstadoPedido::Pendiente),
            fecha_pedido: Set(Utc::now()),
            fecha_entrega: Set(input.fecha_entrega),
        };
        Ok(model.insert(&*self.db).await?)
    }

    pub async fn listar_pedidos(
        &self,
        uid: &str,
        proveedor_id: Option<Uuid>,
        estado: Option<EstadoPedido>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<pedido_proveedor::Model>, u64), ServiceError> {
        let mut query = PedidoProveedor::find().filter(pedido_proveedor::Column::Uid.eq(uid));
        if let Some(pid) = proveedor_id {
            query = query.filter(pedido_proveedor::Column::ProveedorId.eq(pid));
        }
        if let Some(estado) = estado {
            query = query.filter(pedido_proveedor::Column::Estado.eq(estado));
        }

        let paginator = query
            .order_by_desc(pedido_proveedor::Column::FechaPedido)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// State machine: only pending orders move, to received or cancelled.
    #[instrument(skip(self), fields(uid = %uid, id = %id, estado = ?nuevo_estado))]
    pub async fn cambiar_estado_pedido(
        &self,
        uid: &str,
        id: Uuid,
        nuevo_estado: EstadoPedido,
    ) -> Result<pedido_proveedor::Model, ServiceError> {
        let pedido = PedidoProveedor::find_by_id(id)
            .filter(pedido_proveedor::Column::Uid.eq(uid))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Pedido {} no encontrado", id)))?;

        if pedido.estado != EstadoPedido::Pendiente {
            return Err(ServiceError::InvalidOperation(format!(
                "el pedido ya está {:?} y no puede cambiar de estado",
                pedido.estado
            )));
        }
        if nuevo_estado == EstadoPedido::Pendiente {
            return Err(ServiceError::InvalidOperation(
                "un pedido no puede volver a pendiente".to_string(),
            ));
        }

        let mut model: pedido_proveedor::ActiveModel = pedido.into();
        if nuevo_estado == EstadoPedido::Recibido {
            model.fecha_entrega = Set(Some(Utc::now()));
        }
        model.estado = Set(nuevo_estado);
        Ok(model.update(&*self.db).await?)
    }
}
