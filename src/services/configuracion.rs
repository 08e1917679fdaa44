use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        categoria::{self, Entity as Categoria},
        datos_comercio::{self, Entity as DatosComercio},
        medio_pago::{self, Entity as MedioPago},
    },
    errors::ServiceError,
};

/// Tenant configuration: product categories, payment methods and the
/// business info card.
#[derive(Clone)]
pub struct ConfiguracionService {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NombreInput {
    #[validate(length(min = 1))]
    pub nombre: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DatosComercioInput {
    #[validate(length(min = 1))]
    pub nombre_comercio: String,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub cuit: Option<String>,
}

impl ConfiguracionService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ---- categories ----

    #[instrument(skip(self, input), fields(uid = %uid))]
    pub async fn crear_categoria(
        &self,
        uid: &str,
        input: NombreInput,
    ) -> Result<categoria::Model, ServiceError> {
        input.validate()?;

        let duplicada = Categoria::find()
            .filter(categoria::Column::Uid.eq(uid))
            .filter(categoria::Column::Nombre.eq(input.nombre.clone()))
            .one(&*self.db)
            .await?
            .is_some();
        if duplicada {
            return Err(ServiceError::Conflict(format!(
                "la categoría {} ya existe",
                input.nombre
            )));
        }

        let model = categoria::ActiveModel {
            id: Set(Uuid::new_v4()),
            uid: Set(uid.to_string()),
            nombre: Set(input.nombre),
        };
        Ok(model.insert(&*self.db).await?)
    }

    pub async fn listar_categorias(&self, uid: &str) -> Result<Vec<categoria::Model>, ServiceError> {
        Ok(Categoria::find()
            .filter(categoria::Column::Uid.eq(uid))
            .order_by_asc(categoria::Column::Nombre)
            .all(&*self.db)
            .await?)
    }

    pub async fn eliminar_categoria(&self, uid: &str, id: Uuid) -> Result<(), ServiceError> {
        let existing = Categoria::find_by_id(id)
            .filter(categoria::Column::Uid.eq(uid))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Categoría {} no encontrada", id)))?;
        let model: categoria::ActiveModel = existing.into();
        model.delete(&*self.db).await?;
        Ok(())
    }

    // ---- payment methods ----

    #[instrument(skip(self, input), fields(uid = %uid))]
    pub async fn crear_medio_pago(
        &self,
        uid: &str,
        input: NombreInput,
    ) -> Result<medio_pago::Model, ServiceError> {
        input.validate()?;

        let duplicado = MedioPago::find()
            .filter(medio_pago::Column::Uid.eq(uid))
            .filter(medio_pago::Column::Nombre.eq(input.nombre.clone()))
            .one(&*self.db)
            .await?
            .is_some();
        if duplicado {
            return Err(ServiceError::Conflict(format!(
                "el medio de pago {} ya existe",
                input.nombre
            )));
        }

        let model = medio_pago::ActiveModel {
            id: Set(Uuid::new_v4()),
            uid: Set(uid.to_string()),
            nombre: Set(input.nombre),
        };
        Ok(model.insert(&*self.db).await?)
    }

    pub async fn listar_medios_pago(
        &self,
        uid: &str,
    ) -> Result<Vec<medio_pago::Model>, ServiceError> {
        Ok(MedioPago::find()
            .filter(medio_pago::Column::Uid.eq(uid))
            .order_by_asc(medio_pago::Column::Nombre)
            .all(&*self.db)
            .await?)
    }

    pub async fn eliminar_medio_pago(&self, uid: &str, id: Uuid) -> Result<(), ServiceError> {
        let existing = MedioPago::find_by_id(id)
            .filter(medio_pago::Column::Uid.eq(uid))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Medio de pago {} no encontrado", id))
            })?;
        let model: medio_pago::ActiveModel = existing.into();
        model.delete(&*self.db).await?;
        Ok(())
    }

    // ---- business info ----

    pub async fn obtener_datos_comercio(
        &self,
        uid: &str,
    ) -> Result<Option<datos_comercio::Model>, ServiceError> {
        Ok(DatosComercio::find()
            .filter(datos_comercio::Column::Uid.eq(uid))
            .one(&*self.db)
            .await?)
    }

    /// Upsert of the single business-info row. The invoice counter is
    /// owned by the checkout flow and never touched here.
    #[instrument(skip(self, input), fields(uid = %uid))]
    pub async fn guardar_datos_comercio(
        &self,
        uid: &str,
        input: DatosComercioInput,
    ) -> Result<datos_comercio::Model, ServiceError> {
        input.validate()?;

        match self.obtener_datos_comercio(uid).await? {
            Some(existing) => {
                let mut model: datos_comercio::ActiveModel = existing.into();
                model.nombre_comercio = Set(input.nombre_comercio);
                model.direccion = Set(input.direccion);
                model.telefono = Set(input.telefono);
                model.cuit = Set(input.cuit);
                Ok(model.update(&*self.db).await?)
            }
            None => {
                let model = datos_comercio::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    uid: Set(uid.to_string()),
                    nombre_comercio: Set(input.nombre_comercio),
                    direccion: Set(input.direccion),
                    telefono: Set(input.telefono),
                    cuit: Set(input.cuit),
                    proximo_numero_factura: Set(1),
                };
                Ok(model.insert(&*self.db).await?)
            }
        }
    }
}
