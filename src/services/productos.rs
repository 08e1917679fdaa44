use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        producto::{self, Entity as Producto},
        producto_peso::{self, Entity as ProductoPeso},
    },
    errors::ServiceError,
};

/// Product catalog service covering both unit and weight products.
#[derive(Clone)]
pub struct ProductoService {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NuevoProducto {
    #[validate(length(min = 1))]
    pub nombre: String,
    pub categoria: Option<String>,
    pub precio_compra: Decimal,
    pub precio_venta: Decimal,
    pub stock: i32,
    #[validate(length(min = 1))]
    pub codigo_producto: String,
    pub codigo_barras: Option<String>,
    pub fecha_vencimiento: Option<chrono::NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NuevoProductoPeso {
    #[validate(length(min = 1))]
    pub nombre: String,
    pub categoria: Option<String>,
    pub precio_compra_gramo: Decimal,
    pub precio_venta_gramo: Decimal,
    pub stock_gramos: Decimal,
    #[validate(length(min = 1))]
    pub codigo_producto: String,
    pub codigo_barras: Option<String>,
    pub fecha_vencimiento: Option<chrono::NaiveDate>,
}

/// Result of a checkout code lookup: which table matched decides pricing
/// and stock semantics downstream.
#[derive(Debug, Serialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum ProductoEncontrado {
    Unidad(producto::Model),
    Peso(producto_peso::Model),
}

impl ProductoService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ---- unit products ----

    #[instrument(skip(self, input), fields(uid = %uid))]
    pub async fn crear(
        &self,
        uid: &str,
        input: NuevoProducto,
    ) -> Result<producto::Model, ServiceError> {
        input.validate()?;
        validar_precios(input.precio_compra, input.precio_venta)?;
        if input.stock < 0 {
            return Err(ServiceError::ValidationError(
                "el stock no puede ser negativo".to_string(),
            ));
        }

        let now = Utc::now();
        let model = producto::ActiveModel {
            id: Set(Uuid::new_v4()),
            uid: Set(uid.to_string()),
            nombre: Set(input.nombre),
            categoria: Set(input.categoria),
            precio_compra: Set(input.precio_compra),
            precio_venta: Set(input.precio_venta),
            stock: Set(input.stock),
            codigo_producto: Set(input.codigo_producto),
            codigo_barras: Set(input.codigo_barras),
            fecha_vencimiento: Set(input.fecha_vencimiento),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(&*self.db).await?)
    }

    pub async fn obtener(&self, uid: &str, id: Uuid) -> Result<producto::Model, ServiceError> {
        Producto::find_by_id(id)
            .filter(producto::Column::Uid.eq(uid))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Producto {} no encontrado", id)))
    }

    pub async fn listar(
        &self,
        uid: &str,
        search: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<producto::Model>, u64), ServiceError> {
        let mut query = Producto::find().filter(producto::Column::Uid.eq(uid));

        if let Some(term) = search {
            let pattern = format!("%{}%", term);
            query = query.filter(
                Condition::any()
                    .add(producto::Column::Nombre.like(pattern.clone()))
                    .add(producto::Column::CodigoProducto.like(pattern.clone()))
                    .add(producto::Column::CodigoBarras.like(pattern)),
            );
        }

        let paginator = query
            .order_by_asc(producto::Column::Nombre)
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
        input: NuevoProducto,
    ) -> Result<producto::Model, ServiceError> {
        input.validate()?;
        validar_precios(input.precio_compra, input.precio_venta)?;
        if input.stock < 0 {
            return Err(ServiceError::ValidationError(
                "el stock no puede ser negativo".to_string(),
            ));
        }

        let existing = self.obtener(uid, id).await?;
        let mut model: producto::ActiveModel = existing.into();
        model.nombre = Set(input.nombre);
        model.categoria = Set(input.categoria);
        model.precio_compra = Set(input.precio_compra);
        model.precio_venta = Set(input.precio_venta);
        model.stock = Set(input.stock);
        model.codigo_producto = Set(input.codigo_producto);
        model.codigo_barras = Set(input.codigo_barras);
        model.fecha_vencimiento = Set(input.fecha_vencimiento);
        model.updated_at = Set(Utc::now());

        Ok(model.update(&*self.db).await?)
    }

    pub async fn eliminar(&self, uid: &str, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.obtener(uid, id).await?;
        let model: producto::ActiveModel = existing.into();
        model.delete(&*self.db).await?;
        Ok(())
    }

    /// Unit products whose stock is at or below the given threshold.
    pub async fn bajo_stock(
        &self,
        uid: &str,
        umbral: i32,
    ) -> Result<Vec<producto::Model>, ServiceError> {
        Ok(Producto::find()
            .filter(producto::Column::Uid.eq(uid))
            .filter(producto::Column::Stock.lte(umbral))
            .order_by_asc(producto::Column::Stock)
            .all(&*self.db)
            .await?)
    }

    // ---- weight products ----

    #[instrument(skip(self, input), fields(uid = %uid))]
    pub async fn crear_peso(
        &self,
        uid: &str,
        input: NuevoProductoPeso,
    ) -> Result<producto_peso::Model, ServiceError> {
        input.validate()?;
        validar_precios(input.precio_compra_gramo, input.precio_venta_gramo)?;
        if input.stock_gramos < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "el stock en gramos no puede ser negativo".to_string(),
            ));
        }

        let now = Utc::now();
        let model = producto_peso::ActiveModel {
            id: Set(Uuid::new_v4()),
            uid: Set(uid.to_string()),
            nombre: Set(input.nombre),
            categoria: Set(input.categoria),
            precio_compra_gramo: Set(input.precio_compra_gramo),
            precio_venta_gramo: Set(input.precio_venta_gramo),
            stock_gramos: Set(input.stock_gramos),
            codigo_producto: Set(input.codigo_producto),
            codigo_barras: Set(input.codigo_barras),
            fecha_vencimiento: Set(input.fecha_vencimiento),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(&*self.db).await?)
    }

    pub async fn obtener_peso(
        &self,
        uid: &str,
        id: Uuid,
    ) -> Result<producto_peso::Model, ServiceError> {
        ProductoPeso::find_by_id(id)
            .filter(producto_peso::Column::Uid.eq(uid))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Producto por peso {} no encontrado", id)))
    }

    pub async fn listar_peso(
        &self,
        uid: &str,
        search: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<producto_peso::Model>, u64), ServiceError> {
        let mut query = ProductoPeso::find().filter(producto_peso::Column::Uid.eq(uid));

        if let Some(term) = search {
            let pattern = format!("%{}%", term);
            query = query.filter(
                Condition::any()
                    .add(producto_peso::Column::Nombre.like(pattern.clone()))
                    .add(producto_peso::Column::CodigoProducto.like(pattern.clone()))
                    .add(producto_peso::Column::CodigoBarras.like(pattern)),
            );
        }

        let paginator = query
            .order_by_asc(producto_peso::Column::Nombre)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    #[instrument(skip(self, input), fields(uid = %uid, id = %id))]
    pub async fn actualizar_peso(
        &self,
        uid: &str,
        id: Uuid,
        input: NuevoProductoPeso,
    ) -> Result<producto_peso::Model, ServiceError> {
        input.validate()?;
        validar_precios(input.precio_compra_gramo, input.precio_venta_gramo)?;
        if input.stock_gramos < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "el stock en gramos no puede ser negativo".to_string(),
            ));
        }

        let existing = self.obtener_peso(uid, id).await?;
        let mut model: producto_peso::ActiveModel = existing.into();
        model.nombre = Set(input.nombre);
        model.categoria = Set(input.categoria);
        model.precio_compra_gramo = Set(input.precio_compra_gramo);
        model.precio_venta_gramo = Set(input.precio_venta_gramo);
        model.stock_gramos = Set(input.stock_gramos);
        model.codigo_producto = Set(input.codigo_producto);
        model.codigo_barras = Set(input.codigo_barras);
        model.fecha_vencimiento = Set(input.fecha_vencimiento);
        model.updated_at = Set(Utc::now());

        Ok(model.update(&*self.db).await?)
    }

    pub async fn eliminar_peso(&self, uid: &str, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.obtener_peso(uid, id).await?;
        let model: producto_peso::ActiveModel = existing.into();
        model.delete(&*self.db).await?;
        Ok(())
    }

    /// Checkout lookup: match product code or barcode in the unit table
    /// first, then the weight table.
    #[instrument(skip(self), fields(uid = %uid))]
    pub async fn buscar_por_codigo(
        &self,
        uid: &str,
        codigo: &str,
    ) -> Result<ProductoEncontrado, ServiceError> {
        let unidad = Producto::find()
            .filter(producto::Column::Uid.eq(uid))
            .filter(
                Condition::any()
                    .add(producto::Column::CodigoProducto.eq(codigo))
                    .add(producto::Column::CodigoBarras.eq(codigo)),
            )
            .one(&*self.db)
            .await?;

        if let Some(p) = unidad {
            return Ok(ProductoEncontrado::Unidad(p));
        }

        let peso = ProductoPeso::find()
            .filter(producto_peso::Column::Uid.eq(uid))
            .filter(
                Condition::any()
                    .add(producto_peso::Column::CodigoProducto.eq(codigo))
                    .add(producto_peso::Column::CodigoBarras.eq(codigo)),
            )
            .one(&*self.db)
            .await?;

        peso.map(ProductoEncontrado::Peso)
            .ok_or_else(|| ServiceError::NotFound(format!("No existe producto con código {}", codigo)))
    }
}

fn validar_precios(compra: Decimal, venta: Decimal) -> Result<(), ServiceError> {
    if compra < Decimal::ZERO || venta < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "los precios no pueden ser negativos".to_string(),
        ));
    }
    Ok(())
}
