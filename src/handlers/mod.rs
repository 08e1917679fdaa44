use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::{
    config::AppConfig,
    events::EventSender,
    services::{
        CajaService, ConfiguracionService, MercadoPagoClient, PagoService, ProductoService,
        ProveedorService, ReporteService, SuscripcionService, VentaService,
    },
};

pub mod caja;
pub mod common;
pub mod configuracion;
pub mod pagos;
pub mod productos;
pub mod proveedores;
pub mod reportes;
pub mod suscripciones;
pub mod ventas;

/// Container wiring every domain service over the shared connection pool
/// and event channel.
#[derive(Clone)]
pub struct AppServices {
    pub productos: ProductoService,
    pub ventas: VentaService,
    pub caja: CajaService,
    pub proveedores: ProveedorService,
    pub configuracion: ConfiguracionService,
    pub reportes: ReporteService,
    pub suscripciones: Arc<SuscripcionService>,
    pub pagos: PagoService,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        config: &AppConfig,
    ) -> Self {
        let mp = MercadoPagoClient::new(
            config.mercadopago_access_token.clone().unwrap_or_default(),
        );
        let precio = Decimal::from_f64_retain(config.subscription_price).unwrap_or(Decimal::ZERO);

        Self {
            productos: ProductoService::new(db.clone()),
            ventas: VentaService::new(db.clone(), event_sender.clone()),
            caja: CajaService::new(db.clone(), event_sender.clone()),
            proveedores: ProveedorService::new(db.clone()),
            configuracion: ConfiguracionService::new(db.clone()),
            reportes: ReporteService::new(db.clone()),
            suscripciones: Arc::new(SuscripcionService::new(db.clone(), event_sender.clone())),
            pagos: PagoService::new(
                db,
                mp,
                event_sender,
                precio,
                config.site_url.clone(),
            ),
        }
    }
}
