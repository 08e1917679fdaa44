pub mod caja;
pub mod configuracion;
pub mod mercadopago;
pub mod pagos;
pub mod productos;
pub mod proveedores;
pub mod reportes;
pub mod suscripciones;
pub mod ventas;

pub use caja::CajaService;
pub use configuracion::ConfiguracionService;
pub use mercadopago::MercadoPagoClient;
pub use pagos::PagoService;
pub use productos::ProductoService;
pub use proveedores::ProveedorService;
pub use reportes::ReporteService;
pub use suscripciones::SuscripcionService;
pub use ventas::VentaService;
