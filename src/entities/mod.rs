pub mod categoria;
pub mod datos_comercio;
pub mod detalle_venta;
pub mod medio_pago;
pub mod movimiento_caja;
pub mod pago;
pub mod pedido_proveedor;
pub mod producto;
pub mod producto_peso;
pub mod proveedor;
pub mod suscripcion;
pub mod usuario;
pub mod venta;

pub use categoria::Entity as Categoria;
pub use datos_comercio::Entity as DatosComercio;
pub use detalle_venta::Entity as DetalleVenta;
pub use medio_pago::Entity as MedioPago;
pub use movimiento_caja::Entity as MovimientoCaja;
pub use pago::Entity as Pago;
pub use pedido_proveedor::Entity as PedidoProveedor;
pub use producto::Entity as Producto;
pub use producto_peso::Entity as ProductoPeso;
pub use proveedor::Entity as Proveedor;
pub use suscripcion::Entity as Suscripcion;
pub use usuario::Entity as Usuario;
pub use venta::Entity as Venta;
