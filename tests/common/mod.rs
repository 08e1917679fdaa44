use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use tienda360_api::{
    auth::{AuthConfig, AuthService, RegisterRequest},
    db::{establish_connection_with_config, run_migrations, DbConfig, DbPool},
    entities::{producto, producto_peso},
    events::{self, EventSender},
    services::{
        CajaService, ConfiguracionService, PagoService, ProductoService, ProveedorService,
        ReporteService, SuscripcionService, VentaService,
    },
};
use chrono::Utc;
use tokio::sync::mpsc;
use uuid::Uuid;

const TEST_JWT_SECRET: &str =
    "test-secret-long-enough-for-validation-0123456789-0123456789-0123456789";

/// Test harness over an in-memory SQLite database with migrations applied.
/// A single pooled connection keeps every query on the same in-memory DB.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub auth: Arc<AuthService>,
    pub event_sender: EventSender,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_cfg = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            acquire_timeout: Duration::from_secs(5),
        };
        let pool = establish_connection_with_config(&db_cfg)
            .await
            .expect("failed to open in-memory database");
        run_migrations(&pool).await.expect("migrations failed");
        let db = Arc::new(pool);

        let (tx, rx) = mpsc::channel(256);
        let event_sender = EventSender::new(tx);
        let event_task = tokio::spawn(events::process_events(rx));

        let auth = Arc::new(AuthService::new(
            AuthConfig {
                jwt_secret: TEST_JWT_SECRET.to_string(),
                access_token_expiration: Duration::from_secs(3600),
                trial_days: 30,
            },
            db.clone(),
        ));

        Self {
            db,
            auth,
            event_sender,
            _event_task: event_task,
        }
    }

    /// Registers a fresh tenant and returns its uid.
    pub async fn registrar_tenant(&self, email: &str) -> String {
        let token = self
            .auth
            .register(RegisterRequest {
                email: email.to_string(),
                password: "contrasena-segura".to_string(),
                nombre: "Tienda de prueba".to_string(),
            })
            .await
            .expect("tenant registration failed");
        token.uid
    }

    pub fn productos(&self) -> ProductoService {
        ProductoService::new(self.db.clone())
    }

    pub fn ventas(&self) -> VentaService {
        VentaService::new(self.db.clone(), self.event_sender.clone())
    }

    pub fn caja(&self) -> CajaService {
        CajaService::new(self.db.clone(), self.event_sender.clone())
    }

    pub fn suscripciones(&self) -> SuscripcionService {
        SuscripcionService::new(self.db.clone(), self.event_sender.clone())
    }

    pub fn proveedores(&self) -> ProveedorService {
        ProveedorService::new(self.db.clone())
    }

    pub fn configuracion(&self) -> ConfiguracionService {
        ConfiguracionService::new(self.db.clone())
    }

    pub fn reportes(&self) -> ReporteService {
        ReporteService::new(self.db.clone())
    }

    #[allow(dead_code)]
    pub fn pagos_local(&self, base_url: String, precio: Decimal) -> PagoService {
        let mp = tienda360_api::services::MercadoPagoClient::with_base_url(
            "test-token".to_string(),
            base_url,
        );
        PagoService::new(
            self.db.clone(),
            mp,
            self.event_sender.clone(),
            precio,
            "http://localhost:3000".to_string(),
        )
    }
}

/// Inserts a unit product directly, bypassing the service layer.
#[allow(dead_code)]
pub async fn sembrar_producto(app: &TestApp, uid: &str, nombre: &str, stock: i32) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    producto::ActiveModel {
        id: Set(id),
        uid: Set(uid.to_string()),
        nombre: Set(nombre.to_string()),
        categoria: Set(None),
        precio_compra: Set(Decimal::new(500, 0)),
        precio_venta: Set(Decimal::new(1000, 0)),
        stock: Set(stock),
        codigo_producto: Set(format!("COD-{}", id)),
        codigo_barras: Set(None),
        fecha_vencimiento: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&*app.db)
    .await
    .expect("failed seeding product");
    id
}

/// Inserts a weight product directly.
#[allow(dead_code)]
pub async fn sembrar_producto_peso(
    app: &TestApp,
    uid: &str,
    nombre: &str,
    stock_gramos: Decimal,
) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    producto_peso::ActiveModel {
        id: Set(id),
        uid: Set(uid.to_string()),
        nombre: Set(nombre.to_string()),
        categoria: Set(None),
        precio_compra_gramo: Set(Decimal::new(1, 0)),
        precio_venta_gramo: Set(Decimal::new(2, 0)),
        stock_gramos: Set(stock_gramos),
        codigo_producto: Set(format!("PESO-{}", id)),
        codigo_barras: Set(None),
        fecha_vencimiento: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&*app.db)
    .await
    .expect("failed seeding weight product");
    id
}
