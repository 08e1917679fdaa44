mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use tienda360_api::{
    entities::{
        medio_pago,
        pago,
        suscripcion::{self, EstadoSuscripcion},
    },
    errors::ServiceError,
    services::pagos::ResultadoNotificacion,
};

#[tokio::test]
async fn el_registro_siembra_trial_y_medios_de_pago() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("alta@test.com").await;

    let sub = app.suscripciones().obtener(&uid).await.unwrap();
    assert_eq!(sub.estado, EstadoSuscripcion::Trial);
    assert!(sub.trial_fin > Utc::now());

    let medios = medio_pago::Entity::find()
        .filter(medio_pago::Column::Uid.eq(uid))
        .count(&*app.db)
        .await
        .unwrap();
    assert_eq!(medios, 3);
}

#[tokio::test]
async fn trial_vencido_pasa_a_inactiva_y_bloquea_acceso() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("vencido@test.com").await;
    let subs = app.suscripciones();

    // in window: access granted
    subs.verificar_acceso(&uid).await.unwrap();

    // push trial_fin into the past
    let sub = suscripcion::Entity::find()
        .filter(suscripcion::Column::Uid.eq(uid.clone()))
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    let mut am: suscripcion::ActiveModel = sub.into();
    am.trial_fin = Set(Utc::now() - Duration::days(1));
    am.update(&*app.db).await.unwrap();

    let err = subs.verificar_acceso(&uid).await.unwrap_err();
    assert_matches!(err, ServiceError::SubscriptionRequired(_));

    // the read flipped the row to inactive
    let sub = subs.obtener(&uid).await.unwrap();
    assert_eq!(sub.estado, EstadoSuscripcion::Inactive);
}

#[tokio::test]
async fn activar_marca_la_suscripcion_activa() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("activa@test.com").await;
    let subs = app.suscripciones();

    let sub = subs.activar(&uid, "mp-777").await.unwrap();
    assert_eq!(sub.estado, EstadoSuscripcion::Active);
    assert_eq!(sub.payment_id.as_deref(), Some("mp-777"));

    subs.verificar_acceso(&uid).await.unwrap();
}

#[tokio::test]
async fn pago_aprobado_activa_y_registra_historial() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("pago1@test.com").await;
    let pagos = app.pagos_local("http://127.0.0.1:9".to_string(), dec!(5000));

    let resultado = pagos
        .aplicar_pago(&uid, "mp-1001", "approved", dec!(5000), Some("visa".to_string()))
        .await
        .unwrap();
    assert_matches!(resultado, ResultadoNotificacion::Activada { .. });

    let sub = app.suscripciones().obtener(&uid).await.unwrap();
    assert_eq!(sub.estado, EstadoSuscripcion::Active);

    let historial = pagos.historial(&uid).await.unwrap();
    assert_eq!(historial.len(), 1);
    assert_eq!(historial[0].external_payment_id, "mp-1001");
    assert_eq!(historial[0].estado, "approved");
}

#[tokio::test]
async fn pago_rechazado_no_activa() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("pago2@test.com").await;
    let pagos = app.pagos_local("http://127.0.0.1:9".to_string(), dec!(5000));

    let resultado = pagos
        .aplicar_pago(&uid, "mp-1002", "rejected", dec!(5000), None)
        .await
        .unwrap();
    assert_matches!(resultado, ResultadoNotificacion::Registrada { .. });

    let sub = app.suscripciones().obtener(&uid).await.unwrap();
    assert_eq!(sub.estado, EstadoSuscripcion::Trial);

    // rejected attempt still lands in the history
    assert_eq!(pagos.historial(&uid).await.unwrap().len(), 1);
}

#[tokio::test]
async fn notificacion_repetida_es_idempotente() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("pago3@test.com").await;
    let pagos = app.pagos_local("http://127.0.0.1:9".to_string(), dec!(5000));

    pagos
        .aplicar_pago(&uid, "mp-2001", "approved", dec!(5000), None)
        .await
        .unwrap();
    let repetido = pagos
        .aplicar_pago(&uid, "mp-2001", "approved", dec!(5000), None)
        .await
        .unwrap();
    assert_matches!(repetido, ResultadoNotificacion::Ignorada { .. });

    let registros = pago::Entity::find()
        .filter(pago::Column::Uid.eq(uid))
        .count(&*app.db)
        .await
        .unwrap();
    assert_eq!(registros, 1);
}

#[tokio::test]
async fn forzar_estado_admin() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("admin@test.com").await;
    let subs = app.suscripciones();

    let sub = subs.obtener(&uid).await.unwrap();
    let forzada = subs
        .forzar_estado(sub.id, EstadoSuscripcion::Inactive)
        .await
        .unwrap();
    assert_eq!(forzada.estado, EstadoSuscripcion::Inactive);

    let err = subs.verificar_acceso(&uid).await.unwrap_err();
    assert_matches!(err, ServiceError::SubscriptionRequired(_));
}
