mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use common::TestApp;
use rust_decimal_macros::dec;
use tienda360_api::{
    entities::movimiento_caja::TipoMovimiento,
    errors::ServiceError,
    services::caja::NuevoMovimiento,
};

#[tokio::test]
async fn ingreso_y_egreso_actualizan_el_saldo() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("caja1@test.com").await;
    let caja = app.caja();

    let ingreso = caja
        .registrar_movimiento(
            &uid,
            NuevoMovimiento {
                tipo: TipoMovimiento::Ingreso,
                motivo: "Fondo inicial".to_string(),
                monto: dec!(500),
            },
        )
        .await
        .unwrap();
    assert_eq!(ingreso.saldo_anterior, dec!(0));
    assert_eq!(ingreso.saldo_actual, dec!(500));

    let egreso = caja
        .registrar_movimiento(
            &uid,
            NuevoMovimiento {
                tipo: TipoMovimiento::Egreso,
                motivo: "Pago a proveedor".to_string(),
                monto: dec!(200),
            },
        )
        .await
        .unwrap();
    assert_eq!(egreso.saldo_anterior, dec!(500));
    assert_eq!(egreso.saldo_actual, dec!(300));

    assert_eq!(caja.saldo(&uid).await.unwrap(), dec!(300));
}

#[tokio::test]
async fn egreso_mayor_al_saldo_es_rechazado() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("caja2@test.com").await;
    let caja = app.caja();

    caja.registrar_movimiento(
        &uid,
        NuevoMovimiento {
            tipo: TipoMovimiento::Ingreso,
            motivo: "Fondo inicial".to_string(),
            monto: dec!(100),
        },
    )
    .await
    .unwrap();

    let err = caja
        .registrar_movimiento(
            &uid,
            NuevoMovimiento {
                tipo: TipoMovimiento::Egreso,
                motivo: "Retiro".to_string(),
                monto: dec!(150),
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientFunds(_));

    // balance untouched after the rejection
    assert_eq!(caja.saldo(&uid).await.unwrap(), dec!(100));
}

#[tokio::test]
async fn monto_no_positivo_es_invalido() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("caja3@test.com").await;

    let err = app
        .caja()
        .registrar_movimiento(
            &uid,
            NuevoMovimiento {
                tipo: TipoMovimiento::Ingreso,
                motivo: "Nada".to_string(),
                monto: dec!(0),
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn el_saldo_es_por_tenant() {
    let app = TestApp::new().await;
    let uid_a = app.registrar_tenant("caja-a@test.com").await;
    let uid_b = app.registrar_tenant("caja-b@test.com").await;
    let caja = app.caja();

    caja.registrar_movimiento(
        &uid_a,
        NuevoMovimiento {
            tipo: TipoMovimiento::Ingreso,
            motivo: "Fondo".to_string(),
            monto: dec!(1000),
        },
    )
    .await
    .unwrap();

    assert_eq!(caja.saldo(&uid_a).await.unwrap(), dec!(1000));
    assert_eq!(caja.saldo(&uid_b).await.unwrap(), dec!(0));
}

#[tokio::test]
async fn reporte_suma_por_tipo() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("caja4@test.com").await;
    let caja = app.caja();

    for monto in [dec!(300), dec!(700)] {
        caja.registrar_movimiento(
            &uid,
            NuevoMovimiento {
                tipo: TipoMovimiento::Ingreso,
                motivo: "Venta".to_string(),
                monto,
            },
        )
        .await
        .unwrap();
    }
    caja.registrar_movimiento(
        &uid,
        NuevoMovimiento {
            tipo: TipoMovimiento::Egreso,
            motivo: "Gasto".to_string(),
            monto: dec!(250),
        },
    )
    .await
    .unwrap();

    let desde = Utc::now() - Duration::hours(1);
    let hasta = Utc::now() + Duration::hours(1);
    let reporte = caja.reporte(&uid, desde, hasta).await.unwrap();

    assert_eq!(reporte.cantidad_movimientos, 3);
    assert_eq!(reporte.total_ingresos, dec!(1000));
    assert_eq!(reporte.total_egresos, dec!(250));
    assert_eq!(reporte.saldo_final, dec!(750));
}
