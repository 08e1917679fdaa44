mod common;

use chrono::{Duration, Utc};
use common::{sembrar_producto, TestApp};
use rust_decimal_macros::dec;
use tienda360_api::services::ventas::{ItemVenta, NuevaVenta};

#[tokio::test]
async fn reporte_de_ventas_totaliza_y_desglosa_por_medio() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("rep1@test.com").await;
    let producto_id = sembrar_producto(&app, &uid, "Yerba", 100).await;
    let ventas = app.ventas();

    // two card sales and one cash sale, all at 1000 per unit
    for cantidad in [dec!(2), dec!(3)] {
        ventas
            .registrar_venta(
                &uid,
                NuevaVenta {
                    items: vec![ItemVenta {
                        producto_id,
                        es_peso: false,
                        cantidad,
                    }],
                    medio_pago: "Tarjeta".to_string(),
                    monto_recibido: None,
                },
            )
            .await
            .unwrap();
    }
    ventas
        .registrar_venta(
            &uid,
            NuevaVenta {
                items: vec![ItemVenta {
                    producto_id,
                    es_peso: false,
                    cantidad: dec!(1),
                }],
                medio_pago: "Efectivo".to_string(),
                monto_recibido: Some(dec!(1000)),
            },
        )
        .await
        .unwrap();

    let desde = Utc::now() - Duration::hours(1);
    let hasta = Utc::now() + Duration::hours(1);
    let reporte = app.reportes().ventas_periodo(&uid, desde, hasta).await.unwrap();

    assert_eq!(reporte.cantidad_ventas, 3);
    assert_eq!(reporte.total_vendido, dec!(6000));
    assert_eq!(reporte.ticket_promedio, dec!(2000));

    assert_eq!(reporte.por_medio_pago.len(), 2);
    // sorted by total descending: Tarjeta 5000, Efectivo 1000
    assert_eq!(reporte.por_medio_pago[0].medio_pago, "Tarjeta");
    assert_eq!(reporte.por_medio_pago[0].total, dec!(5000));
    assert_eq!(reporte.por_medio_pago[1].cantidad, 1);

    assert_eq!(reporte.productos_mas_vendidos.len(), 1);
    assert_eq!(reporte.productos_mas_vendidos[0].cantidad, dec!(6));
    assert_eq!(reporte.productos_mas_vendidos[0].total, dec!(6000));
}

#[tokio::test]
async fn periodo_sin_ventas_devuelve_ceros() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("rep2@test.com").await;

    let desde = Utc::now() - Duration::days(7);
    let hasta = Utc::now();
    let reporte = app.reportes().ventas_periodo(&uid, desde, hasta).await.unwrap();

    assert_eq!(reporte.cantidad_ventas, 0);
    assert_eq!(reporte.total_vendido, dec!(0));
    assert_eq!(reporte.ticket_promedio, dec!(0));
    assert!(reporte.por_medio_pago.is_empty());
    assert!(reporte.productos_mas_vendidos.is_empty());
}

#[tokio::test]
async fn rango_invertido_es_invalido() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("rep3@test.com").await;

    let desde = Utc::now();
    let hasta = desde - Duration::days(1);
    assert!(app
        .reportes()
        .ventas_periodo(&uid, desde, hasta)
        .await
        .is_err());
}
