mod common;

use assert_matches::assert_matches;
use common::{sembrar_producto, sembrar_producto_peso, TestApp};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tienda360_api::{
    entities::{detalle_venta, movimiento_caja, producto, venta},
    errors::ServiceError,
    services::ventas::{ItemVenta, NuevaVenta},
};

#[tokio::test]
async fn venta_descuenta_stock_y_numera_factura() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("venta1@test.com").await;
    let producto_id = sembrar_producto(&app, &uid, "Yerba", 10).await;

    let venta = app
        .ventas()
        .registrar_venta(
            &uid,
            NuevaVenta {
                items: vec![ItemVenta {
                    producto_id,
                    es_peso: false,
                    cantidad: dec!(3),
                }],
                medio_pago: "Tarjeta".to_string(),
                monto_recibido: None,
            },
        )
        .await
        .expect("checkout failed");

    assert_eq!(venta.venta.numero_factura, 1);
    assert_eq!(venta.venta.total, dec!(3000));
    assert_eq!(venta.detalles.len(), 1);
    assert_eq!(venta.detalles[0].subtotal, dec!(3000));

    let p = producto::Entity::find_by_id(producto_id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(p.stock, 7);

    // second sale gets the next invoice number
    let venta2 = app
        .ventas()
        .registrar_venta(
            &uid,
            NuevaVenta {
                items: vec![ItemVenta {
                    producto_id,
                    es_peso: false,
                    cantidad: dec!(1),
                }],
                medio_pago: "Tarjeta".to_string(),
                monto_recibido: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(venta2.venta.numero_factura, 2);
}

#[tokio::test]
async fn stock_insuficiente_aborta_la_venta_completa() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("venta2@test.com").await;
    let con_stock = sembrar_producto(&app, &uid, "Azúcar", 50).await;
    let sin_stock = sembrar_producto(&app, &uid, "Café", 2).await;

    let err = app
        .ventas()
        .registrar_venta(
            &uid,
            NuevaVenta {
                items: vec![
                    ItemVenta {
                        producto_id: con_stock,
                        es_peso: false,
                        cantidad: dec!(5),
                    },
                    ItemVenta {
                        producto_id: sin_stock,
                        es_peso: false,
                        cantidad: dec!(8),
                    },
                ],
                medio_pago: "Tarjeta".to_string(),
                monto_recibido: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    // nothing was written: no sale, no detail, no ledger entry, stock intact
    let ventas = venta::Entity::find()
        .filter(venta::Column::Uid.eq(uid.clone()))
        .count(&*app.db)
        .await
        .unwrap();
    assert_eq!(ventas, 0);

    let detalles = detalle_venta::Entity::find().count(&*app.db).await.unwrap();
    assert_eq!(detalles, 0);

    let movimientos = movimiento_caja::Entity::find()
        .filter(movimiento_caja::Column::Uid.eq(uid))
        .count(&*app.db)
        .await
        .unwrap();
    assert_eq!(movimientos, 0);

    let p = producto::Entity::find_by_id(con_stock)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(p.stock, 50);
}

#[tokio::test]
async fn items_repetidos_se_validan_contra_el_stock_conjunto() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("venta-dup@test.com").await;
    let producto_id = sembrar_producto(&app, &uid, "Harina", 10).await;

    // two lines of 6 each want 12 units against stock 10
    let err = app
        .ventas()
        .registrar_venta(
            &uid,
            NuevaVenta {
                items: vec![
                    ItemVenta {
                        producto_id,
                        es_peso: false,
                        cantidad: dec!(6),
                    },
                    ItemVenta {
                        producto_id,
                        es_peso: false,
                        cantidad: dec!(6),
                    },
                ],
                medio_pago: "Tarjeta".to_string(),
                monto_recibido: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    let ventas = venta::Entity::find()
        .filter(venta::Column::Uid.eq(uid.clone()))
        .count(&*app.db)
        .await
        .unwrap();
    assert_eq!(ventas, 0);

    let p = producto::Entity::find_by_id(producto_id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(p.stock, 10);

    // repeated lines that jointly fit still commit as one sale
    let venta = app
        .ventas()
        .registrar_venta(
            &uid,
            NuevaVenta {
                items: vec![
                    ItemVenta {
                        producto_id,
                        es_peso: false,
                        cantidad: dec!(6),
                    },
                    ItemVenta {
                        producto_id,
                        es_peso: false,
                        cantidad: dec!(4),
                    },
                ],
                medio_pago: "Tarjeta".to_string(),
                monto_recibido: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(venta.detalles.len(), 2);

    let p = producto::Entity::find_by_id(producto_id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(p.stock, 0);
}

#[tokio::test]
async fn venta_sin_items_es_invalida() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("venta-vacia@test.com").await;

    let err = app
        .ventas()
        .registrar_venta(
            &uid,
            NuevaVenta {
                items: vec![],
                medio_pago: "Tarjeta".to_string(),
                monto_recibido: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn venta_en_efectivo_registra_ingreso_y_vuelto() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("venta3@test.com").await;
    let producto_id = sembrar_producto(&app, &uid, "Fideos", 10).await;

    let venta = app
        .ventas()
        .registrar_venta(
            &uid,
            NuevaVenta {
                items: vec![ItemVenta {
                    producto_id,
                    es_peso: false,
                    cantidad: dec!(2),
                }],
                medio_pago: "Efectivo".to_string(),
                monto_recibido: Some(dec!(2500)),
            },
        )
        .await
        .unwrap();

    assert_eq!(venta.venta.total, dec!(2000));
    assert_eq!(venta.venta.vuelto, Some(dec!(500)));

    // tendered amount in, change out, drawer nets the total
    let movimientos = movimiento_caja::Entity::find()
        .filter(movimiento_caja::Column::Uid.eq(uid.clone()))
        .order_by_asc(movimiento_caja::Column::Id)
        .all(&*app.db)
        .await
        .unwrap();
    assert_eq!(movimientos.len(), 2);
    assert_eq!(movimientos[0].monto, dec!(2500));
    assert_eq!(movimientos[1].monto, dec!(500));
    assert_eq!(movimientos[1].saldo_actual, dec!(2000));

    let saldo = app.caja().saldo(&uid).await.unwrap();
    assert_eq!(saldo, dec!(2000));
}

#[tokio::test]
async fn efectivo_sin_monto_recibido_es_invalido() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("venta4@test.com").await;
    let producto_id = sembrar_producto(&app, &uid, "Arroz", 10).await;

    let err = app
        .ventas()
        .registrar_venta(
            &uid,
            NuevaVenta {
                items: vec![ItemVenta {
                    producto_id,
                    es_peso: false,
                    cantidad: dec!(1),
                }],
                medio_pago: "efectivo".to_string(),
                monto_recibido: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn venta_por_peso_descuenta_gramos() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("venta5@test.com").await;
    let peso_id = sembrar_producto_peso(&app, &uid, "Queso", dec!(1000)).await;

    let venta = app
        .ventas()
        .registrar_venta(
            &uid,
            NuevaVenta {
                items: vec![ItemVenta {
                    producto_id: peso_id,
                    es_peso: true,
                    cantidad: dec!(250.5),
                }],
                medio_pago: "Transferencia".to_string(),
                monto_recibido: None,
            },
        )
        .await
        .unwrap();

    // 250.5 g at 2 per gram
    assert_eq!(venta.venta.total, dec!(501.0));

    let p = tienda360_api::entities::producto_peso::Entity::find_by_id(peso_id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(p.stock_gramos, dec!(749.5));
}

#[tokio::test]
async fn cantidad_fraccionaria_en_producto_por_unidad_es_invalida() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("venta6@test.com").await;
    let producto_id = sembrar_producto(&app, &uid, "Leche", 10).await;

    let err = app
        .ventas()
        .registrar_venta(
            &uid,
            NuevaVenta {
                items: vec![ItemVenta {
                    producto_id,
                    es_peso: false,
                    cantidad: dec!(1.5),
                }],
                medio_pago: "Tarjeta".to_string(),
                monto_recibido: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn la_venta_no_cruza_tenants() {
    let app = TestApp::new().await;
    let uid_a = app.registrar_tenant("tienda-a@test.com").await;
    let uid_b = app.registrar_tenant("tienda-b@test.com").await;
    let producto_de_a = sembrar_producto(&app, &uid_a, "Pan", 10).await;

    let err = app
        .ventas()
        .registrar_venta(
            &uid_b,
            NuevaVenta {
                items: vec![ItemVenta {
                    producto_id: producto_de_a,
                    es_peso: false,
                    cantidad: dec!(1),
                }],
                medio_pago: "Tarjeta".to_string(),
                monto_recibido: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}
