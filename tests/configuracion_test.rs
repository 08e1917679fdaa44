mod common;

use assert_matches::assert_matches;
use common::{sembrar_producto, TestApp};
use rust_decimal_macros::dec;
use tienda360_api::{
    errors::ServiceError,
    services::configuracion::{DatosComercioInput, NombreInput},
    services::ventas::{ItemVenta, NuevaVenta},
};

#[tokio::test]
async fn categorias_sin_duplicados_por_tenant() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("conf1@test.com").await;
    let otro = app.registrar_tenant("conf1-otro@test.com").await;
    let servicio = app.configuracion();

    servicio
        .crear_categoria(
            &uid,
            NombreInput {
                nombre: "Bebidas".to_string(),
            },
        )
        .await
        .unwrap();

    let err = servicio
        .crear_categoria(
            &uid,
            NombreInput {
                nombre: "Bebidas".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    // same name under another tenant is fine
    servicio
        .crear_categoria(
            &otro,
            NombreInput {
                nombre: "Bebidas".to_string(),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn medios_de_pago_se_gestionan_por_tenant() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("conf2@test.com").await;
    let servicio = app.configuracion();

    // registration seeds the three defaults
    let medios = servicio.listar_medios_pago(&uid).await.unwrap();
    assert_eq!(medios.len(), 3);

    let nuevo = servicio
        .crear_medio_pago(
            &uid,
            NombreInput {
                nombre: "QR".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(servicio.listar_medios_pago(&uid).await.unwrap().len(), 4);

    servicio.eliminar_medio_pago(&uid, nuevo.id).await.unwrap();
    assert_eq!(servicio.listar_medios_pago(&uid).await.unwrap().len(), 3);
}

#[tokio::test]
async fn datos_comercio_upsert_preserva_numerador() {
    let app = TestApp::new().await;
    let uid = app.registrar_tenant("conf3@test.com").await;
    let servicio = app.configuracion();

    assert!(servicio.obtener_datos_comercio(&uid).await.unwrap().is_none());

    let creado = servicio
        .guardar_datos_comercio(
            &uid,
            DatosComercioInput {
                nombre_comercio: "Almacén Don José".to_string(),
                direccion: Some("Av. Siempre Viva 742".to_string()),
                telefono: None,
                cuit: Some("20-12345678-9".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(creado.proximo_numero_factura, 1);

    // a sale bumps the counter
    let producto_id = sembrar_producto(&app, &uid, "Pan", 10).await;
    app.ventas()
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

    // editing the card does not reset the counter
    let editado = servicio
        .guardar_datos_comercio(
            &uid,
            DatosComercioInput {
                nombre_comercio: "Almacén Don José e Hijos".to_string(),
                direccion: None,
                telefono: Some("11-5555-0000".to_string()),
                cuit: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(editado.proximo_numero_factura, 2);
    assert_eq!(editado.nombre_comercio, "Almacén Don José e Hijos");
}
