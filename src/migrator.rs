use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_usuarios_table::Migration),
            Box::new(m20240101_000002_create_productos_tables::Migration),
            Box::new(m20240101_000003_create_ventas_tables::Migration),
            Box::new(m20240101_000004_create_movimientos_caja_table::Migration),
            Box::new(m20240101_000005_create_suscripciones_tables::Migration),
            Box::new(m20240101_000006_create_proveedores_tables::Migration),
            Box::new(m20240101_000007_create_configuracion_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_usuarios_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_usuarios_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Usuarios::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Usuarios::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Usuarios::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Usuarios::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Usuarios::Nombre).string().not_null())
                        .col(ColumnDef::new(Usuarios::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Usuarios::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Usuarios {
        Table,
        Id,
        Email,
        PasswordHash,
        Nombre,
        CreatedAt,
    }
}

mod m20240101_000002_create_productos_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_productos_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Productos::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Productos::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Productos::Uid).string().not_null())
                        .col(ColumnDef::new(Productos::Nombre).string().not_null())
                        .col(ColumnDef::new(Productos::Categoria).string().null())
                        .col(
                            ColumnDef::new(Productos::PrecioCompra)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Productos::PrecioVenta)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Productos::Stock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Productos::CodigoProducto)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Productos::CodigoBarras).string().null())
                        .col(ColumnDef::new(Productos::FechaVencimiento).date().null())
                        .col(ColumnDef::new(Productos::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Productos::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_productos_uid")
                        .table(Productos::Table)
                        .col(Productos::Uid)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductosPeso::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductosPeso::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductosPeso::Uid).string().not_null())
                        .col(ColumnDef::new(ProductosPeso::Nombre).string().not_null())
                        .col(ColumnDef::new(ProductosPeso::Categoria).string().null())
                        .col(
                            ColumnDef::new(ProductosPeso::PrecioCompraGramo)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductosPeso::PrecioVentaGramo)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductosPeso::StockGramos)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductosPeso::CodigoProducto)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductosPeso::CodigoBarras).string().null())
                        .col(
                            ColumnDef::new(ProductosPeso::FechaVencimiento)
                                .date()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductosPeso::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductosPeso::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_productos_peso_uid")
                        .table(ProductosPeso::Table)
                        .col(ProductosPeso::Uid)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductosPeso::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Productos::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Productos {
        Table,
        Id,
        Uid,
        Nombre,
        Categoria,
        PrecioCompra,
        PrecioVenta,
        Stock,
        CodigoProducto,
        CodigoBarras,
        FechaVencimiento,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum ProductosPeso {
        Table,
        Id,
        Uid,
        Nombre,
        Categoria,
        PrecioCompraGramo,
        PrecioVentaGramo,
        StockGramos,
        CodigoProducto,
        CodigoBarras,
        FechaVencimiento,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_ventas_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_ventas_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Ventas::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Ventas::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Ventas::Uid).string().not_null())
                        .col(ColumnDef::new(Ventas::NumeroFactura).big_integer().not_null())
                        .col(ColumnDef::new(Ventas::Total).decimal().not_null())
                        .col(ColumnDef::new(Ventas::MedioPago).string().not_null())
                        .col(ColumnDef::new(Ventas::MontoRecibido).decimal().null())
                        .col(ColumnDef::new(Ventas::Vuelto).decimal().null())
                        .col(ColumnDef::new(Ventas::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_ventas_uid_created_at")
                        .table(Ventas::Table)
                        .col(Ventas::Uid)
                        .col(Ventas::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DetalleVentas::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DetalleVentas::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DetalleVentas::VentaId).uuid().not_null())
                        .col(ColumnDef::new(DetalleVentas::ProductoId).uuid().not_null())
                        .col(ColumnDef::new(DetalleVentas::Nombre).string().not_null())
                        .col(
                            ColumnDef::new(DetalleVentas::PrecioUnitario)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DetalleVentas::Cantidad).decimal().not_null())
                        .col(ColumnDef::new(DetalleVentas::Subtotal).decimal().not_null())
                        .col(
                            ColumnDef::new(DetalleVentas::EsPeso)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_detalle_ventas_venta")
                                .from(DetalleVentas::Table, DetalleVentas::VentaId)
                                .to(Ventas::Table, Ventas::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DetalleVentas::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Ventas::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Ventas {
        Table,
        Id,
        Uid,
        NumeroFactura,
        Total,
        MedioPago,
        MontoRecibido,
        Vuelto,
        CreatedAt,
    }

    #[derive(Iden)]
    enum DetalleVentas {
        Table,
        Id,
        VentaId,
        ProductoId,
        Nombre,
        PrecioUnitario,
        Cantidad,
        Subtotal,
        EsPeso,
    }
}

mod m20240101_000004_create_movimientos_caja_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_movimientos_caja_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MovimientosCaja::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MovimientosCaja::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MovimientosCaja::Uid).string().not_null())
                        .col(ColumnDef::new(MovimientosCaja::Tipo).string().not_null())
                        .col(ColumnDef::new(MovimientosCaja::Motivo).string().not_null())
                        .col(ColumnDef::new(MovimientosCaja::Monto).decimal().not_null())
                        .col(
                            ColumnDef::new(MovimientosCaja::SaldoAnterior)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MovimientosCaja::SaldoActual)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MovimientosCaja::VentaId).uuid().null())
                        .col(
                            ColumnDef::new(MovimientosCaja::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_movimientos_caja_uid")
                        .table(MovimientosCaja::Table)
                        .col(MovimientosCaja::Uid)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MovimientosCaja::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum MovimientosCaja {
        Table,
        Id,
        Uid,
        Tipo,
        Motivo,
        Monto,
        SaldoAnterior,
        SaldoActual,
        VentaId,
        CreatedAt,
    }
}

mod m20240101_000005_create_suscripciones_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_suscripciones_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suscripciones::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suscripciones::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Suscripciones::Uid)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Suscripciones::Estado).string().not_null())
                        .col(
                            ColumnDef::new(Suscripciones::TrialInicio)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Suscripciones::TrialFin)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Suscripciones::PaymentId).string().null())
                        .col(
                            ColumnDef::new(Suscripciones::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Pagos::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Pagos::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Pagos::SuscripcionId).uuid().not_null())
                        .col(ColumnDef::new(Pagos::Uid).string().not_null())
                        .col(
                            ColumnDef::new(Pagos::ExternalPaymentId)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Pagos::Estado).string().not_null())
                        .col(ColumnDef::new(Pagos::Monto).decimal().not_null())
                        .col(ColumnDef::new(Pagos::Metodo).string().null())
                        .col(ColumnDef::new(Pagos::FechaPago).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_pagos_suscripcion")
                                .from(Pagos::Table, Pagos::SuscripcionId)
                                .to(Suscripciones::Table, Suscripciones::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Pagos::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Suscripciones::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Suscripciones {
        Table,
        Id,
        Uid,
        Estado,
        TrialInicio,
        TrialFin,
        PaymentId,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum Pagos {
        Table,
        Id,
        SuscripcionId,
        Uid,
        ExternalPaymentId,
        Estado,
        Monto,
        Metodo,
        FechaPago,
    }
}

mod m20240101_000006_create_proveedores_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_proveedores_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Proveedores::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Proveedores::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Proveedores::Uid).string().not_null())
                        .col(ColumnDef::new(Proveedores::Nombre).string().not_null())
                        .col(ColumnDef::new(Proveedores::Contacto).string().null())
                        .col(ColumnDef::new(Proveedores::Telefono).string().null())
                        .col(ColumnDef::new(Proveedores::Email).string().null())
                        .col(ColumnDef::new(Proveedores::Direccion).string().null())
                        .col(ColumnDef::new(Proveedores::Notas).string().null())
                        .col(
                            ColumnDef::new(Proveedores::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PedidosProveedores::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PedidosProveedores::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PedidosProveedores::Uid).string().not_null())
                        .col(
                            ColumnDef::new(PedidosProveedores::ProveedorId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PedidosProveedores::Descripcion)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PedidosProveedores::Monto)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PedidosProveedores::Estado)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PedidosProveedores::FechaPedido)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PedidosProveedores::FechaEntrega)
                                .timestamp()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_pedidos_proveedor")
                                .from(PedidosProveedores::Table, PedidosProveedores::ProveedorId)
                                .to(Proveedores::Table, Proveedores::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PedidosProveedores::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Proveedores::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Proveedores {
        Table,
        Id,
        Uid,
        Nombre,
        Contacto,
        Telefono,
        Email,
        Direccion,
        Notas,
        CreatedAt,
    }

    #[derive(Iden)]
    enum PedidosProveedores {
        Table,
        Id,
        Uid,
        ProveedorId,
        Descripcion,
        Monto,
        Estado,
        FechaPedido,
        FechaEntrega,
    }
}

mod m20240101_000007_create_configuracion_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_configuracion_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categorias::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categorias::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Categorias::Uid).string().not_null())
                        .col(ColumnDef::new(Categorias::Nombre).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(MediosPago::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MediosPago::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MediosPago::Uid).string().not_null())
                        .col(ColumnDef::new(MediosPago::Nombre).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DatosComercio::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DatosComercio::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DatosComercio::Uid)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(DatosComercio::NombreComercio)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DatosComercio::Direccion).string().null())
                        .col(ColumnDef::new(DatosComercio::Telefono).string().null())
                        .col(ColumnDef::new(DatosComercio::Cuit).string().null())
                        .col(
                            ColumnDef::new(DatosComercio::ProximoNumeroFactura)
                                .big_integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DatosComercio::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(MediosPago::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Categorias::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Categorias {
        Table,
        Id,
        Uid,
        Nombre,
    }

    #[derive(Iden)]
    enum MediosPago {
        Table,
        Id,
        Uid,
        Nombre,
    }

    #[derive(Iden)]
    enum DatosComercio {
        Table,
        Id,
        Uid,
        NombreComercio,
        Direccion,
        Telefono,
        Cuit,
        ProximoNumeroFactura,
    }
}
