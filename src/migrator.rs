use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_categories_table::Migration),
            Box::new(m20240601_000002_create_suppliers_table::Migration),
            Box::new(m20240601_000003_create_products_table::Migration),
            Box::new(m20240601_000004_create_orders_table::Migration),
            Box::new(m20240601_000005_create_order_items_table::Migration),
        ]
    }
}

mod m20240601_000001_create_categories_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_categories_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categories::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Categories::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Categories::Description).string().null())
                        .col(ColumnDef::new(Categories::ParentId).uuid().null())
                        .col(
                            ColumnDef::new(Categories::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Categories::Image).string().null())
                        .col(
                            ColumnDef::new(Categories::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Categories::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_categories_parent_id")
                        .table(Categories::Table)
                        .col(Categories::ParentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Categories {
        Table,
        Id,
        Name,
        Description,
        ParentId,
        IsActive,
        Image,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000002_create_suppliers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_suppliers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Suppliers::Name).string().not_null())
                        .col(
                            ColumnDef::new(Suppliers::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Suppliers::Phone).string().not_null())
                        .col(ColumnDef::new(Suppliers::Street).string().not_null())
                        .col(ColumnDef::new(Suppliers::City).string().not_null())
                        .col(ColumnDef::new(Suppliers::State).string().not_null())
                        .col(ColumnDef::new(Suppliers::ZipCode).string().not_null())
                        .col(ColumnDef::new(Suppliers::Country).string().not_null())
                        .col(ColumnDef::new(Suppliers::ContactName).string().not_null())
                        .col(
                            ColumnDef::new(Suppliers::ContactDesignation)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(Suppliers::ContactPhone).string().null())
                        .col(ColumnDef::new(Suppliers::ContactEmail).string().null())
                        .col(
                            ColumnDef::new(Suppliers::BusinessLicense)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Suppliers::TaxId).string().null())
                        .col(ColumnDef::new(Suppliers::PaymentTerms).string().not_null())
                        .col(
                            ColumnDef::new(Suppliers::Rating)
                                .float()
                                .not_null()
                                .default(3.0),
                        )
                        .col(
                            ColumnDef::new(Suppliers::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Suppliers::Notes).string().null())
                        .col(
                            ColumnDef::new(Suppliers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Suppliers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Suppliers {
        Table,
        Id,
        Name,
        Email,
        Phone,
        Street,
        City,
        State,
        ZipCode,
        Country,
        ContactName,
        ContactDesignation,
        ContactPhone,
        ContactEmail,
        BusinessLicense,
        TaxId,
        PaymentTerms,
        Rating,
        IsActive,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000003_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Description).string().not_null())
                        .col(ColumnDef::new(Products::CategoryId).uuid().not_null())
                        .col(ColumnDef::new(Products::SupplierId).uuid().not_null())
                        .col(
                            ColumnDef::new(Products::Sku)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::CostPrice)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::MinStockLevel)
                                .integer()
                                .not_null()
                                .default(10),
                        )
                        .col(ColumnDef::new(Products::Size).string().not_null())
                        .col(ColumnDef::new(Products::Color).string().not_null())
                        .col(ColumnDef::new(Products::Material).string().not_null())
                        .col(ColumnDef::new(Products::Images).json().not_null())
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Products::Tags).json().not_null())
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_products_category_id")
                        .table(Products::Table)
                        .col(Products::CategoryId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_products_supplier_id")
                        .table(Products::Table)
                        .col(Products::SupplierId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Products {
        Table,
        Id,
        Name,
        Description,
        CategoryId,
        SupplierId,
        Sku,
        Price,
        CostPrice,
        Quantity,
        MinStockLevel,
        Size,
        Color,
        Material,
        Images,
        IsActive,
        Tags,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000004_create_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Orders::OrderNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::OrderType).string().not_null())
                        .col(ColumnDef::new(Orders::SupplierId).uuid().null())
                        .col(ColumnDef::new(Orders::CustomerName).string().null())
                        .col(ColumnDef::new(Orders::CustomerEmail).string().null())
                        .col(ColumnDef::new(Orders::CustomerPhone).string().null())
                        .col(ColumnDef::new(Orders::CustomerAddress).string().null())
                        .col(
                            ColumnDef::new(Orders::Subtotal)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::Tax)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::Discount)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::Total)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(ColumnDef::new(Orders::PaymentStatus).string().not_null())
                        .col(ColumnDef::new(Orders::PaymentMethod).string().null())
                        .col(
                            ColumnDef::new(Orders::OrderDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::ExpectedDeliveryDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Orders::ActualDeliveryDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Orders::Notes).string().null())
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_order_type")
                        .table(Orders::Table)
                        .col(Orders::OrderType)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Orders {
        Table,
        Id,
        OrderNumber,
        OrderType,
        SupplierId,
        CustomerName,
        CustomerEmail,
        CustomerPhone,
        CustomerAddress,
        Subtotal,
        Tax,
        Discount,
        Total,
        Status,
        PaymentStatus,
        PaymentMethod,
        OrderDate,
        ExpectedDeliveryDate,
        ActualDeliveryDate,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000005_create_order_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000005_create_order_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(OrderItems::UnitPrice)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::TotalPrice)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_order_items_product_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        Quantity,
        UnitPrice,
        TotalPrice,
    }
}
