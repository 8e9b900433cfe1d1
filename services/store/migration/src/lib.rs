use sea_orm_migration::prelude::*;

mod m20261017_000001_create_categories;
mod m20261017_000002_create_products;
mod m20261017_000003_create_carts;
mod m20261017_000004_create_cart_items;
mod m20261017_000005_create_orders;
mod m20261017_000006_create_order_items;
mod m20261017_000007_create_profiles;
mod m20261017_000008_add_lookup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261017_000001_create_categories::Migration),
            Box::new(m20261017_000002_create_products::Migration),
            Box::new(m20261017_000003_create_carts::Migration),
            Box::new(m20261017_000004_create_cart_items::Migration),
            Box::new(m20261017_000005_create_orders::Migration),
            Box::new(m20261017_000006_create_order_items::Migration),
            Box::new(m20261017_000007_create_profiles::Migration),
            Box::new(m20261017_000008_add_lookup_indexes::Migration),
        ]
    }
}
