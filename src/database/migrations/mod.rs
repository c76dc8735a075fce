//! SeaORM migrations for multi-database support
//!
//! Database-agnostic migrations that work across SQLite, PostgreSQL and
//! MySQL; column types are chosen per backend where necessary.

use sea_orm_migration::prelude::*;

pub mod m20260801_000001_create_streams;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260801_000001_create_streams::Migration)]
    }
}
