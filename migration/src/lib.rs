pub use sea_orm_migration::prelude::*;

mod m20261019_000001_create_chairs;
mod m20261019_000002_create_rides;
mod m20261019_000003_create_chair_locations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_chairs::Migration),
            Box::new(m20261019_000002_create_rides::Migration),
            Box::new(m20261019_000003_create_chair_locations::Migration),
        ]
    }
}
