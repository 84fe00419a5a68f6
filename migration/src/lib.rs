pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_users_and_profiles;
mod m20250901_000002_create_catalog;
mod m20250901_000003_create_quizzes;
mod m20250901_000004_create_enrollments_and_certificates;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_users_and_profiles::Migration),
            Box::new(m20250901_000002_create_catalog::Migration),
            Box::new(m20250901_000003_create_quizzes::Migration),
            Box::new(m20250901_000004_create_enrollments_and_certificates::Migration),
        ]
    }
}
