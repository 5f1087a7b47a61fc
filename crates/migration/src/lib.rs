pub use sea_orm_migration::prelude::*;

mod m20260302_000001_users;
mod m20260302_000002_categories;
mod m20260305_000001_expenses;
mod m20260305_000002_budgets;
mod m20260312_000001_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260302_000001_users::Migration),
            Box::new(m20260302_000002_categories::Migration),
            Box::new(m20260305_000001_expenses::Migration),
            Box::new(m20260305_000002_budgets::Migration),
            Box::new(m20260312_000001_notifications::Migration),
        ]
    }
}
