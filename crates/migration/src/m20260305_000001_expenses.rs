use sea_orm_migration::prelude::*;

use crate::m20260302_000001_users::Users;
use crate::m20260302_000002_categories::Categories;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Expenses {
    Table,
    Id,
    Owner,
    CategoryId,
    AmountMinor,
    Description,
    Date,
    PaymentMethod,
    Recurring,
    Frequency,
    Attachments,
    ApprovalStatus,
    ApprovalNote,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::Owner).string().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).blob().not_null())
                    .col(
                        ColumnDef::new(Expenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(ColumnDef::new(Expenses::Date).date().not_null())
                    .col(ColumnDef::new(Expenses::PaymentMethod).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::Recurring)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Expenses::Frequency).string())
                    .col(ColumnDef::new(Expenses::Attachments).json().not_null())
                    .col(
                        ColumnDef::new(Expenses::ApprovalStatus)
                            .string()
                            .not_null()
                            .default("requested"),
                    )
                    .col(ColumnDef::new(Expenses::ApprovalNote).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-owner")
                            .from(Expenses::Table, Expenses::Owner)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-category_id")
                            .from(Expenses::Table, Expenses::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-owner-date")
                    .table(Expenses::Table)
                    .col(Expenses::Owner)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-owner-category_id-date")
                    .table(Expenses::Table)
                    .col(Expenses::Owner)
                    .col(Expenses::CategoryId)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await
    }
}
