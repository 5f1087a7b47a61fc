use sea_orm_migration::prelude::*;

use crate::m20260302_000001_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Notifications {
    Table,
    Id,
    Owner,
    Kind,
    Status,
    CreatedAt,
}

#[derive(Iden)]
pub enum NotificationMessages {
    Table,
    Id,
    NotificationId,
    Seq,
    Sender,
    Body,
    SentAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::Owner).string().not_null())
                    .col(ColumnDef::new(Notifications::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Notifications::Status)
                            .string()
                            .not_null()
                            .default("requested"),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notifications-owner")
                            .from(Notifications::Table, Notifications::Owner)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-notifications-owner-created_at")
                    .table(Notifications::Table)
                    .col(Notifications::Owner)
                    .col(Notifications::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NotificationMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NotificationMessages::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NotificationMessages::NotificationId)
                            .blob()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NotificationMessages::Seq)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(NotificationMessages::Sender).string().not_null())
                    .col(ColumnDef::new(NotificationMessages::Body).string().not_null())
                    .col(
                        ColumnDef::new(NotificationMessages::SentAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notification_messages-notification_id")
                            .from(
                                NotificationMessages::Table,
                                NotificationMessages::NotificationId,
                            )
                            .to(Notifications::Table, Notifications::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-notification_messages-notification_id-seq-unique")
                    .table(NotificationMessages::Table)
                    .col(NotificationMessages::NotificationId)
                    .col(NotificationMessages::Seq)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(NotificationMessages::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await
    }
}
