//! Create account table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Account::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Account::Username).string_len(128).not_null())
                    .col(ColumnDef::new(Account::Role).string_len(16).not_null())
                    .col(ColumnDef::new(Account::IsAdmin).boolean().not_null().default(false))
                    .col(ColumnDef::new(Account::Token).string_len(64))
                    .col(ColumnDef::new(Account::IsVerified).boolean().not_null().default(false))
                    .col(ColumnDef::new(Account::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Account::RejectionReason).text())
                    .col(ColumnDef::new(Account::IsSuspended).boolean().not_null().default(false))
                    .col(ColumnDef::new(Account::SuspensionReason).text())
                    .col(ColumnDef::new(Account::SuspendedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Account::IsBanned).boolean().not_null().default(false))
                    .col(ColumnDef::new(Account::BanReason).text())
                    .col(ColumnDef::new(Account::BannedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Account::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Account::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: username
        manager
            .create_index(
                Index::create()
                    .name("idx_account_username")
                    .table(Account::Table)
                    .col(Account::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unique index: token
        manager
            .create_index(
                Index::create()
                    .name("idx_account_token")
                    .table(Account::Table)
                    .col(Account::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: created_at (recent-activity feed)
        manager
            .create_index(
                Index::create()
                    .name("idx_account_created_at")
                    .table(Account::Table)
                    .col(Account::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Account {
    Table,
    Id,
    Username,
    Role,
    IsAdmin,
    Token,
    IsVerified,
    IsActive,
    RejectionReason,
    IsSuspended,
    SuspensionReason,
    SuspendedAt,
    IsBanned,
    BanReason,
    BannedAt,
    CreatedAt,
    UpdatedAt,
}
