//! Create facilitation table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Facilitation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Facilitation::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Facilitation::HostId).string_len(32).not_null())
                    .col(ColumnDef::new(Facilitation::StudentId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Facilitation::Status)
                            .string_len(16)
                            .not_null()
                            .default("matched"),
                    )
                    .col(
                        ColumnDef::new(Facilitation::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Facilitation::CompletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_facilitation_host")
                            .from(Facilitation::Table, Facilitation::HostId)
                            .to(Account::Table, Account::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_facilitation_student")
                            .from(Facilitation::Table, Facilitation::StudentId)
                            .to(Account::Table, Account::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: host (participant lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_facilitation_host_id")
                    .table(Facilitation::Table)
                    .col(Facilitation::HostId)
                    .to_owned(),
            )
            .await?;

        // Index: student (participant lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_facilitation_student_id")
                    .table(Facilitation::Table)
                    .col(Facilitation::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Facilitation::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Facilitation {
    Table,
    Id,
    HostId,
    StudentId,
    Status,
    CreatedAt,
    CompletedAt,
}

#[derive(Iden)]
enum Account {
    Table,
    Id,
}
