//! Create termination request table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TerminationRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TerminationRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TerminationRequest::FacilitationId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TerminationRequest::RequesterId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TerminationRequest::RequesterRole)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TerminationRequest::Reason).text().not_null())
                    .col(
                        ColumnDef::new(TerminationRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(TerminationRequest::AdminNotes).text())
                    .col(ColumnDef::new(TerminationRequest::ReviewedBy).string_len(32))
                    .col(
                        ColumnDef::new(TerminationRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(TerminationRequest::ReviewedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_termination_request_facilitation")
                            .from(TerminationRequest::Table, TerminationRequest::FacilitationId)
                            .to(Facilitation::Table, Facilitation::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_termination_request_requester")
                            .from(TerminationRequest::Table, TerminationRequest::RequesterId)
                            .to(Account::Table, Account::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: facilitation (request lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_termination_request_facilitation_id")
                    .table(TerminationRequest::Table)
                    .col(TerminationRequest::FacilitationId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (recent-activity feed)
        manager
            .create_index(
                Index::create()
                    .name("idx_termination_request_created_at")
                    .table(TerminationRequest::Table)
                    .col(TerminationRequest::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Partial unique index: at most one pending request per facilitation.
        // Two concurrent requesters both passing the application-level check
        // race here; the index serializes them. sea-query cannot express a
        // partial index, so raw SQL it is.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX idx_termination_request_pending_unique \
                 ON termination_request (facilitation_id) WHERE status = 'pending'",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TerminationRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TerminationRequest {
    Table,
    Id,
    FacilitationId,
    RequesterId,
    RequesterRole,
    Reason,
    Status,
    AdminNotes,
    ReviewedBy,
    CreatedAt,
    ReviewedAt,
}

#[derive(Iden)]
enum Facilitation {
    Table,
    Id,
}

#[derive(Iden)]
enum Account {
    Table,
    Id,
}
