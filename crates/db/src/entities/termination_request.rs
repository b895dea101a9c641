//! Termination request entity.
//!
//! A participant-initiated, admin-adjudicated request to end a facilitation.
//! At most one pending request may exist per facilitation; a partial unique
//! index enforces this at the storage layer.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::account::AccountRole;

/// Termination request status. Approved and rejected are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[derive(Default)]
pub enum TerminationStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl TerminationStatus {
    /// Stable string form used in API payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Termination request model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "termination_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The facilitation this request wants to end.
    pub facilitation_id: String,

    /// The participant who filed the request.
    pub requester_id: String,

    /// Role the requester holds in the facilitation.
    pub requester_role: AccountRole,

    /// Why the requester wants to end the arrangement. Required.
    #[sea_orm(column_type = "Text")]
    pub reason: String,

    /// Current status.
    pub status: TerminationStatus,

    /// Notes from the reviewing admin (required on rejection).
    #[sea_orm(column_type = "Text", nullable)]
    pub admin_notes: Option<String>,

    /// Admin who adjudicated the request.
    #[sea_orm(nullable)]
    pub reviewed_by: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    /// When the request was adjudicated.
    #[sea_orm(nullable)]
    pub reviewed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::facilitation::Entity",
        from = "Column::FacilitationId",
        to = "super::facilitation::Column::Id"
    )]
    Facilitation,
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::RequesterId",
        to = "super::account::Column::Id"
    )]
    Requester,
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::ReviewedBy",
        to = "super::account::Column::Id"
    )]
    Reviewer,
}

impl Related<super::facilitation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Facilitation.def()
    }
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requester.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
