//! Account entity.
//!
//! One row per platform participant (host or student). The moderation flags are
//! deliberately independent booleans rather than a single status column: banning
//! a suspended account leaves the suspension audit trail in place, so lifting
//! the ban restores the prior state without re-deriving it. All status reads go
//! through [`Model::status`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a platform participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AccountRole {
    /// Elderly or disabled host offering accommodation.
    #[sea_orm(string_value = "host")]
    Host,
    /// Student helper.
    #[sea_orm(string_value = "student")]
    Student,
}

impl AccountRole {
    /// Stable string form used in API payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Student => "student",
        }
    }
}

/// Derived trust status of an account. Never stored; computed from the flags
/// by [`Model::status`] with strict BANNED > SUSPENDED > rest priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Signed up, awaiting verification.
    Pending,
    /// Verification approved.
    Verified,
    /// Verification rejected; may be reactivated back to pending.
    Rejected,
    /// Temporarily suspended (masked by a ban, if any).
    Suspended,
    /// Banned. Takes priority over every other flag.
    Banned,
}

impl AccountStatus {
    /// Stable string form used in API payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::Suspended => "suspended",
            Self::Banned => "banned",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    /// Participant role.
    pub role: AccountRole,

    /// Platform administrator flag.
    #[sea_orm(default_value = false)]
    pub is_admin: bool,

    /// Opaque bearer token issued by the external identity provider.
    #[sea_orm(unique, nullable)]
    pub token: Option<String>,

    /// Verification approved by an admin.
    #[sea_orm(default_value = false)]
    pub is_verified: bool,

    /// False once verification has been rejected; reactivation restores it.
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    /// Why verification was rejected.
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,

    /// Is this account suspended?
    #[sea_orm(default_value = false)]
    pub is_suspended: bool,

    #[sea_orm(column_type = "Text", nullable)]
    pub suspension_reason: Option<String>,

    #[sea_orm(nullable)]
    pub suspended_at: Option<DateTimeWithTimeZone>,

    /// Is this account banned?
    #[sea_orm(default_value = false)]
    pub is_banned: bool,

    #[sea_orm(column_type = "Text", nullable)]
    pub ban_reason: Option<String>,

    #[sea_orm(nullable)]
    pub banned_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Derive the trust status from the moderation flags.
    ///
    /// Pure and total over every representable flag combination. Priority is
    /// strict: a banned-and-suspended account always reads as banned, and the
    /// suspension only re-emerges once the ban is lifted.
    #[must_use]
    pub const fn status(&self) -> AccountStatus {
        if self.is_banned {
            AccountStatus::Banned
        } else if self.is_suspended {
            AccountStatus::Suspended
        } else if self.is_verified {
            AccountStatus::Verified
        } else if self.is_active {
            AccountStatus::Pending
        } else {
            AccountStatus::Rejected
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::termination_request::Entity")]
    TerminationRequests,
}

impl Related<super::termination_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TerminationRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
