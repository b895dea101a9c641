//! Business logic services.

pub mod account;
pub mod dashboard;
pub mod facilitation;
pub mod moderation;
pub mod notifier;
pub mod termination;

pub use account::{AccountService, RegisterAccountInput};
pub use dashboard::{ActivityItem, ActivityKind, DashboardService, DashboardStats};
pub use facilitation::FacilitationService;
pub use moderation::ModerationService;
pub use notifier::{
    BroadcastNotifier, ChangeNotifier, ChangeNotifierHandle, ChangeSignal, NoOpChangeNotifier,
};
pub use termination::{CreateTerminationInput, TerminationService};
