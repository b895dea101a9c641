//! Database entities.

pub mod account;
pub mod facilitation;
pub mod termination_request;

pub use account::Entity as Account;
pub use facilitation::Entity as Facilitation;
pub use termination_request::Entity as TerminationRequest;
