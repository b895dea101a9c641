//! Database repositories.

pub mod account;
pub mod facilitation;
pub mod termination;

pub use account::AccountRepository;
pub use facilitation::FacilitationRepository;
pub use termination::TerminationRepository;
