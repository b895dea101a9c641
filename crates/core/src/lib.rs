//! Core business logic for homestay-rs.
//!
//! Services wrap the repositories in `homestay-db` with the moderation
//! lifecycle rules, the termination workflow, and the dashboard projections,
//! and emit change signals through the notifier abstraction.

pub mod services;

pub use services::*;
