//! Common utilities and shared types for homestay-rs.
//!
//! This crate provides foundational components used across all homestay-rs crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based record identifiers via [`id::generate_id`]
//!
//! # Example
//!
//! ```no_run
//! use homestay_common::{Config, AppResult, id::generate_id};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id = generate_id();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;

pub use config::Config;
pub use error::{AppError, AppResult};

