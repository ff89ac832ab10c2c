//! Shared types and models for the Granary warehouse platform
//!
//! This crate contains the domain types and the stock accounting model
//! shared between the backend and other components of the system.

pub mod models;
pub mod stock;
pub mod types;
pub mod validation;

pub use models::*;
pub use stock::*;
pub use types::*;
pub use validation::*;
