//! HTTP handlers

pub mod auth;
pub mod clients;
pub mod health;
pub mod movements;
pub mod reports;
pub mod users;

pub use auth::*;
pub use clients::*;
pub use health::*;
pub use movements::*;
pub use reports::*;
pub use users::*;
