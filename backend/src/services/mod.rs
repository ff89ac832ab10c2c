//! Business logic services

pub mod auth;
pub mod clients;
pub mod movements;
pub mod reporting;
pub mod users;

pub use auth::AuthService;
pub use clients::ClientService;
pub use movements::MovementService;
pub use reporting::ReportingService;
pub use users::UserService;
