//! Domain models

pub mod client;
pub mod movement;
pub mod user;

pub use client::*;
pub use movement::*;
pub use user::*;
