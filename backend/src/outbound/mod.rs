//! Driven adapters: persistence and third-party services.

pub mod email;
pub mod persistence;
