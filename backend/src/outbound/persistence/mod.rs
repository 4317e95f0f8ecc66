//! PostgreSQL persistence adapters (Diesel + diesel-async).

mod diesel_automation_repository;
mod diesel_profile_repository;
mod diesel_subscription_repository;
mod diesel_vote_repository;
mod error_mapping;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_automation_repository::DieselAutomationRepository;
pub use diesel_profile_repository::DieselProfileRepository;
pub use diesel_subscription_repository::DieselSubscriptionRepository;
pub use diesel_vote_repository::DieselVoteRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
