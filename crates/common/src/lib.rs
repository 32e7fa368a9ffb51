//! Shared building blocks for the Queens dashboard: configuration, database
//! handles, tracing setup and the leaderboard domain model.

pub mod config;
pub mod db;
pub mod error;
pub mod observability;
pub mod scoring;
pub mod stats;
pub mod types;
