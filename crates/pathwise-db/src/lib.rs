//! Persistence layer for pathwise: connection pool, embedded migrations,
//! row models, and query functions for the `roadmaps` and
//! `roadmap_progress` tables.

pub mod config;
pub mod error;
pub mod models;
pub mod pool;
pub mod queries;

pub use error::PersistenceError;
