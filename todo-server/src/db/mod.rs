//! Database layer - connection pool and repositories
//!
//! # Design Principles
//!
//! - Pooled connections only; the pool is shared across requests
//! - Parameterized queries, no string-built SQL
//! - Every call bounded by a deadline

pub mod pool;
pub mod repos;

pub use pool::create_pool;
pub use repos::*;
