//! Command implementations for the todo CLI

pub mod serve;

pub use serve::run_serve;
