//! Command implementations for the expensebook CLI

pub mod serve;

pub use serve::run_serve;
