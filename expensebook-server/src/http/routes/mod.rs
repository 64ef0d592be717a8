//! Route handlers organized by resource

pub mod expense;
pub mod health;
