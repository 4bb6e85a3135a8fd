//! Foundational data structures, error types, and container type definitions.

pub mod error;
pub mod filetypes;
pub mod models;
