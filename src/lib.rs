//! voxbot library — exposes internal modules for integration tests.

pub mod agent;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod memory;
pub mod providers;
pub mod tools;
