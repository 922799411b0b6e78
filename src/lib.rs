//! vinx: VIN decoding over the NHTSA vPIC API with a local SQLite history
//! that keeps answering when the registry is unreachable.

pub mod app;
pub mod commands;
pub mod config;
pub mod logging;
pub mod nhtsa;
pub mod output;
pub mod repository;
pub mod shell;
pub mod store;
pub mod vin;
