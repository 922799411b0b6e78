//! Client for the NHTSA vPIC vehicle registry API.

pub mod api_types;
pub mod client;
mod fields;
pub mod types;

pub use api_types::ModelResult;
pub use client::{NhtsaClient, VehicleApi};
pub use types::VehicleInfo;
