//! Shared types and models for the PestCheck platform
//!
//! This crate contains types shared between the client SDK, the browser
//! shell (via WASM), and other components of the system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
