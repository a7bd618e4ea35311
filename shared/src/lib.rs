//! Shared types and computation for the AgroIntel decision engine
//!
//! This crate contains the domain models, reference tables and the pure
//! yield estimator shared between the backend, the browser (via WASM), and
//! other components of the system.

pub mod estimator;
pub mod models;
pub mod reference;
pub mod types;
pub mod validation;

pub use estimator::*;
pub use models::*;
pub use reference::*;
pub use types::*;
pub use validation::*;
