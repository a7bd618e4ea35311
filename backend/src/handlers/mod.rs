//! HTTP handlers for the AgroIntel API

pub mod health;
pub mod treatment;
pub mod weather;
pub mod yield_prediction;

pub use health::*;
pub use treatment::*;
pub use weather::*;
pub use yield_prediction::*;
