//! Business logic services for the AgroIntel decision engine

pub mod treatment;
pub mod yield_prediction;

pub use treatment::TreatmentService;
pub use yield_prediction::YieldService;
