//! Domain models for the AgroIntel decision engine

mod crop;
mod prediction;
mod scoring;
mod treatment;
mod weather;

pub use crop::*;
pub use prediction::*;
pub use scoring::*;
pub use treatment::*;
pub use weather::*;
