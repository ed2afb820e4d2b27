//! Core Module - Business Logic
//!
//! Distance and pricing math plus the delivery estimator.

pub mod estimator;
pub mod geo;

pub use estimator::*;
pub use geo::*;
