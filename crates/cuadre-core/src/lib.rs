//! Domain layer for the cuadre accounting-analysis proxy.
//!
//! Holds the pieces that have no provider or transport dependencies: the
//! error type, runtime settings, the analysis result schema, the
//! spreadsheet formatter and the session subsystem.

pub mod analysis;
pub mod config;
pub mod error;
pub mod session;
pub mod tabular;

// Re-export common error type
pub use error::CuadreError;
