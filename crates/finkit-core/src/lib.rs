pub mod error;
pub mod explain;
pub mod guardrails;
pub mod solver;
pub mod time_value;
pub mod types;

#[cfg(feature = "loans")]
pub mod loans;

#[cfg(feature = "investments")]
pub mod investments;

#[cfg(feature = "bonds")]
pub mod bonds;

#[cfg(feature = "corporate")]
pub mod corporate;

#[cfg(feature = "risk")]
pub mod risk;

#[cfg(feature = "goals")]
pub mod goals;

#[cfg(feature = "comparison")]
pub mod comparison;

#[cfg(feature = "timeline")]
pub mod timeline;

#[cfg(feature = "stocks")]
pub mod stocks;

#[cfg(feature = "afford")]
pub mod afford;

pub use error::FinkitError;
pub use types::*;

/// Standard result type for all finkit operations
pub type FinkitResult<T> = Result<T, FinkitError>;
