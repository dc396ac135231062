//! Data loading and dataset implementations
//!
//! Both loaders produce dense vectors with labels mapped to ±1 by sign.

pub mod csv;
pub mod libsvm;

pub use self::csv::*;
pub use self::libsvm::*;
