//! Conversions used to cross-check the reference multiplier

pub mod formats;

pub use formats::{from_sprs_csr, to_dense, to_sprs_csr};
