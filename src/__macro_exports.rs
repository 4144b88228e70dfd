//! Implementation details of this crate's macro expansions.
//!
//! Everything here is semver-exempt and must never be used directly.

#[doc(hidden)]
pub use inventory;
