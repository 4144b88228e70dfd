//! Process-wide type registration.
//!
//! Two layers live here:
//!
//! - [`TypeRegistry`]: maps stable string keys to small numeric
//!   [`TypeTag`]s, lazily, in first-use order. The process-global instance
//!   ([`TypeRegistry::global`]) backs polymorphic dispatch.
//! - [`PolyRecord`] / [`PolyTable`]: the open registry of concrete subtypes
//!   per polymorphic base, collected through `inventory` submissions made
//!   by [`poly_impl!`](crate::poly_impl) and assembled on first use of the
//!   base by the code [`poly_base!`](crate::poly_base) expands to.

// -----------------------------------------------------------------------------
// Modules

mod poly;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use poly::{PolyRecord, PolyTable};
pub use type_registry::{SharedTypeRegistry, TypeRegistry, TypeTag};
