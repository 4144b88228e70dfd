#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Usually, we need to use `crate` in the crate itself and use `flatwalk` in
// doc testing. Macro and derive expansions always emit `flatwalk::` paths,
// so an `extern self` ensures `flatwalk` can be used as an alias for `crate`.
extern crate self as flatwalk;

// -----------------------------------------------------------------------------
// Modules

mod buffer;
mod error;
mod traverse;
mod walker;

pub mod adapters;
pub mod impls;
pub mod registry;

mod api;

// -----------------------------------------------------------------------------
// Top-Level exports

pub mod __macro_exports;

pub use api::{
    deserialize, deserialize_from_file, deserialize_in_place, serialize, serialize_to_file,
    serialized_size,
};
pub use buffer::PackedBuffer;
pub use error::{WalkError, WalkResult};
pub use registry::{TypeRegistry, TypeTag};
pub use traverse::{PolyTraverse, Reconstruct, Traverse};
pub use walker::{Mode, RunVisitor, Walker};

pub use flatwalk_derive as derive;
