//! [`Traverse`](crate::Traverse) and [`Reconstruct`](crate::Reconstruct)
//! implementations for the leaf shapes of an object graph.
//!
//! Implemented menu:
//!
//! - integers `u8`-`u128`, `i8`-`i128` and floats `f32`, `f64`: fixed-width
//!   little-endian, byte-copyable;
//! - `usize` / `isize`: always 8 bytes on the wire regardless of platform;
//! - `bool` (one validated byte), `char` (validated `u32` scalar value),
//!   `()` (zero bytes);
//! - `String`: length header then raw UTF-8, validated on unpacking;
//! - `[T; N]`: elements in order, no header (the length is in the type);
//! - tuples up to twelve fields, in field order.
//!
//! Containers with dynamic shape live in [`crate::adapters`].

mod array;
mod scalar;
mod string;
mod tuple;
