use std::fs;
use std::path::Path;

use crate::buffer::PackedBuffer;
use crate::error::{WalkError, WalkResult};
use crate::traverse::{Reconstruct, Traverse};
use crate::walker::Walker;

// -----------------------------------------------------------------------------
// Serialize

/// Pack `value` into an exactly-sized byte buffer.
///
/// Runs the sizing pass, allocates the computed byte count, then runs the
/// packing pass over the same member order. The two passes disagreeing
/// about any member is reported as [`WalkError::SizeMismatch`] and means a
/// [`Traverse`] implementation whose two bodies diverged.
///
/// # Example
///
/// ```
/// use flatwalk::derive::Traverse;
///
/// #[derive(Traverse, Default, PartialEq, Debug)]
/// #[traverse(default)]
/// struct Pair {
///     a: i32,
///     b: i32,
/// }
///
/// let buffer = flatwalk::serialize(&Pair { a: 29, b: 31 }).unwrap();
/// assert_eq!(buffer.len(), 8);
///
/// let back: Pair = flatwalk::deserialize(buffer.as_bytes()).unwrap();
/// assert_eq!(back, Pair { a: 29, b: 31 });
/// ```
///
/// Serializable types must also carry a [`Reconstruct`] strategy, the same
/// requirement [`deserialize`] enforces. A type with a traversal but no
/// strategy is rejected at compile time on this side too:
///
/// ```compile_fail
/// use flatwalk::{Traverse, WalkResult, Walker};
///
/// struct Opaque {
///     id: u32,
/// }
///
/// impl Traverse for Opaque {
///     fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
///         self.id.traverse(walker)
///     }
///
///     fn traverse_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()> {
///         self.id.traverse_mut(walker)
///     }
/// }
///
/// // No reconstruction strategy: this does not compile.
/// let _ = flatwalk::serialize(&Opaque { id: 4 });
/// ```
pub fn serialize<T: Traverse + Reconstruct>(value: &T) -> WalkResult<PackedBuffer> {
    let sized = serialized_size(value)?;
    let mut bytes = vec![0u8; sized];

    let mut walker = Walker::packing(&mut bytes);
    if let Err(err) = value.traverse(&mut walker) {
        return Err(walker.attach_trace(err));
    }
    let written = walker.position();
    if written != sized {
        return Err(WalkError::SizeMismatch { sized, written });
    }
    Ok(PackedBuffer::new(bytes))
}

/// Compute the exact packed size of `value` without writing any bytes.
///
/// This is the sizing pass on its own. It is deterministic for an
/// unchanged value: calling it twice yields the same count, and that count
/// is exactly what [`serialize`] produces.
pub fn serialized_size<T: Traverse + Reconstruct>(value: &T) -> WalkResult<usize> {
    let mut walker = Walker::sizing();
    match value.traverse(&mut walker) {
        Ok(()) => Ok(walker.position()),
        Err(err) => Err(walker.attach_trace(err)),
    }
}

// -----------------------------------------------------------------------------
// Deserialize

/// Rebuild a value of type `T` from a packed buffer.
///
/// `T` must carry a [`Reconstruct`] strategy in addition to its traversal;
/// a type with neither `#[traverse(default)]` nor `#[traverse(factory)]`
/// (nor a manual implementation) is rejected at compile time:
///
/// ```compile_fail
/// use flatwalk::{Traverse, WalkResult, Walker};
///
/// struct Opaque {
///     id: u32,
/// }
///
/// impl Traverse for Opaque {
///     fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
///         self.id.traverse(walker)
///     }
///
///     fn traverse_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()> {
///         self.id.traverse_mut(walker)
///     }
/// }
///
/// // No reconstruction strategy: this does not compile.
/// let _ = flatwalk::deserialize::<Opaque>(&[0; 4]);
/// ```
///
/// The whole buffer must be consumed; leftover bytes are reported as
/// [`WalkError::TrailingBytes`] rather than silently ignored.
pub fn deserialize<T: Traverse + Reconstruct>(bytes: &[u8]) -> WalkResult<T> {
    let mut walker = Walker::unpacking(bytes);
    let value = match T::unpack_from(&mut walker) {
        Ok(value) => value,
        Err(err) => return Err(walker.attach_trace(err)),
    };
    let consumed = walker.position();
    if consumed != bytes.len() {
        return Err(WalkError::TrailingBytes {
            consumed,
            total: bytes.len(),
        });
    }
    Ok(value)
}

/// Rebuild from a packed buffer into existing storage.
///
/// Skips reconstruction entirely: `value`'s members are overwritten in
/// place, which reuses allocations where the implementations allow it
/// (e.g. a `Box<dyn Base>` already holding the right subtype). The same
/// whole-buffer rule as [`deserialize`] applies.
pub fn deserialize_in_place<T: Traverse>(value: &mut T, bytes: &[u8]) -> WalkResult<()> {
    let mut walker = Walker::unpacking(bytes);
    if let Err(err) = value.traverse_mut(&mut walker) {
        return Err(walker.attach_trace(err));
    }
    let consumed = walker.position();
    if consumed != bytes.len() {
        return Err(WalkError::TrailingBytes {
            consumed,
            total: bytes.len(),
        });
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Files

/// [`serialize`] straight into a file.
pub fn serialize_to_file<T: Traverse + Reconstruct>(
    value: &T,
    path: impl AsRef<Path>,
) -> WalkResult<()> {
    let buffer = serialize(value)?;
    fs::write(path, buffer.as_bytes())?;
    Ok(())
}

/// [`deserialize`] straight from a file.
pub fn deserialize_from_file<T: Traverse + Reconstruct>(path: impl AsRef<Path>) -> WalkResult<T> {
    let bytes = fs::read(path)?;
    deserialize(&bytes)
}
