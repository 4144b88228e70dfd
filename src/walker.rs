use std::fmt;

use crate::error::{WalkError, WalkResult};
use crate::registry::TypeTag;
use crate::traverse::Traverse;

// -----------------------------------------------------------------------------
// Mode

/// The purpose a full traversal is running with.
///
/// Every pass visits the members of the object graph in exactly the same
/// order; only the leaf operation differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Accumulate the total byte count without touching any buffer.
    Sizing,
    /// Write bytes into a pre-sized buffer.
    Packing,
    /// Read bytes back, populating the value in place.
    Unpacking,
    /// Visit every node in order without moving bytes.
    ///
    /// This is the vehicle for [`RunVisitor`]-style instrumentation: hooks
    /// still fire, the byte layout is never touched.
    Custom,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sizing => "Sizing",
            Self::Packing => "Packing",
            Self::Unpacking => "Unpacking",
            Self::Custom => "Custom",
        };
        f.write_str(name)
    }
}

// -----------------------------------------------------------------------------
// RunVisitor

/// Observation hook for contiguous runs of a byte-copyable element type.
///
/// Attached with [`Walker::with_run_visitor`]. The walker announces each run
/// (a `Vec<f64>` body, a `String`'s bytes, an array of scalars) as a unit
/// before its elements are traversed. Purely observational: the byte layout
/// is identical with or without a visitor.
///
/// # Example
///
/// ```
/// use flatwalk::{Mode, RunVisitor, Traverse, Walker};
///
/// #[derive(Default)]
/// struct RunCounter {
///     runs: usize,
///     bytes: usize,
/// }
///
/// impl RunVisitor for RunCounter {
///     fn visit_run(&mut self, _mode: Mode, _key: &'static str, elem_size: usize, count: usize) {
///         self.runs += 1;
///         self.bytes += elem_size * count;
///     }
/// }
///
/// let samples = vec![1.0_f64; 11];
/// let mut counter = RunCounter::default();
/// let mut walker = Walker::custom().with_run_visitor(&mut counter);
/// samples.traverse(&mut walker).unwrap();
///
/// assert_eq!(counter.runs, 1);
/// assert_eq!(counter.bytes, 88);
/// ```
pub trait RunVisitor {
    /// Called once per contiguous run of `count` byte-copyable elements.
    fn visit_run(&mut self, mode: Mode, type_key: &'static str, elem_size: usize, count: usize);
}

// -----------------------------------------------------------------------------
// Trace stack

#[cfg(feature = "debug")]
#[derive(Default)]
struct TraceStack {
    stack: Vec<&'static str>,
}

#[cfg(feature = "debug")]
impl TraceStack {
    const fn new() -> Self {
        Self { stack: Vec::new() }
    }

    fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    fn render(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let mut iter = self.stack.iter();
        if let Some(first) = iter.next() {
            let _ = write!(out, "`{first}`");
        }
        for key in iter {
            let _ = write!(out, " -> `{key}`");
        }
        out
    }
}

// -----------------------------------------------------------------------------
// Walker

enum Cursor<'a> {
    Size { total: usize },
    Write { buffer: &'a mut [u8], offset: usize },
    Read { buffer: &'a [u8], offset: usize },
    Inert,
}

/// The mutable context that drives one full traversal.
///
/// Exactly one walker instance drives one pass over one value; it is passed
/// by `&mut` through every recursive [`Traverse`] call and is deliberately
/// neither `Clone` nor `Copy` — a copy would duplicate or lose cursor state.
///
/// Leaf operations go through [`put`](Walker::put) (Sizing advances the
/// counter, Packing writes, Custom ignores) and [`take`](Walker::take)
/// (Unpacking only). Composite shapes use the
/// [`put_len`](Walker::put_len)/[`take_len`](Walker::take_len) and
/// [`put_tag`](Walker::put_tag)/[`take_tag`](Walker::take_tag) header
/// helpers so their metadata always precedes their elements.
///
/// # Example
///
/// ```
/// use flatwalk::{Traverse, Walker};
///
/// let value = 0x1234_u16;
///
/// let mut sizer = Walker::sizing();
/// value.traverse(&mut sizer).unwrap();
/// assert_eq!(sizer.position(), 2);
///
/// let mut buffer = [0u8; 2];
/// let mut packer = Walker::packing(&mut buffer);
/// value.traverse(&mut packer).unwrap();
/// assert_eq!(buffer, [0x34, 0x12]);
/// ```
pub struct Walker<'a> {
    mode: Mode,
    cursor: Cursor<'a>,
    visitor: Option<&'a mut dyn RunVisitor>,
    #[cfg(feature = "debug")]
    trace: TraceStack,
}

impl<'a> Walker<'a> {
    fn new(mode: Mode, cursor: Cursor<'a>) -> Self {
        Self {
            mode,
            cursor,
            visitor: None,
            #[cfg(feature = "debug")]
            trace: TraceStack::new(),
        }
    }

    /// Create a walker for the sizing pass.
    pub fn sizing() -> Self {
        Self::new(Mode::Sizing, Cursor::Size { total: 0 })
    }

    /// Create a walker that packs into `buffer`.
    ///
    /// The buffer must be exactly the size the sizing pass computed;
    /// [`crate::serialize`] checks this after the pass completes.
    pub fn packing(buffer: &'a mut [u8]) -> Self {
        Self::new(Mode::Packing, Cursor::Write { buffer, offset: 0 })
    }

    /// Create a walker that unpacks from `buffer`.
    pub fn unpacking(buffer: &'a [u8]) -> Self {
        Self::new(Mode::Unpacking, Cursor::Read { buffer, offset: 0 })
    }

    /// Create a walker for the custom pass: full visit order, no bytes.
    pub fn custom() -> Self {
        Self::new(Mode::Custom, Cursor::Inert)
    }

    /// Attach a [`RunVisitor`] observing byte-copyable runs.
    pub fn with_run_visitor(mut self, visitor: &'a mut dyn RunVisitor) -> Self {
        self.visitor = Some(visitor);
        self
    }

    /// The pass this walker is running.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Bytes sized, written or read so far.
    pub fn position(&self) -> usize {
        match &self.cursor {
            Cursor::Size { total } => *total,
            Cursor::Write { offset, .. } | Cursor::Read { offset, .. } => *offset,
            Cursor::Inert => 0,
        }
    }

    // -------------------------------------------------------------------------
    // Leaf operations

    /// Account for (Sizing), write (Packing) or ignore (Custom) `bytes`.
    ///
    /// Calling this during Unpacking is a [`WalkError::ModeMismatch`].
    pub fn put(&mut self, bytes: &[u8]) -> WalkResult<()> {
        match &mut self.cursor {
            Cursor::Size { total } => {
                *total += bytes.len();
                Ok(())
            }
            Cursor::Write { buffer, offset } => {
                let end = match offset.checked_add(bytes.len()) {
                    Some(end) if end <= buffer.len() => end,
                    _ => {
                        return Err(WalkError::Overrun {
                            offset: *offset,
                            needed: bytes.len(),
                            available: buffer.len(),
                        });
                    }
                };
                buffer[*offset..end].copy_from_slice(bytes);
                *offset = end;
                Ok(())
            }
            Cursor::Inert => Ok(()),
            Cursor::Read { .. } => Err(WalkError::ModeMismatch {
                expected: Mode::Packing,
                found: Mode::Unpacking,
            }),
        }
    }

    /// Consume the next `len` bytes of the input buffer (Unpacking only).
    pub fn take(&mut self, len: usize) -> WalkResult<&'a [u8]> {
        match &mut self.cursor {
            Cursor::Read { buffer, offset } => {
                // `len` can come straight from a hostile length header, so
                // the end position must not be computed with plain addition.
                let end = match offset.checked_add(len) {
                    Some(end) if end <= buffer.len() => end,
                    _ => {
                        return Err(WalkError::Underrun {
                            offset: *offset,
                            needed: len,
                            available: buffer.len(),
                        });
                    }
                };
                let slice = &buffer[*offset..end];
                *offset = end;
                Ok(slice)
            }
            _ => Err(WalkError::ModeMismatch {
                expected: Mode::Unpacking,
                found: self.mode,
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Header helpers

    /// Write an element-count header (8-byte little-endian `u64`).
    pub fn put_len(&mut self, len: usize) -> WalkResult<()> {
        self.put(&(len as u64).to_le_bytes())
    }

    /// Read back an element-count header.
    pub fn take_len(&mut self) -> WalkResult<usize> {
        let offset = self.position();
        let raw = self.take(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(raw);
        usize::try_from(u64::from_le_bytes(bytes)).map_err(|_| WalkError::InvalidData {
            offset,
            reason: "length header exceeds the platform's address space".into(),
        })
    }

    /// Write a polymorphic type tag (4-byte little-endian `u32`).
    pub fn put_tag(&mut self, tag: TypeTag) -> WalkResult<()> {
        self.put(&tag.value().to_le_bytes())
    }

    /// Read back a polymorphic type tag.
    pub fn take_tag(&mut self) -> WalkResult<TypeTag> {
        let raw = self.take(4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(raw);
        Ok(TypeTag::from_value(u32::from_le_bytes(bytes)))
    }

    // -------------------------------------------------------------------------
    // Instrumentation

    /// Announce a contiguous run of `count` elements of `T` to the attached
    /// [`RunVisitor`], if `T` is byte-copyable.
    ///
    /// Container adapters call this after the size header and before the
    /// elements. The element size reported is `T`'s fixed wire width
    /// ([`Traverse::WIRE_WIDTH`]), not its in-memory size. A no-op without
    /// a visitor; never affects the byte layout.
    pub fn note_run<T: Traverse>(&mut self, count: usize) {
        if !T::BYTE_COPYABLE {
            return;
        }
        if let Some(visitor) = self.visitor.as_mut() {
            visitor.visit_run(self.mode, std::any::type_name::<T>(), T::WIRE_WIDTH, count);
        }
    }

    /// Push a type key onto the trace stack (the `debug` feature).
    ///
    /// Derive-generated traversals call this on entry; an early `?` return
    /// leaves the trail in place, which is exactly what
    /// [`WalkError::Traced`] reports.
    #[inline]
    pub fn enter(&mut self, key: &'static str) {
        #[cfg(feature = "debug")]
        self.trace.stack.push(key);
        #[cfg(not(feature = "debug"))]
        let _ = key;
    }

    /// Pop the trace stack. Pairs with [`enter`](Walker::enter).
    #[inline]
    pub fn leave(&mut self) {
        #[cfg(feature = "debug")]
        self.trace.stack.pop();
    }

    pub(crate) fn attach_trace(&self, err: WalkError) -> WalkError {
        #[cfg(feature = "debug")]
        if !self.trace.is_empty() {
            return WalkError::Traced {
                path: self.trace.render(),
                source: Box::new(err),
            };
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizing_accumulates() {
        let mut walker = Walker::sizing();
        walker.put(&[0; 3]).unwrap();
        walker.put_len(11).unwrap();
        assert_eq!(walker.mode(), Mode::Sizing);
        assert_eq!(walker.position(), 11);
    }

    #[test]
    fn packing_is_bounds_checked() {
        let mut buffer = [0u8; 4];
        let mut walker = Walker::packing(&mut buffer);
        walker.put(&[1, 2, 3]).unwrap();

        let err = walker.put(&[4, 5]).unwrap_err();
        match err {
            WalkError::Overrun {
                offset,
                needed,
                available,
            } => {
                assert_eq!(offset, 3);
                assert_eq!(needed, 2);
                assert_eq!(available, 4);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn unpacking_is_bounds_checked() {
        let buffer = [1u8, 2];
        let mut walker = Walker::unpacking(&buffer);
        assert_eq!(walker.take(2).unwrap(), &[1, 2]);

        let err = walker.take(1).unwrap_err();
        assert!(matches!(
            err,
            WalkError::Underrun {
                offset: 2,
                needed: 1,
                available: 2,
            }
        ));
    }

    #[test]
    fn oversized_read_request_is_underrun_not_overflow() {
        let buffer = [0u8; 4];
        let mut walker = Walker::unpacking(&buffer);
        walker.take(2).unwrap();

        let err = walker.take(usize::MAX).unwrap_err();
        assert!(matches!(
            err,
            WalkError::Underrun {
                offset: 2,
                needed: usize::MAX,
                available: 4,
            }
        ));
    }

    #[test]
    fn take_in_read_only_pass_is_a_mode_mismatch() {
        let mut walker = Walker::sizing();
        let err = walker.take(1).unwrap_err();
        assert!(matches!(
            err,
            WalkError::ModeMismatch {
                expected: Mode::Unpacking,
                found: Mode::Sizing,
            }
        ));
    }

    #[test]
    fn put_during_unpacking_is_a_mode_mismatch() {
        let buffer = [0u8; 2];
        let mut walker = Walker::unpacking(&buffer);
        assert!(matches!(
            walker.put(&[1]).unwrap_err(),
            WalkError::ModeMismatch { .. }
        ));
    }

    #[test]
    fn length_header_round_trips() {
        let mut buffer = [0u8; 8];
        let mut packer = Walker::packing(&mut buffer);
        packer.put_len(11).unwrap();

        let mut reader = Walker::unpacking(&buffer);
        assert_eq!(reader.take_len().unwrap(), 11);
    }

    #[test]
    fn tag_header_round_trips() {
        let mut buffer = [0u8; 4];
        let mut packer = Walker::packing(&mut buffer);
        packer.put_tag(TypeTag::from_value(7)).unwrap();

        let mut reader = Walker::unpacking(&buffer);
        assert_eq!(reader.take_tag().unwrap(), TypeTag::from_value(7));
    }

    #[test]
    fn custom_pass_moves_no_bytes() {
        let mut walker = Walker::custom();
        walker.put(&[1, 2, 3]).unwrap();
        assert_eq!(walker.position(), 0);
    }

    #[cfg(feature = "debug")]
    #[test]
    fn trace_is_attached_to_errors() {
        let mut walker = Walker::sizing();
        walker.enter("outer::Foo");
        walker.enter("inner::Bar");
        let err = walker.attach_trace(WalkError::SizeMismatch {
            sized: 1,
            written: 2,
        });
        match &err {
            WalkError::Traced { path, .. } => {
                assert_eq!(path, "`outer::Foo` -> `inner::Bar`");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(matches!(err.root(), WalkError::SizeMismatch { .. }));
    }
}
