use std::fmt;

// -----------------------------------------------------------------------------
// PackedBuffer

/// The owned result of [`crate::serialize`]: a contiguous byte image of one
/// object graph.
///
/// The buffer is exactly sized — no capacity slack, no framing beyond what
/// the traversal itself wrote. Hand [`as_bytes`](PackedBuffer::as_bytes) to
/// [`crate::deserialize`] or take the storage with
/// [`into_vec`](PackedBuffer::into_vec).
pub struct PackedBuffer {
    bytes: Vec<u8>,
}

impl PackedBuffer {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The packed image.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the packed image in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the image is empty (a zero-sized graph, e.g. `()`).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Take the underlying storage.
    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for PackedBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<PackedBuffer> for Vec<u8> {
    fn from(buffer: PackedBuffer) -> Self {
        buffer.bytes
    }
}

impl fmt::Debug for PackedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedBuffer")
            .field("len", &self.bytes.len())
            .finish()
    }
}
