use std::borrow::Cow;
use std::{error, fmt, io};

use crate::registry::TypeTag;
use crate::walker::Mode;

/// A enumeration of all error outcomes that might happen while a traversal
/// or one of the [facade](crate::serialize) operations is running.
///
/// Every failure aborts the whole traversal and propagates to the immediate
/// caller of the facade; the engine performs no retries and no partial
/// recovery.
#[derive(Debug)]
pub enum WalkError {
    /// A `TypeTag` read during polymorphic unpacking has no matching record.
    ///
    /// The buffer is malformed or was produced by a binary with a different
    /// registration set.
    UnknownTypeTag { tag: TypeTag },
    /// A concrete value was packed through a base handle it was never
    /// registered for (no [`poly_impl!`](crate::poly_impl) submission).
    UnregisteredImpl { type_path: Cow<'static, str> },
    /// A polymorphic slot was reconstructed while its base has no
    /// registered subtypes at all.
    NoRegisteredSubtypes { base: Cow<'static, str> },
    /// Unpacking tried to read past the end of the supplied buffer.
    ///
    /// The input is truncated or malformed; missing bytes are never
    /// zero-filled.
    Underrun {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// Packing tried to write past the end of the sized buffer.
    ///
    /// This is an engine invariant breach: the sizing pass and the packing
    /// pass disagreed about some member.
    Overrun {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// The packing pass wrote a different byte count than the sizing pass
    /// computed.
    SizeMismatch { sized: usize, written: usize },
    /// Unpacking finished before consuming the whole buffer.
    TrailingBytes { consumed: usize, total: usize },
    /// A pass was asked to perform an operation of a different pass,
    /// e.g. a read-only traversal tried to consume bytes.
    ModeMismatch { expected: Mode, found: Mode },
    /// Decoded bytes are not a valid value, e.g. a non-UTF-8 string body or
    /// an out-of-range enum variant index.
    InvalidData {
        offset: usize,
        reason: Cow<'static, str>,
    },
    /// A file operation of the facade failed.
    Io(io::Error),
    /// A failure with the stack of types that were being traversed when it
    /// happened (the `debug` feature).
    Traced { path: String, source: Box<WalkError> },
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTypeTag { tag } => {
                write!(f, "no polymorphic record registered for type tag {tag}")
            }
            Self::UnregisteredImpl { type_path } => {
                write!(
                    f,
                    "type `{type_path}` was packed through a base it is not registered for"
                )
            }
            Self::NoRegisteredSubtypes { base } => {
                write!(f, "base `{base}` has no registered subtypes")
            }
            Self::Underrun {
                offset,
                needed,
                available,
            } => {
                write!(
                    f,
                    "read of {needed} bytes at offset {offset} past end of buffer ({available} bytes)"
                )
            }
            Self::Overrun {
                offset,
                needed,
                available,
            } => {
                write!(
                    f,
                    "write of {needed} bytes at offset {offset} past end of sized buffer ({available} bytes)"
                )
            }
            Self::SizeMismatch { sized, written } => {
                write!(f, "sizing computed {sized} bytes but packing wrote {written}")
            }
            Self::TrailingBytes { consumed, total } => {
                write!(
                    f,
                    "unpacking consumed {consumed} of {total} bytes, trailing bytes are not allowed"
                )
            }
            Self::ModeMismatch { expected, found } => {
                write!(f, "operation requires the {expected} pass but ran in {found}")
            }
            Self::InvalidData { offset, reason } => {
                write!(f, "invalid data at offset {offset}: {reason}")
            }
            Self::Io(err) => write!(f, "file operation failed: {err}"),
            Self::Traced { path, source } => {
                write!(f, "{source} (while traversing: {path})")
            }
        }
    }
}

impl error::Error for WalkError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Traced { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for WalkError {
    #[inline]
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl WalkError {
    /// Strip any [`Traced`](WalkError::Traced) wrappers and return the
    /// underlying failure.
    ///
    /// # Example
    ///
    /// ```
    /// use flatwalk::WalkError;
    ///
    /// let err = WalkError::Traced {
    ///     path: "`a` -> `b`".into(),
    ///     source: Box::new(WalkError::TrailingBytes { consumed: 4, total: 8 }),
    /// };
    /// assert!(matches!(err.root(), WalkError::TrailingBytes { .. }));
    /// ```
    pub fn root(&self) -> &WalkError {
        let mut current = self;
        while let Self::Traced { source, .. } = current {
            current = source;
        }
        current
    }
}

/// Shorthand result alias used by every traversal operation.
pub type WalkResult<T> = Result<T, WalkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_reports_offsets() {
        let err = WalkError::Underrun {
            offset: 12,
            needed: 8,
            available: 16,
        };
        assert_eq!(
            err.to_string(),
            "read of 8 bytes at offset 12 past end of buffer (16 bytes)"
        );

        let err = WalkError::SizeMismatch {
            sized: 24,
            written: 20,
        };
        assert_eq!(err.to_string(), "sizing computed 24 bytes but packing wrote 20");
    }

    #[test]
    fn root_unwraps_nested_traces() {
        let err = WalkError::Traced {
            path: "`outer`".into(),
            source: Box::new(WalkError::Traced {
                path: "`outer` -> `inner`".into(),
                source: Box::new(WalkError::ModeMismatch {
                    expected: Mode::Unpacking,
                    found: Mode::Sizing,
                }),
            }),
        };
        assert!(matches!(err.root(), WalkError::ModeMismatch { .. }));
    }

    #[test]
    fn io_errors_convert() {
        let err: WalkError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, WalkError::Io(_)));
        assert!(error::Error::source(&err).is_some());
    }
}
