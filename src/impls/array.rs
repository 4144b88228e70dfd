use crate::error::{WalkError, WalkResult};
use crate::traverse::{Reconstruct, Traverse};
use crate::walker::Walker;

// -----------------------------------------------------------------------------
// [T; N]

/// No length header: the element count is part of the type. An array of
/// byte-copyable elements is itself byte-copyable.
impl<T: Traverse, const N: usize> Traverse for [T; N] {
    const BYTE_COPYABLE: bool = T::BYTE_COPYABLE;
    const WIRE_WIDTH: usize = N * T::WIRE_WIDTH;

    fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
        walker.note_run::<T>(N);
        for item in self {
            item.traverse(walker)?;
        }
        Ok(())
    }

    fn traverse_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()> {
        walker.note_run::<T>(N);
        for item in self {
            item.traverse_mut(walker)?;
        }
        Ok(())
    }
}

impl<T: Reconstruct, const N: usize> Reconstruct for [T; N] {
    fn reconstruct() -> WalkResult<Self> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::reconstruct()?);
        }
        // The Err branch is unreachable: `items` holds exactly N elements.
        items.try_into().map_err(|_| WalkError::InvalidData {
            offset: 0,
            reason: "reconstructed array has the wrong length".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn arrays_carry_no_header() {
        let buffer = crate::serialize(&[1u16, 2, 3]).unwrap();
        assert_eq!(buffer.as_bytes(), &[1, 0, 2, 0, 3, 0]);
    }

    #[test]
    fn arrays_round_trip() {
        let values = [9i64, -4, 0, 77];
        let buffer = crate::serialize(&values).unwrap();
        let back: [i64; 4] = crate::deserialize(buffer.as_bytes()).unwrap();
        assert_eq!(back, values);
    }
}
