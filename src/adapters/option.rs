use crate::error::{WalkError, WalkResult};
use crate::traverse::{Reconstruct, Traverse};
use crate::walker::{Mode, Walker};

// -----------------------------------------------------------------------------
// Option

/// One presence byte, then the payload when present. Unpacking into an
/// existing `Some` repopulates the held value in place.
impl<T: Traverse + Reconstruct> Traverse for Option<T> {
    fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
        match self {
            Some(value) => {
                walker.put(&[1])?;
                value.traverse(walker)
            }
            None => walker.put(&[0]),
        }
    }

    fn traverse_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()> {
        if walker.mode() != Mode::Unpacking {
            return self.traverse(walker);
        }
        let offset = walker.position();
        match walker.take(1)?[0] {
            0 => {
                *self = None;
                Ok(())
            }
            1 => match self {
                Some(value) => value.traverse_mut(walker),
                None => {
                    *self = Some(T::unpack_from(walker)?);
                    Ok(())
                }
            },
            _ => Err(WalkError::InvalidData {
                offset,
                reason: "presence flag is neither 0 nor 1".into(),
            }),
        }
    }
}

impl<T> Reconstruct for Option<T> {
    fn reconstruct() -> WalkResult<Self> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_a_single_byte() {
        let buffer = crate::serialize(&None::<u64>).unwrap();
        assert_eq!(buffer.as_bytes(), &[0]);
    }

    #[test]
    fn some_round_trips() {
        let value = Some(String::from("present"));
        let buffer = crate::serialize(&value).unwrap();
        assert_eq!(buffer.as_bytes()[0], 1);
        let back: Option<String> = crate::deserialize(buffer.as_bytes()).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn unpacking_none_clears_an_existing_some() {
        let buffer = crate::serialize(&None::<u32>).unwrap();
        let mut target = Some(5u32);
        crate::deserialize_in_place(&mut target, buffer.as_bytes()).unwrap();
        assert_eq!(target, None);
    }

    #[test]
    fn bad_presence_flag_is_invalid_data() {
        let err = crate::deserialize::<Option<u32>>(&[7]).unwrap_err();
        assert!(matches!(err.root(), WalkError::InvalidData { offset: 0, .. }));
    }
}
