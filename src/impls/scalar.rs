use crate::error::{WalkError, WalkResult};
use crate::traverse::{Reconstruct, Traverse};
use crate::walker::{Mode, Walker};

// -----------------------------------------------------------------------------
// Fixed-width numbers

macro_rules! le_scalar_impls {
    ($($ty:ty),+ $(,)?) => {$(
        impl Traverse for $ty {
            const BYTE_COPYABLE: bool = true;
            const WIRE_WIDTH: usize = size_of::<$ty>();

            fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
                walker.put(&self.to_le_bytes())
            }

            fn traverse_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()> {
                if walker.mode() != Mode::Unpacking {
                    return self.traverse(walker);
                }
                let raw = walker.take(size_of::<$ty>())?;
                let mut bytes = [0u8; size_of::<$ty>()];
                bytes.copy_from_slice(raw);
                *self = <$ty>::from_le_bytes(bytes);
                Ok(())
            }
        }

        impl Reconstruct for $ty {
            fn reconstruct() -> WalkResult<Self> {
                Ok(<$ty>::default())
            }
        }
    )+};
}

le_scalar_impls! {
    u8, u16, u32, u64, u128,
    i8, i16, i32, i64, i128,
    f32, f64,
}

// -----------------------------------------------------------------------------
// Platform-width integers

// Always 8 bytes on the wire; the in-memory width varies per platform, so
// these are not byte-copyable runs.
macro_rules! platform_int_impls {
    ($($ty:ty => $wire:ty),+ $(,)?) => {$(
        impl Traverse for $ty {
            fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
                walker.put(&(*self as $wire).to_le_bytes())
            }

            fn traverse_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()> {
                if walker.mode() != Mode::Unpacking {
                    return self.traverse(walker);
                }
                let offset = walker.position();
                let raw = walker.take(8)?;
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(raw);
                *self = <$ty>::try_from(<$wire>::from_le_bytes(bytes)).map_err(|_| {
                    WalkError::InvalidData {
                        offset,
                        reason: concat!(
                            "value exceeds the platform's `",
                            stringify!($ty),
                            "` range"
                        )
                        .into(),
                    }
                })?;
                Ok(())
            }
        }

        impl Reconstruct for $ty {
            fn reconstruct() -> WalkResult<Self> {
                Ok(0)
            }
        }
    )+};
}

platform_int_impls! {
    usize => u64,
    isize => i64,
}

// -----------------------------------------------------------------------------
// bool / char / unit

impl Traverse for bool {
    const BYTE_COPYABLE: bool = true;
    const WIRE_WIDTH: usize = 1;

    fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
        walker.put(&[*self as u8])
    }

    fn traverse_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()> {
        if walker.mode() != Mode::Unpacking {
            return self.traverse(walker);
        }
        let offset = walker.position();
        *self = match walker.take(1)?[0] {
            0 => false,
            1 => true,
            _ => {
                return Err(WalkError::InvalidData {
                    offset,
                    reason: "boolean byte is neither 0 nor 1".into(),
                });
            }
        };
        Ok(())
    }
}

impl Reconstruct for bool {
    fn reconstruct() -> WalkResult<Self> {
        Ok(false)
    }
}

impl Traverse for char {
    fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
        walker.put(&(*self as u32).to_le_bytes())
    }

    fn traverse_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()> {
        if walker.mode() != Mode::Unpacking {
            return self.traverse(walker);
        }
        let offset = walker.position();
        let raw = walker.take(4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(raw);
        *self =
            char::from_u32(u32::from_le_bytes(bytes)).ok_or_else(|| WalkError::InvalidData {
                offset,
                reason: "not a Unicode scalar value".into(),
            })?;
        Ok(())
    }
}

impl Reconstruct for char {
    fn reconstruct() -> WalkResult<Self> {
        Ok('\0')
    }
}

impl Traverse for () {
    const BYTE_COPYABLE: bool = true;
    const WIRE_WIDTH: usize = 0;

    fn traverse(&self, _walker: &mut Walker<'_>) -> WalkResult<()> {
        Ok(())
    }

    fn traverse_mut(&mut self, _walker: &mut Walker<'_>) -> WalkResult<()> {
        Ok(())
    }
}

impl Reconstruct for () {
    fn reconstruct() -> WalkResult<Self> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_pack_little_endian() {
        let buffer = crate::serialize(&0x1234_5678_u32).unwrap();
        assert_eq!(buffer.as_bytes(), &[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(crate::deserialize::<u32>(buffer.as_bytes()).unwrap(), 0x1234_5678);
    }

    #[test]
    fn floats_round_trip_bit_exact() {
        let buffer = crate::serialize(&934.25_f64).unwrap();
        assert_eq!(buffer.len(), 8);
        let back: f64 = crate::deserialize(buffer.as_bytes()).unwrap();
        assert_eq!(back.to_bits(), 934.25_f64.to_bits());
    }

    #[test]
    fn usize_is_eight_bytes_on_the_wire() {
        let buffer = crate::serialize(&7_usize).unwrap();
        assert_eq!(buffer.len(), 8);
        assert_eq!(crate::deserialize::<usize>(buffer.as_bytes()).unwrap(), 7);
    }

    #[test]
    fn bad_bool_byte_is_invalid_data() {
        let err = crate::deserialize::<bool>(&[2]).unwrap_err();
        assert!(matches!(err.root(), WalkError::InvalidData { offset: 0, .. }));
    }

    #[test]
    fn surrogate_char_is_invalid_data() {
        let bytes = 0xD800_u32.to_le_bytes();
        let err = crate::deserialize::<char>(&bytes).unwrap_err();
        assert!(matches!(err.root(), WalkError::InvalidData { .. }));
    }

    #[test]
    fn unit_occupies_no_bytes() {
        let buffer = crate::serialize(&()).unwrap();
        assert!(buffer.is_empty());
        crate::deserialize::<()>(buffer.as_bytes()).unwrap();
    }
}
