use crate::error::WalkResult;
use crate::traverse::{Reconstruct, Traverse};
use crate::walker::Walker;

// -----------------------------------------------------------------------------
// Tuples

// Fields in declaration order, exactly like a derived struct.
macro_rules! tuple_impls {
    ($(($($name:ident : $idx:tt),+))+) => {$(
        impl<$($name: Traverse),+> Traverse for ($($name,)+) {
            fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
                $(self.$idx.traverse(walker)?;)+
                Ok(())
            }

            fn traverse_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()> {
                $(self.$idx.traverse_mut(walker)?;)+
                Ok(())
            }
        }

        impl<$($name: Reconstruct),+> Reconstruct for ($($name,)+) {
            fn reconstruct() -> WalkResult<Self> {
                Ok(($($name::reconstruct()?,)+))
            }
        }
    )+};
}

tuple_impls! {
    (A:0)
    (A:0, B:1)
    (A:0, B:1, C:2)
    (A:0, B:1, C:2, D:3)
    (A:0, B:1, C:2, D:3, E:4)
    (A:0, B:1, C:2, D:3, E:4, F:5)
    (A:0, B:1, C:2, D:3, E:4, F:5, G:6)
    (A:0, B:1, C:2, D:3, E:4, F:5, G:6, H:7)
    (A:0, B:1, C:2, D:3, E:4, F:5, G:6, H:7, I:8)
    (A:0, B:1, C:2, D:3, E:4, F:5, G:6, H:7, I:8, J:9)
    (A:0, B:1, C:2, D:3, E:4, F:5, G:6, H:7, I:8, J:9, K:10)
    (A:0, B:1, C:2, D:3, E:4, F:5, G:6, H:7, I:8, J:9, K:10, L:11)
}

#[cfg(test)]
mod tests {
    #[test]
    fn fields_pack_in_order() {
        let buffer = crate::serialize(&(1u8, 2u16)).unwrap();
        assert_eq!(buffer.as_bytes(), &[1, 2, 0]);
    }

    #[test]
    fn mixed_tuple_round_trips() {
        let value = (42u32, String::from("x"), vec![1i8, -1]);
        let buffer = crate::serialize(&value).unwrap();
        let back: (u32, String, Vec<i8>) = crate::deserialize(buffer.as_bytes()).unwrap();
        assert_eq!(back, value);
    }
}
