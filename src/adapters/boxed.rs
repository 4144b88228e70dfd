use crate::error::WalkResult;
use crate::traverse::{Reconstruct, Traverse};
use crate::walker::Walker;

// -----------------------------------------------------------------------------
// Box

// Transparent indirection: a boxed sized value has the payload's exact wire
// shape. `Box<dyn Base>` is deliberately not covered here; its tag-prefixed
// implementation comes from `poly_base!`.
impl<T: Traverse> Traverse for Box<T> {
    fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
        (**self).traverse(walker)
    }

    fn traverse_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()> {
        (**self).traverse_mut(walker)
    }
}

impl<T: Reconstruct> Reconstruct for Box<T> {
    fn reconstruct() -> WalkResult<Self> {
        Ok(Box::new(T::reconstruct()?))
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn boxed_payload_has_the_payload_wire_shape() {
        let boxed = Box::new(0xABCD_u16);
        let plain = 0xABCD_u16;
        assert_eq!(
            crate::serialize(&boxed).unwrap().as_bytes(),
            crate::serialize(&plain).unwrap().as_bytes(),
        );
    }

    #[test]
    fn boxed_round_trips() {
        let boxed = Box::new(vec![1u32, 2, 3]);
        let buffer = crate::serialize(&boxed).unwrap();
        let back: Box<Vec<u32>> = crate::deserialize(buffer.as_bytes()).unwrap();
        assert_eq!(back, boxed);
    }
}
