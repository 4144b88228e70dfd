use std::collections::VecDeque;

use crate::error::WalkResult;
use crate::traverse::{Reconstruct, Traverse};
use crate::walker::{Mode, Walker};

// -----------------------------------------------------------------------------
// Vec / VecDeque

macro_rules! seq_impls {
    ($($container:ident :: $push:ident),+ $(,)?) => {$(
        impl<T: Traverse + Reconstruct> Traverse for $container<T> {
            fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
                walker.put_len(self.len())?;
                walker.note_run::<T>(self.len());
                for item in self {
                    item.traverse(walker)?;
                }
                Ok(())
            }

            fn traverse_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()> {
                if walker.mode() != Mode::Unpacking {
                    return self.traverse(walker);
                }
                let len = walker.take_len()?;
                walker.note_run::<T>(len);
                self.clear();
                for _ in 0..len {
                    let before = walker.position();
                    self.$push(T::unpack_from(walker)?);
                    super::guard_zero_width_run(walker, before, len)?;
                }
                Ok(())
            }
        }

        impl<T: Traverse + Reconstruct> Reconstruct for $container<T> {
            fn reconstruct() -> WalkResult<Self> {
                Ok(Self::new())
            }
        }
    )+};
}

seq_impls! {
    Vec::push,
    VecDeque::push_back,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WalkError;
    use crate::walker::RunVisitor;

    #[test]
    fn layout_is_header_then_elements() {
        let samples: Vec<f64> = (0..11).map(|i| 934.0 + f64::from(i)).collect();
        let buffer = crate::serialize(&samples).unwrap();

        assert_eq!(buffer.len(), 8 + 11 * 8);
        assert_eq!(&buffer.as_bytes()[..8], 11u64.to_le_bytes());
        let third = &buffer.as_bytes()[8 + 2 * 8..8 + 3 * 8];
        assert_eq!(third, 936.0_f64.to_le_bytes());
    }

    #[test]
    fn vec_round_trips() {
        let samples: Vec<f64> = (0..11).map(|i| 934.0 + f64::from(i)).collect();
        let buffer = crate::serialize(&samples).unwrap();
        let back: Vec<f64> = crate::deserialize(buffer.as_bytes()).unwrap();
        assert_eq!(back, samples);
    }

    #[test]
    fn deque_round_trips() {
        let mut deque = VecDeque::new();
        deque.push_back(String::from("a"));
        deque.push_front(String::from("b"));
        let buffer = crate::serialize(&deque).unwrap();
        let back: VecDeque<String> = crate::deserialize(buffer.as_bytes()).unwrap();
        assert_eq!(back, deque);
    }

    #[test]
    fn unit_sequences_round_trip() {
        let units = vec![(); 3];
        let buffer = crate::serialize(&units).unwrap();
        assert_eq!(buffer.as_bytes(), &3u64.to_le_bytes());
        let back: Vec<()> = crate::deserialize(buffer.as_bytes()).unwrap();
        assert_eq!(back.len(), 3);
    }

    #[test]
    fn hostile_zero_width_header_is_rejected() {
        // Each element consumes zero bytes, so without the count cap this
        // header would keep the unpack loop busy for 2^64 iterations.
        let bytes = u64::MAX.to_le_bytes();
        let err = crate::deserialize::<Vec<()>>(&bytes).unwrap_err();
        assert!(matches!(err.root(), WalkError::InvalidData { .. }));
    }

    #[test]
    fn in_place_unpack_replaces_previous_contents() {
        let buffer = crate::serialize(&vec![7u32, 8]).unwrap();
        let mut target = vec![1u32, 2, 3, 4];
        crate::deserialize_in_place(&mut target, buffer.as_bytes()).unwrap();
        assert_eq!(target, [7, 8]);
    }

    struct Runs(Vec<(Mode, usize, usize)>);

    impl RunVisitor for Runs {
        fn visit_run(&mut self, mode: Mode, _key: &'static str, elem_size: usize, count: usize) {
            self.0.push((mode, elem_size, count));
        }
    }

    #[test]
    fn runs_are_announced_once_per_container() {
        let samples = vec![0.5f32; 6];
        let mut runs = Runs(Vec::new());
        let mut walker = Walker::custom().with_run_visitor(&mut runs);
        samples.traverse(&mut walker).unwrap();
        assert_eq!(runs.0, [(Mode::Custom, 4, 6)]);
    }

    #[test]
    fn non_byte_copyable_elements_announce_no_runs() {
        let texts = vec![String::from("x"), String::from("y")];
        let mut runs = Runs(Vec::new());
        let mut walker = Walker::custom().with_run_visitor(&mut runs);
        texts.traverse(&mut walker).unwrap();
        // Only the per-string u8 runs fire, never a String run.
        assert_eq!(runs.0, [(Mode::Custom, 1, 1), (Mode::Custom, 1, 1)]);
    }
}
