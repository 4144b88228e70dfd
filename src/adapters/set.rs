use std::collections::{BTreeSet, HashSet};
use std::hash::{BuildHasher, Hash};

use crate::error::WalkResult;
use crate::traverse::{Reconstruct, Traverse};
use crate::walker::{Mode, Walker};

// -----------------------------------------------------------------------------
// Hash sets

macro_rules! hash_set_impls {
    ($($set:path),+ $(,)?) => {$(
        impl<T, S> Traverse for $set
        where
            T: Traverse + Reconstruct + Eq + Hash,
            S: BuildHasher + Default,
        {
            fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
                walker.put_len(self.len())?;
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
                self.clear();
                for _ in 0..len {
                    let before = walker.position();
                    self.insert(T::unpack_from(walker)?);
                    super::guard_zero_width_run(walker, before, len)?;
                }
                Ok(())
            }
        }

        impl<T, S> Reconstruct for $set
        where
            T: Traverse + Reconstruct + Eq + Hash,
            S: BuildHasher + Default,
        {
            fn reconstruct() -> WalkResult<Self> {
                Ok(Self::default())
            }
        }
    )+};
}

hash_set_impls! {
    HashSet<T, S>,
    hashbrown::HashSet<T, S>,
}

// -----------------------------------------------------------------------------
// BTreeSet

impl<T> Traverse for BTreeSet<T>
where
    T: Traverse + Reconstruct + Ord,
{
    fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
        walker.put_len(self.len())?;
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
        self.clear();
        for _ in 0..len {
            let before = walker.position();
            self.insert(T::unpack_from(walker)?);
            super::guard_zero_width_run(walker, before, len)?;
        }
        Ok(())
    }
}

impl<T> Reconstruct for BTreeSet<T>
where
    T: Traverse + Reconstruct + Ord,
{
    fn reconstruct() -> WalkResult<Self> {
        Ok(Self::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_set_round_trips() {
        let set: HashSet<u32> = [3, 14, 15, 92].into_iter().collect();
        let buffer = crate::serialize(&set).unwrap();
        let back: HashSet<u32> = crate::deserialize(buffer.as_bytes()).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn btree_set_packs_in_order() {
        let set: BTreeSet<u8> = [9, 1, 5].into_iter().collect();
        let buffer = crate::serialize(&set).unwrap();
        assert_eq!(&buffer.as_bytes()[8..], &[1, 5, 9]);
    }

    #[test]
    fn hashbrown_set_round_trips() {
        let set: hashbrown::HashSet<String> =
            [String::from("left"), String::from("right")].into_iter().collect();
        let buffer = crate::serialize(&set).unwrap();
        let back: hashbrown::HashSet<String> = crate::deserialize(buffer.as_bytes()).unwrap();
        assert_eq!(back, set);
    }
}
