use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use crate::error::WalkResult;
use crate::traverse::{Reconstruct, Traverse};
use crate::walker::{Mode, Walker};

// -----------------------------------------------------------------------------
// Hash maps

// Keys are traversed through the shared `&self` walk even during packing,
// which is why `Traverse::traverse` takes `&self`: map keys are never
// mutable in place. Unpacking re-inserts entry by entry, so the restored
// map derives its own bucket layout.
macro_rules! hash_map_impls {
    ($($map:path),+ $(,)?) => {$(
        impl<K, V, S> Traverse for $map
        where
            K: Traverse + Reconstruct + Eq + Hash,
            V: Traverse + Reconstruct,
            S: BuildHasher + Default,
        {
            fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
                walker.put_len(self.len())?;
                for (key, value) in self {
                    key.traverse(walker)?;
                    value.traverse(walker)?;
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
                    let key = K::unpack_from(walker)?;
                    let value = V::unpack_from(walker)?;
                    self.insert(key, value);
                    super::guard_zero_width_run(walker, before, len)?;
                }
                Ok(())
            }
        }

        impl<K, V, S> Reconstruct for $map
        where
            K: Traverse + Reconstruct + Eq + Hash,
            V: Traverse + Reconstruct,
            S: BuildHasher + Default,
        {
            fn reconstruct() -> WalkResult<Self> {
                Ok(Self::default())
            }
        }
    )+};
}

hash_map_impls! {
    HashMap<K, V, S>,
    hashbrown::HashMap<K, V, S>,
}

// -----------------------------------------------------------------------------
// BTreeMap

impl<K, V> Traverse for BTreeMap<K, V>
where
    K: Traverse + Reconstruct + Ord,
    V: Traverse + Reconstruct,
{
    fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
        walker.put_len(self.len())?;
        for (key, value) in self {
            key.traverse(walker)?;
            value.traverse(walker)?;
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
            let key = K::unpack_from(walker)?;
            let value = V::unpack_from(walker)?;
            self.insert(key, value);
            super::guard_zero_width_run(walker, before, len)?;
        }
        Ok(())
    }
}

impl<K, V> Reconstruct for BTreeMap<K, V>
where
    K: Traverse + Reconstruct + Ord,
    V: Traverse + Reconstruct,
{
    fn reconstruct() -> WalkResult<Self> {
        Ok(Self::new())
    }
}
