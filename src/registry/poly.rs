use std::any::{Any, TypeId, type_name};
use std::marker::PhantomData;

use hashbrown::HashMap;

use crate::error::{WalkError, WalkResult};
use crate::registry::{TypeRegistry, TypeTag};

// -----------------------------------------------------------------------------
// PolyRecord

/// One registered base/derived pair: everything needed to write a type tag
/// for a concrete value packed through `Box<dyn Base>`, and to allocate the
/// right concrete subtype when that tag is read back.
///
/// Records are submitted with [`poly_impl!`](crate::poly_impl) into one
/// crate-wide `inventory` collection; the base they belong to is carried as
/// a `TypeId` and the allocated handle is type-erased, so submissions from
/// any crate land in the same collection. [`PolyTable::collect`] filters
/// the collection back down to one base. All three members are function
/// pointers so a record is constructible in a static submission.
pub struct PolyRecord {
    base: fn() -> TypeId,
    key: fn() -> &'static str,
    make: fn() -> WalkResult<Box<dyn Any>>,
}

impl PolyRecord {
    /// Create a record. Normally done by [`poly_impl!`](crate::poly_impl).
    ///
    /// `make` must return a `Box<Box<dyn Base>>` erased to `Box<dyn Any>`,
    /// for the base named by `base`; [`allocate`](PolyRecord::allocate)
    /// recovers the handle by downcast.
    pub const fn new(
        base: fn() -> TypeId,
        key: fn() -> &'static str,
        make: fn() -> WalkResult<Box<dyn Any>>,
    ) -> Self {
        Self { base, key, make }
    }

    /// The concrete type's key, `module::path::Name`.
    #[inline]
    pub fn key(&self) -> &'static str {
        (self.key)()
    }

    /// The `TypeId` of the `dyn Base` this record was registered for.
    #[inline]
    pub fn base_id(&self) -> TypeId {
        (self.base)()
    }

    /// Allocate a placeholder instance of the concrete subtype, boxed as
    /// the base `O`.
    ///
    /// Fails when `O` is not the base this record was registered for.
    pub fn allocate<O: ?Sized + 'static>(&self) -> WalkResult<Box<O>> {
        match (self.make)()?.downcast::<Box<O>>() {
            Ok(handle) => Ok(*handle),
            Err(_) => Err(WalkError::UnregisteredImpl {
                type_path: self.key().into(),
            }),
        }
    }
}

inventory::collect!(PolyRecord);

// -----------------------------------------------------------------------------
// PolyTable

/// The per-base dispatch table: [`TypeTag`] to [`PolyRecord`] and back.
///
/// Built once per base on first use, from the submitted records whose base
/// `TypeId` matches `O`. Records are sorted by key before tags are drawn
/// from the process-global [`TypeRegistry`], so two processes running
/// binaries that register the *same* set of subtypes for a base agree on
/// tags. Nothing stronger is promised: a buffer carrying tags is only valid
/// for a consumer with a matching registration set, and a mismatch surfaces
/// as [`WalkError::UnknownTypeTag`].
pub struct PolyTable<O: ?Sized + 'static> {
    record_by_tag: HashMap<TypeTag, &'static PolyRecord>,
    tag_by_key: HashMap<&'static str, TypeTag>,
    order: Vec<TypeTag>,
    _base: PhantomData<fn() -> Box<O>>,
}

impl<O: ?Sized + 'static> PolyTable<O> {
    /// Assemble the table from this base's submitted records.
    ///
    /// Duplicate submissions of the same key keep the first record.
    pub fn collect() -> Self {
        let mut records: Vec<&'static PolyRecord> = inventory::iter::<PolyRecord>
            .into_iter()
            .filter(|record| record.base_id() == TypeId::of::<O>())
            .collect();
        records.sort_by_key(|record| record.key());

        let mut table = Self {
            record_by_tag: HashMap::new(),
            tag_by_key: HashMap::new(),
            order: Vec::new(),
            _base: PhantomData,
        };
        let registry = TypeRegistry::global();
        for record in records {
            let key = record.key();
            if table.tag_by_key.contains_key(key) {
                continue;
            }
            let tag = registry.write().register_key(key);
            table.record_by_tag.insert(tag, record);
            table.tag_by_key.insert(key, tag);
            table.order.push(tag);
        }
        table
    }

    /// The tag for a concrete key, failing when the concrete type was never
    /// registered for this base.
    pub fn tag_for(&self, key: &str) -> WalkResult<TypeTag> {
        self.tag_by_key
            .get(key)
            .copied()
            .ok_or_else(|| WalkError::UnregisteredImpl {
                type_path: key.to_owned().into(),
            })
    }

    /// The record behind a tag read from a buffer.
    pub fn record(&self, tag: TypeTag) -> WalkResult<&'static PolyRecord> {
        self.record_by_tag
            .get(&tag)
            .copied()
            .ok_or(WalkError::UnknownTypeTag { tag })
    }

    /// The first registered record, used as placeholder storage when a
    /// polymorphic slot is reconstructed before its tag is known.
    pub fn first(&self) -> WalkResult<&'static PolyRecord> {
        match self.order.first() {
            Some(tag) => self.record(*tag),
            None => Err(WalkError::NoRegisteredSubtypes {
                base: type_name::<O>().into(),
            }),
        }
    }

    /// Number of registered subtypes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether any subtype is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Macros

/// Set up polymorphic serialization for a base trait.
///
/// Invoked once, next to the base trait, which must declare
/// [`PolyTraverse`](crate::PolyTraverse) as a supertrait. Expands to
/// [`Traverse`](crate::Traverse) and [`Reconstruct`](crate::Reconstruct)
/// implementations for `Box<dyn Base>`, backed by the base's lazily built
/// [`PolyTable`]:
///
/// - packing writes the concrete type's [`TypeTag`] then its fields;
/// - unpacking reads the tag, allocates the matching subtype through its
///   [`PolyRecord`] (or populates the existing box in place when it already
///   holds that subtype) and runs the concrete traversal.
///
/// # Example
///
/// ```
/// use flatwalk::derive::Traverse;
///
/// trait Shape: flatwalk::PolyTraverse {
///     fn area(&self) -> f64;
/// }
///
/// flatwalk::poly_base!(Shape);
///
/// #[derive(Traverse, Default)]
/// #[traverse(default)]
/// struct Square {
///     side: f64,
/// }
///
/// impl Shape for Square {
///     fn area(&self) -> f64 {
///         self.side * self.side
///     }
/// }
///
/// flatwalk::poly_impl!(Shape: Square);
///
/// let shape: Box<dyn Shape> = Box::new(Square { side: 3.0 });
/// let buffer = flatwalk::serialize(&shape).unwrap();
/// let back: Box<dyn Shape> = flatwalk::deserialize(buffer.as_bytes()).unwrap();
/// assert_eq!(back.area(), 9.0);
/// ```
#[macro_export]
macro_rules! poly_base {
    ($base:path) => {
        const _: () = {
            fn __poly_table() -> &'static $crate::registry::PolyTable<dyn $base> {
                static TABLE: ::std::sync::OnceLock<$crate::registry::PolyTable<dyn $base>> =
                    ::std::sync::OnceLock::new();
                TABLE.get_or_init($crate::registry::PolyTable::collect)
            }

            impl $crate::Traverse for ::std::boxed::Box<dyn $base> {
                fn traverse(&self, walker: &mut $crate::Walker<'_>) -> $crate::WalkResult<()> {
                    let table = __poly_table();
                    let key = $crate::PolyTraverse::poly_key(&**self);
                    walker.put_tag(table.tag_for(key)?)?;
                    $crate::PolyTraverse::walk_poly(&**self, walker)
                }

                fn traverse_mut(
                    &mut self,
                    walker: &mut $crate::Walker<'_>,
                ) -> $crate::WalkResult<()> {
                    if walker.mode() != $crate::Mode::Unpacking {
                        return $crate::Traverse::traverse(self, walker);
                    }
                    let table = __poly_table();
                    let record = table.record(walker.take_tag()?)?;
                    if $crate::PolyTraverse::poly_key(&**self) == record.key() {
                        return $crate::PolyTraverse::walk_poly_mut(&mut **self, walker);
                    }
                    let mut value = record.allocate::<dyn $base>()?;
                    $crate::PolyTraverse::walk_poly_mut(&mut *value, walker)?;
                    *self = value;
                    ::core::result::Result::Ok(())
                }
            }

            impl $crate::Reconstruct for ::std::boxed::Box<dyn $base> {
                fn reconstruct() -> $crate::WalkResult<Self> {
                    __poly_table().first()?.allocate::<dyn $base>()
                }

                fn unpack_from(walker: &mut $crate::Walker<'_>) -> $crate::WalkResult<Self>
                where
                    Self: $crate::Traverse,
                {
                    let table = __poly_table();
                    let record = table.record(walker.take_tag()?)?;
                    let mut value = record.allocate::<dyn $base>()?;
                    $crate::PolyTraverse::walk_poly_mut(&mut *value, walker)?;
                    ::core::result::Result::Ok(value)
                }
            }
        };
    };
}

/// Register a concrete subtype for a polymorphic base.
///
/// One invocation per base/derived pair, anywhere in the crate that defines
/// the pair. The concrete type needs [`PolyTraverse`](crate::PolyTraverse)
/// (from [`#[derive(Traverse)]`](crate::derive::Traverse)) and a
/// [`Reconstruct`](crate::Reconstruct) strategy.
///
/// ```ignore
/// flatwalk::poly_impl!(Shape: Circle);
/// flatwalk::poly_impl!(Shape: Square);
/// ```
///
/// See [`poly_base!`](crate::poly_base) for a complete example.
#[macro_export]
macro_rules! poly_impl {
    ($base:path : $concrete:ty) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::registry::PolyRecord::new(
                ::core::any::TypeId::of::<dyn $base>,
                <$concrete as $crate::PolyTraverse>::poly_key_static,
                || {
                    let value = <$concrete as $crate::Reconstruct>::reconstruct()?;
                    let handle: ::std::boxed::Box<dyn $base> = ::std::boxed::Box::new(value);
                    ::core::result::Result::Ok(
                        ::std::boxed::Box::new(handle) as ::std::boxed::Box<dyn ::core::any::Any>
                    )
                },
            )
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::error::{WalkError, WalkResult};
    use crate::traverse::{PolyTraverse, Reconstruct, Traverse};
    use crate::walker::Walker;

    // Manual implementations, independent of the derive.

    #[derive(Default, PartialEq, Debug)]
    struct Beacon {
        id: u32,
    }

    impl Traverse for Beacon {
        fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
            self.id.traverse(walker)
        }

        fn traverse_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()> {
            self.id.traverse_mut(walker)
        }
    }

    impl PolyTraverse for Beacon {
        fn poly_key_static() -> &'static str {
            concat!(module_path!(), "::Beacon")
        }

        fn poly_key(&self) -> &'static str {
            Self::poly_key_static()
        }

        fn walk_poly(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
            self.traverse(walker)
        }

        fn walk_poly_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()> {
            self.traverse_mut(walker)
        }
    }

    impl Reconstruct for Beacon {
        fn reconstruct() -> WalkResult<Self> {
            Ok(Self::default())
        }
    }

    trait Node: PolyTraverse {
        fn describe(&self) -> String;
    }

    impl Node for Beacon {
        fn describe(&self) -> String {
            format!("beacon #{}", self.id)
        }
    }

    crate::poly_base!(Node);
    crate::poly_impl!(Node: Beacon);

    #[test]
    fn packed_handle_is_tag_plus_fields() {
        let node: Box<dyn Node> = Box::new(Beacon { id: 77 });
        let buffer = crate::serialize(&node).unwrap();
        // 4-byte tag, then the one u32 field.
        assert_eq!(buffer.len(), 8);
        assert_eq!(&buffer.as_bytes()[4..], 77u32.to_le_bytes());
    }

    #[test]
    fn handle_round_trips_through_virtual_dispatch() {
        let node: Box<dyn Node> = Box::new(Beacon { id: 3 });
        let buffer = crate::serialize(&node).unwrap();
        let back: Box<dyn Node> = crate::deserialize(buffer.as_bytes()).unwrap();
        assert_eq!(back.describe(), "beacon #3");
    }

    #[test]
    fn unknown_tag_is_fatal() {
        let node: Box<dyn Node> = Box::new(Beacon { id: 1 });
        let mut bytes = crate::serialize(&node).unwrap().into_vec();
        // Corrupt the tag prefix to a value no registry hands out.
        bytes[..4].copy_from_slice(&u32::MAX.to_le_bytes());

        let Err(err) = crate::deserialize::<Box<dyn Node>>(&bytes) else {
            panic!("corrupt tag was accepted");
        };
        assert!(matches!(err.root(), WalkError::UnknownTypeTag { .. }));
    }

    #[test]
    fn registry_resolves_names_for_registered_tags() {
        // Force the table to exist.
        let node: Box<dyn Node> = Box::new(Beacon { id: 0 });
        crate::serialize(&node).unwrap();

        let registry = crate::TypeRegistry::global().read();
        let tag = registry.tag_of(Beacon::poly_key_static()).unwrap();
        assert_eq!(registry.name_of(tag), Some(Beacon::poly_key_static()));
    }

    #[test]
    fn records_of_other_bases_stay_invisible() {
        trait Marker: PolyTraverse {}
        crate::poly_base!(Marker);

        // No subtype is registered for `Marker`; the `Node` records above
        // must not leak into its table.
        let Err(err) = <Box<dyn Marker> as Reconstruct>::reconstruct() else {
            panic!("empty base produced a handle");
        };
        assert!(matches!(err, WalkError::NoRegisteredSubtypes { .. }));
    }
}
