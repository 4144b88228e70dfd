use crate::error::WalkResult;
use crate::walker::Walker;

// -----------------------------------------------------------------------------
// Traverse

/// The intrusive traversal operation: one walk over a value's members,
/// shared by every pass.
///
/// [`traverse`](Traverse::traverse) serves the read-only passes (Sizing,
/// Packing, Custom); [`traverse_mut`](Traverse::traverse_mut) serves
/// Unpacking and forwards to `traverse` in any other mode, so a composite
/// implementation may always recurse through `traverse_mut` from its own
/// `traverse_mut`. **Both bodies must visit members in the same order** —
/// that order is the wire format. [`#[derive(Traverse)]`](crate::derive::Traverse)
/// generates both from the one field list, which is the recommended way to
/// keep them parallel.
///
/// Implementations exist for:
///
/// - scalar leaves: `bool`, `char`, `u8`-`u128`, `i8`-`i128`, `usize`,
///   `isize`, `f32`, `f64`, `()` — fixed-width little-endian, no recursion;
/// - `String`, `[T; N]`, tuples up to 12 fields;
/// - containers: `Vec`, `VecDeque`, `Option`, `Box`, `BTreeMap`/`BTreeSet`,
///   std and hashbrown `HashMap`/`HashSet` — an 8-byte length header
///   precedes the elements of dynamically sized shapes;
/// - `Box<dyn Base>` handles set up with [`poly_base!`](crate::poly_base).
///
/// A type covered by none of these and lacking a derived/manual
/// implementation simply fails the trait bound at the call site; there is
/// no silent fallback strategy.
///
/// # Example
///
/// A hand-written implementation (prefer the derive):
///
/// ```
/// use flatwalk::{Reconstruct, Traverse, WalkResult, Walker};
///
/// struct Extent {
///     width: u32,
///     height: u32,
/// }
///
/// impl Traverse for Extent {
///     fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
///         self.width.traverse(walker)?;
///         self.height.traverse(walker)
///     }
///
///     fn traverse_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()> {
///         self.width.traverse_mut(walker)?;
///         self.height.traverse_mut(walker)
///     }
/// }
///
/// impl Reconstruct for Extent {
///     fn reconstruct() -> WalkResult<Self> {
///         Ok(Self { width: 0, height: 0 })
///     }
/// }
///
/// let extent = Extent { width: 800, height: 600 };
/// assert_eq!(flatwalk::serialized_size(&extent).unwrap(), 8);
/// ```
pub trait Traverse {
    /// Whether this type's representation is a flat fixed-width scalar that
    /// the walker may treat as raw bytes.
    ///
    /// True for the scalar leaves; user types opt in through
    /// `#[traverse(byte_copy)]`, which verifies every field is itself
    /// byte-copyable. Used by [`Walker::note_run`] to announce contiguous
    /// runs to a [`RunVisitor`](crate::RunVisitor).
    const BYTE_COPYABLE: bool = false;

    /// Fixed number of bytes one value occupies on the wire.
    ///
    /// Only meaningful when [`BYTE_COPYABLE`](Traverse::BYTE_COPYABLE) is
    /// true. In-memory padding never reaches the wire, so for an aggregate
    /// this can be smaller than `size_of::<Self>()`.
    const WIRE_WIDTH: usize = 0;

    /// Walk the value for a read-only pass (Sizing, Packing, Custom).
    fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()>;

    /// Walk the value for Unpacking, populating it in place.
    ///
    /// In any mode other than Unpacking this must behave exactly like
    /// [`traverse`](Traverse::traverse).
    fn traverse_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()>;
}

// -----------------------------------------------------------------------------
// PolyTraverse

/// The object-safe face of [`Traverse`], required of polymorphic base
/// traits.
///
/// A base trait opts into polymorphic serialization by declaring this as a
/// supertrait and invoking [`poly_base!`](crate::poly_base):
///
/// ```ignore
/// trait Shape: flatwalk::PolyTraverse {
///     fn area(&self) -> f64;
/// }
/// flatwalk::poly_base!(Shape);
/// ```
///
/// Concrete subtypes get their implementation from
/// [`#[derive(Traverse)]`](crate::derive::Traverse) (non-generic types
/// only: a generic type's key could not distinguish its instantiations) and
/// are announced per base with [`poly_impl!`](crate::poly_impl).
pub trait PolyTraverse {
    /// The stable key identifying the concrete type, `module::path::Name`.
    ///
    /// Only callable on sized types; records capture it as a function
    /// pointer so the dynamic side can recover it through
    /// [`poly_key`](PolyTraverse::poly_key).
    fn poly_key_static() -> &'static str
    where
        Self: Sized;

    /// The key of the concrete type behind this value.
    fn poly_key(&self) -> &'static str;

    /// Dynamic entry into [`Traverse::traverse`].
    fn walk_poly(&self, walker: &mut Walker<'_>) -> WalkResult<()>;

    /// Dynamic entry into [`Traverse::traverse_mut`].
    fn walk_poly_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()>;
}

// -----------------------------------------------------------------------------
// Reconstruct

/// How storage for an unpacked value is obtained.
///
/// Exactly one decision applies per type:
///
/// - **DefaultConstruct** — `#[traverse(default)]` routes through
///   [`Default`]. When a type requests both `default` and a factory,
///   default wins.
/// - **FactoryReconstruct** — `#[traverse(factory = "path")]` calls a user
///   factory producing a valid placeholder instance; every field is then
///   overwritten during Unpacking.
/// - **ByteCopyNoConstruct** — scalar leaves reconstruct as their zero
///   value and are overwritten wholesale.
///
/// A type with a traversal but *no* reconstruction strategy is not
/// serializable: both [`crate::serialize`] and [`crate::deserialize`] fail
/// to compile for it (see the rejection examples there). After
/// [`reconstruct`](Reconstruct::reconstruct) returns, every subsequent
/// Unpacking write is a plain assignment.
pub trait Reconstruct: Sized {
    /// Obtain a fresh placeholder instance.
    fn reconstruct() -> WalkResult<Self>;

    /// Obtain storage and populate it from the walker.
    ///
    /// The default body reconstructs then runs
    /// [`Traverse::traverse_mut`]. Polymorphic handles override it to read
    /// the type tag first and allocate the concrete subtype directly.
    fn unpack_from(walker: &mut Walker<'_>) -> WalkResult<Self>
    where
        Self: Traverse,
    {
        let mut value = Self::reconstruct()?;
        value.traverse_mut(walker)?;
        Ok(value)
    }
}
