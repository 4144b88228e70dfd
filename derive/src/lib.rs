//! See [`Traverse`].
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{Data, DeriveInput, parse_macro_input};

static TRAVERSE_ATTRIBUTE_NAME: &str = "traverse";

// -----------------------------------------------------------------------------
// Modules

mod attrs;
mod common;
mod enums;
mod structs;

// -----------------------------------------------------------------------------
// Macros

/// # Traversal Derivation
///
/// `#[derive(Traverse)]` implements the full traversal surface for a struct
/// or enum:
///
/// - `Traverse`, with both walk bodies generated from the one field list in
///   declaration order, so every pass visits the members identically;
/// - `PolyTraverse` (non-generic types only: a generic type's key could not
///   distinguish its instantiations), which is what
///   `flatwalk::poly_impl!` needs to register the type under a base;
/// - optionally `Reconstruct`, controlled by the type-level attributes
///   below.
///
/// Enums write a 4-byte variant index (declaration order) before the active
/// variant's fields.
///
/// ## Reconstruction Strategy
///
/// A type that should be *deserializable* must pick exactly one strategy:
///
/// ```rust, ignore
/// #[derive(Traverse, Default)]
/// #[traverse(default)]          // route through `Default`
/// struct Foo { /* ... */ }
///
/// #[derive(Traverse)]
/// #[traverse(factory = "Bar::placeholder")]   // call a factory fn
/// struct Bar { /* ... */ }
/// ```
///
/// When both are requested, `default` wins. With neither, the type can be
/// serialized but `flatwalk::deserialize` will not compile for it.
///
/// ## Field Control
///
/// `#[traverse(skip)]` removes a field from every pass. A skipped struct
/// field keeps its pre-unpacking value; a skipped enum field is rebuilt
/// through its own `Reconstruct` strategy when the variant is restored.
///
/// ```rust, ignore
/// #[derive(Traverse, Default)]
/// #[traverse(default)]
/// struct Session {
///     token: u64,
///     #[traverse(skip)]
///     dirty: bool,
/// }
/// ```
///
/// ## Byte-Copyable Types
///
/// `#[traverse(byte_copy)]` marks a non-generic struct as a flat scalar
/// aggregate, which lets containers of it announce contiguous runs to a
/// `flatwalk::RunVisitor`. Every field must itself be byte-copyable; the
/// macro verifies this with a compile-time assertion per field. The
/// aggregate's wire width is the sum of the field widths, which can be
/// smaller than its in-memory size when the layout carries padding.
///
/// ```rust, ignore
/// #[derive(Traverse, Default)]
/// #[traverse(default, byte_copy)]
/// struct Point {
///     x: f32,
///     y: f32,
/// }
/// ```
#[proc_macro_derive(Traverse, attributes(traverse))]
pub fn derive_traverse(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let type_attrs = attrs::TypeAttrs::parse(&input.attrs)?;
    match &input.data {
        Data::Struct(data) => structs::expand_struct(input, data, &type_attrs),
        Data::Enum(data) => enums::expand_enum(input, data, &type_attrs),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "`Traverse` cannot be derived for unions",
        )),
    }
}
