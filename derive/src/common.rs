use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, GenericParam, Generics, Ident};

use crate::attrs::TypeAttrs;

/// Tokens evaluating to the type's stable key, `module::path::Name`.
///
/// `module_path!` expands at the deriving type's definition site, so the
/// key names the module the type actually lives in.
pub fn type_key(name: &Ident) -> TokenStream {
    quote! { concat!(module_path!(), "::", stringify!(#name)) }
}

/// Clone the generics with `Traverse + Reconstruct` bounds on every type
/// parameter.
///
/// Both bounds are added unconditionally: a parameter nested inside a
/// container field (`Vec<T>`, `HashMap<K, V>`) needs `Reconstruct` even for
/// the read-only passes, because the container's own `Traverse`
/// implementation requires it.
pub fn bounded_generics(generics: &Generics) -> Generics {
    let mut generics = generics.clone();
    for param in generics.params.iter_mut() {
        if let GenericParam::Type(type_param) = param {
            type_param.bounds.push(syn::parse_quote!(flatwalk::Traverse));
            type_param
                .bounds
                .push(syn::parse_quote!(flatwalk::Reconstruct));
        }
    }
    generics
}

/// The `PolyTraverse` implementation, or nothing for generic types.
pub fn poly_impl(input: &DeriveInput) -> TokenStream {
    if !input.generics.params.is_empty() {
        return TokenStream::new();
    }
    let name = &input.ident;
    let key = type_key(name);
    quote! {
        impl flatwalk::PolyTraverse for #name {
            fn poly_key_static() -> &'static str {
                #key
            }

            fn poly_key(&self) -> &'static str {
                <Self as flatwalk::PolyTraverse>::poly_key_static()
            }

            fn walk_poly(&self, walker: &mut flatwalk::Walker<'_>) -> flatwalk::WalkResult<()> {
                flatwalk::Traverse::traverse(self, walker)
            }

            fn walk_poly_mut(
                &mut self,
                walker: &mut flatwalk::Walker<'_>,
            ) -> flatwalk::WalkResult<()> {
                flatwalk::Traverse::traverse_mut(self, walker)
            }
        }
    }
}

/// The `Reconstruct` implementation for the requested strategy, or nothing
/// when the type picked none. `default` wins over `factory`.
pub fn reconstruct_impl(input: &DeriveInput, attrs: &TypeAttrs) -> TokenStream {
    let body = if attrs.default {
        quote! { ::core::result::Result::Ok(<Self as ::core::default::Default>::default()) }
    } else if let Some(factory) = &attrs.factory {
        quote! { ::core::result::Result::Ok(#factory()) }
    } else {
        return TokenStream::new();
    };

    let name = &input.ident;
    let mut generics = bounded_generics(&input.generics);
    if attrs.default {
        generics
            .make_where_clause()
            .predicates
            .push(syn::parse_quote!(Self: ::core::default::Default));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics flatwalk::Reconstruct for #name #ty_generics #where_clause {
            fn reconstruct() -> flatwalk::WalkResult<Self> {
                #body
            }
        }
    }
}
