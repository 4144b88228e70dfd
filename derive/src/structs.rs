use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataStruct, DeriveInput, Index, Member};

use crate::attrs::{self, TypeAttrs};
use crate::common;

pub fn expand_struct(
    input: &DeriveInput,
    data: &DataStruct,
    type_attrs: &TypeAttrs,
) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let key = common::type_key(name);

    let mut members: Vec<Member> = Vec::new();
    let mut member_types: Vec<&syn::Type> = Vec::new();
    let mut any_skipped = false;
    for (index, field) in data.fields.iter().enumerate() {
        if attrs::field_is_skipped(field)? {
            any_skipped = true;
            continue;
        }
        members.push(match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(Index::from(index)),
        });
        member_types.push(&field.ty);
    }

    if type_attrs.byte_copy {
        if !input.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                name,
                "`byte_copy` is not supported on generic types",
            ));
        }
        if any_skipped {
            return Err(syn::Error::new_spanned(
                name,
                "`byte_copy` cannot be combined with skipped fields",
            ));
        }
    }

    let byte_copy_const = type_attrs.byte_copy.then(|| {
        // Wire width is the sum of the field widths; in-memory padding is
        // never packed.
        quote! {
            const BYTE_COPYABLE: bool = true;
            const WIRE_WIDTH: usize =
                0 #(+ <#member_types as flatwalk::Traverse>::WIRE_WIDTH)*;
        }
    });
    let byte_copy_asserts = type_attrs.byte_copy.then(|| {
        quote! {
            #(const _: () = ::core::assert!(
                <#member_types as flatwalk::Traverse>::BYTE_COPYABLE,
                "every field of a `byte_copy` type must itself be byte-copyable",
            );)*
        }
    });

    let generics = common::bounded_generics(&input.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let poly = common::poly_impl(input);
    let reconstruct = common::reconstruct_impl(input, type_attrs);

    Ok(quote! {
        const _: () = {
            impl #impl_generics flatwalk::Traverse for #name #ty_generics #where_clause {
                #byte_copy_const

                fn traverse(
                    &self,
                    walker: &mut flatwalk::Walker<'_>,
                ) -> flatwalk::WalkResult<()> {
                    walker.enter(#key);
                    #(flatwalk::Traverse::traverse(&self.#members, walker)?;)*
                    walker.leave();
                    ::core::result::Result::Ok(())
                }

                fn traverse_mut(
                    &mut self,
                    walker: &mut flatwalk::Walker<'_>,
                ) -> flatwalk::WalkResult<()> {
                    walker.enter(#key);
                    #(flatwalk::Traverse::traverse_mut(&mut self.#members, walker)?;)*
                    walker.leave();
                    ::core::result::Result::Ok(())
                }
            }

            #poly
            #reconstruct
            #byte_copy_asserts
        };
    })
}
