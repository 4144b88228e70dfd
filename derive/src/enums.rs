use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{DataEnum, DeriveInput, Fields};

use crate::attrs::{self, TypeAttrs};
use crate::common;

pub fn expand_enum(
    input: &DeriveInput,
    data: &DataEnum,
    type_attrs: &TypeAttrs,
) -> syn::Result<TokenStream> {
    let name = &input.ident;

    if type_attrs.byte_copy {
        return Err(syn::Error::new_spanned(
            name,
            "`byte_copy` is not supported on enums",
        ));
    }
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            name,
            "`Traverse` cannot be derived for an empty enum",
        ));
    }

    let key = common::type_key(name);

    // One arm per variant for each direction: packing writes the 4-byte
    // variant index then the bound fields; unpacking rebuilds the variant,
    // reading kept fields in order and reconstructing skipped ones.
    let mut pack_arms: Vec<TokenStream> = Vec::new();
    let mut unpack_arms: Vec<TokenStream> = Vec::new();
    for (position, variant) in data.variants.iter().enumerate() {
        let variant_name = &variant.ident;
        let index = u32::try_from(position).map_err(|_| {
            syn::Error::new_spanned(variant_name, "too many variants for a 4-byte index")
        })?;

        match &variant.fields {
            Fields::Named(fields) => {
                let mut bindings = Vec::new();
                let mut steps = Vec::new();
                let mut builders = Vec::new();
                for field in &fields.named {
                    let field_name = field.ident.as_ref().expect("named field");
                    if attrs::field_is_skipped(field)? {
                        builders.push(quote! {
                            #field_name: flatwalk::Reconstruct::reconstruct()?
                        });
                        continue;
                    }
                    bindings.push(field_name);
                    steps.push(quote! {
                        flatwalk::Traverse::traverse(#field_name, walker)?;
                    });
                    builders.push(quote! {
                        #field_name: flatwalk::Reconstruct::unpack_from(walker)?
                    });
                }
                pack_arms.push(quote! {
                    Self::#variant_name { #(#bindings,)* .. } => {
                        flatwalk::Traverse::traverse(&#index, walker)?;
                        #(#steps)*
                    }
                });
                unpack_arms.push(quote! {
                    #index => Self::#variant_name { #(#builders),* },
                });
            }
            Fields::Unnamed(fields) => {
                let mut patterns = Vec::new();
                let mut steps = Vec::new();
                let mut builders = Vec::new();
                for (field_position, field) in fields.unnamed.iter().enumerate() {
                    if attrs::field_is_skipped(field)? {
                        patterns.push(quote!(_));
                        builders.push(quote! { flatwalk::Reconstruct::reconstruct()? });
                        continue;
                    }
                    let binding = format_ident!("__field{field_position}");
                    patterns.push(quote!(#binding));
                    steps.push(quote! {
                        flatwalk::Traverse::traverse(#binding, walker)?;
                    });
                    builders.push(quote! { flatwalk::Reconstruct::unpack_from(walker)? });
                }
                pack_arms.push(quote! {
                    Self::#variant_name(#(#patterns),*) => {
                        flatwalk::Traverse::traverse(&#index, walker)?;
                        #(#steps)*
                    }
                });
                unpack_arms.push(quote! {
                    #index => Self::#variant_name(#(#builders),*),
                });
            }
            Fields::Unit => {
                pack_arms.push(quote! {
                    Self::#variant_name => {
                        flatwalk::Traverse::traverse(&#index, walker)?;
                    }
                });
                unpack_arms.push(quote! {
                    #index => Self::#variant_name,
                });
            }
        }
    }

    let generics = common::bounded_generics(&input.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let poly = common::poly_impl(input);
    let reconstruct = common::reconstruct_impl(input, type_attrs);

    Ok(quote! {
        const _: () = {
            impl #impl_generics flatwalk::Traverse for #name #ty_generics #where_clause {
                fn traverse(
                    &self,
                    walker: &mut flatwalk::Walker<'_>,
                ) -> flatwalk::WalkResult<()> {
                    walker.enter(#key);
                    match self {
                        #(#pack_arms)*
                    }
                    walker.leave();
                    ::core::result::Result::Ok(())
                }

                fn traverse_mut(
                    &mut self,
                    walker: &mut flatwalk::Walker<'_>,
                ) -> flatwalk::WalkResult<()> {
                    if walker.mode() != flatwalk::Mode::Unpacking {
                        return flatwalk::Traverse::traverse(self, walker);
                    }
                    walker.enter(#key);
                    let __offset = walker.position();
                    let mut __index: u32 = 0;
                    flatwalk::Traverse::traverse_mut(&mut __index, walker)?;
                    *self = match __index {
                        #(#unpack_arms)*
                        _ => {
                            return ::core::result::Result::Err(
                                flatwalk::WalkError::InvalidData {
                                    offset: __offset,
                                    reason: "enum variant index out of range".into(),
                                },
                            );
                        }
                    };
                    walker.leave();
                    ::core::result::Result::Ok(())
                }
            }

            #poly
            #reconstruct
        };
    })
}
