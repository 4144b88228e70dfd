use syn::{Attribute, Field, LitStr, Path};

use crate::TRAVERSE_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// Type-level attributes

/// The parsed `#[traverse(...)]` attributes of the deriving type.
pub struct TypeAttrs {
    pub default: bool,
    pub factory: Option<Path>,
    pub byte_copy: bool,
}

impl TypeAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self {
            default: false,
            factory: None,
            byte_copy: false,
        };
        for attr in attrs {
            if !attr.path().is_ident(TRAVERSE_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("default") {
                    parsed.default = true;
                    Ok(())
                } else if meta.path.is_ident("factory") {
                    let literal: LitStr = meta.value()?.parse()?;
                    parsed.factory = Some(literal.parse()?);
                    Ok(())
                } else if meta.path.is_ident("byte_copy") {
                    parsed.byte_copy = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `default`, `factory = \"path\"` or `byte_copy`"))
                }
            })?;
        }
        Ok(parsed)
    }
}

// -----------------------------------------------------------------------------
// Field-level attributes

/// Whether a field carries `#[traverse(skip)]`.
pub fn field_is_skipped(field: &Field) -> syn::Result<bool> {
    let mut skipped = false;
    for attr in &field.attrs {
        if !attr.path().is_ident(TRAVERSE_ATTRIBUTE_NAME) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skipped = true;
                Ok(())
            } else {
                Err(meta.error("expected `skip`"))
            }
        })?;
    }
    Ok(skipped)
}
