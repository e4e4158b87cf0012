use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    Error, Field, Ident, LitStr, Result, Token, Type,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
};

pub(crate) fn expand_add_element(fields: &Punctuated<Field, Token![,]>) -> Result<TokenStream> {
    let fields = fields
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    // Leave the trait's default in place.
    if fields.is_empty() {
        return Ok(TokenStream::new());
    }

    let mut names = HashSet::new();

    for field in &fields {
        if !names.insert(field.tag.value()) {
            Err(Error::new_spanned(
                &field.tag,
                "Element names must be unique.",
            ))?
        }
    }

    let cases = fields.iter().map(|field| {
        let FieldMetadata { name, tag, is_vec } = field;

        let assignment = if *is_vec {
            quote! {
                self.#name.push(Default::default());
                self.#name.last_mut().map(|r| r as _)
            }
        } else {
            quote! {
                Some(self.#name.insert(Default::default()))
            }
        };

        quote! { #tag => { #assignment } }
    });

    Ok(quote! {
        fn add_element(&mut self, name: &str) -> Option<&mut dyn ::chainring::avec::FromElement> {
            match name {
                #(#cases)*
                _ => None,
            }
        }
    })
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    tag: LitStr,
    is_vec: bool,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let name = field.ident.clone().unwrap();

        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("element")) else {
            return Ok(None);
        };

        let ElementAttribute { tag } = attr.meta.require_list()?.parse_args()?;

        let Type::Path(path) = &field.ty else {
            Err(Error::new_spanned(
                &field.ty,
                "Field must have a type annotation.",
            ))?
        };

        let Some(segment) = path.path.segments.last() else {
            Err(Error::new_spanned(
                &path.path.segments,
                "Field must have an `Option<T>` or `Vec<T>` type.",
            ))?
        };

        let is_vec = if segment.ident == "Option" {
            false
        } else if segment.ident == "Vec" {
            true
        } else {
            Err(Error::new_spanned(
                &segment.ident,
                "Field must have an `Option<T>` or `Vec<T>` type.",
            ))?
        };

        Ok(Some(Self { name, tag, is_vec }))
    }
}

#[derive(Debug)]
struct ElementAttribute {
    tag: LitStr,
}

impl Parse for ElementAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let tag = input.parse::<LitStr>()?;
        Ok(Self { tag })
    }
}
