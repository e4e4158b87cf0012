use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields, Result};

use crate::{
    elements::expand_add_element,
    values::{Source, expand_add_value},
};

pub(crate) fn expand_from_element(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`FromElement` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new_spanned(
            input,
            "`FromElement` may only be derived on structs with named fields.",
        ))?
    };

    let add_element = expand_add_element(&fields.named)?;
    let add_value = expand_add_value(&fields.named, Source::Value)?;
    let add_attribute = expand_add_value(&fields.named, Source::Attribute)?;

    let name = &input.ident;
    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::chainring::avec::FromElement for #name #type_generics #where_clause {
            #add_element
            #add_value
            #add_attribute
        }
    };

    Ok(expanded.into())
}
