use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    Error, ExprClosure, Field, GenericArgument, Ident, LitStr, Pat, PathArguments, Result, Token,
    Type,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
};

/// Where a value is read from: a leaf child element, or an attribute.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Source {
    Value,
    Attribute,
}

impl Source {
    fn attribute(self) -> &'static str {
        match self {
            Source::Value => "value",
            Source::Attribute => "attribute",
        }
    }

    fn method(self) -> Ident {
        match self {
            Source::Value => Ident::new("add_value", proc_macro2::Span::call_site()),
            Source::Attribute => Ident::new("add_attribute", proc_macro2::Span::call_site()),
        }
    }
}

pub(crate) fn expand_add_value(
    fields: &Punctuated<Field, Token![,]>,
    source: Source,
) -> Result<TokenStream> {
    let fields = fields
        .iter()
        .map(|f| FieldMetadata::parse(f, source))
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
                format!("Names in `{}` attributes must be unique.", source.attribute()),
            ))?
        }
    }

    let cases = fields.into_iter().map(|field| {
        let FieldMetadata {
            name,
            tag,
            primitive,
            handler,
        } = field;

        let assignment = if let Some((field_type, handler)) = handler {
            let body = handler.body;
            let acc = handler.inputs.iter().nth(0).unwrap();
            let val = handler.inputs.iter().nth(1).unwrap();

            quote! {
                (|#acc: &mut #field_type, #val| {#body})(&mut self.#name, value)
            }
        } else {
            quote! {
                self.#name = Some(value)
            }
        };

        quote! {
            #tag => {
                let value = <#primitive as ::chainring::value::Value>::parse(text)?;
                #assignment;
            }
        }
    });

    let method = source.method();

    Ok(quote! {
        fn #method(&mut self, name: &str, text: &str) -> ::core::result::Result<(), ::chainring::value::ValueError> {
            match name {
                #(#cases)*
                _ => {}
            };
            ::core::result::Result::Ok(())
        }
    })
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    tag: LitStr,
    primitive: Type,
    handler: Option<(Type, ExprClosure)>,
}

impl FieldMetadata {
    fn parse(field: &Field, source: Source) -> Result<Option<Self>> {
        let name = field.ident.clone().unwrap();

        let Some(attr) = field
            .attrs
            .iter()
            .find(|a| a.path().is_ident(source.attribute()))
        else {
            return Ok(None);
        };

        let ValueAttribute { tag, handler } = attr.meta.require_list()?.parse_args()?;

        let primitive = if let Some(handler) = &handler {
            let Some(parameter) = handler.inputs.iter().nth(1) else {
                Err(Error::new_spanned(
                    handler,
                    "Handler closure must have two parameters.",
                ))?
            };

            let Pat::Type(pat_type) = parameter else {
                Err(Error::new_spanned(
                    parameter,
                    "Handler closure's second parameter must be annotated with the expected value type.",
                ))?
            };

            (*pat_type.ty).clone()
        } else {
            let Type::Path(path) = &field.ty else {
                Err(Error::new_spanned(
                    &field.ty,
                    "Field must have a type annotation.",
                ))?
            };

            let Some(segment) = path.path.segments.last() else {
                Err(Error::new_spanned(
                    &path.path.segments,
                    "Field must have a type annotation.",
                ))?
            };

            if segment.ident != "Option" {
                Err(Error::new_spanned(
                    &segment.ident,
                    "Field without a handler must have type `Option<T>`.",
                ))?
            }

            let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
                Err(Error::new_spanned(
                    &segment.arguments,
                    "Field of type `Option<T>` must have a generic parameter.",
                ))?
            };

            let Some(argument) = arguments.args.first() else {
                Err(Error::new_spanned(
                    &arguments.args,
                    "Field of type `Option<T>` must have a generic parameter.",
                ))?
            };

            let GenericArgument::Type(inner_type) = argument else {
                Err(Error::new_spanned(
                    argument,
                    "Generic argument of a field of type `Option<T>` must be a type.",
                ))?
            };

            inner_type.clone()
        };

        let handler = handler.map(|h| (field.ty.clone(), h));

        Ok(Some(Self {
            name,
            tag,
            primitive,
            handler,
        }))
    }
}

#[derive(Debug)]
struct ValueAttribute {
    tag: LitStr,
    handler: Option<ExprClosure>,
}

impl Parse for ValueAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let tag = input.parse::<LitStr>()?;

        let handler = if !input.is_empty() {
            input.parse::<Token![,]>()?;
            Some(input.parse::<ExprClosure>()?)
        } else {
            None
        };

        Ok(Self { tag, handler })
    }
}
