use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod elements;
mod from_element;
mod values;

#[proc_macro_derive(FromElement, attributes(element, value, attribute))]
pub fn derive_from_element(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match from_element::expand_from_element(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}
