use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod from_message;

#[proc_macro_derive(FromMessage, attributes(field))]
pub fn derive_from_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match from_message::expand_from_message(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}
