//! `#[derive(UndPlain)]` for structs whose fields carry `#[und("..")]` tags.
//!
//! The expansion is the same as `undgen gen` writes for the struct: a
//! `{Name}Plain` struct, `into_plain` / `into_rich`, `From` both ways and
//! an `und::UndValidate` impl. The plain struct gets the derives listed in
//! `#[und(derive(..))]`.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

#[proc_macro_derive(UndPlain, attributes(und))]
pub fn derive_und_plain(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    und::codegen::expand(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
