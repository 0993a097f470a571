// Plain-side type IR. The container's element type is a hole (`Elem`)
// filled in at render time, so one IR serves every field.

use proc_macro2::TokenStream;
use quote::quote;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlainTy {
    Elem,                         // the rich container's `T`
    Vec(Box<PlainTy>),
    Array(Box<PlainTy>, usize),   // fixed length
    Option(Box<PlainTy>),
    Und(Box<PlainTy>),            // kept tri-state
    Nullish,                      // marker, no payload
}

impl PlainTy {
    pub fn vec(t: PlainTy) -> Self { Self::Vec(Box::new(t)) }
    pub fn array(t: PlainTy, n: usize) -> Self { Self::Array(Box::new(t), n) }
    pub fn option(t: PlainTy) -> Self { Self::Option(Box::new(t)) }
    pub fn und(t: PlainTy) -> Self { Self::Und(Box::new(t)) }

    /// Fully qualified tokens, suitable for generated code.
    pub fn tokens(&self, elem: &TokenStream) -> TokenStream {
        match self {
            Self::Elem => elem.clone(),
            Self::Vec(t) => {
                let t = t.tokens(elem);
                quote!(::std::vec::Vec<#t>)
            }
            Self::Array(t, n) => {
                let t = t.tokens(elem);
                quote!([#t; #n])
            }
            Self::Option(t) => {
                let t = t.tokens(elem);
                quote!(::core::option::Option<#t>)
            }
            Self::Und(t) => {
                let t = t.tokens(elem);
                quote!(::und::Und<#t>)
            }
            Self::Nullish => quote!(::und::conv::Nullish),
        }
    }

    /// Short human form, e.g. `Option<[Option<String>; 2]>`.
    pub fn render(&self, elem: &str) -> String {
        match self {
            Self::Elem => elem.to_string(),
            Self::Vec(t) => format!("Vec<{}>", t.render(elem)),
            Self::Array(t, n) => format!("[{}; {n}]", t.render(elem)),
            Self::Option(t) => format!("Option<{}>", t.render(elem)),
            Self::Und(t) => format!("Und<{}>", t.render(elem)),
            Self::Nullish => "Nullish".to_string(),
        }
    }
}
