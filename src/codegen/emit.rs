//! Token emission for one planned struct.
use proc_macro2::TokenStream;
use quote::{format_ident, quote, ToTokens};
use syn::{Attribute, Ident, LitStr};

use super::{FieldPlan, StructPlan};
use crate::constraint::{Constraint, LenOp};
use crate::plain::{Kind, StateWrap};

pub fn plain_ident(rich: &Ident) -> Ident { format_ident!("{}Plain", rich) }

/// Plain struct, conversions both ways and the validation impl.
pub fn emit_struct(plan: &StructPlan) -> TokenStream {
    let plain = plain_struct(plan);
    let conversions = conversions(plan);
    let validate = validate_impl(plan);
    quote! {
        #plain
        #conversions
        #validate
    }
}

fn plain_struct(plan: &StructPlan) -> TokenStream {
    let shape = &plan.shape;
    let vis = &shape.vis;
    let ident = plain_ident(&shape.ident);
    let generics = &shape.generics;
    let where_clause = &generics.where_clause;
    let derives = &shape.derives;
    let derive_attr = if derives.is_empty() {
        TokenStream::new()
    } else {
        quote!(#[derive(#(#derives),*)])
    };
    let keep_serde = shape.derives_serde();
    let attrs = shape.attrs.iter().filter(|a| keep_serde || !a.path().is_ident("serde"));

    let fields = plan.fields.iter().map(|f| {
        let FieldPlan { field, .. } = f;
        let vis = &field.vis;
        let name = &field.ident;
        let ty = plain_field_ty(f);
        // Serde attributes of a rewritten field may talk about the rich type;
        // only renames and a bare `default` survive.
        let attrs: Vec<&Attribute> = field
            .attrs
            .iter()
            .filter(|a| {
                !a.path().is_ident("serde") || (keep_serde && (f.conversion.is_none() || type_agnostic(a)))
            })
            .collect();
        let marker = match &f.conversion {
            Some(conv) if keep_serde => {
                let has_default = attrs.iter().any(|a| a.path().is_ident("serde") && sets_default(a));
                marker_serde(conv.wrap, has_default)
            }
            _ => TokenStream::new(),
        };
        quote! {
            #(#attrs)*
            #marker
            #vis #name: #ty
        }
    });

    quote! {
        #derive_attr
        #(#attrs)*
        #vis struct #ident #generics #where_clause {
            #(#fields,)*
        }
    }
}

/// Nullish markers have no wire value of their own: the key's presence is
/// the value. `None` leaves the key out and a missing key decodes.
fn marker_serde(wrap: StateWrap, has_default: bool) -> TokenStream {
    let default = if has_default { None } else { Some(quote!(default)) };
    match wrap {
        StateWrap::NullishOption => {
            let skip = default.map(|d| quote!(#d,));
            quote!(#[serde(
                #skip
                skip_serializing_if = "::core::option::Option::is_none",
                deserialize_with = "::und::conv::deserialize_present"
            )])
        }
        StateWrap::Marker { .. } => match default {
            Some(d) => quote!(#[serde(#d)]),
            None => TokenStream::new(),
        },
        _ => TokenStream::new(),
    }
}

fn sets_default(attr: &Attribute) -> bool {
    let mut found = false;
    let _ = attr.parse_nested_meta(|meta| {
        found |= meta.path.is_ident("default");
        if meta.input.peek(syn::Token![=]) {
            meta.value()?.parse::<syn::Expr>()?;
        }
        Ok(())
    });
    found
}

fn type_agnostic(attr: &Attribute) -> bool {
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("rename") || meta.path.is_ident("alias") {
            meta.value()?.parse::<LitStr>()?;
            Ok(())
        } else if meta.path.is_ident("default") && (meta.input.is_empty() || meta.input.peek(syn::Token![,])) {
            Ok(())
        } else {
            Err(meta.error("depends on the field type"))
        }
    })
    .is_ok()
}

fn plain_field_ty(f: &FieldPlan) -> TokenStream {
    match (&f.conversion, &f.field.container) {
        (Some(conv), Some(c)) => conv.plain_ty().tokens(&c.elem.to_token_stream()),
        _ => f.field.ty.to_token_stream(),
    }
}

fn conversions(plan: &StructPlan) -> TokenStream {
    let shape = &plan.shape;
    let rich = &shape.ident;
    let plain = plain_ident(rich);
    let (impl_generics, ty_generics, where_clause) = shape.generics.split_for_impl();

    let names: Vec<&Ident> = plan.fields.iter().map(|f| &f.field.ident).collect();
    let forward = plan.fields.iter().map(|f| {
        let name = &f.field.ident;
        let src = quote!(self.#name);
        match (&f.conversion, &f.field.container) {
            (Some(conv), Some(c)) => conv.forward(src, &c.elem.to_token_stream()),
            _ => src,
        }
    });
    let backward = plan.fields.iter().map(|f| {
        let name = &f.field.ident;
        let src = quote!(self.#name);
        match (&f.conversion, &f.field.container) {
            (Some(conv), Some(c)) => conv.backward(src, &c.elem.to_token_stream()),
            _ => src,
        }
    });

    quote! {
        impl #impl_generics #rich #ty_generics #where_clause {
            pub fn into_plain(self) -> #plain #ty_generics {
                #plain {
                    #(#names: #forward,)*
                }
            }
        }

        impl #impl_generics #plain #ty_generics #where_clause {
            pub fn into_rich(self) -> #rich #ty_generics {
                #rich {
                    #(#names: #backward,)*
                }
            }
        }

        impl #impl_generics ::core::convert::From<#rich #ty_generics> for #plain #ty_generics #where_clause {
            fn from(value: #rich #ty_generics) -> Self { value.into_plain() }
        }

        impl #impl_generics ::core::convert::From<#plain #ty_generics> for #rich #ty_generics #where_clause {
            fn from(value: #plain #ty_generics) -> Self { value.into_rich() }
        }
    }
}

fn validate_impl(plan: &StructPlan) -> TokenStream {
    let shape = &plan.shape;
    let rich = &shape.ident;
    let (impl_generics, ty_generics, where_clause) = shape.generics.split_for_impl();

    let checks = plan.fields.iter().filter_map(|f| {
        let constraint = f.constraint.as_ref()?;
        let kind = f.field.container.as_ref()?.kind;
        let name = &f.field.ident;
        let label = name.to_string();
        let method = match kind {
            Kind::Option => quote!(validate_opt),
            Kind::Und => quote!(validate_und),
            Kind::Elastic => quote!(validate_elastic),
        };
        let lit = constraint_tokens(constraint);
        Some(quote! {
            {
                const C: ::und::Constraint = #lit;
                C.#method(&self.#name).map_err(|v| v.at(#label))?;
            }
        })
    });

    quote! {
        impl #impl_generics ::und::validate::UndValidate for #rich #ty_generics #where_clause {
            fn validate_und(&self) -> ::core::result::Result<(), ::und::validate::ValidationError> {
                #(#checks)*
                ::core::result::Result::Ok(())
            }
        }
    }
}

/// A `Constraint` as a const expression.
pub fn constraint_tokens(c: &Constraint) -> TokenStream {
    let state = match c.state {
        Some(s) => {
            let (def, null, und) = (s.def, s.null, s.und);
            quote!(::core::option::Option::Some(::und::constraint::StateConstraint { def: #def, null: #null, und: #und }))
        }
        None => quote!(::core::option::Option::None),
    };
    let len = match c.len {
        Some(l) => {
            let op = match l.op {
                LenOp::Eq => quote!(Eq),
                LenOp::Gt => quote!(Gt),
                LenOp::Ge => quote!(Ge),
                LenOp::Lt => quote!(Lt),
                LenOp::Le => quote!(Le),
            };
            let n = l.len;
            quote!(::core::option::Option::Some(::und::constraint::LenConstraint { op: ::und::constraint::LenOp::#op, len: #n }))
        }
        None => quote!(::core::option::Option::None),
    };
    let values = match c.values {
        Some(v) => {
            let nonnull = v.nonnull;
            quote!(::core::option::Option::Some(::und::constraint::ValuesConstraint { nonnull: #nonnull }))
        }
        None => quote!(::core::option::Option::None),
    };
    quote!(::und::Constraint { state: #state, len: #len, values: #values })
}
