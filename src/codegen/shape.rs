//! Struct shapes read out of `syn` items.
//!
//! A shape keeps only what the rewrite needs: names, visibility, generics,
//! derives, doc lines, and per field the recognized container kind, its
//! element type and the raw tag.
use quote::ToTokens;
use syn::punctuated::Punctuated;
use syn::{
    Attribute, Data, DeriveInput, Expr, ExprLit, Fields, GenericArgument, Generics, Ident,
    ItemStruct, Lit, LitStr, Meta, Path, PathArguments, Token, Type, Visibility,
};

use crate::plain::Kind;

pub const IGNORE_DIRECTIVE: &str = "undgen:ignore";
pub const GENERATED_DIRECTIVE: &str = "undgen:generated";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Directives {
    pub ignore: bool,
    pub generated: bool,
}

#[derive(Debug, Clone)]
pub struct StructShape {
    pub ident: Ident,
    pub vis: Visibility,
    pub generics: Generics,
    /// Derives copied from the item plus any `#[und(derive(..))]` extras.
    pub derives: Vec<Path>,
    /// `doc` and `serde` attributes, directive lines removed.
    pub attrs: Vec<Attribute>,
    pub fields: Vec<FieldShape>,
    pub directives: Directives,
}

#[derive(Debug, Clone)]
pub struct FieldShape {
    pub ident: Ident,
    pub vis: Visibility,
    pub ty: Type,
    pub container: Option<Container>,
    pub tag: Option<LitStr>,
    pub attrs: Vec<Attribute>,
    pub directives: Directives,
}

#[derive(Debug, Clone)]
pub struct Container {
    pub kind: Kind,
    pub elem: Type,
}

/// Everything found in `#[und(..)]` attributes of one item.
#[derive(Debug, Default)]
struct UndAttrs {
    tag: Option<LitStr>,
    ignore: bool,
    derives: Vec<Path>,
}

// ————————————————————————————————————————————————————————————————————————————
// EXTRACTION
// ————————————————————————————————————————————————————————————————————————————

impl StructShape {
    /// `Ok(None)` for unit and tuple structs, which have nothing to rewrite.
    pub fn from_item(item: &ItemStruct) -> syn::Result<Option<Self>> {
        Self::build(&item.ident, &item.vis, &item.generics, &item.attrs, &item.fields)
    }

    pub fn from_derive(input: &DeriveInput) -> syn::Result<Self> {
        let Data::Struct(data) = &input.data else {
            return Err(syn::Error::new_spanned(input, "UndPlain only works on structs"));
        };
        Self::build(&input.ident, &input.vis, &input.generics, &input.attrs, &data.fields)?
            .ok_or_else(|| syn::Error::new_spanned(input, "UndPlain requires named fields"))
    }

    fn build(
        ident: &Ident,
        vis: &Visibility,
        generics: &Generics,
        attrs: &[Attribute],
        fields: &Fields,
    ) -> syn::Result<Option<Self>> {
        let Fields::Named(named) = fields else { return Ok(None) };

        let und = read_und_attrs(attrs)?;
        if let Some(tag) = &und.tag {
            return Err(syn::Error::new_spanned(tag, "a constraint tag belongs on a field"));
        }
        let mut directives = doc_directives(attrs);
        directives.ignore |= und.ignore;

        let mut derives = read_derives(attrs)?;
        for extra in und.derives {
            let seen = derives.iter().any(|d| d.to_token_stream().to_string() == extra.to_token_stream().to_string());
            if !seen {
                derives.push(extra);
            }
        }

        let fields = named
            .named
            .iter()
            .map(FieldShape::from_field)
            .collect::<syn::Result<Vec<_>>>()?;

        Ok(Some(Self {
            ident: ident.clone(),
            vis: vis.clone(),
            generics: generics.clone(),
            derives,
            attrs: carried_attrs(attrs),
            fields,
            directives,
        }))
    }

    pub fn name(&self) -> String { self.ident.to_string() }

    /// True when any non-ignored field carries a tag.
    pub fn has_tags(&self) -> bool {
        self.fields.iter().any(|f| f.tag.is_some() && !f.directives.ignore)
    }

    pub fn derives_serde(&self) -> bool {
        self.derives.iter().any(|p| {
            p.segments
                .last()
                .is_some_and(|s| s.ident == "Serialize" || s.ident == "Deserialize")
        })
    }
}

impl FieldShape {
    fn from_field(field: &syn::Field) -> syn::Result<Self> {
        let Some(ident) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let und = read_und_attrs(&field.attrs)?;
        if let Some(first) = und.derives.first() {
            return Err(syn::Error::new_spanned(first, "derive belongs on the struct"));
        }
        let mut directives = doc_directives(&field.attrs);
        directives.ignore |= und.ignore;

        Ok(Self {
            ident,
            vis: field.vis.clone(),
            ty: field.ty.clone(),
            container: Container::detect(&field.ty),
            tag: und.tag,
            attrs: carried_attrs(&field.attrs),
            directives,
        })
    }

    /// Exported fields only: `pub` or `pub(..)`.
    pub fn is_exported(&self) -> bool { !matches!(self.vis, Visibility::Inherited) }
}

impl Container {
    /// Recognized by the last path segment with exactly one type argument,
    /// so `Und<T>`, `und::Und<T>` and `::und::Und<T>` all match.
    pub fn detect(ty: &Type) -> Option<Self> {
        let Type::Path(tp) = ty else { return None };
        if tp.qself.is_some() {
            return None;
        }
        let last = tp.path.segments.last()?;
        let kind = match last.ident.to_string().as_str() {
            "Option" | "Opt" | "Nullable" => Kind::Option,
            "Und" => Kind::Und,
            "Elastic" => Kind::Elastic,
            _ => return None,
        };
        let PathArguments::AngleBracketed(args) = &last.arguments else { return None };
        if args.args.len() != 1 {
            return None;
        }
        match args.args.first()? {
            GenericArgument::Type(elem) => Some(Self { kind, elem: elem.clone() }),
            _ => None,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ATTRIBUTE HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_und_attrs(attrs: &[Attribute]) -> syn::Result<UndAttrs> {
    let mut out = UndAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("und")) {
        match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => set_tag(&mut out, s)?,
                other => return Err(syn::Error::new_spanned(other, "expected a string tag")),
            },
            Meta::List(list) => {
                if let Ok(s) = list.parse_args::<LitStr>() {
                    set_tag(&mut out, &s)?;
                    continue;
                }
                list.parse_nested_meta(|meta| {
                    if meta.path.is_ident("ignore") {
                        out.ignore = true;
                        Ok(())
                    } else if meta.path.is_ident("derive") {
                        meta.parse_nested_meta(|d| {
                            out.derives.push(d.path);
                            Ok(())
                        })
                    } else {
                        Err(meta.error("expected `ignore`, `derive(..)` or a tag string"))
                    }
                })?;
            }
            Meta::Path(p) => {
                return Err(syn::Error::new_spanned(p, "expected #[und(\"..\")] or #[und = \"..\"]"));
            }
        }
    }
    Ok(out)
}

fn set_tag(out: &mut UndAttrs, s: &LitStr) -> syn::Result<()> {
    if out.tag.replace(s.clone()).is_some() {
        return Err(syn::Error::new_spanned(s, "duplicate und tag"));
    }
    Ok(())
}

fn read_derives(attrs: &[Attribute]) -> syn::Result<Vec<Path>> {
    let mut out = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("derive")) {
        let paths = attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)?;
        out.extend(paths.into_iter().filter(|p| !ends_with(p, "UndPlain")));
    }
    Ok(out)
}

fn ends_with(p: &Path, name: &str) -> bool { p.segments.last().is_some_and(|s| s.ident == name) }

fn doc_lines(attrs: &[Attribute]) -> impl Iterator<Item = (&Attribute, String)> {
    attrs.iter().filter_map(|attr| match &attr.meta {
        Meta::NameValue(nv) if nv.path.is_ident("doc") => match &nv.value {
            Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => Some((attr, s.value())),
            _ => None,
        },
        _ => None,
    })
}

fn doc_directives(attrs: &[Attribute]) -> Directives {
    let mut d = Directives::default();
    for (_, line) in doc_lines(attrs) {
        match line.trim() {
            IGNORE_DIRECTIVE => d.ignore = true,
            GENERATED_DIRECTIVE => d.generated = true,
            _ => {}
        }
    }
    d
}

fn is_directive(line: &str) -> bool { matches!(line.trim(), IGNORE_DIRECTIVE | GENERATED_DIRECTIVE) }

/// Attributes worth repeating on the plain side.
fn carried_attrs(attrs: &[Attribute]) -> Vec<Attribute> {
    let docs = doc_lines(attrs).filter(|(_, line)| !is_directive(line)).map(|(a, _)| a.clone());
    let serde = attrs.iter().filter(|a| a.path().is_ident("serde")).cloned();
    docs.chain(serde).collect()
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(src: &str) -> StructShape {
        let item: ItemStruct = syn::parse_str(src).unwrap();
        StructShape::from_item(&item).unwrap().unwrap()
    }

    #[test]
    fn reads_fields_kinds_and_tags() {
        let s = shape(
            r#"
            /// A sample.
            #[derive(Debug, Clone, UndPlain)]
            pub struct Sample {
                #[und("required")]
                pub a: Option<String>,
                #[und = "def,null"]
                pub b: und::Und<i32>,
                pub c: Elastic<f64>,
                d: u8,
            }
            "#,
        );
        assert_eq!(s.name(), "Sample");
        assert_eq!(s.derives.len(), 2);
        assert_eq!(s.attrs.len(), 1);
        assert!(s.has_tags());

        let kinds: Vec<_> = s.fields.iter().map(|f| f.container.as_ref().map(|c| c.kind)).collect();
        assert_eq!(kinds, vec![Some(Kind::Option), Some(Kind::Und), Some(Kind::Elastic), None]);
        assert_eq!(s.fields[0].tag.as_ref().map(LitStr::value).as_deref(), Some("required"));
        assert_eq!(s.fields[1].tag.as_ref().map(LitStr::value).as_deref(), Some("def,null"));
        assert_eq!(s.fields[1].container.as_ref().unwrap().elem.to_token_stream().to_string(), "i32");
        assert!(s.fields[2].tag.is_none());
        assert!(!s.fields[3].is_exported());
    }

    #[test]
    fn directives_from_docs_and_attrs() {
        let s = shape(
            r#"
            /// undgen:generated
            pub struct Done {
                /// undgen:ignore
                #[und("required")]
                pub a: Option<u8>,
                #[und(ignore)]
                #[und("required")]
                pub b: Option<u8>,
            }
            "#,
        );
        assert!(s.directives.generated);
        assert!(s.attrs.is_empty());
        assert!(s.fields.iter().all(|f| f.directives.ignore));
        assert!(!s.has_tags());
    }

    #[test]
    fn extra_derives_for_the_plain_side() {
        let s = shape(
            r#"
            #[derive(Debug)]
            #[und(derive(Debug, serde::Serialize))]
            pub struct S { #[und("def")] pub a: Und<u8> }
            "#,
        );
        assert_eq!(s.derives.len(), 2);
        assert!(s.derives_serde());
    }

    #[test]
    fn rejects_misplaced_or_duplicate_tags() {
        let dup: ItemStruct =
            syn::parse_str(r#"pub struct S { #[und("def")] #[und("null")] pub a: Und<u8> }"#).unwrap();
        assert!(StructShape::from_item(&dup).is_err());
        let on_struct: ItemStruct = syn::parse_str(r#"#[und("def")] pub struct S { pub a: Und<u8> }"#).unwrap();
        assert!(StructShape::from_item(&on_struct).is_err());
    }

    #[test]
    fn container_detection_needs_one_type_argument() {
        let ty: Type = syn::parse_str("Vec<u8>").unwrap();
        assert!(Container::detect(&ty).is_none());
        let ty: Type = syn::parse_str("Option").unwrap();
        assert!(Container::detect(&ty).is_none());
        let ty: Type = syn::parse_str("::und::Elastic<Vec<u8>>").unwrap();
        assert_eq!(Container::detect(&ty).map(|c| c.kind), Some(Kind::Elastic));
    }

    #[test]
    fn tuple_structs_are_skipped() {
        let item: ItemStruct = syn::parse_str("pub struct T(pub Und<u8>);").unwrap();
        assert!(StructShape::from_item(&item).unwrap().is_none());
    }
}
