//! Rewrite driver: rich structs in, plain structs and conversions out.
//!
//! For every struct the driver walks its fields in order. An exported field
//! whose type is a recognized container and which carries a tag is run
//! through [`crate::plain::select`]; every other field is copied as it is.
//! A struct with tags but no modified field is malformed input.
//!
//! Two front ends share this driver: `undgen gen` over whole files
//! ([`generate_file`]) and `#[derive(UndPlain)]` ([`expand`]).
pub mod emit;
pub mod shape;

use proc_macro2::TokenStream;
use quote::ToTokens;
use syn::{DeriveInput, Item};

use crate::constraint::{Constraint, TagError};
use crate::plain::{self, Conversion, SelectError};

pub use shape::{Container, Directives, FieldShape, StructShape};

/// First line of every file written by `undgen`.
pub const GENERATED_HEADER: &str = "// Code generated by undgen. DO NOT EDIT.";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("syntax: {0}")]
    Syntax(#[from] syn::Error),
    #[error("{ty}.{field}: {source}")]
    Tag {
        ty: String,
        field: String,
        #[source]
        source: TagError,
    },
    #[error("{ty}.{field}: {source}")]
    Select {
        ty: String,
        field: String,
        #[source]
        source: SelectError,
    },
    #[error("{ty}: malformed: no field is modified")]
    NoFieldModified { ty: String },
}

#[derive(Debug, Clone)]
pub struct FieldPlan {
    pub field: FieldShape,
    /// Set for every tagged container field, modified or not.
    pub constraint: Option<Constraint>,
    pub conversion: Option<Conversion>,
}

#[derive(Debug, Clone)]
pub struct StructPlan {
    pub shape: StructShape,
    pub fields: Vec<FieldPlan>,
}

/// Output of one source file.
#[derive(Debug, Default)]
pub struct GeneratedFile {
    /// The input was itself generated and was left alone.
    pub skipped: bool,
    /// Names of the rich structs that got a plain twin.
    pub structs: Vec<String>,
    /// Per-struct failures; the other structs are still generated.
    pub errors: Vec<GenError>,
    pub tokens: TokenStream,
}

// ————————————————————————————————————————————————————————————————————————————
// PLANNING
// ————————————————————————————————————————————————————————————————————————————

impl StructPlan {
    pub fn build(shape: StructShape) -> Result<Self, GenError> {
        let ty = shape.name();
        let mut modified = 0usize;
        let mut fields = Vec::with_capacity(shape.fields.len());

        for field in &shape.fields {
            let (constraint, conversion) = plan_field(&ty, field)?;
            if let Some(conv) = &conversion {
                modified += 1;
                tracing::debug!(
                    ty = %ty,
                    field = %field.ident,
                    wrap = %conv.wrap,
                    plain = %conv.plain_ty().render("T"),
                    "field rewritten"
                );
            }
            fields.push(FieldPlan { field: field.clone(), constraint, conversion });
        }

        if modified == 0 {
            return Err(GenError::NoFieldModified { ty });
        }
        Ok(Self { shape, fields })
    }

    pub fn modified(&self) -> impl Iterator<Item = &FieldPlan> {
        self.fields.iter().filter(|f| f.conversion.is_some())
    }
}

type FieldDecision = (Option<Constraint>, Option<Conversion>);

fn plan_field(ty: &str, field: &FieldShape) -> Result<FieldDecision, GenError> {
    let name = field.ident.to_string();
    let skip = |reason: &str| -> Result<FieldDecision, GenError> {
        tracing::debug!(ty = %ty, field = %name, reason, "field copied");
        Ok((None, None))
    };
    if field.directives.ignore {
        return skip("ignored");
    }
    let Some(tag) = &field.tag else { return skip("untagged") };
    if !field.is_exported() {
        return skip("not exported");
    }
    let Some(container) = &field.container else { return skip("not a container") };

    let constraint = Constraint::parse(&tag.value()).map_err(|source| GenError::Tag {
        ty: ty.to_string(),
        field: name.clone(),
        source,
    })?;
    let conversion = plain::select(container.kind, &constraint).map_err(|source| GenError::Select {
        ty: ty.to_string(),
        field: name.clone(),
        source,
    })?;
    if conversion.is_none() {
        tracing::debug!(ty = %ty, field = %name, tag = %constraint, "constraint gains nothing");
    }
    Ok((Some(constraint), conversion))
}

// ————————————————————————————————————————————————————————————————————————————
// FRONT ENDS
// ————————————————————————————————————————————————————————————————————————————

/// Derive entry point. Errors come back as `syn::Error` so they point at
/// the offending tokens.
pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let shape = StructShape::from_derive(input)?;
    let plan = StructPlan::build(shape).map_err(|e| match e {
        GenError::Syntax(e) => e,
        other => syn::Error::new_spanned(&input.ident, other),
    })?;
    Ok(emit::emit_struct(&plan))
}

/// Rewrites every eligible struct of one file.
pub fn generate_file(src: &str) -> Result<GeneratedFile, GenError> {
    if is_generated_source(src) {
        return Ok(GeneratedFile { skipped: true, ..GeneratedFile::default() });
    }
    let file = syn::parse_file(src)?;
    let mut out = GeneratedFile::default();

    for item in &file.items {
        let Item::Struct(item) = item else { continue };
        let shape = match StructShape::from_item(item) {
            Ok(Some(shape)) => shape,
            Ok(None) => continue,
            Err(e) => {
                out.errors.push(e.into());
                continue;
            }
        };
        if shape.directives.ignore || shape.directives.generated || !shape.has_tags() {
            continue;
        }
        let name = shape.name();
        match StructPlan::build(shape) {
            Ok(plan) => {
                tracing::info!(ty = %name, fields = plan.modified().count(), "generated plain struct");
                emit::emit_struct(&plan).to_tokens(&mut out.tokens);
                out.structs.push(name);
            }
            Err(e) => {
                tracing::warn!(ty = %name, error = %e, "struct skipped");
                out.errors.push(e);
            }
        }
    }
    Ok(out)
}

pub fn is_generated_source(src: &str) -> bool {
    src.lines().find(|l| !l.trim().is_empty()).is_some_and(|l| l.trim() == GENERATED_HEADER)
}

impl GeneratedFile {
    pub fn is_empty(&self) -> bool { self.structs.is_empty() }

    /// Unformatted source, meant to be declared as a child module of the
    /// file it was generated from.
    pub fn render(&self) -> String {
        format!("{GENERATED_HEADER}\n\n#[allow(unused_imports)]\nuse super::*;\n\n{}\n", self.tokens)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
