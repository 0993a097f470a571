//! Tri-state optional containers, the `und` constraint tag, and a generator
//! that rewrites rich structs into plain ones.
//!
//! - [`Opt`], [`Nullable`]: present or absent.
//! - [`Und`]: undefined, null or defined.
//! - [`Elastic`]: undefined, null, one value or many (nullable) values.
//! - [`Constraint`]: parsed `#[und("..")]` tag, checked against live values
//!   in [`validate`] and turned into a plain type by [`plain::select`].
//! - [`codegen`]: struct rewriting shared by the `undgen` binary and the
//!   `UndPlain` derive.

// Generated code names this crate as `::und`, including inside it.
extern crate self as und;

pub mod codegen;
pub mod constraint;
pub mod conv;
pub mod decode;
pub mod elastic;
pub mod nullable;
pub mod option;
pub mod plain;
pub mod tristate;
pub mod validate;

pub use constraint::{Constraint, TagError};
pub use conv::Nullish;
pub use elastic::Elastic;
pub use nullable::Nullable;
pub use option::Opt;
pub use tristate::Und;
pub use validate::{UndValidate, ValidationError, Violation};
