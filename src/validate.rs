//! Checking live values against a [`Constraint`].
//!
//! Option-like values cannot tell Null from Undefined, so for them the two
//! nullish bits are OR'd together. Elastic values are checked for state
//! first; a present sequence then has to satisfy the len and values parts.
use crate::constraint::{Constraint, LenConstraint};
use crate::elastic::Elastic;
use crate::nullable::Nullable;
use crate::option::Opt;
use crate::tristate::Und;

// ————————————————————————————————————————————————————————————————————————————
// TRAITS
// ————————————————————————————————————————————————————————————————————————————

pub trait OptLike {
    fn is_some_value(&self) -> bool;
}

pub trait UndLike {
    fn is_defined_value(&self) -> bool;
    fn is_null_value(&self) -> bool;
    fn is_undefined_value(&self) -> bool;
}

pub trait ElasticLike: UndLike {
    fn seq_len(&self) -> usize;
    fn seq_has_null(&self) -> bool;
}

/// Implemented by generated code for structs with tagged fields.
pub trait UndValidate {
    fn validate_und(&self) -> Result<(), ValidationError>;
}

// ————————————————————————————————————————————————————————————————————————————
// ERRORS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("value is defined, but the constraint does not allow defined")]
    Defined,
    #[error("value is null, but the constraint does not allow null")]
    Null,
    #[error("value is undefined, but the constraint does not allow undefined")]
    Undefined,
    #[error("value is none, but the constraint allows neither null nor undefined")]
    None,
    #[error("length {actual} does not satisfy {constraint}")]
    Len { constraint: LenConstraint, actual: usize },
    #[error("sequence contains null, but values must be nonnull")]
    NullValue,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field {field}: {violation}")]
pub struct ValidationError {
    pub field: String,
    pub violation: Violation,
}

impl Violation {
    pub fn at(self, field: impl Into<String>) -> ValidationError {
        ValidationError { field: field.into(), violation: self }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// EVALUATION
// ————————————————————————————————————————————————————————————————————————————

impl Constraint {
    pub fn validate_opt(&self, v: &impl OptLike) -> Result<(), Violation> {
        let Some(s) = self.state else { return Ok(()) };
        match v.is_some_value() {
            true if !s.def => Err(Violation::Defined),
            false if !s.allows_nullish() => Err(Violation::None),
            _ => Ok(()),
        }
    }

    pub fn validate_und(&self, v: &impl UndLike) -> Result<(), Violation> {
        let Some(s) = self.state else { return Ok(()) };
        if v.is_defined_value() && !s.def {
            Err(Violation::Defined)
        } else if v.is_null_value() && !s.null {
            Err(Violation::Null)
        } else if v.is_undefined_value() && !s.und {
            Err(Violation::Undefined)
        } else {
            Ok(())
        }
    }

    pub fn validate_elastic(&self, v: &impl ElasticLike) -> Result<(), Violation> {
        let s = self.effective_state();
        if v.is_undefined_value() {
            return if s.und { Ok(()) } else { Err(Violation::Undefined) };
        }
        if v.is_null_value() {
            // An explicit null permission admits the null form as it is.
            if self.state.is_some() {
                return if s.null { Ok(()) } else { Err(Violation::Null) };
            }
        } else if !s.def {
            return Err(Violation::Defined);
        }

        if let Some(len) = self.len {
            let actual = v.seq_len();
            if !len.valid_len(actual) {
                return Err(Violation::Len { constraint: len, actual });
            }
        }
        if let Some(values) = self.values {
            if !values.valid(v.seq_has_null()) {
                return Err(Violation::NullValue);
            }
        }
        Ok(())
    }

    pub fn valid_opt(&self, v: &impl OptLike) -> bool { self.validate_opt(v).is_ok() }
    pub fn valid_und(&self, v: &impl UndLike) -> bool { self.validate_und(v).is_ok() }
    pub fn valid_elastic(&self, v: &impl ElasticLike) -> bool { self.validate_elastic(v).is_ok() }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLS
// ————————————————————————————————————————————————————————————————————————————

impl<T> OptLike for Opt<T> {
    fn is_some_value(&self) -> bool { self.is_some() }
}

impl<T> OptLike for Nullable<T> {
    fn is_some_value(&self) -> bool { self.is_non_null() }
}

impl<T> OptLike for Option<T> {
    fn is_some_value(&self) -> bool { self.is_some() }
}

impl<T> UndLike for Und<T> {
    fn is_defined_value(&self) -> bool { self.is_defined() }
    fn is_null_value(&self) -> bool { self.is_null() }
    fn is_undefined_value(&self) -> bool { self.is_undefined() }
}

impl<T> UndLike for Elastic<T> {
    fn is_defined_value(&self) -> bool { self.is_defined() }
    fn is_null_value(&self) -> bool { self.is_null() }
    fn is_undefined_value(&self) -> bool { self.is_undefined() }
}

impl<T> ElasticLike for Elastic<T> {
    fn seq_len(&self) -> usize { self.len() }
    fn seq_has_null(&self) -> bool { self.has_null() }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
