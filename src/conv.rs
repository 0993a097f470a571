//! Conversion primitives called by generated `into_plain` / `into_rich`
//! bodies.
//!
//! Every rich field is first brought to `Und<_>` (kind adapters), its value
//! is pushed through the element steps, and the result is wrapped into the
//! plain shape (state wraps). The `into_rich` direction uses the inverse of
//! each function in reverse order.
use serde::{Deserialize, Deserializer, Serialize};

use crate::elastic::Elastic;
use crate::option::Opt;
use crate::tristate::Und;

/// Marker for "this field was nullish" in a plain struct. Which nullish
/// state it was is not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Nullish;

// ————————————————————————————————————————————————————————————————————————————
// KIND ADAPTERS
// ————————————————————————————————————————————————————————————————————————————

/// Option-like kinds: some is Defined, none is Null.
pub fn option_to_und<T>(o: impl Into<Option<T>>) -> Und<T> { Und::from_option(o.into()) }

pub fn und_to_option<T>(u: Und<T>) -> Option<T> {
    match u {
        Und::Defined(v) => Some(v),
        Und::Null | Und::Undefined => None,
    }
}

/// The elastic null form becomes `Und::Null`.
pub fn elastic_to_und<T>(e: Elastic<T>) -> Und<Vec<Option<T>>> {
    if e.is_undefined() {
        Und::Undefined
    } else if e.is_null() {
        Und::Null
    } else {
        Und::Defined(e.into_options().into_iter().map(Opt::into_option).collect())
    }
}

pub fn und_to_elastic<T>(u: Und<Vec<Option<T>>>) -> Elastic<T> {
    match u {
        Und::Undefined => Elastic::undefined(),
        Und::Null => Elastic::null(),
        Und::Defined(seq) => Elastic::from_options(seq),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// STATE WRAPS
// ————————————————————————————————————————————————————————————————————————————

/// Defined only: the value, or the default when the rich value was not
/// defined.
pub fn unwrap_defined<T: Default>(u: Und<T>) -> T { u.into_value() }

pub fn from_defined<T>(v: T) -> Und<T> { Und::Defined(v) }

/// Exactly one nullish state allowed: nothing to keep but the marker.
pub fn to_marker<T>(_u: Und<T>) -> Nullish { Nullish }

pub fn from_marker<T>(_m: Nullish, null: bool) -> Und<T> {
    if null { Und::Null } else { Und::Undefined }
}

/// Null and Undefined both allowed: the marker's presence tells them apart.
pub fn to_nullish_option<T>(u: Und<T>) -> Option<Nullish> {
    match u {
        Und::Null => Some(Nullish),
        Und::Undefined | Und::Defined(_) => None,
    }
}

/// `deserialize_with` for `Option<Nullish>` fields: a present key is the
/// marker even though its value is `null`.
pub fn deserialize_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Nullish>, D::Error> {
    Nullish::deserialize(deserializer).map(Some)
}

pub fn from_nullish_option<T>(o: Option<Nullish>) -> Und<T> {
    match o {
        Some(Nullish) => Und::Null,
        None => Und::Undefined,
    }
}

/// Defined plus one nullish state.
pub fn to_option<T>(u: Und<T>) -> Option<T> { und_to_option(u) }

/// `null` says which nullish state a missing value came from.
pub fn from_option<T>(o: Option<T>, null: bool) -> Und<T> {
    match o {
        Some(v) => Und::Defined(v),
        None if null => Und::Null,
        None => Und::Undefined,
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ELEMENT STEPS
// ————————————————————————————————————————————————————————————————————————————

/// Pads with `None` or truncates to exactly `N` slots.
pub fn fixed_len<T, const N: usize>(v: Vec<Option<T>>) -> [Option<T>; N] {
    let mut it = v.into_iter();
    std::array::from_fn(|_| it.next().flatten())
}

pub fn to_dyn<T, const N: usize>(v: [T; N]) -> Vec<T> { Vec::from(v) }

/// Pads with `None` to at least `n` elements. Never truncates.
pub fn pad_min<T>(mut v: Vec<Option<T>>, n: usize) -> Vec<Option<T>> {
    if v.len() < n {
        v.resize_with(n, || None);
    }
    v
}

/// Truncates to at most `n` elements. Never pads.
pub fn truncate_max<T>(mut v: Vec<Option<T>>, n: usize) -> Vec<Option<T>> {
    v.truncate(n);
    v
}

/// Null elements become `T::default()`.
pub fn nonnull<T: Default>(v: Vec<Option<T>>) -> Vec<T> {
    v.into_iter().map(Option::unwrap_or_default).collect()
}

pub fn nonnull_array<T: Default, const N: usize>(v: [Option<T>; N]) -> [T; N] {
    v.map(Option::unwrap_or_default)
}

pub fn wrap_some<T>(v: Vec<T>) -> Vec<Option<T>> { v.into_iter().map(Some).collect() }

pub fn wrap_some_array<T, const N: usize>(v: [T; N]) -> [Option<T>; N] { v.map(Some) }

pub fn single<T>(v: [T; 1]) -> T {
    let [x] = v;
    x
}

pub fn unsingle<T>(v: T) -> [T; 1] { [v] }

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
