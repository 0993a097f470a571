//! `Und<T>`: undefined, null, or defined.
//!
//! On the wire both Undefined and Null are `null`; a struct field usually
//! omits Undefined altogether:
//!
//! ```
//! use und::Und;
//!
//! #[derive(serde::Serialize, serde::Deserialize)]
//! struct Patch {
//!     #[serde(default, skip_serializing_if = "Und::is_undefined")]
//!     name: Und<String>,
//! }
//!
//! let p: Patch = serde_json::from_str("{}").unwrap();
//! assert!(p.name.is_undefined());
//! let p: Patch = serde_json::from_str(r#"{"name":null}"#).unwrap();
//! assert!(p.name.is_null());
//! ```
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::option::Opt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Und<T> {
    Undefined,
    Null,
    Defined(T),
}

impl<T> Default for Und<T> {
    fn default() -> Self { Self::Undefined }
}

impl<T> Und<T> {
    pub const fn defined(v: T) -> Self { Self::Defined(v) }
    pub const fn null() -> Self { Self::Null }
    pub const fn undefined() -> Self { Self::Undefined }

    /// A missing reference is Undefined.
    pub fn from_pointer(v: Option<&T>) -> Self
    where
        T: Clone,
    {
        match v {
            Some(v) => Self::Defined(v.clone()),
            None => Self::Undefined,
        }
    }

    /// A missing value is Null.
    pub fn from_option(v: Option<T>) -> Self {
        match v {
            Some(v) => Self::Defined(v),
            None => Self::Null,
        }
    }

    /// Outer none is Undefined, inner none is Null.
    pub fn from_opt(v: Opt<Opt<T>>) -> Self {
        match v.into_option() {
            None => Self::Undefined,
            Some(inner) => Self::from_option(inner.into_option()),
        }
    }

    pub fn into_opt(self) -> Opt<Opt<T>> {
        match self {
            Self::Undefined => Opt::none(),
            Self::Null => Opt::some(Opt::none()),
            Self::Defined(v) => Opt::some(Opt::some(v)),
        }
    }

    pub const fn is_defined(&self) -> bool { matches!(self, Self::Defined(_)) }
    pub const fn is_null(&self) -> bool { matches!(self, Self::Null) }
    pub const fn is_undefined(&self) -> bool { matches!(self, Self::Undefined) }

    pub fn value(&self) -> T
    where
        T: Clone + Default,
    {
        match self {
            Self::Defined(v) => v.clone(),
            _ => T::default(),
        }
    }

    pub fn into_value(self) -> T
    where
        T: Default,
    {
        match self {
            Self::Defined(v) => v,
            _ => T::default(),
        }
    }

    pub const fn pointer(&self) -> Option<&T> {
        match self {
            Self::Defined(v) => Some(v),
            _ => None,
        }
    }

    /// Maps a defined value; Null and Undefined are kept.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Und<U> {
        match self {
            Self::Undefined => Und::Undefined,
            Self::Null => Und::Null,
            Self::Defined(v) => Und::Defined(f(v)),
        }
    }

    /// Replaces the whole `Opt<Opt<T>>` representation, so any state may
    /// become any other.
    pub fn map_opt<U>(self, f: impl FnOnce(Opt<Opt<T>>) -> Opt<Opt<U>>) -> Und<U> {
        Und::from_opt(f(self.into_opt()))
    }
}

impl<T: Serialize> Serialize for Und<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Defined(v) => serializer.serialize_some(v),
            Self::Null | Self::Undefined => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Und<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from_option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn states<T>(u: &Und<T>) -> [bool; 3] {
        [u.is_defined(), u.is_null(), u.is_undefined()]
    }

    #[test]
    fn states_are_exclusive_and_exhaustive() {
        let cases = [
            Und::defined(1),
            Und::null(),
            Und::undefined(),
            Und::from_option(None),
            Und::from_pointer(Some(&3)),
            Und::from_pointer(None),
            Und::from_opt(Opt::some(Opt::some(4))),
            Und::from_opt(Opt::some(Opt::none())),
            Und::from_opt(Opt::none()),
            Und::default(),
        ];
        for u in &cases {
            let set = states(u).iter().filter(|b| **b).count();
            assert_eq!(set, 1, "{u:?}");
        }
    }

    #[test]
    fn opt_representation_round_trips() {
        for u in [Und::defined("a"), Und::null(), Und::undefined()] {
            assert_eq!(Und::from_opt(u.into_opt()), u);
        }
        assert_eq!(Und::<i32>::null().into_opt(), Opt::some(Opt::<i32>::none()));
    }

    #[test]
    fn equality_across_states() {
        assert_ne!(Und::<i32>::null(), Und::undefined());
        assert_ne!(Und::defined(0), Und::null());
        assert_eq!(Und::defined(vec![1, 2]), Und::defined(vec![1, 2]));
        assert_ne!(Und::defined(vec![1]), Und::defined(vec![2]));
    }

    #[test]
    fn value_map_and_map_opt() {
        assert_eq!(Und::<i32>::null().value(), 0);
        assert_eq!(Und::defined(2).map(|x| x + 1), Und::defined(3));
        assert_eq!(Und::<i32>::null().map(|x| x + 1), Und::null());
        let promoted = Und::<i32>::undefined().map_opt(|_| Opt::some(Opt::some(9)));
        assert_eq!(promoted, Und::defined(9));
        let demoted = Und::defined(1).map_opt(|_: Opt<Opt<i32>>| Opt::some(Opt::<i32>::none()));
        assert!(demoted.is_null());
    }

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Doc {
        #[serde(default, skip_serializing_if = "Und::is_undefined")]
        f: Und<i32>,
    }

    #[test]
    fn json_round_trip() {
        for (input, expect) in [
            (json!({}), Und::undefined()),
            (json!({"f": null}), Und::null()),
            (json!({"f": 3}), Und::defined(3)),
        ] {
            let d: Doc = serde_json::from_value(input.clone()).unwrap();
            assert_eq!(d.f, expect);
            assert_eq!(serde_json::to_value(&d).unwrap(), input);
        }
    }
}
