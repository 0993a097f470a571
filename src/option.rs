//! Two-state container: a value or nothing.
//!
//! `Opt<T>` is a thin newtype over [`core::option::Option`] that gives the
//! rest of the crate a uniform vocabulary (`value`, `pointer`, ...) and a
//! JSON shape of its own: none ↔ `null`, some ↔ `<T>`.
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Opt<T>(Option<T>);

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl<T> Opt<T> {
    pub const fn some(v: T) -> Self { Self(Some(v)) }
    pub const fn none() -> Self { Self(None) }

    pub const fn is_some(&self) -> bool { self.0.is_some() }
    pub const fn is_none(&self) -> bool { self.0.is_none() }

    /// The held value, or `T::default()` when absent. Never fails.
    pub fn value(&self) -> T
    where
        T: Clone + Default,
    {
        self.0.clone().unwrap_or_default()
    }

    pub fn into_value(self) -> T
    where
        T: Default,
    {
        self.0.unwrap_or_default()
    }

    /// `None` when absent.
    pub const fn pointer(&self) -> Option<&T> { self.0.as_ref() }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Opt<U> { Opt(self.0.map(f)) }

    pub fn into_option(self) -> Option<T> { self.0 }
}

impl<T> Default for Opt<T> {
    fn default() -> Self { Self::none() }
}

impl<T> From<Option<T>> for Opt<T> {
    fn from(o: Option<T>) -> Self { Self(o) }
}

impl<T> From<Opt<T>> for Option<T> {
    fn from(o: Opt<T>) -> Self { o.0 }
}

impl<T: Serialize> Serialize for Opt<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Some(v) => serializer.serialize_some(v),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Opt<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
