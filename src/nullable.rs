//! `Nullable<T>`: an [`Opt`] spelled as null / non-null.
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::option::Opt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nullable<T>(Opt<T>);

impl<T> Nullable<T> {
    pub const fn null() -> Self { Self(Opt::none()) }
    pub const fn non_null(v: T) -> Self { Self(Opt::some(v)) }

    pub const fn is_null(&self) -> bool { self.0.is_none() }
    pub const fn is_non_null(&self) -> bool { self.0.is_some() }

    pub fn value(&self) -> T
    where
        T: Clone + Default,
    {
        self.0.value()
    }

    pub const fn pointer(&self) -> Option<&T> { self.0.pointer() }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Nullable<U> { Nullable(self.0.map(f)) }

    pub fn into_opt(self) -> Opt<T> { self.0 }
}

impl<T> Default for Nullable<T> {
    fn default() -> Self { Self::null() }
}

impl<T> From<Opt<T>> for Nullable<T> {
    fn from(o: Opt<T>) -> Self { Self(o) }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(o: Option<T>) -> Self { Self(o.into()) }
}

impl<T> From<Nullable<T>> for Option<T> {
    fn from(n: Nullable<T>) -> Self { n.0.into_option() }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Opt::<T>::deserialize(deserializer).map(Self)
    }
}
