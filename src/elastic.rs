//! `Elastic<T>`: undefined, null, one value or many values.
//!
//! Models a wire field that may be a scalar, `null` or an array of nullable
//! scalars. Internally this is `Und<Vec<Opt<T>>>`; Null is stored as a
//! defined sequence holding exactly one null element.
//!
//! Encoding always normalizes to the array form (`[null]` for Null, `[v]`
//! for a single value) or `null` for Undefined. Decoding accepts the bare
//! scalar too.
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::option::Opt;
use crate::tristate::Und;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Elastic<T>(Und<Vec<Opt<T>>>);

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTION
// ————————————————————————————————————————————————————————————————————————————

impl<T> Elastic<T> {
    pub const fn undefined() -> Self { Self(Und::Undefined) }

    /// A single null element.
    pub fn null() -> Self { Self(Und::Defined(vec![Opt::none()])) }

    pub fn defined(seq: Vec<Opt<T>>) -> Self { Self(Und::Defined(seq)) }

    pub fn single(v: T) -> Self { Self(Und::Defined(vec![Opt::some(v)])) }

    pub fn multiple(vs: Vec<T>) -> Self {
        Self(Und::Defined(vs.into_iter().map(Opt::some).collect()))
    }

    pub fn from_options<I, O>(options: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<Opt<T>>,
    {
        Self(Und::Defined(options.into_iter().map(Into::into).collect()))
    }

    /// `Und::Null` is stored as the null form.
    pub fn from_und(u: Und<Vec<Opt<T>>>) -> Self {
        match u {
            Und::Null => Self::null(),
            u => Self(u),
        }
    }
}

impl<T> Default for Elastic<T> {
    fn default() -> Self { Self::undefined() }
}

// ————————————————————————————————————————————————————————————————————————————
// CLASSIFICATION
// ————————————————————————————————————————————————————————————————————————————

impl<T> Elastic<T> {
    fn seq(&self) -> &[Opt<T>] {
        match &self.0 {
            Und::Defined(seq) => seq,
            _ => &[],
        }
    }

    pub const fn is_undefined(&self) -> bool { self.0.is_undefined() }

    /// Defined and not the null form.
    pub fn is_defined(&self) -> bool { self.0.is_defined() && !self.is_null() }

    /// Exactly one element, and that element is null.
    pub fn is_null(&self) -> bool {
        matches!(self.seq(), [only] if only.is_none())
    }

    /// Undefined, null, or a sequence whose elements are all null.
    pub fn is_nullish(&self) -> bool { self.seq().iter().all(Opt::is_none) }

    pub fn is_single(&self) -> bool { self.len() == 1 }
    pub fn is_multiple(&self) -> bool { self.len() > 1 }

    pub fn len(&self) -> usize { self.seq().len() }
    pub fn is_empty(&self) -> bool { self.seq().is_empty() }

    pub fn has_null(&self) -> bool { self.seq().iter().any(Opt::is_none) }
}

// ————————————————————————————————————————————————————————————————————————————
// EXTRACTION
// ————————————————————————————————————————————————————————————————————————————

impl<T> Elastic<T> {
    /// First element's value, or `T::default()`.
    pub fn value(&self) -> T
    where
        T: Clone + Default,
    {
        self.seq().first().map(Opt::value).unwrap_or_default()
    }

    pub fn value_single(&self) -> T
    where
        T: Clone + Default,
    {
        self.value()
    }

    /// Every element's value; null elements become `T::default()`.
    pub fn values(&self) -> Vec<T>
    where
        T: Clone + Default,
    {
        self.seq().iter().map(Opt::value).collect()
    }

    pub fn value_multiple(&self) -> Vec<T>
    where
        T: Clone + Default,
    {
        self.values()
    }

    pub fn pointer(&self) -> Option<&T> { self.seq().first().and_then(Opt::pointer) }

    pub fn pointers(&self) -> Vec<Option<&T>> { self.seq().iter().map(Opt::pointer).collect() }

    pub fn into_und(self) -> Und<Vec<Opt<T>>> { self.0 }

    pub fn into_options(self) -> Vec<Opt<T>> {
        match self.0 {
            Und::Defined(seq) => seq,
            _ => Vec::new(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(Und<Vec<Opt<T>>>) -> Und<Vec<Opt<U>>>) -> Elastic<U> {
        Elastic::from_und(f(self.0))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// JSON
// ————————————————————————————————————————————————————————————————————————————

impl<T: Serialize> Serialize for Elastic<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Und::Defined(seq) => seq.serialize(serializer),
            Und::Null | Und::Undefined => serializer.serialize_none(),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Elastic<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        match raw {
            Value::Null => Ok(Self::null()),
            Value::Array(_) => {
                // An array may still be one T when T is itself a sequence.
                // The element index is kept in the message.
                match serde_path_to_error::deserialize::<_, Vec<Opt<T>>>(raw.clone()) {
                    Ok(seq) => Ok(Self::defined(seq)),
                    Err(first) => serde_json::from_value::<T>(raw)
                        .map(Self::single)
                        .map_err(|_| D::Error::custom(first)),
                }
            }
            other => serde_json::from_value::<T>(other)
                .map(Self::single)
                .map_err(D::Error::custom),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_is_a_single_null_element() {
        let e = Elastic::<i32>::null();
        assert!(e.is_null());
        assert!(e.is_single());
        assert!(e.is_nullish());
        assert!(!e.is_defined());
        assert!(!e.is_undefined());
        assert_eq!(e.into_options(), vec![Opt::none()]);
        assert_eq!(Elastic::<i32>::from_options([None::<i32>]), Elastic::null());
    }

    #[test]
    fn und_null_is_stored_as_the_null_form() {
        let e = Elastic::<i32>::from_und(Und::Null);
        assert_eq!(e, Elastic::null());
        assert_eq!(serde_json::to_value(&e).unwrap(), json!([null]));

        let mapped = Elastic::single(1).map(|_| Und::<Vec<Opt<i32>>>::Null);
        assert_eq!(mapped, Elastic::null());
        assert!(mapped.is_null() && !mapped.is_defined());
        assert_eq!(serde_json::to_string(&mapped).unwrap(), "[null]");
    }

    #[test]
    fn classification() {
        let u = Elastic::<i32>::undefined();
        assert!(u.is_undefined() && u.is_nullish() && !u.is_single() && u.is_empty());

        let s = Elastic::single(1);
        assert!(s.is_single() && !s.is_multiple() && !s.is_null() && s.is_defined());

        let m = Elastic::multiple(vec![1, 2]);
        assert!(m.is_multiple() && !m.has_null());

        let holes = Elastic::<i32>::from_options([None::<i32>, None]);
        assert!(holes.is_nullish() && !holes.is_null() && holes.has_null());

        let empty = Elastic::<i32>::defined(vec![]);
        assert!(empty.is_nullish() && empty.is_defined());
    }

    #[test]
    fn extraction() {
        let e = Elastic::<i32>::from_options([None, Some(2), Some(3)]);
        assert_eq!(e.value(), 0);
        assert_eq!(e.values(), vec![0, 2, 3]);
        assert_eq!(e.pointers(), vec![None, Some(&2), Some(&3)]);
        assert_eq!(Elastic::single(5).value_single(), 5);
        assert_eq!(Elastic::single(5).pointer(), Some(&5));
        assert_eq!(Elastic::<i32>::undefined().value_multiple(), Vec::<i32>::new());
    }

    #[test]
    fn encode_always_uses_array_form() {
        assert_eq!(serde_json::to_value(Elastic::<i32>::undefined()).unwrap(), json!(null));
        assert_eq!(serde_json::to_value(Elastic::<i32>::null()).unwrap(), json!([null]));
        assert_eq!(serde_json::to_value(Elastic::single(1)).unwrap(), json!([1]));
        assert_eq!(
            serde_json::to_value(Elastic::<i32>::from_options([Some(1), None])).unwrap(),
            json!([1, null])
        );
    }

    #[test]
    fn decode_is_lenient_about_scalars() {
        let e: Elastic<f64> = serde_json::from_value(json!(123)).unwrap();
        assert_eq!(e, Elastic::single(123.0));
        let e: Elastic<f64> = serde_json::from_value(json!(null)).unwrap();
        assert!(e.is_null());
        let e: Elastic<f64> = serde_json::from_value(json!([1, null])).unwrap();
        assert_eq!(e, Elastic::<f64>::from_options([Some(1.0), None]));
    }

    #[test]
    fn decode_falls_back_to_single_sequence_value() {
        let e: Elastic<Vec<u8>> = serde_json::from_value(json!([1, 2, 3])).unwrap();
        assert_eq!(e, Elastic::single(vec![1, 2, 3]));
        let e: Elastic<u8> = serde_json::from_value(json!([1, 2, 3])).unwrap();
        assert_eq!(e, Elastic::multiple(vec![1, 2, 3]));
        let e: Elastic<Vec<u8>> = serde_json::from_value(json!([[1], null])).unwrap();
        assert_eq!(e, Elastic::<Vec<u8>>::from_options([Some(vec![1]), None]));
    }

    #[test]
    fn decode_reports_array_error_first() {
        let err = serde_json::from_value::<Elastic<u8>>(json!(["x"])).unwrap_err();
        assert!(err.to_string().contains("invalid type"), "{err}");
        let err = serde_json::from_value::<Elastic<u8>>(json!([1, "x"])).unwrap_err();
        assert!(err.to_string().starts_with("[1]: "), "{err}");
        assert!(serde_json::from_value::<Elastic<u8>>(json!("x")).is_err());
    }

    #[test]
    fn round_trip_up_to_array_normalization() {
        for e in [
            Elastic::null(),
            Elastic::single("a".to_string()),
            Elastic::<String>::from_options([Some("a".to_string()), None]),
        ] {
            let back: Elastic<String> =
                serde_json::from_str(&serde_json::to_string(&e).unwrap()).unwrap();
            assert_eq!(back, e);
        }
    }

    #[derive(Debug, serde::Serialize, serde::Deserialize)]
    struct Doc {
        #[serde(rename = "F", default, skip_serializing_if = "Elastic::is_undefined")]
        f: Elastic<f64>,
    }

    #[test]
    fn scalar_field_reencodes_as_array() {
        let d: Doc = serde_json::from_str(r#"{"F":123}"#).unwrap();
        assert_eq!(serde_json::to_string(&d).unwrap(), r#"{"F":[123.0]}"#);
        let d: Doc = serde_json::from_str("{}").unwrap();
        assert_eq!(serde_json::to_string(&d).unwrap(), "{}");
    }
}
