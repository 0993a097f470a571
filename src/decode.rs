//! JSON decoding with the failing path attached to the error.
//!
//! `Elastic` buffers its value before choosing between the array and the
//! scalar form, so the path stops at the `Elastic` field. The element index
//! is part of the message instead (`inner.values` → `[1]: invalid type..`).
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
#[error("at JSON path {path} → {source}")]
pub struct DecodeError {
    pub path: String,
    #[source]
    pub source: serde_json::Error,
}

impl DecodeError {
    fn from_path_error(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();
        Self { path, source: err.into_inner() }
    }
}

pub fn from_str<T: DeserializeOwned>(src: &str) -> Result<T, DecodeError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(DecodeError::from_path_error)
}

pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(DecodeError::from_path_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Elastic, Und};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Outer {
        #[serde(default)]
        inner: Und<Inner>,
    }

    #[derive(Debug, Deserialize)]
    struct Inner {
        #[serde(default)]
        values: Elastic<u8>,
    }

    #[test]
    fn error_carries_path() {
        let err = from_str::<Outer>(r#"{"inner":{"values":[1,"x"]}}"#).unwrap_err();
        assert_eq!(err.path, "inner.values");
        assert!(err.source.to_string().starts_with("[1]: invalid type"), "{err}");
        assert!(err.to_string().starts_with("at JSON path inner.values → [1]"), "{err}");
    }

    #[test]
    fn decodes_tri_states() {
        let v: Outer = from_slice(br#"{"inner":null}"#).unwrap();
        assert!(v.inner.is_null());
        let v: Outer = from_str("{}").unwrap();
        assert!(v.inner.is_undefined());
        let v: Outer = from_str(r#"{"inner":{"values":3}}"#).unwrap();
        assert_eq!(v.inner.pointer().map(|i| i.values.len()), Some(1));
    }
}
