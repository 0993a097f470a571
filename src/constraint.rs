//! The `und` constraint tag.
//!
//! A tag is a comma separated list of tokens:
//!
//! ```text
//! tag          := token (',' token)*
//! token        := state-token | len-token | values-token
//! state-token  := "required" | "nullish" | "def" | "null" | "und"
//! len-token    := "len" op uint
//! op           := "==" | ">=" | "<=" | "<" | ">"
//! values-token := "values:nonnull"
//! ```
//!
//! Token order does not matter. Repeating a part, or mixing `required` /
//! `nullish` with any other state token, is an error.
pub mod len;
pub mod state;
pub mod values;

use std::fmt;
use std::str::FromStr;

pub use len::{LenConstraint, LenOp};
pub use state::StateConstraint;
pub use values::ValuesConstraint;

use state::StateToken;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("multiple option: {0:?} conflicts with an earlier option")]
    MultipleOption(String),
    #[error("unknown option: {0:?}")]
    UnknownOption(String),
    #[error("malformed len: {0:?}")]
    MalformedLen(String),
    #[error("malformed values: {0:?}")]
    MalformedValues(String),
}

/// Parsed tag. Every part is optional and independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Constraint {
    pub state: Option<StateConstraint>,
    pub len: Option<LenConstraint>,
    pub values: Option<ValuesConstraint>,
}

// ————————————————————————————————————————————————————————————————————————————
// PARSING
// ————————————————————————————————————————————————————————————————————————————

impl Constraint {
    pub fn parse(tag: &str) -> Result<Self, TagError> {
        let mut out = Self::default();
        if tag.trim().is_empty() {
            return Ok(out);
        }
        let mut had_shorthand = false;

        for raw in tag.split(',') {
            let token = raw.trim();

            if let Some(tok) = StateToken::from_token(token) {
                let current = out.state.unwrap_or_default();
                let next = current
                    .overlay(tok, had_shorthand)
                    .ok_or_else(|| TagError::MultipleOption(token.to_string()))?;
                had_shorthand |= matches!(tok, StateToken::Required | StateToken::Nullish);
                out.state = Some(next);
            } else if LenConstraint::claims(token) {
                let parsed = LenConstraint::parse_token(token)
                    .ok_or_else(|| TagError::MalformedLen(token.to_string()))?;
                if out.len.replace(parsed).is_some() {
                    return Err(TagError::MultipleOption(token.to_string()));
                }
            } else if let Some(suffix) = token.strip_prefix(ValuesConstraint::PREFIX) {
                let parsed = ValuesConstraint::parse_suffix(suffix)
                    .ok_or_else(|| TagError::MalformedValues(token.to_string()))?;
                if out.values.replace(parsed).is_some() {
                    return Err(TagError::MultipleOption(token.to_string()));
                }
            } else {
                return Err(TagError::UnknownOption(token.to_string()));
            }
        }
        Ok(out)
    }

    pub const fn is_empty(&self) -> bool {
        self.state.is_none() && self.len.is_none() && self.values.is_none()
    }

    /// The states that actually apply: an absent state part allows all
    /// three, and `len==n` always allows Defined.
    pub fn effective_state(&self) -> StateConstraint {
        let mut s = self.state.unwrap_or(StateConstraint::ALL);
        if self.len.is_some_and(|l| l.exact().is_some()) {
            s.def = true;
        }
        s
    }

    pub const fn requires_nonnull(&self) -> bool {
        matches!(self.values, Some(ValuesConstraint { nonnull: true }))
    }
}

impl FromStr for Constraint {
    type Err = TagError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

/// Canonical tag form: state, then len, then values.
impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::<String>::new();
        if let Some(s) = self.state {
            parts.push(s.to_string());
        }
        if let Some(l) = self.len {
            parts.push(l.to_string());
        }
        if let Some(v) = self.values {
            parts.push(v.to_string());
        }
        f.write_str(&parts.join(","))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
