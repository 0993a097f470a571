use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// `len` followed by an operator and a non-negative integer, nothing else.
static LEN_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^len(==|>=|<=|<|>)([0-9]+)$").expect("static pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LenOp {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LenConstraint {
    pub op: LenOp,
    pub len: usize,
}

impl LenOp {
    fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "==" => Some(Self::Eq),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            _ => None,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

impl LenConstraint {
    /// `len` alone or followed by an operator character. Such a token is a
    /// len part, well-formed or not.
    pub(super) fn claims(token: &str) -> bool {
        token
            .strip_prefix("len")
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(['=', '<', '>']))
    }

    /// `None` if `token` is not a well-formed len token.
    pub(super) fn parse_token(token: &str) -> Option<Self> {
        let caps = LEN_TOKEN.captures(token)?;
        let op = LenOp::from_symbol(caps.get(1)?.as_str())?;
        let len = caps.get(2)?.as_str().parse().ok()?;
        Some(Self { op, len })
    }

    pub const fn valid_len(&self, actual: usize) -> bool {
        match self.op {
            LenOp::Eq => actual == self.len,
            LenOp::Gt => actual > self.len,
            LenOp::Ge => actual >= self.len,
            LenOp::Lt => actual < self.len,
            LenOp::Le => actual <= self.len,
        }
    }

    /// The fixed length, when the operator is `==`.
    pub const fn exact(&self) -> Option<usize> {
        match self.op {
            LenOp::Eq => Some(self.len),
            _ => None,
        }
    }
}

impl fmt::Display for LenConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "len{}{}", self.op.symbol(), self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_operator() {
        for (tok, op, len) in [
            ("len==2", LenOp::Eq, 2),
            ("len>0", LenOp::Gt, 0),
            ("len>=3", LenOp::Ge, 3),
            ("len<10", LenOp::Lt, 10),
            ("len<=1", LenOp::Le, 1),
        ] {
            let c = LenConstraint::parse_token(tok).unwrap();
            assert_eq!(c, LenConstraint { op, len });
            assert_eq!(c.to_string(), tok);
        }
    }

    #[test]
    fn rejects_malformed() {
        for tok in ["len", "len==", "len=2", "len==-1", "len>>2", "len==2x", "len 2", "lenient"] {
            assert!(LenConstraint::parse_token(tok).is_none(), "{tok}");
        }
    }

    #[test]
    fn claims_only_operator_tokens() {
        for tok in ["len", "len==2", "len=>2", "len<", "len>=x"] {
            assert!(LenConstraint::claims(tok), "{tok}");
        }
        for tok in ["lenient", "length", "len 2", "values:nonnull", "le"] {
            assert!(!LenConstraint::claims(tok), "{tok}");
        }
    }

    #[test]
    fn valid_len() {
        let gt1 = LenConstraint { op: LenOp::Gt, len: 1 };
        assert!(gt1.valid_len(2));
        assert!(!gt1.valid_len(1));
        let le2 = LenConstraint { op: LenOp::Le, len: 2 };
        assert!(le2.valid_len(0) && le2.valid_len(2) && !le2.valid_len(3));
    }
}
