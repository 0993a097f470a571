use std::fmt;

/// Constraint on the elements of an elastic sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValuesConstraint {
    pub nonnull: bool,
}

impl ValuesConstraint {
    pub(super) const PREFIX: &'static str = "values:";

    /// `token` without the `values:` prefix.
    pub(super) fn parse_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "nonnull" => Some(Self { nonnull: true }),
            _ => None,
        }
    }

    pub const fn valid(&self, has_null: bool) -> bool { !(self.nonnull && has_null) }
}

impl fmt::Display for ValuesConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nonnull {
            write!(f, "{}nonnull", Self::PREFIX)?;
        }
        Ok(())
    }
}
