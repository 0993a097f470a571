use std::fmt;

/// Which of Defined / Null / Undefined a field may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateConstraint {
    pub def: bool,
    pub null: bool,
    pub und: bool,
}

/// One state token as written in a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StateToken {
    Required,
    Nullish,
    Def,
    Null,
    Und,
}

impl StateToken {
    pub(super) fn from_token(s: &str) -> Option<Self> {
        match s {
            "required" => Some(Self::Required),
            "nullish" => Some(Self::Nullish),
            "def" => Some(Self::Def),
            "null" => Some(Self::Null),
            "und" => Some(Self::Und),
            _ => None,
        }
    }

    const fn is_shorthand(self) -> bool { matches!(self, Self::Required | Self::Nullish) }
}

impl StateConstraint {
    pub const REQUIRED: Self = Self { def: true, null: false, und: false };
    pub const NULLISH: Self = Self { def: false, null: true, und: true };
    pub const ALL: Self = Self { def: true, null: true, und: true };

    pub const fn allows_all(&self) -> bool { self.def && self.null && self.und }
    pub const fn allows_none(&self) -> bool { !self.def && !self.null && !self.und }
    pub const fn allows_nullish(&self) -> bool { self.null || self.und }

    /// Overlay one token. `None` when the token clashes with what is set:
    /// a bit set twice, or a shorthand mixed with anything else.
    pub(super) fn overlay(self, tok: StateToken, had_shorthand: bool) -> Option<Self> {
        let empty = self.allows_none();
        if had_shorthand || (tok.is_shorthand() && !empty) {
            return None;
        }
        let mut next = self;
        match tok {
            StateToken::Required => next = Self::REQUIRED,
            StateToken::Nullish => next = Self::NULLISH,
            StateToken::Def if !self.def => next.def = true,
            StateToken::Null if !self.null => next.null = true,
            StateToken::Und if !self.und => next.und = true,
            _ => return None,
        }
        Some(next)
    }
}

impl fmt::Display for StateConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::REQUIRED {
            return f.write_str("required");
        }
        if *self == Self::NULLISH {
            return f.write_str("nullish");
        }
        let parts = [(self.def, "def"), (self.null, "null"), (self.und, "und")];
        let words: Vec<&str> = parts.iter().filter(|(on, _)| *on).map(|(_, w)| *w).collect();
        f.write_str(&words.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_rejects_repeats_and_mixed_shorthand() {
        let s = StateConstraint::default();
        let s = s.overlay(StateToken::Def, false).unwrap();
        assert!(s.overlay(StateToken::Def, false).is_none());
        assert!(s.overlay(StateToken::Required, false).is_none());
        assert!(StateConstraint::REQUIRED.overlay(StateToken::Null, true).is_none());
        assert_eq!(s.overlay(StateToken::Und, false), Some(StateConstraint { def: true, null: false, und: true }));
    }

    #[test]
    fn display_prefers_shorthand() {
        assert_eq!(StateConstraint::REQUIRED.to_string(), "required");
        assert_eq!(StateConstraint::NULLISH.to_string(), "nullish");
        assert_eq!(StateConstraint { def: true, null: true, und: false }.to_string(), "def,null");
        assert_eq!(StateConstraint::ALL.to_string(), "def,null,und");
    }
}
