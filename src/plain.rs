//! Choosing the plain form of a tagged field.
//!
//! [`select`] maps (container kind, constraint) to a [`Conversion`]: the
//! ordered element steps plus a state wrap. The conversion knows its plain
//! type and renders the forward (rich → plain) and backward (plain → rich)
//! expressions as calls into [`crate::conv`].
//!
//! Element steps, applied outward from `Vec<Option<T>>` (Elastic only):
//!
//! 1. `len==n` fixes the sequence to `[Option<T>; n]`; `len>n` / `len>=n`
//!    pad to a lower bound; `len<n` / `len<=n` truncate to an upper bound.
//! 2. `values:nonnull` unwraps every element.
//! 3. `len==1` collapses the one-slot array to its element.
//!
//! The state wrap then decides how Defined / Null / Undefined survive.
pub mod ty;

use std::fmt;

use proc_macro2::TokenStream;
use quote::quote;

use crate::constraint::{Constraint, LenOp};

pub use ty::PlainTy;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Rich container kinds the generator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Option,
    Und,
    Elastic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FixedLen(usize),
    PadMin(usize),
    TruncateMax(usize),
    NonNull { fixed: bool },
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateWrap {
    /// All three states allowed: keep `Und<V>`.
    Und,
    /// Defined only: the bare value.
    Value,
    /// A single nullish state: a marker. `null` picks which one comes back.
    Marker { null: bool },
    /// Null and Undefined, no Defined: `Option<Nullish>`.
    NullishOption,
    /// Defined plus one nullish state: `Option<V>`.
    Option { null: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub kind: Kind,
    pub steps: Vec<Step>,
    pub wrap: StateWrap,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("len and values constraints apply to Elastic fields only, not {0}")]
    NotElastic(Kind),
}

// ————————————————————————————————————————————————————————————————————————————
// SELECTION
// ————————————————————————————————————————————————————————————————————————————

/// `Ok(None)` when the field stays as it is: nothing would be gained, or
/// the constraint admits no state at all.
pub fn select(kind: Kind, c: &Constraint) -> Result<Option<Conversion>, SelectError> {
    let refined = c.len.is_some() || c.values.is_some();
    if refined && kind != Kind::Elastic {
        return Err(SelectError::NotElastic(kind));
    }

    let s = c.effective_state();
    if s.allows_none() {
        return Ok(None);
    }

    let wrap = match kind {
        Kind::Option => {
            // Option cannot keep Null apart from Undefined.
            if s.def && s.allows_nullish() {
                return Ok(None);
            }
            if s.def { StateWrap::Value } else { StateWrap::Marker { null: false } }
        }
        Kind::Und | Kind::Elastic => {
            if s.allows_all() && !refined {
                return Ok(None);
            }
            match (s.def, s.null, s.und) {
                (true, true, true) => StateWrap::Und,
                (true, false, false) => StateWrap::Value,
                (false, true, false) => StateWrap::Marker { null: true },
                (false, false, _) => StateWrap::Marker { null: false },
                (false, true, true) => StateWrap::NullishOption,
                (true, true, false) => StateWrap::Option { null: true },
                (true, false, true) => StateWrap::Option { null: false },
            }
        }
    };

    let steps = if kind == Kind::Elastic && wrap.carries_value() {
        element_steps(c)
    } else {
        Vec::new()
    };
    Ok(Some(Conversion { kind, steps, wrap }))
}

fn element_steps(c: &Constraint) -> Vec<Step> {
    let mut steps = Vec::new();
    let mut fixed = None;
    if let Some(len) = c.len {
        let n = len.len;
        steps.push(match len.op {
            LenOp::Eq => {
                fixed = Some(n);
                Step::FixedLen(n)
            }
            LenOp::Gt => Step::PadMin(n.saturating_add(1)),
            LenOp::Ge => Step::PadMin(n),
            LenOp::Lt => Step::TruncateMax(n.saturating_sub(1)),
            LenOp::Le => Step::TruncateMax(n),
        });
    }
    if c.requires_nonnull() {
        steps.push(Step::NonNull { fixed: fixed.is_some() });
    }
    if fixed == Some(1) {
        steps.push(Step::Single);
    }
    steps
}

// ————————————————————————————————————————————————————————————————————————————
// STEPS & WRAPS
// ————————————————————————————————————————————————————————————————————————————

impl Step {
    fn apply_ty(self, ty: PlainTy) -> PlainTy {
        match (self, ty) {
            (Self::FixedLen(n), PlainTy::Vec(inner)) => PlainTy::Array(inner, n),
            (Self::NonNull { .. }, PlainTy::Vec(inner)) => PlainTy::vec(unwrap_option_ty(*inner)),
            (Self::NonNull { .. }, PlainTy::Array(inner, n)) => {
                PlainTy::Array(Box::new(unwrap_option_ty(*inner)), n)
            }
            (Self::Single, PlainTy::Array(inner, 1)) => *inner,
            (_, ty) => ty,
        }
    }

    /// The two bound steps have no inverse: the plain side just goes back
    /// to being a dynamic sequence.
    pub const fn invertible(self) -> bool { !matches!(self, Self::PadMin(_) | Self::TruncateMax(_)) }

    fn forward(self, v: TokenStream) -> TokenStream {
        match self {
            Self::FixedLen(n) => quote!(::und::conv::fixed_len::<_, #n>(#v)),
            Self::PadMin(n) => quote!(::und::conv::pad_min(#v, #n)),
            Self::TruncateMax(n) => quote!(::und::conv::truncate_max(#v, #n)),
            Self::NonNull { fixed: false } => quote!(::und::conv::nonnull(#v)),
            Self::NonNull { fixed: true } => quote!(::und::conv::nonnull_array(#v)),
            Self::Single => quote!(::und::conv::single(#v)),
        }
    }

    fn backward(self, v: TokenStream) -> TokenStream {
        match self {
            Self::FixedLen(_) => quote!(::und::conv::to_dyn(#v)),
            Self::PadMin(_) | Self::TruncateMax(_) => v,
            Self::NonNull { fixed: false } => quote!(::und::conv::wrap_some(#v)),
            Self::NonNull { fixed: true } => quote!(::und::conv::wrap_some_array(#v)),
            Self::Single => quote!(::und::conv::unsingle(#v)),
        }
    }
}

fn unwrap_option_ty(ty: PlainTy) -> PlainTy {
    match ty {
        PlainTy::Option(inner) => *inner,
        other => other,
    }
}

impl StateWrap {
    pub const fn carries_value(self) -> bool {
        matches!(self, Self::Und | Self::Value | Self::Option { .. })
    }

    fn apply_ty(self, v: PlainTy) -> PlainTy {
        match self {
            Self::Und => PlainTy::und(v),
            Self::Value => v,
            Self::Marker { .. } => PlainTy::Nullish,
            Self::NullishOption => PlainTy::option(PlainTy::Nullish),
            Self::Option { .. } => PlainTy::option(v),
        }
    }

    fn forward(self, u: TokenStream) -> TokenStream {
        match self {
            Self::Und => u,
            Self::Value => quote!(::und::conv::unwrap_defined(#u)),
            Self::Marker { .. } => quote!(::und::conv::to_marker(#u)),
            Self::NullishOption => quote!(::und::conv::to_nullish_option(#u)),
            Self::Option { .. } => quote!(::und::conv::to_option(#u)),
        }
    }

    fn backward(self, p: TokenStream) -> TokenStream {
        match self {
            Self::Und => p,
            Self::Value => quote!(::und::conv::from_defined(#p)),
            Self::Marker { null } => quote!(::und::conv::from_marker(#p, #null)),
            Self::NullishOption => quote!(::und::conv::from_nullish_option(#p)),
            Self::Option { null } => quote!(::und::conv::from_option(#p, #null)),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CONVERSION
// ————————————————————————————————————————————————————————————————————————————

impl Conversion {
    /// The value type carried inside the state wrap.
    fn value_ty(&self) -> PlainTy {
        match self.kind {
            Kind::Option | Kind::Und => PlainTy::Elem,
            Kind::Elastic => self
                .steps
                .iter()
                .fold(PlainTy::vec(PlainTy::option(PlainTy::Elem)), |ty, s| s.apply_ty(ty)),
        }
    }

    pub fn plain_ty(&self) -> PlainTy { self.wrap.apply_ty(self.value_ty()) }

    /// Rich → plain. `src` is the rich field expression, `elem` its `T`.
    pub fn forward(&self, src: TokenStream, elem: &TokenStream) -> TokenStream {
        let und = match self.kind {
            Kind::Option => quote!(::und::conv::option_to_und::<#elem>(#src)),
            Kind::Und => src,
            Kind::Elastic => quote!(::und::conv::elastic_to_und(#src)),
        };
        // A Defined-only value is unwrapped before the steps: a `Vec` always
        // has a default, a fixed-size array of any length does not.
        if self.wrap == StateWrap::Value {
            return self.steps.iter().fold(self.wrap.forward(und), |acc, s| s.forward(acc));
        }
        let mapped = if self.steps.is_empty() {
            und
        } else {
            let body = self.steps.iter().fold(quote!(v), |acc, s| s.forward(acc));
            quote!(#und.map(|v| #body))
        };
        self.wrap.forward(mapped)
    }

    /// Plain → rich, the inverse composition in reverse order.
    pub fn backward(&self, src: TokenStream, elem: &TokenStream) -> TokenStream {
        let inverse: Vec<Step> = self.steps.iter().rev().copied().filter(|s| s.invertible()).collect();
        let mapped = if self.wrap == StateWrap::Value {
            self.wrap.backward(inverse.iter().fold(src, |acc, s| s.backward(acc)))
        } else if inverse.is_empty() {
            self.wrap.backward(src)
        } else {
            let und = self.wrap.backward(src);
            let body = inverse.iter().fold(quote!(v), |acc, s| s.backward(acc));
            quote!(#und.map(|v| #body))
        };
        match self.kind {
            Kind::Option => quote!(::core::convert::Into::into(::und::conv::und_to_option::<#elem>(#mapped))),
            Kind::Und => mapped,
            Kind::Elastic => quote!(::und::conv::und_to_elastic(#mapped)),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Option => "Option",
            Self::Und => "Und",
            Self::Elastic => "Elastic",
        })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedLen(n) => write!(f, "fixed_len({n})"),
            Self::PadMin(n) => write!(f, "pad_min({n})"),
            Self::TruncateMax(n) => write!(f, "truncate_max({n})"),
            Self::NonNull { .. } => f.write_str("nonnull"),
            Self::Single => f.write_str("single"),
        }
    }
}

impl fmt::Display for StateWrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Und => f.write_str("und"),
            Self::Value => f.write_str("value"),
            Self::Marker { null: true } => f.write_str("marker(null)"),
            Self::Marker { null: false } => f.write_str("marker(und)"),
            Self::NullishOption => f.write_str("nullish_option"),
            Self::Option { null: true } => f.write_str("option(null)"),
            Self::Option { null: false } => f.write_str("option(und)"),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::StateConstraint;

    fn pick(kind: Kind, tag: &str) -> Option<Conversion> {
        select(kind, &Constraint::parse(tag).unwrap()).unwrap()
    }

    fn plain(kind: Kind, tag: &str) -> Option<String> {
        pick(kind, tag).map(|c| c.plain_ty().render("T"))
    }

    #[test]
    fn unchanged_when_nothing_is_gained() {
        assert_eq!(plain(Kind::Und, ""), None);
        assert_eq!(plain(Kind::Und, "def,null,und"), None);
        assert_eq!(plain(Kind::Elastic, "def,null,und"), None);
        assert_eq!(plain(Kind::Option, "def,null"), None);
        assert_eq!(plain(Kind::Option, ""), None);
    }

    #[test]
    fn declines_an_empty_state_set() {
        let c = Constraint {
            state: Some(StateConstraint { def: false, null: false, und: false }),
            ..Constraint::default()
        };
        assert_eq!(select(Kind::Und, &c), Ok(None));
    }

    #[test]
    fn option_kind() {
        assert_eq!(plain(Kind::Option, "required").as_deref(), Some("T"));
        assert_eq!(plain(Kind::Option, "nullish").as_deref(), Some("Nullish"));
        assert_eq!(plain(Kind::Option, "null").as_deref(), Some("Nullish"));
        assert_eq!(
            select(Kind::Option, &Constraint::parse("required,len==1").unwrap()),
            Err(SelectError::NotElastic(Kind::Option))
        );
    }

    #[test]
    fn und_state_table() {
        for (tag, expect) in [
            ("required", "T"),
            ("def", "T"),
            ("null", "Nullish"),
            ("und", "Nullish"),
            ("nullish", "Option<Nullish>"),
            ("def,null", "Option<T>"),
            ("def,und", "Option<T>"),
        ] {
            assert_eq!(plain(Kind::Und, tag).as_deref(), Some(expect), "{tag}");
        }
        assert_eq!(pick(Kind::Und, "null").unwrap().wrap, StateWrap::Marker { null: true });
        assert_eq!(pick(Kind::Und, "und").unwrap().wrap, StateWrap::Marker { null: false });
        assert_eq!(pick(Kind::Und, "def,null").unwrap().wrap, StateWrap::Option { null: true });
        assert_eq!(pick(Kind::Und, "def,und").unwrap().wrap, StateWrap::Option { null: false });
    }

    #[test]
    fn elastic_pipeline_types() {
        for (tag, expect) in [
            ("def,null", "Option<Vec<Option<T>>>"),
            ("required,len==2", "[Option<T>; 2]"),
            ("required,len==2,values:nonnull", "[T; 2]"),
            ("required,len==1", "Option<T>"),
            ("required,len==1,values:nonnull", "T"),
            ("def,und,len==1", "Option<Option<T>>"),
            ("len>2", "Und<Vec<Option<T>>>"),
            ("values:nonnull", "Und<Vec<T>>"),
            ("nullish,len==3", "Und<[Option<T>; 3]>"),
            ("null,len>2", "Nullish"),
            ("required,len<=4,values:nonnull", "Vec<T>"),
        ] {
            assert_eq!(plain(Kind::Elastic, tag).as_deref(), Some(expect), "{tag}");
        }
    }

    #[test]
    fn step_order_is_len_nonnull_single() {
        let c = pick(Kind::Elastic, "values:nonnull,len==1,required").unwrap();
        assert_eq!(c.steps, vec![Step::FixedLen(1), Step::NonNull { fixed: true }, Step::Single]);
        assert_eq!(pick(Kind::Elastic, "len>2").unwrap().steps, vec![Step::PadMin(3)]);
        assert_eq!(pick(Kind::Elastic, "len>=2").unwrap().steps, vec![Step::PadMin(2)]);
        assert_eq!(pick(Kind::Elastic, "len<2").unwrap().steps, vec![Step::TruncateMax(1)]);
        assert_eq!(pick(Kind::Elastic, "len<=2").unwrap().steps, vec![Step::TruncateMax(2)]);
        assert_eq!(pick(Kind::Elastic, "len<0").unwrap().steps, vec![Step::TruncateMax(0)]);
    }

    #[test]
    fn selection_is_deterministic() {
        for tag in ["required,len==2", "def,null", "nullish", "len>1,values:nonnull"] {
            assert_eq!(pick(Kind::Elastic, tag), pick(Kind::Elastic, tag));
        }
    }

    #[test]
    fn expressions_compose_in_order() {
        let c = pick(Kind::Elastic, "required,len==2,values:nonnull").unwrap();
        let elem = quote!(String);
        let fwd = c.forward(quote!(self.f), &elem).to_string();
        let fixed = fwd.find("fixed_len").unwrap();
        let nonnull = fwd.find("nonnull_array").unwrap();
        assert!(fwd.starts_with(":: und :: conv :: nonnull_array"), "{fwd}");
        assert!(nonnull < fixed, "nonnull wraps fixed_len: {fwd}");
        assert!(fwd.contains("(:: und :: conv :: unwrap_defined (:: und :: conv :: elastic_to_und (self . f)))"), "{fwd}");

        let bwd = c.backward(quote!(p.f), &elem).to_string();
        assert!(bwd.starts_with(":: und :: conv :: und_to_elastic (:: und :: conv :: from_defined"), "{bwd}");
        let to_dyn = bwd.find("to_dyn").unwrap();
        let wrap = bwd.find("wrap_some_array").unwrap();
        assert!(to_dyn < wrap, "to_dyn wraps wrap_some_array: {bwd}");
        assert!(!bwd.contains("map"), "{bwd}");
    }

    #[test]
    fn wide_fixed_length_unwraps_the_vec() {
        let c = pick(Kind::Elastic, "required,len==33").unwrap();
        assert_eq!(c.plain_ty().render("u8"), "[Option<u8>; 33]");
        let fwd = c.forward(quote!(self.f), &quote!(u8)).to_string();
        assert!(fwd.starts_with(":: und :: conv :: fixed_len :: < _ , 33usize > (:: und :: conv :: unwrap_defined"), "{fwd}");
        assert!(!fwd.contains("map"), "{fwd}");
    }

    #[test]
    fn lossy_bounds_have_no_backward_step() {
        let c = pick(Kind::Elastic, "required,len>=2").unwrap();
        let bwd = c.backward(quote!(p.f), &quote!(u8)).to_string();
        assert!(!bwd.contains("map"), "{bwd}");
        assert!(bwd.contains("from_defined"), "{bwd}");
    }

    #[test]
    fn option_kind_converts_back_through_into() {
        let c = pick(Kind::Option, "nullish").unwrap();
        let bwd = c.backward(quote!(p.f), &quote!(u8)).to_string();
        assert!(bwd.contains(":: core :: convert :: Into :: into"), "{bwd}");
        assert!(bwd.contains("und_to_option :: < u8 >"), "{bwd}");
    }
}
