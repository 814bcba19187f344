use crate::ast::{Ident, Locator, Ty, TySlot};
use crate::{common_enum, common_struct};

pub type BPattern = Box<Pattern>;

common_enum! {
    pub enum PatternKind {
        Ident(PatternIdent),
        Tuple(PatternTuple),
        TupleStruct(PatternTupleStruct),
        Type(PatternType),
        Wildcard(PatternWildcard),
    }
}

common_struct! {
    pub struct Pattern {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub ty: TySlot,
        #[serde(flatten)]
        pub kind: PatternKind,
    }
}

impl Pattern {
    pub fn new(kind: PatternKind) -> Self {
        Self { ty: None, kind }
    }

    pub fn ident(ident: Ident) -> Self {
        Self::new(PatternKind::Ident(PatternIdent::new(ident)))
    }

    pub fn wildcard() -> Self {
        Self::new(PatternKind::Wildcard(PatternWildcard))
    }

    pub fn kind(&self) -> &PatternKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut PatternKind {
        &mut self.kind
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match &self.kind {
            PatternKind::Ident(ident) => Some(&ident.ident),
            PatternKind::Type(pattern_type) => pattern_type.pat.as_ident(),
            _ => None,
        }
    }

    pub fn make_mut(&mut self) {
        match &mut self.kind {
            PatternKind::Ident(ident) => {
                ident.mutability = Some(true);
            }
            PatternKind::Type(PatternType { pat, .. }) => {
                pat.make_mut();
            }
            _ => {}
        }
    }
}

impl<T> From<T> for Pattern
where
    PatternKind: From<T>,
{
    fn from(value: T) -> Self {
        Pattern::new(PatternKind::from(value))
    }
}

common_struct! {
    pub struct PatternIdent {
        pub ident: Ident,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub mutability: Option<bool>,
    }
}

impl PatternIdent {
    pub fn new(ident: Ident) -> Self {
        Self {
            ident,
            mutability: None,
        }
    }
}

common_struct! {
    pub struct PatternTuple {
        pub patterns: Vec<Pattern>,
    }
}

common_struct! {
    /// `Ok(inner)`, `Err(inner)` and friends.
    pub struct PatternTupleStruct {
        pub name: Locator,
        pub patterns: Vec<Pattern>,
    }
}

common_struct! {
    /// `x: T` in a binding position.
    pub struct PatternType {
        pub pat: BPattern,
        pub ty: Ty,
    }
}

common_struct! {
    pub struct PatternWildcard;
}
