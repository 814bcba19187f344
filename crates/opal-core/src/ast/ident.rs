//! AST identifier types.

use itertools::Itertools;

use crate::{common_enum, common_struct};

/// A simple identifier - a single name like `foo` or `MyStruct`
#[derive(
    Debug, Clone, serde::Serialize, serde::Deserialize, Hash, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<Ident> for String {
    fn from(ident: Ident) -> Self {
        ident.name
    }
}

impl From<String> for Ident {
    fn from(name: String) -> Self {
        Ident::new(name)
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Ident::new(name)
    }
}

common_struct! {
    /// A sequence of identifiers separated by `::`, like `From::from`.
    pub struct Path {
        pub segments: Vec<Ident>,
    }
}

impl Path {
    pub fn new(segments: Vec<Ident>) -> Self {
        debug_assert!(!segments.is_empty(), "path must have at least one segment");
        Self { segments }
    }

    pub fn from_ident(ident: Ident) -> Self {
        Self::new(vec![ident])
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> &Ident {
        self.segments.last().expect("path is never empty")
    }

    pub fn push(&mut self, ident: Ident) {
        self.segments.push(ident);
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.segments.iter().join("::"))
    }
}

common_enum! {
    /// A reference to a named thing, before name resolution has run.
    pub enum Locator {
        Ident(Ident),
        Path(Path),
    }
}

impl Locator {
    pub fn ident(ident: Ident) -> Self {
        Locator::Ident(ident)
    }

    pub fn path(path: Path) -> Self {
        if path.len() == 1 {
            let Path { mut segments } = path;
            return Locator::Ident(segments.remove(0));
        }
        Locator::Path(path)
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Locator::Ident(ident) => Some(ident),
            Locator::Path(path) if path.len() == 1 => Some(path.last()),
            Locator::Path(_) => None,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Locator::Ident(ident) => write!(f, "{}", ident),
            Locator::Path(path) => write!(f, "{}", path),
        }
    }
}
