//! The Opal abstract syntax tree.
//!
//! A closed tagged-variant tree. Every node is exclusively owned by its
//! parent; passes that replace a node take it out of the parent slot and
//! write the replacement back into the same slot.

use std::path::PathBuf;

use crate::{common_enum, common_struct};

mod expr;
mod ident;
mod item;
mod pat;
mod ty;
mod value;

pub use expr::*;
pub use ident::*;
pub use item::*;
pub use pat::*;
pub use ty::*;
pub use value::*;

common_struct! {
    pub struct File {
        pub path: PathBuf,
        pub items: ItemChunk,
    }
}

common_enum! {
    /// Any syntax tree element a pass can be handed as its root.
    pub enum NodeKind {
        Item(Item),
        Expr(Expr),
        File(File),
    }
}

common_struct! {
    pub struct Node {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub ty: TySlot,
        #[serde(flatten)]
        pub kind: NodeKind,
    }
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self { ty: None, kind }
    }

    pub fn expr(expr: Expr) -> Self {
        Self::new(NodeKind::Expr(expr))
    }

    pub fn item(item: Item) -> Self {
        Self::new(NodeKind::Item(item))
    }

    pub fn file(file: File) -> Self {
        Self::new(NodeKind::File(file))
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn into_kind(self) -> NodeKind {
        self.kind
    }
}

impl<T> From<T> for Node
where
    NodeKind: From<T>,
{
    fn from(value: T) -> Self {
        Node::new(NodeKind::from(value))
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(text) => f.write_str(&text),
            Err(_) => f.write_str("<node serialization error>"),
        }
    }
}
