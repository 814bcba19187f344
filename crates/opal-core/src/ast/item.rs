use crate::ast::{BExpr, Expr, Ident, Ty, TySlot};
use crate::{common_enum, common_struct};

pub type ItemChunk = Vec<Item>;
pub type BItem = Box<Item>;

common_enum! {
    pub enum ItemKind {
        Module(Module),
        DefFunction(ItemDefFunction),
        DefConst(ItemDefConst),
        /// A bare top-level expression, as scripts and tests produce.
        Expr(Expr),
    }
}

common_struct! {
    pub struct Item {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub ty: TySlot,
        #[serde(flatten)]
        pub kind: ItemKind,
    }
}

impl Item {
    pub fn new(kind: ItemKind) -> Self {
        Self { ty: None, kind }
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ItemKind {
        &mut self.kind
    }
}

impl<T> From<T> for Item
where
    ItemKind: From<T>,
{
    fn from(value: T) -> Self {
        Item::new(ItemKind::from(value))
    }
}

common_enum! {
    pub enum Visibility {
        Public,
        Private,
    }
}

common_struct! {
    pub struct Module {
        pub name: Ident,
        pub items: ItemChunk,
    }
}

common_struct! {
    pub struct FunctionParam {
        pub name: Ident,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub ty: Option<Ty>,
    }
}

impl FunctionParam {
    pub fn new(name: Ident, ty: Option<Ty>) -> Self {
        Self { name, ty }
    }
}

common_struct! {
    pub struct FunctionSignature {
        pub params: Vec<FunctionParam>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub ret_ty: Option<Ty>,
    }
}

impl FunctionSignature {
    pub fn unit() -> Self {
        Self {
            params: Vec::new(),
            ret_ty: None,
        }
    }
}

common_struct! {
    pub struct ItemDefFunction {
        pub visibility: Visibility,
        pub name: Ident,
        pub sig: FunctionSignature,
        pub body: BExpr,
    }
}

impl ItemDefFunction {
    pub fn new_simple(name: Ident, body: impl Into<BExpr>) -> Self {
        Self {
            visibility: Visibility::Private,
            name,
            sig: FunctionSignature::unit(),
            body: body.into(),
        }
    }
}

common_struct! {
    pub struct ItemDefConst {
        pub visibility: Visibility,
        pub name: Ident,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub ty: Option<Ty>,
        pub value: BExpr,
    }
}

impl ItemDefConst {
    pub fn new(name: Ident, value: impl Into<BExpr>) -> Self {
        Self {
            visibility: Visibility::Private,
            name,
            ty: None,
            value: value.into(),
        }
    }
}
