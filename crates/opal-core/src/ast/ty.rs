//! Minimal type annotations carried through the frontend.
//!
//! Lowering runs before inference; it reads and writes type slots only to
//! preserve them, never to reason about them.

use crate::ast::Path;
use crate::{common_enum, common_struct};

/// Inferred or annotated type of a node. `None` until inference runs.
pub type TySlot = Option<Ty>;
pub type BTy = Box<Ty>;

common_enum! {
    pub enum Ty {
        Primitive(TypePrimitive),
        Unit(TypeUnit),
        /// A named type, unresolved at this stage.
        Path(Path),
        Function(TypeFunction),
    }
}

common_enum! {
    pub enum TypePrimitive {
        Int64,
        Int32,
        Bool,
        Str,
    }
}

common_struct! {
    pub struct TypeUnit;
}

common_struct! {
    pub struct TypeFunction {
        pub params: Vec<Ty>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub ret_ty: Option<BTy>,
    }
}
