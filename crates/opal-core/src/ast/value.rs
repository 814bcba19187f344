//! Literal values appearing as expression leaves.

use crate::{common_enum, common_struct};

pub type BValue = Box<Value>;

common_enum! {
    pub enum Value {
        Int(ValueInt),
        Bool(ValueBool),
        String(ValueString),
        Unit(ValueUnit),
    }
}

common_struct! {
    pub struct ValueInt {
        pub value: i64,
    }
}

common_struct! {
    pub struct ValueBool {
        pub value: bool,
    }
}

common_struct! {
    pub struct ValueString {
        pub value: String,
    }
}

common_struct! {
    pub struct ValueUnit;
}

impl Value {
    pub fn int(value: i64) -> Value {
        Value::Int(ValueInt { value })
    }

    pub fn bool(value: bool) -> Value {
        Value::Bool(ValueBool { value })
    }

    pub fn string(value: impl Into<String>) -> Value {
        Value::String(ValueString {
            value: value.into(),
        })
    }

    pub fn unit() -> Value {
        Value::Unit(ValueUnit)
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit(_))
    }
}
