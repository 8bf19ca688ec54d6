use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::types::Type;
use crate::runtime::value::{ArrayValue, Value};

/// Bidirectional marshalling between native host values and script values.
/// The implementation set mirrors the supported host kinds: strings, floats,
/// signed and unsigned integers, bools, and nested sequences. Element types
/// are taken from the static type, so empty vectors marshal correctly.
pub trait HostType: Sized {
    fn script_type() -> Type;
    fn into_value(self) -> Value;
    fn from_value(value: &Value) -> RuntimeResult<Self>;
}

impl HostType for String {
    fn script_type() -> Type {
        Type::String
    }

    fn into_value(self) -> Value {
        Value::Str(self)
    }

    fn from_value(value: &Value) -> RuntimeResult<Self> {
        match value {
            Value::Str(v) => Ok(v.clone()),
            other => Err(mismatch(other, Type::String)),
        }
    }
}

impl HostType for bool {
    fn script_type() -> Type {
        Type::Bool
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> RuntimeResult<Self> {
        match value {
            Value::Bool(v) => Ok(*v),
            other => Err(mismatch(other, Type::Bool)),
        }
    }
}

impl HostType for f64 {
    fn script_type() -> Type {
        Type::Float
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> RuntimeResult<Self> {
        value.to_float()
    }
}

impl HostType for f32 {
    fn script_type() -> Type {
        Type::Float
    }

    fn into_value(self) -> Value {
        Value::Float(self as f64)
    }

    fn from_value(value: &Value) -> RuntimeResult<Self> {
        Ok(value.to_float()? as f32)
    }
}

macro_rules! int_host_type {
    ($($ty:ty),*) => {$(
        impl HostType for $ty {
            fn script_type() -> Type {
                Type::Int
            }

            fn into_value(self) -> Value {
                Value::Int(self as i64)
            }

            fn from_value(value: &Value) -> RuntimeResult<Self> {
                Ok(value.to_int()? as $ty)
            }
        }
    )*};
}

macro_rules! uint_host_type {
    ($($ty:ty),*) => {$(
        impl HostType for $ty {
            fn script_type() -> Type {
                Type::Uint
            }

            fn into_value(self) -> Value {
                Value::Uint(self as u64)
            }

            fn from_value(value: &Value) -> RuntimeResult<Self> {
                match value {
                    Value::Uint(v) => Ok(*v as $ty),
                    Value::Int(v) if *v >= 0 => Ok(*v as $ty),
                    other => Err(mismatch(other, Type::Uint)),
                }
            }
        }
    )*};
}

int_host_type!(i64, i32, i16, i8);
uint_host_type!(u64, u32, u16, u8);

impl<T: HostType> HostType for Vec<T> {
    fn script_type() -> Type {
        Type::array_of(T::script_type())
    }

    fn into_value(self) -> Value {
        let items = self.into_iter().map(HostType::into_value).collect();
        Value::Array(ArrayValue::from_vec(T::script_type(), items))
    }

    fn from_value(value: &Value) -> RuntimeResult<Self> {
        match value {
            Value::Array(array) => array.items.borrow().iter().map(T::from_value).collect(),
            // a multi-return pack converts to a host sequence of its elements
            Value::Pack(elems) => elems.iter().map(T::from_value).collect(),
            other => Err(mismatch(other, Self::script_type())),
        }
    }
}

fn mismatch(value: &Value, wanted: Type) -> RuntimeError {
    RuntimeError::TypeMismatch {
        message: format!("cannot convert type {} to {}", value.type_of(), wanted),
    }
}

/// Structural projection to JSON for machine-readable host output.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Empty => serde_json::Value::Null,
        Value::Str(v) => serde_json::Value::String(v.clone()),
        Value::Float(v) => serde_json::Number::from_f64(*v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Int(v) => serde_json::Value::Number((*v).into()),
        Value::Uint(v) => serde_json::Value::Number((*v).into()),
        Value::Bool(v) => serde_json::Value::Bool(*v),
        Value::Array(array) => {
            serde_json::Value::Array(array.items.borrow().iter().map(to_json).collect())
        }
        Value::Func(_) => serde_json::Value::String("λ".to_string()),
        Value::Builtin(builtin) => serde_json::Value::String(builtin.name().to_string()),
        Value::Pack(elems) => serde_json::Value::Array(elems.iter().map(to_json).collect()),
    }
}
