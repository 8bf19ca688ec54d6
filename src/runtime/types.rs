use crate::language::ast::Expr;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use std::fmt;

/// The closed set of runtime value tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Invalid,
    String,
    Float,
    Int,
    Uint,
    Bool,
    Array,
    Func,
    Builtin,
    /// Ephemeral multi-value tuple produced by a multi-return.
    Packing,
}

impl Kind {
    pub fn is_numeric(self) -> bool {
        matches!(self, Kind::Float | Kind::Int | Kind::Uint)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Invalid => "invalid",
            Kind::String => "string",
            Kind::Float => "float",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Bool => "bool",
            Kind::Array => "array",
            Kind::Func => "function",
            Kind::Builtin => "builtin",
            Kind::Packing => "packing",
        };
        f.write_str(name)
    }
}

/// A type descriptor: either a literal of some kind, or an array with a
/// nested element type. Equality is the derived recursive equality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    Invalid,
    String,
    Float,
    Int,
    Uint,
    Bool,
    Func,
    Builtin,
    Packing,
    Array(Box<Type>),
}

impl Type {
    pub fn array_of(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Type::Invalid => Kind::Invalid,
            Type::String => Kind::String,
            Type::Float => Kind::Float,
            Type::Int => Kind::Int,
            Type::Uint => Kind::Uint,
            Type::Bool => Kind::Bool,
            Type::Func => Kind::Func,
            Type::Builtin => Kind::Builtin,
            Type::Packing => Kind::Packing,
            Type::Array(_) => Kind::Array,
        }
    }

    /// The element type of an array type.
    pub fn elem(&self) -> RuntimeResult<&Type> {
        match self {
            Type::Array(elem) => Ok(elem),
            _ => Err(RuntimeError::NotAnArray),
        }
    }

    /// Resolves a type identifier as it appears in array element position.
    pub fn from_name(name: &str) -> RuntimeResult<Type> {
        match name {
            "string" => Ok(Type::String),
            "float32" | "float64" => Ok(Type::Float),
            "int" | "int8" | "int16" | "int32" | "int64" => Ok(Type::Int),
            _ => Err(RuntimeError::UnknownType {
                name: name.to_string(),
            }),
        }
    }

    /// Resolves a type expression (`float64`, `[]int`, `[][]string`, ...)
    /// from the syntax tree.
    pub fn from_expr(expr: &Expr) -> RuntimeResult<Type> {
        match expr {
            Expr::Ident(ident) => Type::from_name(&ident.name),
            Expr::ArrayType(array) => Ok(Type::array_of(Type::from_expr(&array.elem)?)),
            Expr::Paren(inner, _) => Type::from_expr(inner),
            other => Err(RuntimeError::UnsupportedType {
                message: format!("{} is not a type", other.kind_name()),
            }),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Array(elem) => write!(f, "[]{}", elem),
            other => write!(f, "{}", other.kind()),
        }
    }
}
