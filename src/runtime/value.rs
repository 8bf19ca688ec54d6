use crate::language::ast::FuncLit;
use crate::runtime::builtins::Builtin;
use crate::runtime::environment::Environment;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::types::{Kind, Type};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The single runtime value carrier, one payload per kind. Arrays and
/// functions are reference-shared; everything else copies.
#[derive(Clone, Debug)]
pub enum Value {
    Empty,
    Str(String),
    Float(f64),
    Int(i64),
    Uint(u64),
    Bool(bool),
    Array(ArrayValue),
    Func(FuncValue),
    Builtin(Builtin),
    /// Multi-value tuple produced by a multi-return; unpacked by the
    /// assignment or return that consumes it.
    Pack(Vec<Value>),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Empty => Kind::Invalid,
            Value::Str(_) => Kind::String,
            Value::Float(_) => Kind::Float,
            Value::Int(_) => Kind::Int,
            Value::Uint(_) => Kind::Uint,
            Value::Bool(_) => Kind::Bool,
            Value::Array(_) => Kind::Array,
            Value::Func(_) => Kind::Func,
            Value::Builtin(_) => Kind::Builtin,
            Value::Pack(_) => Kind::Packing,
        }
    }

    pub fn type_of(&self) -> Type {
        match self {
            Value::Empty => Type::Invalid,
            Value::Str(_) => Type::String,
            Value::Float(_) => Type::Float,
            Value::Int(_) => Type::Int,
            Value::Uint(_) => Type::Uint,
            Value::Bool(_) => Type::Bool,
            Value::Array(array) => Type::array_of(array.elem.clone()),
            Value::Func(_) => Type::Func,
            Value::Builtin(_) => Type::Builtin,
            Value::Pack(_) => Type::Packing,
        }
    }

    /// Truncating for floats, widening for uints.
    pub fn to_int(&self) -> RuntimeResult<i64> {
        match self {
            Value::Float(v) => Ok(*v as i64),
            Value::Int(v) => Ok(*v),
            Value::Uint(v) => Ok(*v as i64),
            other => Err(RuntimeError::TypeMismatch {
                message: format!("cannot convert type {} to int", other.type_of()),
            }),
        }
    }

    /// Lossy for very large uints.
    pub fn to_float(&self) -> RuntimeResult<f64> {
        match self {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            Value::Uint(v) => Ok(*v as f64),
            other => Err(RuntimeError::TypeMismatch {
                message: format!("cannot convert type {} to float", other.type_of()),
            }),
        }
    }

    /// The zero value of a type, as produced by `make([]T, n)`.
    pub fn zero(typ: &Type) -> Value {
        match typ {
            Type::String => Value::Str(String::new()),
            Type::Float => Value::Float(0.0),
            Type::Int => Value::Int(0),
            Type::Uint => Value::Uint(0),
            Type::Bool => Value::Bool(false),
            Type::Array(elem) => Value::Array(ArrayValue::new((**elem).clone())),
            _ => Value::Empty,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => write!(f, "invalid"),
            Value::Str(v) => write!(f, "{:?}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Uint(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Array(array) => {
                write!(f, "[ ")?;
                for item in array.items.borrow().iter() {
                    write!(f, "{} ", item)?;
                }
                write!(f, "]")
            }
            Value::Func(_) => write!(f, "λ"),
            Value::Builtin(builtin) => write!(f, "{}", builtin.name()),
            Value::Pack(elems) => {
                write!(f, "(")?;
                for (idx, elem) in elems.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A shared array. `append` grows the underlying vector in place, so every
/// holder of the handle observes the mutation.
#[derive(Clone, Debug)]
pub struct ArrayValue {
    pub elem: Type,
    pub items: Rc<RefCell<Vec<Value>>>,
}

impl ArrayValue {
    pub fn new(elem: Type) -> Self {
        Self {
            elem,
            items: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn from_vec(elem: Type, items: Vec<Value>) -> Self {
        Self {
            elem,
            items: Rc::new(RefCell::new(items)),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.borrow().get(index).cloned()
    }

    pub fn push(&self, value: Value) {
        self.items.borrow_mut().push(value);
    }

    /// Whether two handles share the same underlying storage.
    pub fn same_storage(&self, other: &ArrayValue) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }
}

/// A function literal together with the environment captured at the point
/// the literal was evaluated. The captured environment must outlive the
/// value, which the shared handle guarantees.
#[derive(Clone)]
pub struct FuncValue {
    pub lit: Rc<FuncLit>,
    pub env: Environment,
}

impl fmt::Debug for FuncValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FuncValue(λ)")
    }
}
