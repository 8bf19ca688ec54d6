use crate::language::ast::Expr;
use crate::runtime::error::{ResultExt, RuntimeError, RuntimeResult};
use crate::runtime::machine::Machine;
use crate::runtime::types::Type;
use crate::runtime::value::{ArrayValue, Value};

/// The built-ins pre-bound in every fresh machine's global context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Append,
    Len,
    Make,
}

impl Builtin {
    pub const ALL: [Builtin; 3] = [Builtin::Append, Builtin::Len, Builtin::Make];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Append => "append",
            Builtin::Len => "len",
            Builtin::Make => "make",
        }
    }

    /// `make` inspects a type literal, so it receives its arguments as
    /// unevaluated syntax; the others take evaluated values.
    pub fn takes_raw_args(self) -> bool {
        matches!(self, Builtin::Make)
    }
}

impl Machine {
    pub(crate) fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: &[Expr],
    ) -> RuntimeResult<Value> {
        if builtin.takes_raw_args() {
            return self.builtin_make(args);
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(
                self.eval_expr(arg)
                    .prefix("error evaluating builtin arguments")?,
            );
        }
        match builtin {
            Builtin::Append => builtin_append(values),
            Builtin::Len => builtin_len(&values),
            Builtin::Make => unreachable!("make takes raw arguments"),
        }
    }

    // make([]T), make([]T, n), make([]T, n, cap)
    fn builtin_make(&mut self, args: &[Expr]) -> RuntimeResult<Value> {
        if args.is_empty() {
            return Err(RuntimeError::TooFewArgs {
                expected: 1,
                received: 0,
            });
        }
        if args.len() > 3 {
            return Err(RuntimeError::ArityMismatch {
                expected: 3,
                received: args.len(),
            });
        }

        let typ = Type::from_expr(&args[0])?;
        let elem = match &typ {
            Type::Array(elem) => (**elem).clone(),
            other => {
                return Err(RuntimeError::UnsupportedType {
                    message: format!("make supports []T only, not {}", other),
                });
            }
        };

        let size = if args.len() >= 2 {
            let value = self.eval_expr(&args[1])?;
            make_size(&value)?
        } else {
            0
        };
        // capacity is advisory
        let capacity = if args.len() == 3 {
            let value = self.eval_expr(&args[2])?;
            make_size(&value)?
        } else {
            size
        };

        let mut items = Vec::with_capacity(capacity.max(size));
        for _ in 0..size {
            items.push(Value::zero(&elem));
        }
        Ok(Value::Array(ArrayValue::from_vec(elem, items)))
    }
}

// append(s []T, vs ...T) []T
fn builtin_append(mut args: Vec<Value>) -> RuntimeResult<Value> {
    if args.is_empty() {
        return Err(RuntimeError::TooFewArgs {
            expected: 1,
            received: 0,
        });
    }
    let rest = args.split_off(1);
    let target = args.pop().expect("append target");
    match &target {
        Value::Array(array) => {
            array.items.borrow_mut().extend(rest);
            Ok(target)
        }
        other => Err(RuntimeError::UnsupportedType {
            message: format!("append expects an array, not {}", other.type_of()),
        }),
    }
}

fn builtin_len(args: &[Value]) -> RuntimeResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeError::ArityMismatch {
            expected: 1,
            received: args.len(),
        });
    }
    match &args[0] {
        Value::Str(v) => Ok(Value::Int(v.len() as i64)),
        Value::Array(array) => Ok(Value::Int(array.len() as i64)),
        other => Err(RuntimeError::UnsupportedType {
            message: format!("unsupported type {} for len", other.type_of()),
        }),
    }
}

fn make_size(value: &Value) -> RuntimeResult<usize> {
    let size = match value {
        Value::Int(v) => *v,
        Value::Uint(v) => return Ok(*v as usize),
        Value::Float(v) if v.fract() == 0.0 => *v as i64,
        other => {
            return Err(RuntimeError::TypeMismatch {
                message: format!("make size must be an integer, not {}", other.type_of()),
            });
        }
    };
    if size < 0 {
        return Err(RuntimeError::TypeMismatch {
            message: format!("make size must be non-negative, got {}", size),
        });
    }
    Ok(size as usize)
}
