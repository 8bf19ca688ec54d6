use crate::language::ast::Expr;
use crate::language::errors::SyntaxErrors;
use crate::language::parser::parse_expression_source;
use crate::runtime::bridge::HostType;
use crate::runtime::builtins::Builtin;
use crate::runtime::environment::Environment;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::preprocessor::preprocess;
use crate::runtime::value::Value;

/// Construction options. The defaults are a quiet machine with an
/// effectively unbounded recursion budget.
#[derive(Clone, Copy, Debug)]
pub struct MachineOptions {
    pub debug: bool,
    pub max_depth: usize,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            debug: false,
            max_depth: usize::MAX,
        }
    }
}

/// The evaluator together with its global environment and options. A
/// machine is single-threaded and non-reentrant: the current environment is
/// machine state, mutated during dispatch and restored on the way out.
pub struct Machine {
    pub(crate) context: Environment,
    pub(crate) debug: bool,
    pub(crate) depth_left: usize,
}

impl Machine {
    pub fn new() -> Self {
        Self::with_options(MachineOptions::default())
    }

    pub fn with_options(options: MachineOptions) -> Self {
        let context = Environment::new("global", options.debug);
        for builtin in Builtin::ALL {
            context.bind(builtin.name(), Value::Builtin(builtin));
        }
        Self {
            context,
            debug: options.debug,
            depth_left: options.max_depth,
        }
    }

    /// Parse and preprocess a source expression without evaluating it.
    pub fn parse(&self, source: &str) -> Result<Expr, SyntaxErrors> {
        let mut expr = parse_expression_source(source)?;
        preprocess(&mut expr);
        Ok(expr)
    }

    pub fn parse_and_eval(&mut self, source: &str) -> RuntimeResult<Value> {
        let expr = self.parse(source).map_err(|errs| RuntimeError::Parse {
            message: errs.to_message(),
        })?;
        self.evaluate(&expr)
    }

    /// Evaluate a pre-parsed node against the machine's global environment.
    pub fn evaluate(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        self.eval_expr(expr)
    }

    /// Invoke a previously evaluated function value directly. This is the
    /// hot path for compile-once, call-many-times hosts.
    pub fn call_function(&mut self, fun: &Value, args: &[Value]) -> RuntimeResult<Value> {
        match fun {
            Value::Func(func) => self.apply_function(func, args.to_vec()),
            other => Err(RuntimeError::TypeMismatch {
                message: format!("cannot call non-function type {}", other.type_of()),
            }),
        }
    }

    /// Equivalent to `name := value` at global scope.
    pub fn add_to_global_context<T: HostType>(
        &mut self,
        name: &str,
        value: T,
    ) -> RuntimeResult<()> {
        self.context.define(name, value.into_value())
    }

    pub(crate) fn enter(&mut self) -> RuntimeResult<()> {
        if self.depth_left == 0 {
            return Err(RuntimeError::DepthExceeded);
        }
        self.depth_left -= 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth_left += 1;
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
