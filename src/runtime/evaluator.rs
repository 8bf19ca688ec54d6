use crate::language::ast::{
    AssignStmt, Block, BranchKind, CompositeLit, DeclStmt, Expr, ForStmt, IfStmt, IncDecStmt, Op,
    RangeStmt, ReturnStmt, Stmt,
};
use crate::runtime::error::{ResultExt, RuntimeError, RuntimeResult};
use crate::runtime::machine::Machine;
use crate::runtime::preprocessor::literal_value;
use crate::runtime::types::{Kind, Type};
use crate::runtime::value::{ArrayValue, FuncValue, Value};

/// Control flow escaping a statement, surfaced by blocks and consumed at
/// the loop or function boundary that owns it.
pub(crate) enum FlowSignal {
    Break,
    Continue,
    Return(Value),
}

pub(crate) enum BlockEval {
    Value(Value),
    Flow(FlowSignal),
}

impl Machine {
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        self.enter()?;
        if self.debug {
            eprintln!("---evaluating {}", expr.kind_name());
        }
        let result = self.eval_expr_inner(expr);
        if self.debug {
            match &result {
                Ok(value) => eprintln!(
                    "---finished {}, result: {}, context: {}",
                    expr.kind_name(),
                    value,
                    self.context
                ),
                Err(err) => eprintln!("---finished {}, err: {}", expr.kind_name(), err),
            }
        }
        self.leave();
        result
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        match expr {
            Expr::Folded(value) => Ok(value.clone()),
            Expr::Lit(lit) => Ok(literal_value(lit)),
            Expr::Ident(ident) => match ident.name.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                name => self
                    .context
                    .get(name)
                    .ok_or_else(|| RuntimeError::UnknownName {
                        name: name.to_string(),
                    }),
            },
            Expr::FuncLit(lit) => Ok(Value::Func(FuncValue {
                lit: lit.clone(),
                env: self.context.clone(),
            })),
            Expr::CompositeLit(lit) => self.eval_composite(lit),
            Expr::ArrayType(_) => Err(RuntimeError::UnsupportedType {
                message: "array type is not a value".to_string(),
            }),
            Expr::Paren(inner, _) => self.eval_expr(inner),
            Expr::Unary {
                op, expr: operand, ..
            } => self.eval_unary(*op, operand),
            Expr::Binary { op, x, y, .. } => self.eval_binary(*op, x, y),
            Expr::Call { fun, args, .. } => self.eval_call(fun, args),
            Expr::Index { x, index, .. } => self.eval_index(x, index),
        }
    }

    pub(crate) fn eval_stmt(&mut self, stmt: &Stmt) -> RuntimeResult<BlockEval> {
        self.enter()?;
        if self.debug {
            eprintln!("---evaluating {}", stmt.kind_name());
        }
        let result = self.eval_stmt_inner(stmt);
        self.leave();
        result
    }

    fn eval_stmt_inner(&mut self, stmt: &Stmt) -> RuntimeResult<BlockEval> {
        match stmt {
            Stmt::Expr(expr) => Ok(BlockEval::Value(self.eval_expr(expr)?)),
            Stmt::Decl(decl) => {
                self.eval_decl(decl)?;
                Ok(BlockEval::Value(Value::Empty))
            }
            Stmt::Assign(assign) => {
                self.eval_assign(assign)?;
                Ok(BlockEval::Value(Value::Empty))
            }
            Stmt::IncDec(incdec) => {
                self.eval_incdec(incdec)?;
                Ok(BlockEval::Value(Value::Empty))
            }
            Stmt::Block(block) => {
                let saved = self.context.clone();
                self.context = saved.child("block");
                let result = self.eval_block(block);
                self.context = saved;
                result
            }
            Stmt::If(stmt) => {
                let saved = self.context.clone();
                let result = self.eval_if(stmt);
                self.context = saved;
                result
            }
            Stmt::For(stmt) => {
                let saved = self.context.clone();
                let result = self.eval_for(stmt);
                self.context = saved;
                result
            }
            Stmt::Range(stmt) => {
                let saved = self.context.clone();
                let result = self.eval_range(stmt);
                self.context = saved;
                result
            }
            Stmt::Return(ret) => self.eval_return(ret),
            Stmt::Branch(branch) => Ok(BlockEval::Flow(match branch.kind {
                BranchKind::Break => FlowSignal::Break,
                BranchKind::Continue => FlowSignal::Continue,
            })),
        }
    }

    /// Evaluates statements in order; the first return, break or continue
    /// stops the block and surfaces immediately.
    pub(crate) fn eval_block(&mut self, block: &Block) -> RuntimeResult<BlockEval> {
        let mut result = BlockEval::Value(Value::Empty);
        for stmt in &block.stmts {
            match self.eval_stmt(stmt)? {
                BlockEval::Flow(flow) => return Ok(BlockEval::Flow(flow)),
                value => result = value,
            }
        }
        Ok(result)
    }

    fn eval_decl(&mut self, decl: &DeclStmt) -> RuntimeResult<()> {
        let spec = &decl.spec;
        if spec.names.len() != spec.values.len() {
            return Err(RuntimeError::ArityMismatch {
                expected: spec.names.len(),
                received: spec.values.len(),
            }
            .context("declaration mismatch"));
        }
        for (name, expr) in spec.names.iter().zip(&spec.values) {
            let value = self.eval_expr(expr)?;
            self.context.define(&name.name, value)?;
        }
        Ok(())
    }

    fn eval_assign(&mut self, assign: &AssignStmt) -> RuntimeResult<()> {
        if let Some(op) = assign.op.strip_assign() {
            if assign.lhs.len() != 1 || assign.rhs.len() != 1 {
                return Err(RuntimeError::UnsupportedOperator {
                    op: assign.op.text().to_string(),
                });
            }
            let name = assign_target(&assign.lhs[0])?;
            let x = self.eval_expr(&assign.lhs[0])?;
            let y = self.eval_expr(&assign.rhs[0])?;
            let value = binary_op(op, x, y)?;
            return self.context.update(name, value);
        }

        // evaluate the right side left to right, flattening multi-returns
        let mut rhs = Vec::with_capacity(assign.rhs.len());
        for expr in &assign.rhs {
            match self.eval_expr(expr)? {
                Value::Pack(elems) => rhs.extend(elems),
                value => rhs.push(value),
            }
        }

        if assign.lhs.len() != rhs.len() {
            return Err(RuntimeError::ArityMismatch {
                expected: assign.lhs.len(),
                received: rhs.len(),
            }
            .context("assignment mismatch"));
        }

        for (target, value) in assign.lhs.iter().zip(rhs) {
            let name = assign_target(target)?;
            if assign.op == Op::Define {
                self.context.define(name, value)?;
            } else {
                self.context.update(name, value)?;
            }
        }
        Ok(())
    }

    // x++ and x-- translate into x += 1 / x -= 1
    fn eval_incdec(&mut self, incdec: &IncDecStmt) -> RuntimeResult<()> {
        let op = match incdec.op {
            Op::Inc => Op::Add,
            Op::Dec => Op::Sub,
            other => {
                return Err(RuntimeError::UnsupportedOperator {
                    op: other.text().to_string(),
                });
            }
        };
        let name = assign_target(&incdec.expr)?;
        let current = self.eval_expr(&incdec.expr)?;
        let value = binary_op(op, current, Value::Int(1))?;
        self.context.update(name, value)
    }

    fn eval_unary(&mut self, op: Op, operand: &Expr) -> RuntimeResult<Value> {
        let value = self.eval_expr(operand)?;
        match op {
            Op::Sub => match value {
                Value::Float(v) => Ok(Value::Float(-v)),
                Value::Int(v) => Ok(Value::Int(v.wrapping_neg())),
                Value::Uint(v) => Ok(Value::Uint(v.wrapping_neg())),
                other => Err(RuntimeError::UnsupportedType {
                    message: format!("unsupported operand type {} for unary `-`", other.type_of()),
                }),
            },
            Op::Not => match value {
                Value::Bool(v) => Ok(Value::Bool(!v)),
                other => Err(RuntimeError::UnsupportedType {
                    message: format!("unsupported operand type {} for unary `!`", other.type_of()),
                }),
            },
            other => Err(RuntimeError::UnsupportedOperator {
                op: other.text().to_string(),
            }),
        }
    }

    fn eval_binary(&mut self, op: Op, x: &Expr, y: &Expr) -> RuntimeResult<Value> {
        if matches!(op, Op::Land | Op::Lor) {
            return self.eval_bool(op, x, y);
        }

        let x = self.eval_expr(x)?;
        let y = self.eval_expr(y)?;
        binary_op(op, x, y)
    }

    // && and || short-circuit: the right side only runs when the left side
    // has not already decided the outcome.
    fn eval_bool(&mut self, op: Op, x: &Expr, y: &Expr) -> RuntimeResult<Value> {
        let x = self.eval_expr(x)?;
        let left = match x {
            Value::Bool(v) => v,
            other => {
                return Err(RuntimeError::TypeMismatch {
                    message: format!("left operand type {} is not boolean", other.type_of()),
                });
            }
        };

        if op == Op::Lor && left {
            return Ok(Value::Bool(true));
        }
        if op == Op::Land && !left {
            return Ok(Value::Bool(false));
        }

        let y = self.eval_expr(y)?;
        let right = match y {
            Value::Bool(v) => v,
            other => {
                return Err(RuntimeError::TypeMismatch {
                    message: format!("right operand type {} is not boolean", other.type_of()),
                });
            }
        };
        Ok(Value::Bool(right))
    }

    fn eval_call(&mut self, fun: &Expr, args: &[Expr]) -> RuntimeResult<Value> {
        let callee = self.eval_expr(fun)?;
        match callee {
            Value::Builtin(builtin) => self.call_builtin(builtin, args),
            Value::Func(func) => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(
                        self.eval_expr(arg)
                            .prefix("error evaluating function arguments")?,
                    );
                }
                self.apply_function(&func, values)
            }
            other => Err(RuntimeError::TypeMismatch {
                message: format!("cannot call non-function type {}", other.type_of()),
            }),
        }
    }

    /// Calls a function value: a fresh frame under the *captured*
    /// environment, parameters bound left to right, the body run as a
    /// block. Extra arguments are ignored; missing ones are an error. A
    /// return surfacing from the body is consumed here.
    pub(crate) fn apply_function(
        &mut self,
        func: &FuncValue,
        args: Vec<Value>,
    ) -> RuntimeResult<Value> {
        let params = &func.lit.typ.params;
        if params.len() > args.len() {
            return Err(RuntimeError::TooFewArgs {
                expected: params.len(),
                received: args.len(),
            });
        }

        let saved = self.context.clone();
        self.context = func.env.child("func block");
        for (param, arg) in params.iter().zip(args) {
            let Some(name) = param.names.first() else {
                self.context = saved;
                return Err(RuntimeError::TypeMismatch {
                    message: "cannot determine function parameter name".to_string(),
                });
            };
            self.context.bind(&name.name, arg);
        }

        let result = self.eval_block(&func.lit.body);
        self.context = saved;

        match result? {
            BlockEval::Value(value) => Ok(value),
            BlockEval::Flow(FlowSignal::Return(value)) => Ok(value),
            BlockEval::Flow(_) => Err(RuntimeError::StrayBranch),
        }
    }

    fn eval_index(&mut self, x: &Expr, index: &Expr) -> RuntimeResult<Value> {
        let target = self.eval_expr(x)?;
        let array = match target {
            Value::Array(array) => array,
            other => {
                return Err(RuntimeError::TypeMismatch {
                    message: format!("cannot index type {}", other.type_of()),
                });
            }
        };

        let index_value = self.eval_expr(index)?;
        let index = match index_value {
            Value::Int(v) => v,
            Value::Uint(v) => v as i64,
            Value::Float(v) if v.fract() == 0.0 => v as i64,
            _ => return Err(RuntimeError::BadIndex),
        };
        let len = array.len();
        if index < 0 || index as usize >= len {
            return Err(RuntimeError::OutOfRange { index, len });
        }
        array
            .get(index as usize)
            .ok_or(RuntimeError::OutOfRange { index, len })
    }

    fn eval_composite(&mut self, lit: &CompositeLit) -> RuntimeResult<Value> {
        let Some(typ) = &lit.typ else {
            return Err(RuntimeError::TypeMismatch {
                message: "composite literal is missing its type".to_string(),
            });
        };
        let Expr::ArrayType(array_type) = typ.as_ref() else {
            return Err(RuntimeError::UnsupportedType {
                message: format!("unsupported composite type {}", typ.kind_name()),
            });
        };
        let elem_type = Type::from_expr(&array_type.elem)?;
        self.eval_array(&elem_type, &lit.elems)
    }

    fn eval_array(&mut self, elem_type: &Type, elems: &[Expr]) -> RuntimeResult<Value> {
        let mut items = Vec::with_capacity(elems.len());
        for elem in elems {
            let value = match (elem_type, elem) {
                // nested array literal with elided element type
                (Type::Array(inner), Expr::CompositeLit(nested)) if nested.typ.is_none() => {
                    self.eval_array(inner, &nested.elems)?
                }
                _ => self.eval_expr(elem)?,
            };
            items.push(coerce_element(value, elem_type)?);
        }
        Ok(Value::Array(ArrayValue::from_vec(
            elem_type.clone(),
            items,
        )))
    }

    fn eval_if(&mut self, stmt: &IfStmt) -> RuntimeResult<BlockEval> {
        // the head frame holds the init clause; body and else get their own
        self.context = self.context.child("if stmt");
        if let Some(init) = &stmt.init {
            self.eval_stmt(init)?;
        }

        let cond = self.eval_expr(&stmt.cond)?;
        let Value::Bool(cond) = cond else {
            return Err(RuntimeError::BadCondition {
                clause: "if condition".to_string(),
            });
        };

        self.context = self.context.child("if block");
        let result = if cond {
            self.eval_block(&stmt.body)
        } else if let Some(else_branch) = &stmt.else_branch {
            self.eval_stmt(else_branch)
        } else {
            Ok(BlockEval::Value(Value::Empty))
        };
        result.prefix("cannot eval if")
    }

    fn eval_for(&mut self, stmt: &ForStmt) -> RuntimeResult<BlockEval> {
        self.context = self.context.child("for stmt");
        if let Some(init) = &stmt.init {
            self.eval_stmt(init).prefix("cannot eval for init block")?;
        }
        let head = self.context.clone();

        let mut result = BlockEval::Value(Value::Empty);
        loop {
            self.context = head.clone();
            let proceed = match &stmt.cond {
                Some(cond) => {
                    let value = self
                        .eval_expr(cond)
                        .prefix("cannot eval for cond block")?;
                    match value {
                        Value::Bool(v) => v,
                        _ => {
                            return Err(RuntimeError::BadCondition {
                                clause: "for condition".to_string(),
                            });
                        }
                    }
                }
                None => true,
            };
            if !proceed {
                break;
            }

            self.context = head.child("for block");
            match self.eval_block(&stmt.body).prefix("cannot eval for body")? {
                BlockEval::Flow(FlowSignal::Return(value)) => {
                    return Ok(BlockEval::Flow(FlowSignal::Return(value)));
                }
                BlockEval::Flow(FlowSignal::Break) => {
                    result = BlockEval::Value(Value::Empty);
                    break;
                }
                BlockEval::Flow(FlowSignal::Continue) => {}
                value => result = value,
            }

            self.context = head.clone();
            if let Some(post) = &stmt.post {
                self.eval_stmt(post).prefix("cannot eval for post")?;
            }
        }
        Ok(result)
    }

    fn eval_range(&mut self, stmt: &RangeStmt) -> RuntimeResult<BlockEval> {
        self.context = self.context.child("for stmt");
        let target = self.eval_expr(&stmt.x)?;
        let array = match target {
            Value::Array(array) => array,
            other => {
                return Err(RuntimeError::UnsupportedType {
                    message: format!("range not implemented for type {}", other.type_of()),
                });
            }
        };
        let head = self.context.clone();
        let len = array.len();

        let mut result = BlockEval::Value(Value::Empty);
        for index in 0..len {
            let Some(elem) = array.get(index) else {
                break;
            };
            if let Some(key) = &stmt.key {
                head.bind(&key.name, Value::Int(index as i64));
            }
            if let Some(value) = &stmt.value {
                head.bind(&value.name, elem);
            }

            self.context = head.child("for block");
            match self
                .eval_block(&stmt.body)
                .prefix("cannot eval range body")?
            {
                BlockEval::Flow(FlowSignal::Return(value)) => {
                    return Ok(BlockEval::Flow(FlowSignal::Return(value)));
                }
                BlockEval::Flow(FlowSignal::Break) => {
                    result = BlockEval::Value(Value::Empty);
                    break;
                }
                BlockEval::Flow(FlowSignal::Continue) => {}
                value => result = value,
            }
        }
        Ok(result)
    }

    fn eval_return(&mut self, ret: &ReturnStmt) -> RuntimeResult<BlockEval> {
        let value = match ret.results.len() {
            0 => Value::Empty,
            1 => self.eval_expr(&ret.results[0])?,
            _ => {
                let mut elems = Vec::with_capacity(ret.results.len());
                for result in &ret.results {
                    elems.push(self.eval_expr(result)?);
                }
                Value::Pack(elems)
            }
        };
        Ok(BlockEval::Flow(FlowSignal::Return(value)))
    }
}

fn assign_target(expr: &Expr) -> RuntimeResult<&str> {
    match expr {
        Expr::Ident(ident) => Ok(&ident.name),
        other => Err(RuntimeError::TypeMismatch {
            message: format!("cannot assign to {}", other.kind_name()),
        }),
    }
}

// Integer elements promote to float when the other side (or the declared
// element type) is float; nothing else converts implicitly.
fn coerce_element(value: Value, declared: &Type) -> RuntimeResult<Value> {
    if value.type_of() == *declared {
        return Ok(value);
    }
    if *declared == Type::Float {
        if let Ok(promoted) = value.to_float() {
            return Ok(Value::Float(promoted));
        }
    }
    Err(RuntimeError::TypeMismatch {
        message: format!(
            "array type mismatch, element {} is not a {}",
            value, declared
        ),
    })
}

pub(crate) fn binary_op(op: Op, x: Value, y: Value) -> RuntimeResult<Value> {
    if !x.kind().is_numeric() || !y.kind().is_numeric() {
        return Err(RuntimeError::UnsupportedType {
            message: format!(
                "unsupported operand types {} and {}",
                x.type_of(),
                y.type_of()
            ),
        });
    }

    let float_context = x.kind() == Kind::Float || y.kind() == Kind::Float;
    match op {
        Op::Add | Op::Sub | Op::Mul | Op::Quo | Op::Rem => {
            if float_context {
                Ok(Value::Float(arith_float(op, x.to_float()?, y.to_float()?)?))
            } else if x.kind() == Kind::Int && y.kind() == Kind::Int {
                Ok(Value::Int(arith_int(op, x.to_int()?, y.to_int()?)?))
            } else {
                Err(RuntimeError::UnsupportedType {
                    message: format!(
                        "unsupported operand types {} and {}",
                        x.type_of(),
                        y.type_of()
                    ),
                })
            }
        }
        Op::Eql | Op::Neq | Op::Lss | Op::Leq | Op::Gtr | Op::Geq => {
            if float_context {
                Ok(Value::Bool(compare_float(op, x.to_float()?, y.to_float()?)))
            } else if x.kind() == Kind::Int && y.kind() == Kind::Int {
                Ok(Value::Bool(compare_int(op, x.to_int()?, y.to_int()?)))
            } else {
                Err(RuntimeError::UnsupportedType {
                    message: format!(
                        "unsupported operand types {} and {}",
                        x.type_of(),
                        y.type_of()
                    ),
                })
            }
        }
        other => Err(RuntimeError::UnsupportedOperator {
            op: other.text().to_string(),
        }),
    }
}

fn arith_float(op: Op, a: f64, b: f64) -> RuntimeResult<f64> {
    Ok(match op {
        Op::Add => a + b,
        Op::Sub => a - b,
        Op::Mul => a * b,
        // division by zero follows IEEE-754
        Op::Quo => a / b,
        Op::Rem => a % b,
        other => {
            return Err(RuntimeError::UnsupportedOperator {
                op: other.text().to_string(),
            });
        }
    })
}

// Two's-complement wrap on overflow; division by zero is an error.
fn arith_int(op: Op, a: i64, b: i64) -> RuntimeResult<i64> {
    Ok(match op {
        Op::Add => a.wrapping_add(b),
        Op::Sub => a.wrapping_sub(b),
        Op::Mul => a.wrapping_mul(b),
        Op::Quo => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            a.wrapping_div(b)
        }
        Op::Rem => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            a.wrapping_rem(b)
        }
        other => {
            return Err(RuntimeError::UnsupportedOperator {
                op: other.text().to_string(),
            });
        }
    })
}

fn compare_float(op: Op, a: f64, b: f64) -> bool {
    match op {
        Op::Eql => a == b,
        Op::Neq => a != b,
        Op::Lss => a < b,
        Op::Leq => a <= b,
        Op::Gtr => a > b,
        Op::Geq => a >= b,
        _ => false,
    }
}

fn compare_int(op: Op, a: i64, b: i64) -> bool {
    match op {
        Op::Eql => a == b,
        Op::Neq => a != b,
        Op::Lss => a < b,
        Op::Leq => a <= b,
        Op::Gtr => a > b,
        Op::Geq => a >= b,
        _ => false,
    }
}
