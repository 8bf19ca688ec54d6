use crate::language::ast::{Block, Expr, Field, FuncLit, Literal, Stmt};
use crate::runtime::value::Value;
use std::rc::Rc;

/// One-shot rewrite of a freshly parsed tree:
///
/// 1. every basic literal becomes a folded node carrying a ready-made value,
///    so hot loops never re-lower literal text;
/// 2. `true` / `false` identifiers fold to Bool values;
/// 3. parameter lists flatten to one name per field, promoting the untyped
///    form (`func(a, b)`) out of the type slot.
pub fn preprocess(expr: &mut Expr) {
    match expr {
        Expr::Lit(lit) => {
            let value = literal_value(lit);
            *expr = Expr::Folded(value);
        }
        Expr::Ident(ident) => {
            let folded = match ident.name.as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            };
            if let Some(value) = folded {
                *expr = Expr::Folded(value);
            }
        }
        Expr::Folded(_) => {}
        Expr::FuncLit(lit) => preprocess_func_lit(lit),
        Expr::CompositeLit(lit) => {
            // the type slot holds a type expression, not a value
            for elem in &mut lit.elems {
                preprocess(elem);
            }
        }
        Expr::ArrayType(_) => {}
        Expr::Paren(inner, _) => preprocess(inner),
        Expr::Unary { expr: inner, .. } => preprocess(inner),
        Expr::Binary { x, y, .. } => {
            preprocess(x);
            preprocess(y);
        }
        Expr::Call { fun, args, .. } => {
            preprocess(fun);
            for arg in args {
                preprocess(arg);
            }
        }
        Expr::Index { x, index, .. } => {
            preprocess(x);
            preprocess(index);
        }
    }
}

pub(crate) fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Int(value, _) => Value::Int(*value),
        Literal::Float(value, _) => Value::Float(*value),
        Literal::Char(value, _) => Value::Str(value.to_string()),
        Literal::Str(value, _) => Value::Str(value.clone()),
    }
}

fn preprocess_func_lit(lit: &mut Rc<FuncLit>) {
    let lit = Rc::make_mut(lit);
    lit.typ.params = flatten_params(std::mem::take(&mut lit.typ.params));
    preprocess_block(&mut lit.body);
}

// (a, b, c T) and (a, b) both become one-name-per-field entries.
fn flatten_params(fields: Vec<Field>) -> Vec<Field> {
    let mut flat = Vec::with_capacity(fields.len());
    for field in fields {
        let Field { names, typ, span } = field;

        if names.is_empty() {
            // untyped form, the lone identifier sits in the type slot
            if let Some(Expr::Ident(ident)) = typ {
                flat.push(Field {
                    names: vec![ident],
                    typ: None,
                    span,
                });
            } else {
                flat.push(Field { names, typ, span });
            }
            continue;
        }

        if names.len() == 1 {
            flat.push(Field { names, typ, span });
            continue;
        }

        for name in names {
            flat.push(Field {
                names: vec![name],
                typ: typ.clone(),
                span,
            });
        }
    }
    flat
}

fn preprocess_block(block: &mut Block) {
    for stmt in &mut block.stmts {
        preprocess_stmt(stmt);
    }
}

fn preprocess_stmt(stmt: &mut Stmt) {
    match stmt {
        Stmt::Decl(decl) => {
            for value in &mut decl.spec.values {
                preprocess(value);
            }
        }
        Stmt::Assign(assign) => {
            for target in &mut assign.lhs {
                preprocess(target);
            }
            for value in &mut assign.rhs {
                preprocess(value);
            }
        }
        Stmt::IncDec(incdec) => preprocess(&mut incdec.expr),
        Stmt::Expr(expr) => preprocess(expr),
        Stmt::Block(block) => preprocess_block(block),
        Stmt::If(stmt) => {
            if let Some(init) = &mut stmt.init {
                preprocess_stmt(init);
            }
            preprocess(&mut stmt.cond);
            preprocess_block(&mut stmt.body);
            if let Some(else_branch) = &mut stmt.else_branch {
                preprocess_stmt(else_branch);
            }
        }
        Stmt::For(stmt) => {
            if let Some(init) = &mut stmt.init {
                preprocess_stmt(init);
            }
            if let Some(cond) = &mut stmt.cond {
                preprocess(cond);
            }
            if let Some(post) = &mut stmt.post {
                preprocess_stmt(post);
            }
            preprocess_block(&mut stmt.body);
        }
        Stmt::Range(stmt) => {
            preprocess(&mut stmt.x);
            preprocess_block(&mut stmt.body);
        }
        Stmt::Return(ret) => {
            for result in &mut ret.results {
                preprocess(result);
            }
        }
        Stmt::Branch(_) => {}
    }
}
