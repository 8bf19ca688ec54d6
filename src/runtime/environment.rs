use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// One lexical scope: a name→value frame with a parent link. Cloning an
/// `Environment` clones the handle, not the frame, which is what lets
/// function values capture their defining scope.
#[derive(Clone)]
pub struct Environment {
    inner: Rc<RefCell<Frame>>,
}

struct Frame {
    label: &'static str,
    bindings: HashMap<String, Value>,
    parent: Option<Environment>,
    debug: bool,
}

impl Environment {
    pub fn new(label: &'static str, debug: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Frame {
                label,
                bindings: HashMap::new(),
                parent: None,
                debug,
            })),
        }
    }

    /// Opens a new frame whose parent is this one.
    pub fn child(&self, label: &'static str) -> Environment {
        let debug = self.inner.borrow().debug;
        Environment {
            inner: Rc::new(RefCell::new(Frame {
                label,
                bindings: HashMap::new(),
                parent: Some(self.clone()),
                debug,
            })),
        }
    }

    /// Looks a name up through the frame chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        let frame = self.inner.borrow();
        if let Some(value) = frame.bindings.get(name) {
            return Some(value.clone());
        }
        frame.parent.as_ref().and_then(|parent| parent.get(name))
    }

    /// The `:=` contract: binds in this frame, shadowing outer frames, but
    /// never rebinding a name this frame already holds.
    pub fn define(&self, name: &str, value: Value) -> RuntimeResult<()> {
        let debug = {
            let mut frame = self.inner.borrow_mut();
            if frame.bindings.contains_key(name) {
                return Err(RuntimeError::Reassignment {
                    name: name.to_string(),
                });
            }
            frame.bindings.insert(name.to_string(), value);
            frame.debug
        };
        if debug {
            eprintln!("set context {} | {}", name, self);
        }
        Ok(())
    }

    /// The `=` contract: overwrites the nearest frame up the chain that
    /// binds the name.
    pub fn update(&self, name: &str, value: Value) -> RuntimeResult<()> {
        let (found, debug) = {
            let mut frame = self.inner.borrow_mut();
            match frame.bindings.get_mut(name) {
                Some(slot) => {
                    *slot = value;
                    (Ok(()), frame.debug)
                }
                None => match frame.parent.clone() {
                    Some(parent) => {
                        drop(frame);
                        return parent.update(name, value);
                    }
                    None => {
                        return Err(RuntimeError::UnknownName {
                            name: name.to_string(),
                        });
                    }
                },
            }
        };
        if debug {
            eprintln!("update context {} | {}", name, self);
        }
        found
    }

    /// Unconditional insert into this frame; used for parameter binding and
    /// per-iteration range variables.
    pub(crate) fn bind(&self, name: &str, value: Value) {
        let debug = {
            let mut frame = self.inner.borrow_mut();
            frame.bindings.insert(name.to_string(), value);
            frame.debug
        };
        if debug {
            eprintln!("bind context {} | {}", name, self);
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.inner.borrow();
        let mut entries: Vec<String> = frame
            .bindings
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect();
        entries.sort();
        write!(f, "{} {{{}}}", frame.label, entries.join(" | "))
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment({})", self.inner.borrow().label)
    }
}
