//! Lexically nested variable environments.
//!
//! Environments form a parent chain of `Rc<RefCell<_>>` frames: one global
//! frame at the root, one frame per block or function call.  Closures hold an
//! `Rc` to the frame that was current at declaration time, which keeps
//! captured frames alive after the declaring scope exits.
//!
//! The `*_at` accessors jump a resolver‑computed number of hops up the chain
//! and touch exactly that frame, never searching.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

#[derive(Debug, Default)]
pub struct Environment<'a> {
    values: HashMap<String, Value<'a>>,
    enclosing: Option<Rc<RefCell<Environment<'a>>>>,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment<'a>>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Bind (or rebind) `name` in this frame.  Redefinition in the global
    /// frame is legal and silently replaces the old value.
    pub fn define(&mut self, name: &str, value: Value<'a>) {
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up through the chain.  `None` means undefined; the caller
    /// owns turning that into a runtime error with the right token.
    pub fn get(&self, name: &str) -> Option<Value<'a>> {
        if let Some(value) = self.values.get(name) {
            Some(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            None
        }
    }

    /// Assign to an existing binding somewhere in the chain.  Returns `false`
    /// if no frame defines `name`; assignment never creates bindings.
    pub fn assign(&mut self, name: &str, value: Value<'a>) -> bool {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            true
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            false
        }
    }

    /// The frame exactly `distance` hops up from `env`.
    fn ancestor(
        env: &Rc<RefCell<Environment<'a>>>,
        distance: usize,
    ) -> Rc<RefCell<Environment<'a>>> {
        let mut frame = Rc::clone(env);

        for _ in 0..distance {
            let parent = frame
                .borrow()
                .enclosing
                .clone()
                .expect("resolved hop count exceeds environment depth");
            frame = parent;
        }

        frame
    }

    /// Read a binding the resolver located `distance` hops up.  The binding
    /// is guaranteed to exist there; a miss is a resolver bug.
    pub fn get_at(env: &Rc<RefCell<Environment<'a>>>, distance: usize, name: &str) -> Value<'a> {
        Environment::ancestor(env, distance)
            .borrow()
            .values
            .get(name)
            .cloned()
            .expect("resolved variable missing from its frame")
    }

    /// Write a binding the resolver located `distance` hops up.
    pub fn assign_at(
        env: &Rc<RefCell<Environment<'a>>>,
        distance: usize,
        name: &str,
        value: Value<'a>,
    ) {
        Environment::ancestor(env, distance)
            .borrow_mut()
            .values
            .insert(name.to_string(), value);
    }
}
