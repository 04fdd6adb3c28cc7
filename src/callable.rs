//! Callable runtime objects: native functions, user functions (closures),
//! classes, and instances.
//!
//! A user function captures the environment frame that was current when its
//! declaration executed; every call builds a fresh frame parented there, so
//! recursion and closures fall out of the environment chain.  Classes carry a
//! method table and an optional superclass; method lookup walks the
//! superclass chain.  Instances hold a mutable field map and shadow methods
//! with fields on property access.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::Utc;
use log::debug;

use crate::ast::FunctionDecl;
use crate::environment::Environment;
use crate::error::Result;
use crate::interpreter::{Completion, Interpreter};
use crate::value::Value;

// ───────────────────────────── native functions ─────────────────────────────

/// A host‑provided function exposed as a Lox value.
pub struct NativeFunction<'a> {
    pub name: String,
    pub arity: usize,
    pub func: fn(&[Value<'a>]) -> std::result::Result<Value<'a>, String>,
}

impl std::fmt::Debug for NativeFunction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// `clock()` — milliseconds since the Unix epoch, as a Lox number.
pub fn clock<'a>() -> NativeFunction<'a> {
    NativeFunction {
        name: "clock".to_string(),
        arity: 0,
        func: |_args| Ok(Value::Number(Utc::now().timestamp_millis() as f64)),
    }
}

// ────────────────────────────── user functions ──────────────────────────────

/// A user‑declared function or method plus its captured environment.
#[derive(Debug)]
pub struct LoxFunction<'a> {
    pub declaration: Rc<FunctionDecl<'a>>,
    pub closure: Rc<RefCell<Environment<'a>>>,
    pub is_initializer: bool,
}

impl<'a> LoxFunction<'a> {
    pub fn name(&self) -> &'a str {
        self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Run the body in a fresh frame parented at the closure.  Initializers
    /// always evaluate to the bound `this`, even through a bare `return`.
    pub fn call(
        &self,
        interpreter: &mut Interpreter<'a, '_>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        debug!("Calling <fn {}> with {} args", self.name(), arguments.len());

        let mut frame = Environment::with_enclosing(Rc::clone(&self.closure));

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            frame.define(param.lexeme, argument);
        }

        let completion =
            interpreter.execute_block(&self.declaration.body, Rc::new(RefCell::new(frame)))?;

        if self.is_initializer {
            // `this` sits in the bind() frame, zero hops from the closure.
            return Ok(Environment::get_at(&self.closure, 0, "this"));
        }

        match completion {
            Completion::Return(value) => Ok(value),
            Completion::Normal => Ok(Value::Nil),
        }
    }

    /// Re‑close the function over a one‑entry frame defining `this`.
    pub fn bind(&self, instance: Rc<RefCell<LoxInstance<'a>>>) -> LoxFunction<'a> {
        let mut frame = Environment::with_enclosing(Rc::clone(&self.closure));
        frame.define("this", Value::Instance(instance));

        LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: Rc::new(RefCell::new(frame)),
            is_initializer: self.is_initializer,
        }
    }
}

// ───────────────────────────────── classes ──────────────────────────────────

#[derive(Debug)]
pub struct LoxClass<'a> {
    pub name: String,
    pub superclass: Option<Rc<LoxClass<'a>>>,
    pub methods: HashMap<String, Rc<LoxFunction<'a>>>,
}

impl<'a> LoxClass<'a> {
    /// Method lookup, walking the superclass chain on a local miss.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction<'a>>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }

        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }

    /// A class's call arity is its initializer's arity, or zero without one.
    pub fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }

    /// Calling a class constructs an instance and, if an `init` method
    /// exists, runs it bound to the new instance.
    pub fn call(
        class: &Rc<LoxClass<'a>>,
        interpreter: &mut Interpreter<'a, '_>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        debug!("Instantiating class {}", class.name);

        let instance = Rc::new(RefCell::new(LoxInstance::new(Rc::clone(class))));

        if let Some(init) = class.find_method("init") {
            init.bind(Rc::clone(&instance)).call(interpreter, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

// ──────────────────────────────── instances ─────────────────────────────────

#[derive(Debug)]
pub struct LoxInstance<'a> {
    pub class: Rc<LoxClass<'a>>,
    fields: HashMap<String, Value<'a>>,
}

impl<'a> LoxInstance<'a> {
    pub fn new(class: Rc<LoxClass<'a>>) -> Self {
        LoxInstance {
            class,
            fields: HashMap::new(),
        }
    }

    /// Property read: fields shadow methods; a found method is returned
    /// freshly bound to this instance.  `None` means undefined property.
    pub fn get(instance: &Rc<RefCell<LoxInstance<'a>>>, name: &str) -> Option<Value<'a>> {
        if let Some(field) = instance.borrow().fields.get(name) {
            return Some(field.clone());
        }

        let method = instance.borrow().class.find_method(name);

        method.map(|method| Value::Function(Rc::new(method.bind(Rc::clone(instance)))))
    }

    /// Property write: always succeeds, creating the field if needed.
    pub fn set(&mut self, name: &str, value: Value<'a>) {
        self.fields.insert(name.to_string(), value);
    }
}
