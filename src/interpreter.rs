//! Tree‑walking evaluator.
//!
//! Statements execute for effect and yield a [`Completion`]; `return`
//! surfaces as `Completion::Return(value)` and is threaded back through the
//! enclosing blocks to the function call that absorbs it — control flow is
//! explicit in the return type, nothing unwinds.
//!
//! Expression evaluation is strict left‑to‑right (operands before operators,
//! arguments before the call, object before value in a property write except
//! where noted).  Variable references consult the resolver's hop table; names
//! absent from it are globals, looked up dynamically so mutually recursive
//! top‑level functions work.
//!
//! Runtime errors are fail‑fast: the first one aborts execution and is
//! reported exactly once through the [`RuntimeReporter`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::callable::{self, LoxClass, LoxFunction, LoxInstance};
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::reporter::{OutputSink, RuntimeReporter};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// How a statement finished: fell through, or hit a `return`.
#[derive(Debug)]
pub enum Completion<'a> {
    Normal,
    Return(Value<'a>),
}

pub struct Interpreter<'a, 'io> {
    pub globals: Rc<RefCell<Environment<'a>>>,
    environment: Rc<RefCell<Environment<'a>>>,
    locals: HashMap<ExprId, usize>,
    out: &'io mut dyn OutputSink,
}

impl<'a, 'io> Interpreter<'a, 'io> {
    /// Build an interpreter around a resolved hop table and an output sink.
    /// The global frame starts with the `clock` native defined.
    pub fn new(locals: HashMap<ExprId, usize>, out: &'io mut dyn OutputSink) -> Self {
        info!("Interpreter created ({} resolved locals)", locals.len());

        let globals = Rc::new(RefCell::new(Environment::new()));

        globals
            .borrow_mut()
            .define("clock", Value::NativeFunction(Rc::new(callable::clock())));

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals,
            out,
        }
    }

    /// Run a program.  Stops at the first runtime error and reports it.
    pub fn interpret(&mut self, statements: &[Stmt<'a>], runtime: &mut dyn RuntimeReporter) {
        info!("Beginning interpretation of {} statements", statements.len());

        for statement in statements {
            if let Err(err) = self.execute(statement) {
                match err {
                    LoxError::Runtime { message, line } => runtime.report(&message, line),
                    other => runtime.report(&other.to_string(), 0),
                }

                return;
            }
        }
    }

    // ───────────────────────── statement execution ─────────────────────────

    fn execute(&mut self, statement: &Stmt<'a>) -> Result<Completion<'a>> {
        match statement {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(Completion::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                self.out.emit(&value.to_string());

                Ok(Completion::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(name.lexeme, value);

                Ok(Completion::Normal)
            }

            Stmt::Block(statements) => {
                let frame = Environment::with_enclosing(Rc::clone(&self.environment));

                self.execute_block(statements, Rc::new(RefCell::new(frame)))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Completion::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let ret @ Completion::Return(_) = self.execute(body)? {
                        return Ok(ret);
                    }
                }

                Ok(Completion::Normal)
            }

            Stmt::Function(declaration) => {
                let function = LoxFunction {
                    declaration: Rc::clone(declaration),
                    closure: Rc::clone(&self.environment),
                    is_initializer: false,
                };

                self.environment
                    .borrow_mut()
                    .define(declaration.name.lexeme, Value::Function(Rc::new(function)));

                Ok(Completion::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.evaluate(value)?,
                    None => Value::Nil,
                };

                Ok(Completion::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    /// Execute `statements` inside `frame`, restoring the previous frame on
    /// every exit path.  A `Return` completion stops the block early.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt<'a>],
        frame: Rc<RefCell<Environment<'a>>>,
    ) -> Result<Completion<'a>> {
        let previous = std::mem::replace(&mut self.environment, frame);

        let mut completion = Completion::Normal;

        for statement in statements {
            match self.execute(statement) {
                Ok(Completion::Normal) => {}

                Ok(ret @ Completion::Return(_)) => {
                    completion = ret;
                    break;
                }

                Err(err) => {
                    self.environment = previous;
                    return Err(err);
                }
            }
        }

        self.environment = previous;

        Ok(completion)
    }

    /// Class declaration: two‑step bind (name first, object second) so
    /// methods may refer to the class by name, plus an extra closure frame
    /// holding `super` when there is a superclass.
    fn execute_class(
        &mut self,
        name: &Token<'a>,
        superclass_expr: Option<&Expr<'a>>,
        methods: &[Rc<FunctionDecl<'a>>],
    ) -> Result<Completion<'a>> {
        debug!("Declaring class {}", name.lexeme);

        let superclass = match superclass_expr {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),

                _ => {
                    let at = match expr {
                        Expr::Variable { name, .. } => *name,
                        _ => name,
                    };

                    return Err(LoxError::runtime(at, "Superclass must be a class."));
                }
            },

            None => None,
        };

        self.environment.borrow_mut().define(name.lexeme, Value::Nil);

        let method_closure = if let Some(ref superclass) = superclass {
            let mut frame = Environment::with_enclosing(Rc::clone(&self.environment));
            frame.define("super", Value::Class(Rc::clone(superclass)));

            Rc::new(RefCell::new(frame))
        } else {
            Rc::clone(&self.environment)
        };

        let mut method_table = HashMap::new();

        for method in methods {
            let function = LoxFunction {
                declaration: Rc::clone(method),
                closure: Rc::clone(&method_closure),
                is_initializer: method.name.lexeme == "init",
            };

            method_table.insert(method.name.lexeme.to_string(), Rc::new(function));
        }

        let class = LoxClass {
            name: name.lexeme.to_string(),
            superclass,
            methods: method_table,
        };

        self.environment
            .borrow_mut()
            .assign(name.lexeme, Value::Class(Rc::new(class)));

        Ok(Completion::Normal)
    }

    // ───────────────────────── expression evaluation ────────────────────────

    pub fn evaluate(&mut self, expression: &Expr<'a>) -> Result<Value<'a>> {
        match expression {
            Expr::Literal(literal) => Ok(Value::from_literal(literal)),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;

                match operator.token_type {
                    TokenType::MINUS => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
                    },

                    TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),

                    _ => unreachable!("unary operator {:?}", operator.token_type),
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => self.binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                // Short circuit: yield the deciding operand itself.
                if matches!(operator.token_type, TokenType::OR) {
                    if left.is_truthy() {
                        return Ok(left);
                    }
                } else if !left.is_truthy() {
                    return Ok(left);
                }

                self.evaluate(right)
            }

            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                // Only the taken branch evaluates.
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }

            Expr::Variable { id, name } => self.lookup_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                if let Some(&distance) = self.locals.get(id) {
                    Environment::assign_at(&self.environment, distance, name.lexeme, value.clone());
                } else if !self.globals.borrow_mut().assign(name.lexeme, value.clone()) {
                    return Err(LoxError::runtime(
                        name,
                        format!("Undefined variable '{}'.", name.lexeme),
                    ));
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.call(callee, paren, arguments),

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name.lexeme)
                    .ok_or_else(|| {
                        LoxError::runtime(
                            name,
                            format!("Undefined property '{}'.", name.lexeme),
                        )
                    }),

                _ => Err(LoxError::runtime(name, "Only instances can have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(LoxError::runtime(name, "Only instances have fields."));
                };

                let value = self.evaluate(value)?;

                instance.borrow_mut().set(name.lexeme, value.clone());

                Ok(value)
            }

            Expr::This { id, keyword } => self.lookup_variable(*id, keyword),

            Expr::Super { id, keyword: _, method } => {
                let distance = *self
                    .locals
                    .get(id)
                    .expect("'super' reference resolved before execution");

                let superclass = Environment::get_at(&self.environment, distance, "super");
                // `this` lives one frame inside the `super` frame.
                let this = Environment::get_at(&self.environment, distance - 1, "this");

                let (Value::Class(superclass), Value::Instance(instance)) = (superclass, this)
                else {
                    unreachable!("'super'/'this' frames hold class and instance");
                };

                let found = superclass.find_method(method.lexeme).ok_or_else(|| {
                    LoxError::runtime(
                        method,
                        format!("Undefined property '{}'.", method.lexeme),
                    )
                })?;

                Ok(Value::Function(Rc::new(found.bind(instance))))
            }
        }
    }

    fn binary(
        &mut self,
        left: &Expr<'a>,
        operator: &Token<'a>,
        right: &Expr<'a>,
    ) -> Result<Value<'a>> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => self.arithmetic(left, operator, right, |a, b| a - b),
            TokenType::STAR => self.arithmetic(left, operator, right, |a, b| a * b),
            // IEEE semantics: division by zero yields an infinity, not an error.
            TokenType::SLASH => self.arithmetic(left, operator, right, |a, b| a / b),

            TokenType::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),

                (left, right) => Err(LoxError::runtime(
                    operator,
                    format!(
                        "Both operands must be the same type and both strings or numbers. \
                         Left is {}, right is {}.",
                        left.type_name(),
                        right.type_name()
                    ),
                )),
            },

            TokenType::GREATER => self.comparison(left, operator, right, |a, b| a > b),
            TokenType::GREATER_EQUAL => self.comparison(left, operator, right, |a, b| a >= b),
            TokenType::LESS => self.comparison(left, operator, right, |a, b| a < b),
            TokenType::LESS_EQUAL => self.comparison(left, operator, right, |a, b| a <= b),

            TokenType::BANG_EQUAL => Ok(Value::Bool(!left.is_equal(&right))),
            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left.is_equal(&right))),

            _ => unreachable!("binary operator {:?}", operator.token_type),
        }
    }

    fn arithmetic(
        &self,
        left: Value<'a>,
        operator: &Token<'a>,
        right: Value<'a>,
        op: fn(f64, f64) -> f64,
    ) -> Result<Value<'a>> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(op(a, b))),
            _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
        }
    }

    fn comparison(
        &self,
        left: Value<'a>,
        operator: &Token<'a>,
        right: Value<'a>,
        op: fn(f64, f64) -> bool,
    ) -> Result<Value<'a>> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(op(a, b))),
            _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
        }
    }

    fn call(
        &mut self,
        callee: &Expr<'a>,
        paren: &Token<'a>,
        arguments: &[Expr<'a>],
    ) -> Result<Value<'a>> {
        let callee = self.evaluate(callee)?;

        let mut args = Vec::with_capacity(arguments.len());

        for argument in arguments {
            args.push(self.evaluate(argument)?);
        }

        match callee {
            Value::Function(function) => {
                self.check_arity(function.arity(), args.len(), paren)?;

                function.call(self, args)
            }

            Value::Class(class) => {
                self.check_arity(class.arity(), args.len(), paren)?;

                LoxClass::call(&class, self, args)
            }

            Value::NativeFunction(native) => {
                self.check_arity(native.arity, args.len(), paren)?;

                (native.func)(&args).map_err(|message| LoxError::runtime(paren, message))
            }

            _ => Err(LoxError::runtime(
                paren,
                "Can only call functions and classes.",
            )),
        }
    }

    fn check_arity(&self, expected: usize, got: usize, paren: &Token<'a>) -> Result<()> {
        if expected != got {
            return Err(LoxError::runtime(
                paren,
                format!("Expected {} arguments but got {}.", expected, got),
            ));
        }

        Ok(())
    }

    fn lookup_variable(&self, id: ExprId, name: &Token<'a>) -> Result<Value<'a>> {
        if let Some(&distance) = self.locals.get(&id) {
            return Ok(Environment::get_at(&self.environment, distance, name.lexeme));
        }

        self.globals.borrow().get(name.lexeme).ok_or_else(|| {
            LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
        })
    }
}
