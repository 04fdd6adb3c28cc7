//! Static resolution pass between parsing and interpretation.
//!
//! Walks the statement tree once, maintaining a stack of compile‑time scopes
//! (name → "finished initializing" flag), and produces a side table mapping
//! each variable‑reference node id to the number of environment hops between
//! its use site and its declaration.  References that resolve to no scope are
//! left out of the table and fall through to the global frame at runtime.
//!
//! The same walk rejects programs that are syntactically valid but
//! statically ill‑formed: reading a local inside its own initializer,
//! redeclaring a local, `return` outside a function, returning a value from
//! an `init` method, `this`/`super` outside a class, `super` without a
//! superclass, and self‑inheritance.  All violations are reported through
//! the [`ErrorReporter`]; the pass never stops at the first one.

use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::reporter::ErrorReporter;
use crate::token::Token;

/// Hop counts for resolved variable references, keyed by node id.
pub type Locals = HashMap<ExprId, usize>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

pub struct Resolver<'a, 'r> {
    /// Innermost scope last.  `false` = declared but not yet initialized.
    scopes: Vec<HashMap<&'a str, bool>>,
    locals: Locals,
    current_function: FunctionType,
    current_class: ClassType,
    reporter: &'r mut dyn ErrorReporter,
}

impl<'a, 'r> Resolver<'a, 'r> {
    pub fn new(reporter: &'r mut dyn ErrorReporter) -> Self {
        Self {
            scopes: Vec::new(),
            locals: Locals::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            reporter,
        }
    }

    /// Resolve a whole program and hand back the side table.  Check the
    /// reporter's `had_error` flag before trusting the result.
    pub fn resolve(mut self, statements: &[Stmt<'a>]) -> Locals {
        info!("Beginning resolution phase");

        self.resolve_statements(statements);

        debug!("Resolved {} local references", self.locals.len());

        self.locals
    }

    // ───────────────────────── statement walk ─────────────────────────

    fn resolve_statements(&mut self, statements: &[Stmt<'a>]) {
        for statement in statements {
            self.resolve_statement(statement);
        }
    }

    fn resolve_statement(&mut self, statement: &Stmt<'a>) {
        match statement {
            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expression(expr),

            Stmt::Var { name, initializer } => {
                self.declare(name);

                if let Some(initializer) = initializer {
                    self.resolve_expression(initializer);
                }

                self.define(name);
            }

            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_statements(statements);
                self.end_scope();
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expression(condition);
                self.resolve_statement(then_branch);

                if let Some(else_branch) = else_branch {
                    self.resolve_statement(else_branch);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expression(condition);
                self.resolve_statement(body);
            }

            Stmt::Function(declaration) => {
                // Defined eagerly so the body may recurse into the name.
                self.declare(declaration.name);
                self.define(declaration.name);

                self.resolve_function(declaration, FunctionType::Function);
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.reporter
                        .error_at(keyword, "Can't return from top-level code.");
                }

                if let Some(value) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.reporter
                            .error_at(keyword, "Can't return from an initialiser.");
                    }

                    self.resolve_expression(value);
                }
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods),
        }
    }

    fn resolve_class(
        &mut self,
        name: &Token<'a>,
        superclass: Option<&Expr<'a>>,
        methods: &[Rc<FunctionDecl<'a>>],
    ) {
        let enclosing_class = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(name);
        self.define(name);

        if let Some(superclass) = superclass {
            if let Expr::Variable {
                name: superclass_name,
                ..
            } = superclass
            {
                if superclass_name.lexeme == name.lexeme {
                    self.reporter
                        .error_at(superclass_name, "A class can't inherit from itself.");
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expression(superclass);

            // Methods of a subclass close over a scope holding `super`.
            self.begin_scope();
            self.scopes
                .last_mut()
                .expect("scope just pushed")
                .insert("super", true);
        }

        self.begin_scope();
        self.scopes
            .last_mut()
            .expect("scope just pushed")
            .insert("this", true);

        for method in methods {
            let declaration = if method.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };

            self.resolve_function(method, declaration);
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_function(&mut self, declaration: &FunctionDecl<'a>, function_type: FunctionType) {
        let enclosing_function = self.current_function;
        self.current_function = function_type;

        self.begin_scope();

        for param in &declaration.params {
            self.declare(param);
            self.define(param);
        }

        self.resolve_statements(&declaration.body);

        self.end_scope();

        self.current_function = enclosing_function;
    }

    // ───────────────────────── expression walk ────────────────────────

    fn resolve_expression(&mut self, expression: &Expr<'a>) {
        match expression {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expression(inner),

            Expr::Unary { right, .. } => self.resolve_expression(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expression(left);
                self.resolve_expression(right);
            }

            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expression(condition);
                self.resolve_expression(then_branch);
                self.resolve_expression(else_branch);
            }

            Expr::Variable { id, name } => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(name.lexeme) == Some(&false) {
                        self.reporter.error_at(
                            name,
                            "Can't read local variable in its own initialiser.",
                        );
                    }
                }

                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                self.resolve_expression(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expression(callee);

                for argument in arguments {
                    self.resolve_expression(argument);
                }
            }

            Expr::Get { object, .. } => self.resolve_expression(object),

            Expr::Set { object, value, .. } => {
                self.resolve_expression(value);
                self.resolve_expression(object);
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    self.reporter
                        .error_at(keyword, "Can't use 'this' outside of a class.");
                    return;
                }

                self.resolve_local(*id, keyword);
            }

            Expr::Super { id, keyword, .. } => {
                match self.current_class {
                    ClassType::None => {
                        self.reporter
                            .error_at(keyword, "Can't use 'super' outside of a class.");
                    }

                    ClassType::Class => {
                        self.reporter.error_at(
                            keyword,
                            "Can't use 'super' in a class with no superclass.",
                        );
                    }

                    ClassType::Subclass => {}
                }

                self.resolve_local(*id, keyword);
            }
        }
    }

    // ───────────────────────── scope bookkeeping ──────────────────────

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Reserve `name` in the innermost scope, unfinished.  Globals are not
    /// tracked, so redeclaration is only an error inside a local scope.
    fn declare(&mut self, name: &Token<'a>) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };

        if scope.contains_key(name.lexeme) {
            self.reporter
                .error_at(name, "Already a variable with this name in this scope.");
        }

        scope.insert(name.lexeme, false);
    }

    /// Mark `name`'s initializer as finished.
    fn define(&mut self, name: &Token<'a>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme, true);
        }
    }

    /// Record the hop count from the use site to the declaring scope.  A
    /// miss in every scope means the reference targets the global frame.
    fn resolve_local(&mut self, id: ExprId, name: &Token<'a>) {
        for (hops, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name.lexeme) {
                debug!("Resolved '{}' at {} hops", name.lexeme, hops);
                self.locals.insert(id, hops);
                return;
            }
        }
    }
}
