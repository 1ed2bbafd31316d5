use crate::parser::ast::{
    ClassDeclarationStatement, Expression, ExpressionId, FunctionDeclarationStatement, Statement,
    VariableReferenceExpression,
};
use crate::resolver::scopes::ScopeStack;
use crate::scanner::Token;
use std::collections::HashMap;

/// Scope depth for every variable use the resolver managed to pin down,
/// keyed by expression identity. Expressions without an entry refer to
/// globals and are looked up dynamically at runtime.
pub type Locals = HashMap<ExpressionId, usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassKind {
    None,
    Class,
}

/// Static pass over a parsed program: binds every variable, `this` and
/// `super` use to a lexical scope depth and rejects the handful of
/// constructs that can be ruled out without running the code.
pub struct Resolver {
    scopes: ScopeStack,
    locals: Locals,
    current_function: FunctionKind,
    current_class: ClassKind,
}

impl Resolver {
    pub fn resolve(statements: &[Statement]) -> Result<Locals, anyhow::Error> {
        let mut resolver = Self {
            scopes: ScopeStack::new(),
            locals: Locals::new(),
            current_function: FunctionKind::None,
            current_class: ClassKind::None,
        };
        resolver.resolve_statements(statements)?;
        Ok(resolver.locals)
    }

    fn resolve_statements(&mut self, statements: &[Statement]) -> Result<(), anyhow::Error> {
        for statement in statements {
            // The first error aborts the whole pass.
            self.resolve_statement(statement)?;
        }
        Ok(())
    }

    fn resolve_statement(&mut self, statement: &Statement) -> Result<(), anyhow::Error> {
        match statement {
            Statement::Expression(e) => self.resolve_expression(&e.0),
            Statement::Print(p) => self.resolve_expression(&p.0),
            Statement::VariableDeclaration(v) => {
                self.declare(&v.identifier)?;
                if let Some(initializer) = &v.initializer {
                    self.resolve_expression(initializer)?;
                }
                self.scopes.define(v.identifier.lexeme());
                Ok(())
            }
            Statement::FunctionDeclaration(f) => {
                // The name is usable before the body resolves, so functions
                // can recurse.
                self.declare(&f.name)?;
                self.scopes.define(f.name.lexeme());
                self.resolve_function(f, FunctionKind::Function)
            }
            Statement::ClassDeclaration(c) => self.resolve_class(c),
            Statement::Block(b) => {
                let guard = self.scopes.enter_scope();
                let outcome = self.resolve_statements(&b.0);
                self.scopes.exit_scope(guard);
                outcome
            }
            Statement::IfElse(ifelse) => {
                self.resolve_expression(&ifelse.condition)?;
                self.resolve_statement(&ifelse.if_branch)?;
                if let Some(else_branch) = &ifelse.else_branch {
                    self.resolve_statement(else_branch)?;
                }
                Ok(())
            }
            Statement::While(w) => {
                self.resolve_expression(&w.condition)?;
                // Any statement is accepted as the loop body, whether or not
                // the parser produced a block (hand-built trees may not).
                self.resolve_statement(&w.body)
            }
            Statement::Return(r) => {
                if self.current_function == FunctionKind::None {
                    return Err(static_error(
                        &r.keyword,
                        "Cannot return from top-level code.",
                    ));
                }
                if let Some(value) = &r.value {
                    if self.current_function == FunctionKind::Initializer {
                        return Err(static_error(
                            &r.keyword,
                            "Cannot return a value from an initializer.",
                        ));
                    }
                    self.resolve_expression(value)?;
                }
                Ok(())
            }
        }
    }

    fn resolve_expression(&mut self, expression: &Expression) -> Result<(), anyhow::Error> {
        match expression {
            Expression::Binary(b) => {
                self.resolve_expression(&b.left)?;
                self.resolve_expression(&b.right)
            }
            Expression::Logical(l) => {
                self.resolve_expression(&l.left)?;
                self.resolve_expression(&l.right)
            }
            Expression::Unary(u) => self.resolve_expression(&u.operand),
            Expression::Literal(_) => Ok(()),
            Expression::Grouping(g) => self.resolve_expression(&g.0),
            Expression::VariableReference(v) => self.resolve_variable_reference(v),
            Expression::VariableAssignment(a) => {
                self.resolve_expression(&a.value)?;
                self.resolve_local(a.id, a.identifier.lexeme());
                Ok(())
            }
            Expression::Call(c) => {
                self.resolve_expression(&c.callee)?;
                c.arguments
                    .iter()
                    .try_for_each(|argument| self.resolve_expression(argument))
            }
            Expression::PropertyGet(g) => self.resolve_expression(&g.object),
            Expression::PropertySet(s) => {
                self.resolve_expression(&s.value)?;
                self.resolve_expression(&s.object)
            }
            Expression::This(t) => {
                if self.current_class == ClassKind::None {
                    return Err(static_error(
                        &t.keyword,
                        "Cannot use 'this' outside of a class.",
                    ));
                }
                self.resolve_local(t.id, t.keyword.lexeme());
                Ok(())
            }
            Expression::Super(s) => {
                self.resolve_local(s.id, s.keyword.lexeme());
                Ok(())
            }
        }
    }

    fn resolve_variable_reference(
        &mut self,
        variable: &VariableReferenceExpression,
    ) -> Result<(), anyhow::Error> {
        if self
            .scopes
            .shadows_own_initializer(variable.identifier.lexeme())
        {
            return Err(static_error(
                &variable.identifier,
                "Cannot read local variable in its own initializer.",
            ));
        }
        self.resolve_local(variable.id, variable.identifier.lexeme());
        Ok(())
    }

    fn resolve_class(&mut self, class: &ClassDeclarationStatement) -> Result<(), anyhow::Error> {
        let enclosing_class = std::mem::replace(&mut self.current_class, ClassKind::Class);
        let outcome = self.resolve_class_parts(class);
        self.current_class = enclosing_class;
        outcome
    }

    fn resolve_class_parts(
        &mut self,
        class: &ClassDeclarationStatement,
    ) -> Result<(), anyhow::Error> {
        self.declare(&class.name)?;
        self.scopes.define(class.name.lexeme());

        if let Some(superclass) = &class.superclass {
            if superclass.identifier.lexeme() == class.name.lexeme() {
                return Err(static_error(
                    &superclass.identifier,
                    "A class cannot inherit from itself.",
                ));
            }
            self.resolve_variable_reference(superclass)?;
        }

        // Methods of a subclass close over a scope holding `super`, and every
        // method closes over a scope holding `this`; mirror those scopes here
        // so depths line up with the environments built at runtime.
        let super_guard = class.superclass.as_ref().map(|_| {
            let guard = self.scopes.enter_scope();
            self.scopes.define("super");
            guard
        });

        let this_guard = self.scopes.enter_scope();
        self.scopes.define("this");

        let outcome = class.methods.iter().try_for_each(|method| {
            let kind = if method.name.lexeme() == "init" {
                FunctionKind::Initializer
            } else {
                FunctionKind::Method
            };
            self.resolve_function(method, kind)
        });

        self.scopes.exit_scope(this_guard);
        if let Some(guard) = super_guard {
            self.scopes.exit_scope(guard);
        }
        outcome
    }

    fn resolve_function(
        &mut self,
        function: &FunctionDeclarationStatement,
        kind: FunctionKind,
    ) -> Result<(), anyhow::Error> {
        let enclosing_function = std::mem::replace(&mut self.current_function, kind);
        let guard = self.scopes.enter_scope();
        let outcome = self.resolve_function_parts(function);
        self.scopes.exit_scope(guard);
        self.current_function = enclosing_function;
        outcome
    }

    fn resolve_function_parts(
        &mut self,
        function: &FunctionDeclarationStatement,
    ) -> Result<(), anyhow::Error> {
        for parameter in &function.parameters {
            self.declare(parameter)?;
            self.scopes.define(parameter.lexeme());
        }
        self.resolve_statements(&function.body)
    }

    fn resolve_local(&mut self, id: ExpressionId, name: &str) {
        if let Some(depth) = self.scopes.depth_of(name) {
            self.locals.insert(id, depth);
        }
        // Not found: assumed global, looked up dynamically at runtime.
    }

    fn declare(&mut self, name: &Token) -> Result<(), anyhow::Error> {
        if !self.scopes.declare(name.lexeme()) {
            return Err(static_error(
                name,
                "Variable with this name already declared in this scope.",
            ));
        }
        Ok(())
    }
}

fn static_error(token: &Token, message: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "[line {}] Error at '{}': {}",
        token.line(),
        token.lexeme(),
        message
    )
}
