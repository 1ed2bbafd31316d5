use crate::interpreter::environment::Environment;
use crate::interpreter::lox_class::LoxInstance;
use crate::interpreter::lox_value::LoxValue;
use crate::interpreter::tree_walker::{Interpreter, RuntimeError, RuntimeErrorOrReturn};
use crate::parser::ast::FunctionDeclarationStatement;
use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::iter::zip;
use std::rc::Rc;

pub(in crate::interpreter) trait LoxCallable {
    fn arity(&self) -> u8;
    fn call(
        &self,
        interpreter: &mut Interpreter<'_>,
        arguments: Vec<LoxValue>,
    ) -> Result<LoxValue, RuntimeError>;
}

/// A user-defined function: its declaration plus the environment that was
/// active at the declaration site.
#[derive(Debug)]
pub(in crate::interpreter) struct LoxFunction {
    declaration: Rc<FunctionDeclarationStatement>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        declaration: Rc<FunctionDeclarationStatement>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    /// A copy of this function whose closure gains a scope binding `this`
    /// to the given instance.
    pub fn bind(&self, instance: Rc<RefCell<LoxInstance>>) -> LoxFunction {
        let environment = Environment::nested(Rc::clone(&self.closure));
        environment
            .borrow_mut()
            .define("this", LoxValue::Instance(instance));
        LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: environment,
            is_initializer: self.is_initializer,
        }
    }

    fn this_from_closure(&self) -> LoxValue {
        Environment::get_at(&self.closure, 0, "this")
    }
}

impl LoxCallable for LoxFunction {
    fn arity(&self) -> u8 {
        // Safe because the parser enforces that we do not have more than 255 parameters
        self.declaration.parameters.len() as u8
    }

    fn call(
        &self,
        interpreter: &mut Interpreter<'_>,
        arguments: Vec<LoxValue>,
    ) -> Result<LoxValue, RuntimeError> {
        let environment = Environment::nested(Rc::clone(&self.closure));
        for (parameter, argument) in zip(self.declaration.parameters.iter(), arguments) {
            environment.borrow_mut().define(parameter.lexeme(), argument);
        }
        // `Return` is converted back into a plain value right here: it never
        // crosses a call boundary.
        match interpreter.execute_block(&self.declaration.body, environment) {
            Err(RuntimeErrorOrReturn::RuntimeError(e)) => Err(e),
            Err(RuntimeErrorOrReturn::Return(value)) => {
                // An initializer always hands back its instance, whatever the
                // body did.
                if self.is_initializer {
                    Ok(self.this_from_closure())
                } else {
                    Ok(value.0)
                }
            }
            Ok(()) => {
                if self.is_initializer {
                    Ok(self.this_from_closure())
                } else {
                    Ok(LoxValue::Null)
                }
            }
        }
    }
}

impl Display for LoxFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme())
    }
}

/// A function provided by the interpreter itself rather than by Lox code.
#[derive(Debug)]
pub(in crate::interpreter) struct NativeFunction {
    name: &'static str,
    arity: u8,
    function: fn(&[LoxValue]) -> Result<LoxValue, RuntimeError>,
}

impl NativeFunction {
    pub fn new(
        name: &'static str,
        arity: u8,
        function: fn(&[LoxValue]) -> Result<LoxValue, RuntimeError>,
    ) -> Self {
        Self {
            name,
            arity,
            function,
        }
    }

    /// The name this function is registered under in the globals environment.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl LoxCallable for NativeFunction {
    fn arity(&self) -> u8 {
        self.arity
    }

    fn call(
        &self,
        _interpreter: &mut Interpreter<'_>,
        arguments: Vec<LoxValue>,
    ) -> Result<LoxValue, RuntimeError> {
        (self.function)(&arguments)
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn>")
    }
}
