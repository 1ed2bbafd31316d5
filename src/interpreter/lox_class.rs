use crate::interpreter::lox_callable::{LoxCallable, LoxFunction};
use crate::interpreter::lox_value::LoxValue;
use crate::interpreter::tree_walker::{Interpreter, RuntimeError};
use crate::scanner::Token;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

#[derive(Debug)]
pub(in crate::interpreter) struct LoxClass {
    name: String,
    superclass: Option<Rc<LoxClass>>,
    methods: HashMap<String, LoxFunction>,
}

impl LoxClass {
    pub fn new(
        name: impl Into<String>,
        superclass: Option<Rc<LoxClass>>,
        methods: HashMap<String, LoxFunction>,
    ) -> Self {
        Self {
            name: name.into(),
            superclass,
            methods,
        }
    }

    /// Look a method up on this class, then on its ancestors.
    pub fn find_method(&self, name: &str) -> Option<&LoxFunction> {
        self.methods
            .get(name)
            .or_else(|| self.superclass.as_ref()?.find_method(name))
    }

    /// A class's arity is its initializer's, inherited or not.
    pub fn arity(&self) -> u8 {
        self.find_method("init")
            .map(|initializer| initializer.arity())
            .unwrap_or(0)
    }

    /// Calling a class builds an instance and runs `init` on it, when one
    /// exists anywhere on the inheritance chain.
    pub fn instantiate(
        class: &Rc<LoxClass>,
        interpreter: &mut Interpreter<'_>,
        arguments: Vec<LoxValue>,
    ) -> Result<LoxValue, RuntimeError> {
        let instance = Rc::new(RefCell::new(LoxInstance::new(Rc::clone(class))));
        if let Some(initializer) = class.find_method("init") {
            initializer
                .bind(Rc::clone(&instance))
                .call(interpreter, arguments)?;
        }
        Ok(LoxValue::Instance(instance))
    }
}

impl Display for LoxClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug)]
pub(in crate::interpreter) struct LoxInstance {
    class: Rc<LoxClass>,
    fields: HashMap<String, LoxValue>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    /// Fields shadow methods; methods come back bound to this instance.
    pub fn get(
        instance: &Rc<RefCell<LoxInstance>>,
        name: &Token,
    ) -> Result<LoxValue, RuntimeError> {
        if let Some(value) = instance.borrow().fields.get(name.lexeme()) {
            return Ok(value.clone());
        }
        if let Some(method) = instance.borrow().class.find_method(name.lexeme()) {
            return Ok(LoxValue::Function(Rc::new(method.bind(Rc::clone(instance)))));
        }
        Err(RuntimeError::undefined_property(name))
    }

    pub fn set(&mut self, name: &Token, value: LoxValue) {
        self.fields.insert(name.lexeme().to_string(), value);
    }
}

impl Display for LoxInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} instance", self.class.name)
    }
}
