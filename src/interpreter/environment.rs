use crate::interpreter::lox_value::LoxValue;
use crate::interpreter::tree_walker::RuntimeError;
use crate::scanner::Token;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A single link in the lexical scope chain.
///
/// Environments are shared: every function value holds on to the environment
/// that was active at its declaration site, and bound methods chain extra
/// scopes on top of that. Links are therefore reference-counted, with the
/// name map behind a `RefCell`.
#[derive(Debug, Default)]
pub struct Environment {
    enclosing: Option<Rc<RefCell<Environment>>>,
    values: HashMap<String, LoxValue>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh environment chained onto `enclosing`.
    pub(in crate::interpreter) fn nested(
        enclosing: Rc<RefCell<Environment>>,
    ) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Self {
            enclosing: Some(enclosing),
            values: HashMap::new(),
        }))
    }

    pub(in crate::interpreter) fn define(&mut self, name: impl Into<String>, value: LoxValue) {
        self.values.insert(name.into(), value);
    }

    /// Dynamic lookup: walk the chain until the name is found.
    pub(in crate::interpreter) fn get(&self, name: &Token) -> Result<LoxValue, RuntimeError> {
        if let Some(value) = self.values.get(name.lexeme()) {
            return Ok(value.clone());
        }
        match &self.enclosing {
            Some(enclosing) => enclosing.borrow().get(name),
            None => Err(RuntimeError::undefined_variable(name)),
        }
    }

    /// Dynamic assignment: walk the chain until the name is found.
    pub(in crate::interpreter) fn assign(
        &mut self,
        name: &Token,
        value: LoxValue,
    ) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(name.lexeme()) {
            *slot = value;
            return Ok(());
        }
        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign(name, value),
            None => Err(RuntimeError::undefined_variable(name)),
        }
    }

    /// Resolved lookup: hop exactly `depth` links, no search.
    /// The resolver guarantees the name is bound there.
    pub(in crate::interpreter) fn get_at(
        environment: &Rc<RefCell<Environment>>,
        depth: usize,
        name: &str,
    ) -> LoxValue {
        Self::ancestor(environment, depth)
            .borrow()
            .values
            .get(name)
            .cloned()
            .expect("A resolved variable is missing from its environment. This is an interpreter bug.")
    }

    /// Resolved assignment: hop exactly `depth` links, no search.
    pub(in crate::interpreter) fn assign_at(
        environment: &Rc<RefCell<Environment>>,
        depth: usize,
        name: &str,
        value: LoxValue,
    ) {
        Self::ancestor(environment, depth)
            .borrow_mut()
            .values
            .insert(name.to_string(), value);
    }

    fn ancestor(environment: &Rc<RefCell<Environment>>, depth: usize) -> Rc<RefCell<Environment>> {
        let mut environment = Rc::clone(environment);
        for _ in 0..depth {
            let enclosing = environment
                .borrow()
                .enclosing
                .clone()
                .expect("The scope chain is shorter than a resolved depth. This is an interpreter bug.");
            environment = enclosing;
        }
        environment
    }
}
