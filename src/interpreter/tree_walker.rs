use crate::interpreter::environment::Environment;
use crate::interpreter::lox_callable::{LoxCallable, LoxFunction, NativeFunction};
use crate::interpreter::lox_class::{LoxClass, LoxInstance};
use crate::interpreter::lox_value::LoxValue;
use crate::parser::ast::{
    BinaryExpression, BlockStatement, ClassDeclarationStatement, Expression, ExpressionId,
    ExpressionIdGenerator, ExpressionStatement, LiteralExpression, LogicalExpression,
    PrintStatement, ReturnStatement, Statement, UnaryExpression, VariableDeclarationStatement,
    WhileStatement,
};
use crate::parser::{ParseError, Parser};
use crate::resolver::{Locals, Resolver};
use crate::scanner::{Scanner, Token, TokenDiscriminant};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct Interpreter<'a> {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: Locals,
    expression_ids: ExpressionIdGenerator,
    output_stream: Box<dyn Write + 'a>,
}

impl<'a> Interpreter<'a> {
    pub fn new<OutputStream>(output: OutputStream) -> Self
    where
        OutputStream: Write + 'a,
    {
        let globals = Rc::new(RefCell::new(Environment::new()));
        let clock = NativeFunction::new("clock", 0, |_| {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|_| RuntimeError::native_failure("clock", "The system clock predates the Unix epoch."))?;
            Ok(LoxValue::Number(now.as_millis() as f64))
        });
        globals
            .borrow_mut()
            .define(clock.name(), LoxValue::NativeFunction(Rc::new(clock)));
        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: Locals::new(),
            expression_ids: ExpressionIdGenerator::new(),
            output_stream: Box::new(output),
        }
    }

    /// Scan, parse, resolve and then execute a Lox source file.
    ///
    /// Each stage runs only if the previous one succeeded; the returned error
    /// carries the diagnostics of the stage that failed.
    pub fn execute_raw(&mut self, source: &str) -> Result<(), ExecuteRawError> {
        let statements = Parser::parse(Scanner::new(source), &mut self.expression_ids)
            .map_err(ExecuteRawError::ParserErrors)?;
        let locals = Resolver::resolve(&statements).map_err(ExecuteRawError::NameResolutionError)?;
        // Function values may outlive this batch (the REPL keeps the
        // interpreter around), so resolved depths accumulate instead of
        // replacing each other.
        self.locals.extend(locals);
        self.batch_execute(&statements)
            .map_err(ExecuteRawError::RuntimeError)
    }

    /// Execute a series of statements.
    /// It exits as soon as a runtime error is encountered.
    pub(crate) fn batch_execute(&mut self, statements: &[Statement]) -> Result<(), RuntimeError> {
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    /// Execute a single Lox statement.
    pub(crate) fn execute(&mut self, statement: &Statement) -> Result<(), RuntimeError> {
        self._execute(statement).map_err(|e| match e {
            RuntimeErrorOrReturn::RuntimeError(e) => e,
            RuntimeErrorOrReturn::Return(_) => RuntimeError::unexpected_return(),
        })
    }

    /// Execute a sequence of statements against a fresh environment.
    ///
    /// The previous environment comes back no matter how execution exits:
    /// runtime errors and `return` both travel through the `Err` channel, so
    /// a swap-in/swap-out around the loop covers every path.
    pub(in crate::interpreter) fn execute_block(
        &mut self,
        statements: &[Statement],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<(), RuntimeErrorOrReturn> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let outcome = statements
            .iter()
            .try_for_each(|statement| self._execute(statement));
        self.environment = previous;
        outcome
    }

    fn _execute(&mut self, s: &Statement) -> Result<(), RuntimeErrorOrReturn> {
        match s {
            Statement::Expression(ExpressionStatement(e)) => {
                self.eval(e)?;
            }
            Statement::Print(PrintStatement(e)) => {
                let value = self.eval(e)?;
                writeln!(self.output_stream, "{value}").map_err(RuntimeError::failed_to_print)?;
                self.output_stream
                    .flush()
                    .map_err(RuntimeError::failed_to_flush)?;
            }
            Statement::VariableDeclaration(VariableDeclarationStatement {
                initializer,
                identifier,
            }) => {
                let value = if let Some(initializer) = initializer {
                    self.eval(initializer)?
                } else {
                    LoxValue::Null
                };
                self.environment
                    .borrow_mut()
                    .define(identifier.lexeme(), value);
            }
            Statement::Block(BlockStatement(statements)) => {
                let environment = Environment::nested(Rc::clone(&self.environment));
                self.execute_block(statements, environment)?;
            }
            Statement::IfElse(ifelse) => {
                if self.eval(&ifelse.condition)?.is_truthy() {
                    self._execute(&ifelse.if_branch)?;
                } else if let Some(else_branch) = &ifelse.else_branch {
                    self._execute(else_branch)?;
                }
            }
            Statement::While(WhileStatement { condition, body }) => {
                while self.eval(condition)?.is_truthy() {
                    self._execute(body)?;
                }
            }
            Statement::FunctionDeclaration(declaration) => {
                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );
                self.environment
                    .borrow_mut()
                    .define(declaration.name.lexeme(), LoxValue::Function(Rc::new(function)));
            }
            Statement::ClassDeclaration(class) => {
                self.execute_class_declaration(class)?;
            }
            Statement::Return(ReturnStatement { value, .. }) => {
                let value = match value {
                    Some(value) => self.eval(value)?,
                    None => LoxValue::Null,
                };
                return Err(Return(value).into());
            }
        }
        Ok(())
    }

    fn execute_class_declaration(
        &mut self,
        class: &ClassDeclarationStatement,
    ) -> Result<(), RuntimeErrorOrReturn> {
        let superclass = match &class.superclass {
            Some(superclass) => {
                let value = self.look_up_variable(&superclass.identifier, superclass.id)?;
                match value {
                    LoxValue::Class(superclass) => Some(superclass),
                    _ => {
                        return Err(RuntimeError::new(
                            superclass.identifier.clone(),
                            "Superclass must be a class.",
                        )
                        .into())
                    }
                }
            }
            None => None,
        };

        // The class name is bound before the methods are built, so method
        // bodies can refer to it.
        self.environment
            .borrow_mut()
            .define(class.name.lexeme(), LoxValue::Null);

        // Methods of a subclass close over an extra environment holding
        // `super`.
        let previous = superclass.as_ref().map(|superclass| {
            let environment = Environment::nested(Rc::clone(&self.environment));
            environment
                .borrow_mut()
                .define("super", LoxValue::Class(Rc::clone(superclass)));
            std::mem::replace(&mut self.environment, environment)
        });

        let mut methods = HashMap::new();
        for method in &class.methods {
            let is_initializer = method.name.lexeme() == "init";
            let function =
                LoxFunction::new(Rc::clone(method), Rc::clone(&self.environment), is_initializer);
            methods.insert(method.name.lexeme().to_string(), function);
        }

        let class_value = LoxValue::Class(Rc::new(LoxClass::new(
            class.name.lexeme(),
            superclass,
            methods,
        )));

        if let Some(previous) = previous {
            self.environment = previous;
        }

        self.environment
            .borrow_mut()
            .assign(&class.name, class_value)?;
        Ok(())
    }

    fn eval(&mut self, e: &Expression) -> Result<LoxValue, RuntimeErrorOrReturn> {
        match e {
            Expression::Binary(b) => {
                let BinaryExpression {
                    left,
                    operator,
                    right,
                } = b;
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                match operator.discriminant() {
                    TokenDiscriminant::Minus => {
                        num_op(left, right, operator, |l, r| LoxValue::Number(l - r))
                    }
                    TokenDiscriminant::Plus => match (left, right) {
                        (LoxValue::Number(l), LoxValue::Number(r)) => Ok(LoxValue::Number(l + r)),
                        (LoxValue::String(l), LoxValue::String(r)) => Ok(LoxValue::String(l + &r)),
                        (_, _) => Err(RuntimeError::new(
                            operator.clone(),
                            "Operands must both be a number or a string.",
                        )
                        .into()),
                    },
                    TokenDiscriminant::Slash => {
                        // Division by zero follows IEEE-754: no error raised.
                        num_op(left, right, operator, |l, r| LoxValue::Number(l / r))
                    }
                    TokenDiscriminant::Star => {
                        num_op(left, right, operator, |l, r| LoxValue::Number(l * r))
                    }
                    TokenDiscriminant::Greater => {
                        num_op(left, right, operator, |l, r| LoxValue::Boolean(l > r))
                    }
                    TokenDiscriminant::GreaterEqual => {
                        num_op(left, right, operator, |l, r| LoxValue::Boolean(l >= r))
                    }
                    TokenDiscriminant::Less => {
                        num_op(left, right, operator, |l, r| LoxValue::Boolean(l < r))
                    }
                    TokenDiscriminant::LessEqual => {
                        num_op(left, right, operator, |l, r| LoxValue::Boolean(l <= r))
                    }
                    TokenDiscriminant::EqualEqual => Ok(LoxValue::Boolean(left.is_equal(&right))),
                    TokenDiscriminant::BangEqual => Ok(LoxValue::Boolean(!left.is_equal(&right))),
                    _ => Err(RuntimeError::new(
                        operator.clone(),
                        "It is not a valid binary operator.",
                    )
                    .into()),
                }
            }
            Expression::Logical(l) => {
                let LogicalExpression {
                    left,
                    operator,
                    right,
                } = l;
                let left = self.eval(left)?;
                // `and`/`or` return the deciding operand itself, not a
                // coerced boolean.
                match operator.discriminant() {
                    TokenDiscriminant::Or if left.is_truthy() => Ok(left),
                    TokenDiscriminant::And if !left.is_truthy() => Ok(left),
                    _ => self.eval(right),
                }
            }
            Expression::Unary(u) => {
                let UnaryExpression { operand, operator } = u;
                let value = self.eval(operand)?;
                match operator.discriminant() {
                    TokenDiscriminant::Minus => match value {
                        LoxValue::Number(n) => Ok(LoxValue::Number(-n)),
                        _ => Err(
                            RuntimeError::new(operator.clone(), "Operand must be a number.").into(),
                        ),
                    },
                    TokenDiscriminant::Bang => Ok(LoxValue::Boolean(!value.is_truthy())),
                    _ => Err(RuntimeError::new(
                        operator.clone(),
                        "`!` and `-` are the only valid unary operators.",
                    )
                    .into()),
                }
            }
            Expression::Literal(l) => match l {
                LiteralExpression::Boolean(b) => Ok(LoxValue::Boolean(*b)),
                LiteralExpression::Null(_) => Ok(LoxValue::Null),
                LiteralExpression::String(s) => {
                    // Avoidable .to_owned()
                    let s = s.ty().to_owned().string().expect(
                        "A string literal node holds a non-string token. This is an interpreter bug.",
                    );
                    Ok(LoxValue::String(s))
                }
                LiteralExpression::Number(n) => {
                    // Avoidable .to_owned()
                    let n = n.ty().to_owned().number().expect(
                        "A number literal node holds a non-number token. This is an interpreter bug.",
                    );
                    Ok(LoxValue::Number(n))
                }
            },
            Expression::Grouping(g) => self.eval(&g.0),
            Expression::VariableReference(v) => {
                Ok(self.look_up_variable(&v.identifier, v.id)?)
            }
            Expression::VariableAssignment(v) => {
                let value = self.eval(&v.value)?;
                match self.locals.get(&v.id) {
                    Some(depth) => Environment::assign_at(
                        &self.environment,
                        *depth,
                        v.identifier.lexeme(),
                        value.clone(),
                    ),
                    None => self
                        .globals
                        .borrow_mut()
                        .assign(&v.identifier, value.clone())?,
                }
                Ok(value)
            }
            Expression::Call(c) => {
                let callee = self.eval(&c.callee)?;
                let mut arguments = Vec::with_capacity(c.arguments.len());
                for argument in &c.arguments {
                    arguments.push(self.eval(argument)?);
                }
                match callee {
                    LoxValue::Function(function) => {
                        check_arity(function.arity(), &arguments, &c.closing_parenthesis)?;
                        Ok(function.call(self, arguments)?)
                    }
                    LoxValue::NativeFunction(native) => {
                        check_arity(native.arity(), &arguments, &c.closing_parenthesis)?;
                        Ok(native.call(self, arguments)?)
                    }
                    LoxValue::Class(class) => {
                        check_arity(class.arity(), &arguments, &c.closing_parenthesis)?;
                        Ok(LoxClass::instantiate(&class, self, arguments)?)
                    }
                    LoxValue::Boolean(_)
                    | LoxValue::Null
                    | LoxValue::String(_)
                    | LoxValue::Number(_)
                    | LoxValue::Instance(_) => Err(RuntimeError::new(
                        c.closing_parenthesis.clone(),
                        "Can only call functions and classes.",
                    )
                    .into()),
                }
            }
            Expression::PropertyGet(g) => {
                let object = self.eval(&g.object)?;
                match object {
                    LoxValue::Instance(instance) => Ok(LoxInstance::get(&instance, &g.name)?),
                    _ => Err(RuntimeError::new(
                        g.name.clone(),
                        "Only instances have properties.",
                    )
                    .into()),
                }
            }
            Expression::PropertySet(s) => {
                let object = self.eval(&s.object)?;
                match object {
                    LoxValue::Instance(instance) => {
                        let value = self.eval(&s.value)?;
                        instance.borrow_mut().set(&s.name, value.clone());
                        Ok(value)
                    }
                    _ => Err(
                        RuntimeError::new(s.name.clone(), "Only instances have fields.").into(),
                    ),
                }
            }
            Expression::This(t) => Ok(self.look_up_variable(&t.keyword, t.id)?),
            Expression::Super(s) => {
                let depth = match self.locals.get(&s.id) {
                    Some(depth) => *depth,
                    None => return Err(RuntimeError::undefined_variable(&s.keyword).into()),
                };
                let superclass = match Environment::get_at(&self.environment, depth, "super") {
                    LoxValue::Class(superclass) => superclass,
                    _ => {
                        return Err(RuntimeError::new(
                            s.keyword.clone(),
                            "Superclass must be a class.",
                        )
                        .into())
                    }
                };
                // `this` always sits one scope nearer than `super`.
                let instance = match Environment::get_at(&self.environment, depth - 1, "this") {
                    LoxValue::Instance(instance) => instance,
                    _ => {
                        return Err(RuntimeError::new(
                            s.keyword.clone(),
                            "'this' is not bound to an instance. This is an interpreter bug.",
                        )
                        .into())
                    }
                };
                match superclass.find_method(s.method.lexeme()) {
                    Some(method) => Ok(LoxValue::Function(Rc::new(method.bind(instance)))),
                    None => Err(RuntimeError::undefined_property(&s.method).into()),
                }
            }
        }
    }

    fn look_up_variable(&self, name: &Token, id: ExpressionId) -> Result<LoxValue, RuntimeError> {
        match self.locals.get(&id) {
            Some(depth) => Ok(Environment::get_at(&self.environment, *depth, name.lexeme())),
            None => self.globals.borrow().get(name),
        }
    }
}

/// Short-hand for evaluating numerical operations.
fn num_op<F>(
    left: LoxValue,
    right: LoxValue,
    operator: &Token,
    operation: F,
) -> Result<LoxValue, RuntimeErrorOrReturn>
where
    F: Fn(f64, f64) -> LoxValue,
{
    match (left, right) {
        (LoxValue::Number(l), LoxValue::Number(r)) => Ok(operation(l, r)),
        (_, _) => Err(RuntimeError::operands_must_be_numbers(operator).into()),
    }
}

fn check_arity(
    arity: u8,
    arguments: &[LoxValue],
    closing_parenthesis: &Token,
) -> Result<(), RuntimeError> {
    if usize::from(arity) != arguments.len() {
        return Err(RuntimeError::arity_mismatch(
            closing_parenthesis,
            arity,
            arguments.len(),
        ));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ExecuteRawError {
    #[error("{}", display_parse_errors(.0))]
    ParserErrors(Vec<ParseError>),
    #[error(transparent)]
    NameResolutionError(anyhow::Error),
    #[error(transparent)]
    RuntimeError(RuntimeError),
}

impl ExecuteRawError {
    /// Runtime failures conventionally exit with a different code than
    /// malformed input.
    pub fn is_runtime(&self) -> bool {
        matches!(self, ExecuteRawError::RuntimeError(_))
    }
}

fn display_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, thiserror::Error)]
pub(in crate::interpreter) enum RuntimeErrorOrReturn {
    #[error(transparent)]
    RuntimeError(#[from] RuntimeError),
    #[error(transparent)]
    Return(#[from] Return),
}

/// Not an error: the control-flow signal carrying a `return` value out of a
/// function body. It must never escape a call boundary.
#[derive(Debug, thiserror::Error)]
#[error("An early return was encountered")]
pub(in crate::interpreter) struct Return(pub(in crate::interpreter) LoxValue);

#[derive(Debug, thiserror::Error)]
#[error("{}", report(.token, .message))]
pub struct RuntimeError {
    token: Option<Token>,
    message: String,
}

fn report(token: &Option<Token>, message: &str) -> String {
    match token {
        Some(token) => format!(
            "[line {}] {} Runtime Error: {}",
            token.line(),
            token.lexeme(),
            message
        ),
        None => format!("Runtime Error: {}", message),
    }
}

impl RuntimeError {
    pub(in crate::interpreter) fn new(token: Token, message: impl Into<String>) -> Self {
        Self {
            token: Some(token),
            message: message.into(),
        }
    }

    fn without_token(message: impl Into<String>) -> Self {
        Self {
            token: None,
            message: message.into(),
        }
    }

    pub(in crate::interpreter) fn operands_must_be_numbers(operator: &Token) -> Self {
        Self::new(operator.clone(), "Both operands must be a number.")
    }

    pub(in crate::interpreter) fn undefined_variable(name: &Token) -> Self {
        Self::new(
            name.clone(),
            format!("Undefined variable '{}'.", name.lexeme()),
        )
    }

    pub(in crate::interpreter) fn undefined_property(name: &Token) -> Self {
        Self::new(
            name.clone(),
            format!("Undefined property '{}'.", name.lexeme()),
        )
    }

    pub(in crate::interpreter) fn arity_mismatch(
        closing_parenthesis: &Token,
        expected: u8,
        found: usize,
    ) -> Self {
        Self::new(
            closing_parenthesis.clone(),
            format!("Expected {expected} arguments but got {found}."),
        )
    }

    pub(in crate::interpreter) fn native_failure(name: &str, message: &str) -> Self {
        Self::without_token(format!("Native function '{name}' failed: {message}"))
    }

    fn failed_to_print(e: std::io::Error) -> Self {
        Self::without_token(format!("Failed to execute a print statement.\n{}", e))
    }

    fn failed_to_flush(e: std::io::Error) -> Self {
        Self::without_token(format!("Failed to flush the output stream.\n{}", e))
    }

    fn unexpected_return() -> Self {
        Self::without_token("`return` was used in an illegal position")
    }
}
