pub mod ast;

use crate::parser::ast::{
    BlockStatement, ClassDeclarationStatement, ExpressionIdGenerator, ExpressionStatement,
    FunctionDeclarationStatement, IfElseStatement, PrintStatement, ReturnStatement, Statement,
    VariableDeclarationStatement, VariableReferenceExpression, WhileStatement,
};
use crate::scanner::{Token, TokenDiscriminant, TokenType};
use ast::{Expression, LiteralExpression};
use std::fmt::Write;
use std::iter::Peekable;
use std::rc::Rc;

#[derive(Debug, Clone, thiserror::Error)]
#[error("[line {line}] Parse Error {location}: {message}")]
pub struct ParseError {
    line: u64,
    location: String,
    message: String,
}

impl ParseError {
    fn new(token: &Token, message: impl Into<String>) -> Self {
        let location = if token.discriminant() == TokenDiscriminant::Eof {
            "at end".to_string()
        } else {
            format!("at '{}'", token.lexeme())
        };
        Self {
            line: token.line(),
            location,
            message: message.into(),
        }
    }

    fn at_end(line: u64, message: impl Into<String>) -> Self {
        Self {
            line,
            location: "at end".to_string(),
            message: message.into(),
        }
    }
}

#[derive(PartialEq, Eq, Copy, Clone)]
enum ParsingMode {
    ErrorRecovery,
    Normal,
}

pub struct Parser<'i, TokenIter>
where
    TokenIter: Iterator<Item = Token>,
{
    tokens: Peekable<Source<TokenIter>>,
    mode: ParsingMode,
    errors: Vec<ParseError>,
    last_line: u64,
    ids: &'i mut ExpressionIdGenerator,
}

impl<'i, TokenIter> Parser<'i, TokenIter>
where
    TokenIter: Iterator<Item = Token>,
{
    pub fn parse(
        tokens: TokenIter,
        ids: &'i mut ExpressionIdGenerator,
    ) -> Result<Vec<Statement>, Vec<ParseError>> {
        let mut parser = Self {
            tokens: Source(tokens).peekable(),
            mode: ParsingMode::Normal,
            errors: vec![],
            last_line: 1,
            ids,
        };

        let mut statements = vec![];
        while !parser.is_at_end() {
            let statement = parser.declaration();
            match statement {
                Some(statement) => {
                    statements.push(statement);
                }
                None => {
                    parser.advance_until_recovery_point();
                }
            }
        }
        if parser.errors.is_empty() {
            Ok(statements)
        } else {
            Err(parser.errors)
        }
    }

    fn declaration(&mut self) -> Option<Statement> {
        if self.advance_on_match(&[TokenDiscriminant::Class]).is_some() {
            self.class_declaration()
        } else if self.advance_on_match(&[TokenDiscriminant::Fun]).is_some() {
            self.function()
                .map(|f| Statement::FunctionDeclaration(Rc::new(f)))
        } else if self.advance_on_match(&[TokenDiscriminant::Var]).is_some() {
            let identifier = self.expect(TokenDiscriminant::Identifier, "Expect variable name.")?;
            let mut initializer = None;
            if self.advance_on_match(&[TokenDiscriminant::Equal]).is_some() {
                initializer = Some(self.expression()?);
            }
            self.expect(
                TokenDiscriminant::Semicolon,
                "Expect ';' after variable declaration.",
            )?;
            Some(Statement::VariableDeclaration(
                VariableDeclarationStatement {
                    initializer,
                    identifier,
                },
            ))
        } else {
            self.statement()
        }
    }

    fn class_declaration(&mut self) -> Option<Statement> {
        let name = self.expect(TokenDiscriminant::Identifier, "Expect class name.")?;
        let mut superclass = None;
        if self.advance_on_match(&[TokenDiscriminant::Less]).is_some() {
            let identifier =
                self.expect(TokenDiscriminant::Identifier, "Expect superclass name.")?;
            superclass = Some(VariableReferenceExpression {
                identifier,
                id: self.ids.next_id(),
            });
        }
        self.expect(TokenDiscriminant::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = vec![];
        loop {
            if self.is_at_end() {
                break;
            }
            if let Some(t) = self.peek() {
                if t.discriminant() == TokenDiscriminant::RightBrace {
                    break;
                }
            }
            methods.push(Rc::new(self.function()?));
        }
        self.expect(TokenDiscriminant::RightBrace, "Expect '}' after class body.")?;

        Some(Statement::ClassDeclaration(ClassDeclarationStatement {
            name,
            superclass,
            methods,
        }))
    }

    fn function(&mut self) -> Option<FunctionDeclarationStatement> {
        let name = self.expect(TokenDiscriminant::Identifier, "Expect function name.")?;
        self.expect(
            TokenDiscriminant::LeftParen,
            "Expect '(' after function name.",
        )?;

        // Function parameters
        let mut parameters = vec![];
        if self.peek()?.discriminant() != TokenDiscriminant::RightParen {
            loop {
                if parameters.len() >= 255 {
                    self.record_error_at_upcoming("Cannot have more than 255 parameters.");
                }
                parameters.push(self.expect(TokenDiscriminant::Identifier, "Expect parameter name.")?);
                if self.advance_on_match(&[TokenDiscriminant::Comma]).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenDiscriminant::RightParen, "Expect ')' after parameters.")?;

        // Body
        self.expect(
            TokenDiscriminant::LeftBrace,
            "Expect '{' before function body.",
        )?;
        let body = self.block_statement()?;

        Some(FunctionDeclarationStatement {
            name,
            parameters,
            body: body.0,
        })
    }

    fn statement(&mut self) -> Option<Statement> {
        if self.advance_on_match(&[TokenDiscriminant::Print]).is_some() {
            self.print_statement().map(Statement::Print)
        } else if self.advance_on_match(&[TokenDiscriminant::While]).is_some() {
            self.while_statement().map(Statement::While)
        } else if self.advance_on_match(&[TokenDiscriminant::For]).is_some() {
            self.for_statement()
        } else if self.advance_on_match(&[TokenDiscriminant::If]).is_some() {
            self.if_else_statement().map(Statement::IfElse)
        } else if let Some(keyword) = self.advance_on_match(&[TokenDiscriminant::Return]) {
            self.return_statement(keyword).map(Statement::Return)
        } else if self
            .advance_on_match(&[TokenDiscriminant::LeftBrace])
            .is_some()
        {
            self.block_statement().map(Statement::Block)
        } else {
            self.expression_statement().map(Statement::Expression)
        }
    }

    fn for_statement(&mut self) -> Option<Statement> {
        self.expect(TokenDiscriminant::LeftParen, "Expect '(' after 'for'.")?;
        let initializer = if self
            .advance_on_match(&[TokenDiscriminant::Semicolon])
            .is_some()
        {
            None
        } else if self
            .peek()
            .map(|t| t.discriminant() == TokenDiscriminant::Var)
            .unwrap_or(false)
        {
            Some(self.declaration()?)
        } else {
            Some(Statement::Expression(self.expression_statement()?))
        };
        let condition = if self.peek()?.discriminant() == TokenDiscriminant::Semicolon {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(
            TokenDiscriminant::Semicolon,
            "Expect ';' after loop condition.",
        )?;
        let increment = if self.peek()?.discriminant() == TokenDiscriminant::RightParen {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(
            TokenDiscriminant::RightParen,
            "Expect ')' after for clauses.",
        )?;
        let mut body = self.statement()?;

        // De-sugaring the for loop into an equivalent while loop
        if let Some(increment) = increment {
            body = Statement::Block(BlockStatement(vec![
                body,
                Statement::Expression(ExpressionStatement(increment)),
            ]))
        }

        body = Statement::While(WhileStatement {
            condition: condition.unwrap_or_else(|| Expression::boolean(true)),
            body: Box::new(body),
        });

        if let Some(initializer) = initializer {
            body = Statement::Block(BlockStatement(vec![initializer, body]))
        }

        Some(body)
    }

    fn block_statement(&mut self) -> Option<BlockStatement> {
        let mut statements = vec![];

        loop {
            if self.is_at_end() {
                break;
            }
            if let Some(t) = self.peek() {
                if t.discriminant() == TokenDiscriminant::RightBrace {
                    break;
                }
            }
            statements.push(self.declaration()?);
        }
        self.expect(TokenDiscriminant::RightBrace, "Expect '}' after block.")?;
        Some(BlockStatement(statements))
    }

    fn while_statement(&mut self) -> Option<WhileStatement> {
        self.expect(TokenDiscriminant::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.expect(TokenDiscriminant::RightParen, "Expect ')' after condition.")?;
        let body = self.statement()?;
        Some(WhileStatement {
            condition,
            body: Box::new(body),
        })
    }

    fn if_else_statement(&mut self) -> Option<IfElseStatement> {
        self.expect(TokenDiscriminant::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.expect(
            TokenDiscriminant::RightParen,
            "Expect ')' after if condition.",
        )?;
        let if_branch = self.statement()?;
        let mut else_branch = None;
        if self.advance_on_match(&[TokenDiscriminant::Else]).is_some() {
            else_branch = Some(Box::new(self.statement()?));
        }
        Some(IfElseStatement {
            condition,
            if_branch: Box::new(if_branch),
            else_branch,
        })
    }

    fn return_statement(&mut self, keyword: Token) -> Option<ReturnStatement> {
        let value = if self.peek()?.discriminant() == TokenDiscriminant::Semicolon {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(
            TokenDiscriminant::Semicolon,
            "Expect ';' after return value.",
        )?;
        Some(ReturnStatement { keyword, value })
    }

    fn print_statement(&mut self) -> Option<PrintStatement> {
        let expr = self.expression()?;
        self.expect(TokenDiscriminant::Semicolon, "Expect ';' after value.")?;
        Some(PrintStatement(expr))
    }

    fn expression_statement(&mut self) -> Option<ExpressionStatement> {
        let expr = self.expression()?;
        self.expect(TokenDiscriminant::Semicolon, "Expect ';' after expression.")?;
        Some(ExpressionStatement(expr))
    }

    fn expression(&mut self) -> Option<Expression> {
        self.assignment()
    }

    fn assignment(&mut self) -> Option<Expression> {
        let expr = self.or()?;

        if let Some(equals) = self.advance_on_match(&[TokenDiscriminant::Equal]) {
            let value = self.assignment()?;
            match expr {
                Expression::VariableReference(variable) => {
                    let name = variable.identifier;
                    Some(Expression::variable_assignment(
                        name,
                        value,
                        self.ids.next_id(),
                    ))
                }
                Expression::PropertyGet(get) => {
                    Some(Expression::property_set(*get.object, get.name, value))
                }
                expr => {
                    // The error is reported at the `=` token, but the statement
                    // keeps parsing: there is no panic mode to enter here.
                    self.record_error(&equals, "Invalid assignment target.");
                    Some(expr)
                }
            }
        } else {
            Some(expr)
        }
    }

    fn or(&mut self) -> Option<Expression> {
        let mut expr = self.and()?;

        while let Some(operator) = self.advance_on_match(&[TokenDiscriminant::Or]) {
            expr = Expression::logical(expr, operator, self.and()?);
        }
        Some(expr)
    }

    fn and(&mut self) -> Option<Expression> {
        let mut expr = self.equality()?;

        while let Some(operator) = self.advance_on_match(&[TokenDiscriminant::And]) {
            expr = Expression::logical(expr, operator, self.equality()?);
        }
        Some(expr)
    }

    fn equality(&mut self) -> Option<Expression> {
        let mut expr = self.comparison()?;

        while let Some(operator) =
            self.advance_on_match(&[TokenDiscriminant::BangEqual, TokenDiscriminant::EqualEqual])
        {
            expr = Expression::binary(expr, operator, self.comparison()?);
        }
        Some(expr)
    }

    fn comparison(&mut self) -> Option<Expression> {
        let mut expr = self.term()?;

        while let Some(operator) = self.advance_on_match(&[
            TokenDiscriminant::Greater,
            TokenDiscriminant::GreaterEqual,
            TokenDiscriminant::Less,
            TokenDiscriminant::LessEqual,
        ]) {
            expr = Expression::binary(expr, operator, self.term()?);
        }
        Some(expr)
    }

    fn term(&mut self) -> Option<Expression> {
        let mut expr = self.factor()?;

        while let Some(operator) =
            self.advance_on_match(&[TokenDiscriminant::Minus, TokenDiscriminant::Plus])
        {
            expr = Expression::binary(expr, operator, self.factor()?);
        }
        Some(expr)
    }

    fn factor(&mut self) -> Option<Expression> {
        let mut expr = self.unary()?;

        while let Some(operator) =
            self.advance_on_match(&[TokenDiscriminant::Slash, TokenDiscriminant::Star])
        {
            expr = Expression::binary(expr, operator, self.unary()?);
        }
        Some(expr)
    }

    fn unary(&mut self) -> Option<Expression> {
        if let Some(operator) =
            self.advance_on_match(&[TokenDiscriminant::Bang, TokenDiscriminant::Minus])
        {
            Some(Expression::unary(operator, self.unary()?))
        } else {
            self.call()
        }
    }

    fn call(&mut self) -> Option<Expression> {
        let mut callee = self.primary()?;

        loop {
            if self
                .advance_on_match(&[TokenDiscriminant::LeftParen])
                .is_some()
            {
                callee = self.finish_call(callee)?;
            } else if self.advance_on_match(&[TokenDiscriminant::Dot]).is_some() {
                let name = self.expect(
                    TokenDiscriminant::Identifier,
                    "Expect property name after '.'.",
                )?;
                callee = Expression::property_get(callee, name);
            } else {
                break;
            }
        }
        Some(callee)
    }

    fn finish_call(&mut self, callee: Expression) -> Option<Expression> {
        let mut arguments = vec![];
        if self.peek()?.discriminant() != TokenDiscriminant::RightParen {
            loop {
                if arguments.len() >= 255 {
                    self.record_error_at_upcoming("Cannot have more than 255 arguments.");
                }
                arguments.push(self.expression()?);
                if self.advance_on_match(&[TokenDiscriminant::Comma]).is_none() {
                    break;
                }
            }
        }
        let closing_parenthesis =
            self.expect(TokenDiscriminant::RightParen, "Expect ')' after arguments.")?;
        Some(Expression::call(callee, closing_parenthesis, arguments))
    }

    fn primary(&mut self) -> Option<Expression> {
        if self.advance_on_match(&[TokenDiscriminant::True]).is_some() {
            Some(Expression::boolean(true))
        } else if self.advance_on_match(&[TokenDiscriminant::False]).is_some() {
            Some(Expression::boolean(false))
        } else if let Some(t) = self.advance_on_match(&[TokenDiscriminant::Nil]) {
            Some(Expression::null(t))
        } else if let Some(t) = self.advance_on_match(&[TokenDiscriminant::Number]) {
            Some(Expression::number(t))
        } else if let Some(t) = self.advance_on_match(&[TokenDiscriminant::String]) {
            Some(Expression::string(t))
        } else if let Some(t) = self.advance_on_match(&[TokenDiscriminant::Identifier]) {
            let id = self.ids.next_id();
            Some(Expression::variable_reference(t, id))
        } else if let Some(keyword) = self.advance_on_match(&[TokenDiscriminant::This]) {
            let id = self.ids.next_id();
            Some(Expression::this(keyword, id))
        } else if let Some(keyword) = self.advance_on_match(&[TokenDiscriminant::Super]) {
            self.expect(TokenDiscriminant::Dot, "Expect '.' after 'super'.")?;
            let method = self.expect(
                TokenDiscriminant::Identifier,
                "Expect superclass method name.",
            )?;
            let id = self.ids.next_id();
            Some(Expression::super_access(keyword, method, id))
        } else if self
            .advance_on_match(&[TokenDiscriminant::LeftParen])
            .is_some()
        {
            let expr = self.expression()?;
            self.expect(
                TokenDiscriminant::RightParen,
                "Expect ')' after expression.",
            )?;
            Some(Expression::grouping(expr))
        } else {
            self.error_at_upcoming("Expect expression.");
            None
        }
    }

    fn advance_on_match(&mut self, token_types: &[TokenDiscriminant]) -> Option<Token> {
        let upcoming = self.tokens.peek()?;
        if token_types.contains(&upcoming.discriminant()) {
            return self.advance();
        }
        None
    }

    fn advance_until_recovery_point(&mut self) {
        self.mode = ParsingMode::Normal;
        // Using a closure that returns `Option` to be able to use the `?` operator.
        // Looking forward to try blocks.
        let mut recover = || -> Option<()> {
            loop {
                if self.tokens.peek()?.discriminant() == TokenDiscriminant::Eof {
                    break None;
                }
                let current = self.tokens.next()?;
                if current.discriminant() == TokenDiscriminant::Semicolon {
                    break None;
                }
                let upcoming = self.tokens.peek()?;
                match upcoming.discriminant() {
                    TokenDiscriminant::Class
                    | TokenDiscriminant::Fun
                    | TokenDiscriminant::Var
                    | TokenDiscriminant::For
                    | TokenDiscriminant::If
                    | TokenDiscriminant::Print
                    | TokenDiscriminant::Return
                    | TokenDiscriminant::While => {
                        break None;
                    }
                    _ => {}
                }
            }
        };
        let _ = recover();
    }

    fn expect(&mut self, token_type: TokenDiscriminant, message: &'static str) -> Option<Token> {
        let t = self.advance_on_match(&[token_type]);
        if t.is_none() {
            self.error_at_upcoming(message);
        }
        t
    }

    /// Report an error against the next meaningful token and enter panic mode.
    ///
    /// Scanner error tokens carry their own message, which takes precedence
    /// over the parser's expectation.
    /// Once the parser is already recovering, further failures are part of the
    /// same panic and are not reported again.
    fn error_at_upcoming(&mut self, message: &'static str) {
        if self.mode == ParsingMode::ErrorRecovery {
            return;
        }
        self.mode = ParsingMode::ErrorRecovery;
        let error = match self.tokens.peek() {
            Some(token) => {
                if let TokenType::SyntaxError { error_msg } = token.ty() {
                    ParseError::new(token, error_msg.unwrap_or("Unexpected character."))
                } else {
                    ParseError::new(token, message)
                }
            }
            None => ParseError::at_end(self.last_line, message),
        };
        self.errors.push(error);
    }

    fn record_error(&mut self, token: &Token, message: &'static str) {
        self.errors.push(ParseError::new(token, message));
    }

    fn record_error_at_upcoming(&mut self, message: &'static str) {
        let error = self.tokens.peek().map(|t| ParseError::new(t, message));
        if let Some(error) = error {
            self.errors.push(error);
        }
    }

    fn advance(&mut self) -> Option<Token> {
        if self.mode == ParsingMode::Normal {
            let token = self.tokens.next();
            if let Some(token) = &token {
                self.last_line = token.line();
            }
            token
        } else {
            None
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        if self.mode == ParsingMode::Normal {
            self.tokens.peek()
        } else {
            None
        }
    }

    fn is_at_end(&mut self) -> bool {
        match self.tokens.peek() {
            None => true,
            Some(t) => t.discriminant() == TokenDiscriminant::Eof,
        }
    }
}

/// Our parser does not care about trivia tokens.
/// We give `Source` to our parser instead of the raw token stream: `Source` wraps the underlying
/// token stream and makes sure to skip all trivia tokens, making them invisible to the parser.
struct Source<TokenIter>(TokenIter)
where
    TokenIter: Iterator<Item = Token>;

impl<TokenIter> Iterator for Source<TokenIter>
where
    TokenIter: Iterator<Item = Token>,
{
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.0.next() {
                None => break None,
                Some(t) if t.discriminant() == TokenDiscriminant::Trivia => continue,
                Some(t) => break Some(t),
            }
        }
    }
}

#[allow(unused)]
pub fn display_ast(s: &Statement) -> Result<String, std::fmt::Error> {
    let mut buffer = String::new();
    _display_statement(&mut buffer, s, 0)?;
    Ok(buffer)
}

fn _display_statement(w: &mut impl Write, s: &Statement, depth: u8) -> Result<(), std::fmt::Error> {
    // Can we avoid an allocation for the indentation string here?
    write!(w, "{}", " ".repeat(depth as usize))?;
    match s {
        Statement::Expression(ExpressionStatement(e)) => {
            writeln!(w, "Expression")?;
            _display_expression(w, e, depth + 1)?;
        }
        Statement::Print(PrintStatement(e)) => {
            writeln!(w, "Print")?;
            _display_expression(w, e, depth + 1)?;
        }
        Statement::VariableDeclaration(VariableDeclarationStatement {
            initializer,
            identifier,
        }) => {
            writeln!(w, "Variable Declaration")?;
            _display_token(w, identifier, depth + 1)?;
            if let Some(e) = initializer {
                _display_expression(w, e, depth + 1)?;
            }
        }
        Statement::Block(BlockStatement(statements)) => {
            writeln!(w, "Block")?;
            for statement in statements {
                _display_statement(w, statement, depth + 1)?;
            }
        }
        Statement::IfElse(IfElseStatement {
            condition,
            if_branch,
            else_branch,
        }) => {
            writeln!(w, "IfElse")?;
            _display_expression(w, condition, depth + 1)?;
            _display_statement(w, if_branch, depth + 1)?;
            if let Some(else_branch) = else_branch {
                _display_statement(w, else_branch, depth + 1)?;
            }
        }
        Statement::While(WhileStatement { condition, body }) => {
            writeln!(w, "While")?;
            _display_expression(w, condition, depth + 1)?;
            _display_statement(w, body, depth + 1)?;
        }
        Statement::FunctionDeclaration(f) => {
            writeln!(w, "Function Declaration")?;
            _display_function_parts(w, f, depth + 1)?;
        }
        Statement::ClassDeclaration(ClassDeclarationStatement {
            name,
            superclass,
            methods,
        }) => {
            writeln!(w, "Class Declaration")?;
            _display_token(w, name, depth + 1)?;
            if let Some(superclass) = superclass {
                _display_string(w, "Superclass", depth + 1)?;
                _display_token(w, &superclass.identifier, depth + 2)?;
            }
            _display_string(w, "Methods", depth + 1)?;
            for method in methods {
                _display_string(w, "Function Declaration", depth + 2)?;
                _display_function_parts(w, method, depth + 3)?;
            }
        }
        Statement::Return(ReturnStatement { value, .. }) => {
            writeln!(w, "Return")?;
            if let Some(value) = value {
                _display_expression(w, value, depth + 1)?;
            }
        }
    }
    Ok(())
}

fn _display_function_parts(
    w: &mut impl Write,
    f: &FunctionDeclarationStatement,
    depth: u8,
) -> Result<(), std::fmt::Error> {
    _display_token(w, &f.name, depth)?;
    _display_string(w, "Parameters", depth)?;
    for parameter in &f.parameters {
        _display_token(w, parameter, depth + 1)?;
    }
    _display_string(w, "Body", depth)?;
    for s in &f.body {
        _display_statement(w, s, depth + 1)?;
    }
    Ok(())
}

fn _display_expression(
    w: &mut impl Write,
    e: &Expression,
    depth: u8,
) -> Result<(), std::fmt::Error> {
    // Can we avoid an allocation for the indentation string here?
    write!(w, "{}", " ".repeat(depth as usize))?;
    match e {
        Expression::Binary(b) => {
            writeln!(w, "Binary")?;
            _display_expression(w, &b.left, depth + 1)?;
            _display_token(w, &b.operator, depth + 1)?;
            _display_expression(w, &b.right, depth + 1)?;
        }
        Expression::Logical(l) => {
            writeln!(w, "Logical")?;
            _display_expression(w, &l.left, depth + 1)?;
            _display_token(w, &l.operator, depth + 1)?;
            _display_expression(w, &l.right, depth + 1)?;
        }
        Expression::Unary(u) => {
            writeln!(w, "Unary")?;
            _display_token(w, &u.operator, depth + 1)?;
            _display_expression(w, &u.operand, depth + 1)?;
        }
        Expression::Literal(l) => {
            writeln!(w, "Literal")?;
            match l {
                LiteralExpression::Null(t)
                | LiteralExpression::String(t)
                | LiteralExpression::Number(t) => {
                    _display_token(w, t, depth + 1)?;
                }
                LiteralExpression::Boolean(b) => {
                    let s = if *b { "True" } else { "False" };
                    _display_string(w, s, depth + 1)?;
                }
            }
        }
        Expression::Grouping(g) => {
            writeln!(w, "Grouping")?;
            _display_expression(w, &g.0, depth + 1)?;
        }
        Expression::VariableReference(VariableReferenceExpression { identifier, .. }) => {
            writeln!(w, "Variable Reference")?;
            _display_token(w, identifier, depth + 1)?;
        }
        Expression::VariableAssignment(a) => {
            writeln!(w, "Variable Assignment")?;
            _display_token(w, &a.identifier, depth + 1)?;
            _display_expression(w, &a.value, depth + 1)?;
        }
        Expression::Call(c) => {
            writeln!(w, "Call")?;
            _display_expression(w, &c.callee, depth + 1)?;
            _display_string(w, "Arguments", depth + 1)?;
            for argument in &c.arguments {
                _display_expression(w, argument, depth + 2)?;
            }
        }
        Expression::PropertyGet(g) => {
            writeln!(w, "Property Get")?;
            _display_expression(w, &g.object, depth + 1)?;
            _display_token(w, &g.name, depth + 1)?;
        }
        Expression::PropertySet(s) => {
            writeln!(w, "Property Set")?;
            _display_expression(w, &s.object, depth + 1)?;
            _display_token(w, &s.name, depth + 1)?;
            _display_expression(w, &s.value, depth + 1)?;
        }
        Expression::This(_) => {
            writeln!(w, "This")?;
        }
        Expression::Super(s) => {
            writeln!(w, "Super")?;
            _display_token(w, &s.method, depth + 1)?;
        }
    }
    Ok(())
}

fn _display_token(w: &mut impl Write, t: &Token, depth: u8) -> std::fmt::Result {
    // Can we avoid an allocation for the indentation string here?
    write!(w, "{}", " ".repeat(depth as usize))?;
    write!(w, "{:?}", t.discriminant())?;
    match t.ty() {
        TokenType::String(s) => writeln!(w, " \"{}\"", s)?,
        TokenType::Number(n) => writeln!(w, " {}", n)?,
        TokenType::Identifier => writeln!(w, " {}", t.lexeme())?,
        _ => writeln!(w)?,
    }
    Ok(())
}

fn _display_string(w: &mut impl Write, s: &str, depth: u8) -> std::fmt::Result {
    // Can we avoid an allocation for the indentation string here?
    write!(w, "{}", " ".repeat(depth as usize))?;
    writeln!(w, "{}", s)?;
    Ok(())
}
