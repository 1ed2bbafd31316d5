use itertools::{Itertools, MultiPeek};
use std::collections::HashMap;
use std::fmt::Formatter;
use std::str::{Chars, FromStr};
use strum_macros::EnumDiscriminants;

pub struct Scanner<'a> {
    source: MultiPeek<Chars<'a>>,
    current_token_buffer: Vec<char>,
    current_line: u64,
    keywords: HashMap<String, TokenType>,
    reached_eof: bool,
}

impl<'a> std::iter::Iterator for Scanner<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reached_eof {
            return None;
        }
        match self.scan_token() {
            Some(token) => Some(token),
            None => {
                // The source is exhausted: cap the stream with a single EOF token
                // carrying the final source line.
                self.reached_eof = true;
                Some(Token {
                    ty: TokenType::Eof,
                    lexeme: String::new(),
                    line: self.current_line,
                })
            }
        }
    }
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        let keywords = HashMap::from_iter([
            ("and".into(), TokenType::And),
            ("class".into(), TokenType::Class),
            ("else".into(), TokenType::Else),
            ("false".into(), TokenType::False),
            ("for".into(), TokenType::For),
            ("fun".into(), TokenType::Fun),
            ("if".into(), TokenType::If),
            ("nil".into(), TokenType::Nil),
            ("or".into(), TokenType::Or),
            ("print".into(), TokenType::Print),
            ("return".into(), TokenType::Return),
            ("super".into(), TokenType::Super),
            ("this".into(), TokenType::This),
            ("true".into(), TokenType::True),
            ("var".into(), TokenType::Var),
            ("while".into(), TokenType::While),
        ]);
        Self {
            source: source.chars().multipeek(),
            current_token_buffer: Vec::new(),
            current_line: 1,
            keywords,
            reached_eof: false,
        }
    }

    fn scan_token(&mut self) -> Option<Token> {
        let c = self.advance()?;
        let token = match c {
            '(' => self.finalize_current_token(TokenType::LeftParen),
            ')' => self.finalize_current_token(TokenType::RightParen),
            '{' => self.finalize_current_token(TokenType::LeftBrace),
            '}' => self.finalize_current_token(TokenType::RightBrace),
            ',' => self.finalize_current_token(TokenType::Comma),
            '.' => self.finalize_current_token(TokenType::Dot),
            '-' => self.finalize_current_token(TokenType::Minus),
            '+' => self.finalize_current_token(TokenType::Plus),
            ';' => self.finalize_current_token(TokenType::Semicolon),
            '*' => self.finalize_current_token(TokenType::Star),
            '!' => {
                if self.advance_on_match('=') {
                    self.finalize_current_token(TokenType::BangEqual)
                } else {
                    self.finalize_current_token(TokenType::Bang)
                }
            }
            '=' => {
                if self.advance_on_match('=') {
                    self.finalize_current_token(TokenType::EqualEqual)
                } else {
                    self.finalize_current_token(TokenType::Equal)
                }
            }
            '<' => {
                if self.advance_on_match('=') {
                    self.finalize_current_token(TokenType::LessEqual)
                } else {
                    self.finalize_current_token(TokenType::Less)
                }
            }
            '>' => {
                if self.advance_on_match('=') {
                    self.finalize_current_token(TokenType::GreaterEqual)
                } else {
                    self.finalize_current_token(TokenType::Greater)
                }
            }
            '/' => {
                if self.advance_on_match('/') {
                    // Eat the entire comment, until we encounter a line break
                    self.advance_until('\n');
                    // Empty the token buffer - we don't care about comments.
                    self.current_token_buffer.clear();
                    self.scan_token()?
                } else {
                    self.finalize_current_token(TokenType::Slash)
                }
            }
            '"' => {
                // Strings may span multiple lines; `advance` keeps the line
                // counter honest when it runs over a line break.
                self.advance_until('"');
                if self.is_at_end() {
                    return Some(self.finalize_error_token(Some("Unterminated string.")));
                }
                // Eat the closing `"`
                self.advance();
                let lexeme = self.finalize_buffer_into_lexeme();
                let literal = lexeme.trim_matches('"').to_string();
                Token {
                    ty: TokenType::String(literal),
                    lexeme,
                    line: self.current_line,
                }
            }
            d if d.is_ascii_digit() => {
                self.advance_while_true(|c| c.is_ascii_digit());
                // A fractional part needs a digit right after the dot: `12.` must
                // leave the dot alone so it can be scanned as its own token.
                if self.peek() == Some(&'.') {
                    if let Some(c) = self.peek() {
                        if c.is_ascii_digit() {
                            // Consume `.`
                            self.advance();
                            self.advance_while_true(|c| c.is_ascii_digit());
                        }
                    }
                }
                self.source.reset_peek();
                let lexeme = self.finalize_buffer_into_lexeme();
                match f64::from_str(&lexeme) {
                    Ok(f) => Token {
                        ty: TokenType::Number(f),
                        lexeme,
                        line: self.current_line,
                    },
                    Err(_) => self.finalize_error_token(Some("Failed to parse number.")),
                }
            }
            c => {
                if Self::is_alpha(&c) {
                    self.advance_while_true(|c| Self::is_alpha(c) || c.is_ascii_digit());
                    let lexeme = self.finalize_buffer_into_lexeme();
                    match self.keywords.get(&lexeme) {
                        None => Token {
                            ty: TokenType::Identifier,
                            lexeme,
                            line: self.current_line,
                        },
                        Some(ty) => Token {
                            ty: ty.clone(),
                            lexeme,
                            line: self.current_line,
                        },
                    }
                } else if Self::is_trivia(&c) {
                    self.advance_while_true(Self::is_trivia);
                    self.finalize_current_token(TokenType::Trivia)
                } else {
                    self.finalize_error_token(None)
                }
            }
        };
        Some(token)
    }

    fn is_alpha(c: &char) -> bool {
        c.is_ascii_alphabetic() || c == &'_'
    }

    fn finalize_error_token(&mut self, error_msg: Option<&'static str>) -> Token {
        self.finalize_current_token(TokenType::SyntaxError { error_msg })
    }

    fn finalize_current_token(&mut self, ty: TokenType) -> Token {
        let lexeme = self.finalize_buffer_into_lexeme();
        Token {
            ty,
            lexeme,
            line: self.current_line,
        }
    }

    fn finalize_buffer_into_lexeme(&mut self) -> String {
        String::from_iter(self.current_token_buffer.drain(..))
    }

    /// Advance our source code cursor by one character.
    fn advance(&mut self) -> Option<char> {
        let char = self.source.next()?;
        if char == '\n' {
            self.current_line += 1;
        }
        self.current_token_buffer.push(char);
        Some(char)
    }

    // "Trivia" tokens are tokens that do not alter the functional interpretation
    // of the code we are scanning.
    // For lox, we are talking about whitespace, tabs and new lines.
    fn is_trivia(c: &char) -> bool {
        matches!(c, ' ' | '\r' | '\t' | '\n')
    }

    fn advance_on_match(&mut self, c: char) -> bool {
        if self.peek() == Some(&c) {
            self.advance();
            true
        } else {
            self.source.reset_peek();
            false
        }
    }

    fn advance_until(&mut self, c: char) {
        self.advance_while_true(|ch| ch != &c)
    }

    fn advance_while_true<F>(&mut self, f: F)
    where
        F: Fn(&char) -> bool,
    {
        loop {
            let next = self.peek();
            if let Some(next) = next {
                if f(next) {
                    self.advance();
                    continue;
                }
            }
            break;
        }
        self.source.reset_peek();
    }

    fn peek(&mut self) -> Option<&char> {
        self.source.peek()
    }

    fn is_at_end(&mut self) -> bool {
        let b = self.peek().is_none();
        self.source.reset_peek();
        b
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    ty: TokenType,
    lexeme: String,
    line: u64,
}

impl Token {
    pub fn ty(&self) -> &TokenType {
        &self.ty
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn discriminant(&self) -> TokenDiscriminant {
        TokenDiscriminant::from(&self.ty)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {:?} {:?}", self.line, self.ty, self.lexeme)
    }
}

#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(TokenDiscriminant))]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String(String),
    Number(f64),

    // Keywords
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    // Tokens that do not affect the functional meaning of
    // the scanned code - whitespace, new lines, comments, etc.
    Trivia,

    // Special token to signal that we encountered a token
    // that we couldn't successfully scan.
    // The scanner can choose to specify an error message to
    // help the user understand what it was attempting to do
    // before giving up.
    SyntaxError { error_msg: Option<&'static str> },

    // End-of-source marker, emitted exactly once per scan.
    Eof,
}

impl TokenType {
    /// The payload of a string literal token, if any.
    pub fn string(self) -> Option<String> {
        if let TokenType::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// The payload of a number literal token, if any.
    pub fn number(self) -> Option<f64> {
        if let TokenType::Number(n) = self {
            Some(n)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::scanner::Scanner;
    use insta::assert_display_snapshot;
    use itertools::Itertools;

    /// Short-hand to convert source code into a line-per-token dump.
    fn scan(source: &str) -> String {
        Scanner::new(source).map(|t| t.to_string()).join("\n")
    }

    #[test]
    fn an_empty_source_scans_to_a_lone_eof() {
        let tokens = scan("");
        assert_display_snapshot!(tokens, @r###"1 - Eof """###)
    }

    #[test]
    fn punctuation_and_operators_are_scanned() {
        let tokens = scan("(){};,+-*!===<=>=!=<>/.");
        assert_display_snapshot!(tokens, @r###"
        1 - LeftParen "("
        1 - RightParen ")"
        1 - LeftBrace "{"
        1 - RightBrace "}"
        1 - Semicolon ";"
        1 - Comma ","
        1 - Plus "+"
        1 - Minus "-"
        1 - Star "*"
        1 - BangEqual "!="
        1 - EqualEqual "=="
        1 - LessEqual "<="
        1 - GreaterEqual ">="
        1 - BangEqual "!="
        1 - Less "<"
        1 - Greater ">"
        1 - Slash "/"
        1 - Dot "."
        1 - Eof ""
        "###)
    }

    #[test]
    fn keywords_and_identifiers_are_told_apart() {
        let tokens = scan("var varx");
        assert_display_snapshot!(tokens, @r###"
        1 - Var "var"
        1 - Trivia " "
        1 - Identifier "varx"
        1 - Eof ""
        "###)
    }

    #[test]
    fn a_trailing_dot_is_not_part_of_the_number() {
        let tokens = scan("12.65 12.");
        assert_display_snapshot!(tokens, @r###"
        1 - Number(12.65) "12.65"
        1 - Trivia " "
        1 - Number(12.0) "12"
        1 - Dot "."
        1 - Eof ""
        "###)
    }

    #[test]
    fn strings_may_span_multiple_lines() {
        let tokens = scan("\"ab\ncd\"");
        assert_display_snapshot!(tokens, @r###"
        2 - String("ab\ncd") "\"ab\ncd\""
        2 - Eof ""
        "###)
    }

    #[test]
    fn an_unterminated_string_becomes_an_error_token() {
        let tokens = scan("\"ab");
        assert_display_snapshot!(tokens, @r###"
        1 - SyntaxError { error_msg: Some("Unterminated string.") } "\"ab"
        1 - Eof ""
        "###)
    }

    #[test]
    fn comments_run_to_the_end_of_the_line() {
        let tokens = scan("1 // two three\n4");
        assert_display_snapshot!(tokens, @r###"
        1 - Number(1.0) "1"
        1 - Trivia " "
        2 - Trivia "\n"
        2 - Number(4.0) "4"
        2 - Eof ""
        "###)
    }

    #[test]
    fn an_unexpected_character_does_not_stop_the_scanner() {
        let tokens = scan("@1");
        assert_display_snapshot!(tokens, @r###"
        1 - SyntaxError { error_msg: None } "@"
        1 - Number(1.0) "1"
        1 - Eof ""
        "###)
    }

    #[test]
    fn the_eof_token_carries_the_final_line() {
        let tokens = scan("1;\n2;\n");
        assert_display_snapshot!(tokens, @r###"
        1 - Number(1.0) "1"
        1 - Semicolon ";"
        2 - Trivia "\n"
        2 - Number(2.0) "2"
        2 - Semicolon ";"
        3 - Trivia "\n"
        3 - Eof ""
        "###)
    }
}
