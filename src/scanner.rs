use peekmore::{PeekMore, PeekMoreIterator};
use std::str::Chars;

use crate::error::ScanError;
use crate::token::{keyword, LiteralValue, Token, TokenKind};

pub struct Scanner<'a> {
    source: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    errors: Vec<ScanError>,
    lexeme: String,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Scanner {
            source: source.chars().peekmore(),
            tokens: Vec::new(),
            errors: Vec::new(),
            lexeme: String::new(),
            line: 1,
        }
    }

    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<ScanError>) {
        while let Some(c) = self.advance() {
            self.lexeme.clear();
            self.lexeme.push(c);
            self.scan_token(c);
        }

        self.tokens.push(Token::eof(self.line));
        (self.tokens, self.errors)
    }

    fn advance(&mut self) -> Option<char> {
        self.source.next()
    }

    fn peek(&mut self) -> Option<char> {
        self.source.peek().copied()
    }

    fn peek_next(&mut self) -> Option<char> {
        self.source.peek_nth(1).copied()
    }

    fn matches(&mut self, expected: char) -> bool {
        match self.peek() {
            Some(c) if c == expected => {
                self.lexeme.push(c);
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_token_with_literal(kind, None);
    }

    fn add_token_with_literal(&mut self, kind: TokenKind, literal: Option<LiteralValue>) {
        self.tokens
            .push(Token::new(kind, self.lexeme.clone(), literal, self.line));
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(ScanError {
            line: self.line,
            message: message.into(),
        });
    }

    fn scan_token(&mut self, c: char) {
        match c {
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            '-' => self.add_token(TokenKind::Minus),
            '+' => self.add_token(TokenKind::Plus),
            ';' => self.add_token(TokenKind::Semicolon),
            '*' => self.add_token(TokenKind::Star),
            '!' => {
                let kind = if self.matches('=') { TokenKind::BangEqual } else { TokenKind::Bang };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.matches('=') { TokenKind::EqualEqual } else { TokenKind::Equal };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.matches('=') { TokenKind::LessEqual } else { TokenKind::Less };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.matches('=') { TokenKind::GreaterEqual } else { TokenKind::Greater };
                self.add_token(kind);
            }
            '/' => {
                if self.matches('/') {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,
            '"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if is_alpha(c) => self.identifier(),
            _ => self.error(format!("Unexpected character: {c}")),
        }
    }

    fn string(&mut self) {
        let mut value = String::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    self.lexeme.push('"');
                    break;
                }
                Some(c) => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    value.push(c);
                    self.lexeme.push(c);
                    self.advance();
                }
                None => {
                    self.error("Unterminated string.");
                    return;
                }
            }
        }
        self.add_token_with_literal(TokenKind::String, Some(LiteralValue::String(value)));
    }

    fn number(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            self.lexeme.push(c);
            self.advance();
        }

        // A fractional part requires a digit after the dot; a trailing dot
        // with nothing following it is left for the next token (e.g. a
        // method call on a number literal), not a scan error.
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.lexeme.push('.');
            self.advance();
            while let Some(c) = self.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                self.lexeme.push(c);
                self.advance();
            }
        }

        let value: f64 = self.lexeme.parse().expect("scanned digits form a valid number");
        self.add_token_with_literal(TokenKind::Number, Some(LiteralValue::Number(value)));
    }

    fn identifier(&mut self) {
        while let Some(c) = self.peek() {
            if !is_alphanumeric(c) {
                break;
            }
            self.lexeme.push(c);
            self.advance();
        }

        let kind = keyword(&self.lexeme).unwrap_or(TokenKind::Identifier);
        self.add_token(kind);
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alphanumeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}
