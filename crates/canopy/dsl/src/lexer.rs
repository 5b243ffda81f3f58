//! Lexer: tokenizes DSL source text
//!
//! Tokenizing never fails. Characters the lexer does not recognize
//! become [`TokenKind::Unknown`] tokens and surface as syntax errors in
//! the parser, so a stray character cannot abort processing the file.

use serde::{Deserialize, Serialize};

/// A token produced by the lexer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The raw text of the token (string literals exclude the quotes)
    pub text: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub col: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            col,
        }
    }
}

/// Token types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    // Keywords
    Agent,
    Task,
    Workflow,
    Spawn,
    Contract,
    Route,
    Gather,
    Emit,
    Validate,
    Process,
    With,
    To,
    From,
    On,
    Completion,

    // Identifiers and literals
    Identifier,
    StringLiteral,
    NumberLiteral,

    // Punctuation
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    Colon,
    Comma,
    Dot,

    // Anything the lexer cannot classify — a deferred syntax error
    Unknown,

    // End of input
    Eof,
}

impl TokenKind {
    /// Whether this kind starts a top-level declaration
    pub fn starts_declaration(&self) -> bool {
        matches!(self, Self::Agent | Self::Workflow | Self::Task | Self::Gather)
    }

    /// Whether this kind is one of the reserved, grammarless keywords
    pub fn is_reserved(&self) -> bool {
        matches!(self, Self::Spawn | Self::Contract | Self::Emit)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Agent => write!(f, "agent"),
            Self::Task => write!(f, "task"),
            Self::Workflow => write!(f, "workflow"),
            Self::Spawn => write!(f, "spawn"),
            Self::Contract => write!(f, "contract"),
            Self::Route => write!(f, "route"),
            Self::Gather => write!(f, "gather"),
            Self::Emit => write!(f, "emit"),
            Self::Validate => write!(f, "validate"),
            Self::Process => write!(f, "process"),
            Self::With => write!(f, "with"),
            Self::To => write!(f, "to"),
            Self::From => write!(f, "from"),
            Self::On => write!(f, "on"),
            Self::Completion => write!(f, "completion"),
            Self::Identifier => write!(f, "identifier"),
            Self::StringLiteral => write!(f, "string literal"),
            Self::NumberLiteral => write!(f, "number"),
            Self::OpenBrace => write!(f, "{{"),
            Self::CloseBrace => write!(f, "}}"),
            Self::OpenBracket => write!(f, "["),
            Self::CloseBracket => write!(f, "]"),
            Self::OpenParen => write!(f, "("),
            Self::CloseParen => write!(f, ")"),
            Self::Colon => write!(f, ":"),
            Self::Comma => write!(f, ","),
            Self::Dot => write!(f, "."),
            Self::Unknown => write!(f, "unknown input"),
            Self::Eof => write!(f, "end of input"),
        }
    }
}

/// Lexer for the DSL
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    /// Create a new lexer from input text
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Tokenize the entire input. Infallible; the final token is always Eof.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.pos >= self.input.len() {
                tokens.push(Token::new(TokenKind::Eof, "", self.line, self.col));
                break;
            }

            tokens.push(self.next_token());
        }

        tokens
    }

    fn next_token(&mut self) -> Token {
        let ch = self.input[self.pos];
        let line = self.line;
        let col = self.col;

        let punct = |kind| {
            let text = ch.to_string();
            (kind, text)
        };

        match ch {
            '{' | '}' | '[' | ']' | '(' | ')' | ':' | ',' | '.' => {
                let (kind, text) = match ch {
                    '{' => punct(TokenKind::OpenBrace),
                    '}' => punct(TokenKind::CloseBrace),
                    '[' => punct(TokenKind::OpenBracket),
                    ']' => punct(TokenKind::CloseBracket),
                    '(' => punct(TokenKind::OpenParen),
                    ')' => punct(TokenKind::CloseParen),
                    ':' => punct(TokenKind::Colon),
                    ',' => punct(TokenKind::Comma),
                    _ => punct(TokenKind::Dot),
                };
                self.advance();
                Token::new(kind, text, line, col)
            }
            '"' => self.read_string_literal(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.read_identifier_or_keyword(),
            other => {
                self.advance();
                Token::new(TokenKind::Unknown, other.to_string(), line, col)
            }
        }
    }

    fn read_string_literal(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        self.advance(); // skip opening quote

        let mut text = String::new();
        while self.pos < self.input.len() && self.input[self.pos] != '"' {
            // No escape processing: characters are taken literally.
            if self.input[self.pos] == '\n' {
                break;
            }
            text.push(self.input[self.pos]);
            self.advance();
        }

        if self.pos >= self.input.len() || self.input[self.pos] != '"' {
            // Unterminated literal: hand the fragment to the parser as Unknown
            return Token::new(TokenKind::Unknown, format!("\"{}", text), line, col);
        }

        self.advance(); // skip closing quote
        Token::new(TokenKind::StringLiteral, text, line, col)
    }

    fn read_number(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let mut text = String::new();

        while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
            text.push(self.input[self.pos]);
            self.advance();
        }

        // Optional fractional part; a trailing bare '.' stays a Dot token
        if self.pos < self.input.len()
            && self.input[self.pos] == '.'
            && self.peek_at(1).is_some_and(|c| c.is_ascii_digit())
        {
            text.push('.');
            self.advance();
            while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
                text.push(self.input[self.pos]);
                self.advance();
            }
        }

        Token::new(TokenKind::NumberLiteral, text, line, col)
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let mut text = String::new();

        while self.pos < self.input.len()
            && (self.input[self.pos].is_ascii_alphanumeric() || self.input[self.pos] == '_')
        {
            text.push(self.input[self.pos]);
            self.advance();
        }

        let kind = match text.as_str() {
            "agent" => TokenKind::Agent,
            "task" => TokenKind::Task,
            "workflow" => TokenKind::Workflow,
            "spawn" => TokenKind::Spawn,
            "contract" => TokenKind::Contract,
            "route" => TokenKind::Route,
            "gather" => TokenKind::Gather,
            "emit" => TokenKind::Emit,
            "validate" => TokenKind::Validate,
            "process" => TokenKind::Process,
            "with" => TokenKind::With,
            "to" => TokenKind::To,
            "from" => TokenKind::From,
            "on" => TokenKind::On,
            "completion" => TokenKind::Completion,
            _ => TokenKind::Identifier,
        };

        Token::new(kind, text, line, col)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while self.pos < self.input.len() {
            let ch = self.input[self.pos];
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '#' {
                // Line comment
                while self.pos < self.input.len() && self.input[self.pos] != '\n' {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            if self.input[self.pos] == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
            self.pos += 1;
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }
}

/// Tokenize DSL source text. Never fails.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}
