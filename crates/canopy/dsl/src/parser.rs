//! Parser: resilient recursive descent over the token stream
//!
//! One top-level declaration per `agent | workflow | task | gather`
//! keyword. A malformed declaration records a [`SyntaxError`] and the
//! parser skips to the next top-level keyword, so a single typo does not
//! lose the rest of the file. Errors are returned alongside the
//! [`Program`], never thrown.

use crate::errors::SyntaxError;
use crate::lexer::{tokenize, Token, TokenKind};
use canopy_types::{
    ActionCall, AgentDecl, CompletionHandler, Program, ServiceLevel, Step, StepVerb, TaskDecl,
    WorkflowDecl,
};

/// A block literal value: `key: <value>`
#[derive(Clone, Debug, PartialEq)]
enum Value {
    Str(String),
    Num(f64),
    Ident(String),
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Value {
    fn describe(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Num(_) => "number",
            Self::Ident(_) => "identifier",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Array whose items are all strings or identifiers
    fn into_name_array(self) -> Option<Vec<String>> {
        match self {
            Self::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Self::Str(s) | Self::Ident(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }
}

/// Parse a token stream into a [`Program`] plus all syntax errors found.
pub fn parse(tokens: Vec<Token>) -> (Program, Vec<SyntaxError>) {
    Parser::new(tokens).run()
}

/// Tokenize and parse DSL source text in one call.
pub fn parse_source(source: &str) -> (Program, Vec<SyntaxError>) {
    parse(tokenize(source))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<SyntaxError>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    fn run(mut self) -> (Program, Vec<SyntaxError>) {
        let mut program = Program::new();

        loop {
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Agent => match self.parse_agent() {
                    Ok(agent) => program.agents.push(agent),
                    Err(err) => self.recover(err),
                },
                TokenKind::Workflow => match self.parse_workflow() {
                    Ok(workflow) => program.workflows.push(workflow),
                    Err(err) => self.recover(err),
                },
                TokenKind::Task => match self.parse_task() {
                    Ok(task) => program.tasks.push(task),
                    Err(err) => self.recover(err),
                },
                TokenKind::Gather => match self.parse_gather() {
                    Ok(handler) => program.handlers.push(handler),
                    Err(err) => self.recover(err),
                },
                kind if kind.is_reserved() => {
                    let tok = self.advance();
                    let err = SyntaxError::new(
                        tok.line,
                        tok.col,
                        format!("'{}' is a reserved keyword with no declaration form", tok.text),
                    );
                    self.recover(err);
                }
                _ => {
                    let tok = self.advance();
                    let err = SyntaxError::new(
                        tok.line,
                        tok.col,
                        format!(
                            "expected a top-level declaration (agent, workflow, task, gather), \
                             found '{}'",
                            tok.text
                        ),
                    );
                    self.recover(err);
                }
            }
        }

        (program, self.errors)
    }

    /// Record the error and skip to the next top-level keyword.
    fn recover(&mut self, err: SyntaxError) {
        self.errors.push(err);
        while !self.peek_kind().starts_declaration() && self.peek_kind() != TokenKind::Eof {
            self.advance();
        }
    }

    // ── Declarations ─────────────────────────────────────────────────

    fn parse_agent(&mut self) -> Result<AgentDecl, SyntaxError> {
        let keyword = self.expect(TokenKind::Agent)?;
        let name = self.expect(TokenKind::Identifier)?;
        let mut agent = AgentDecl::new(name.text, keyword.line);

        self.expect(TokenKind::OpenBrace)?;
        while !self.check(TokenKind::CloseBrace) && !self.check(TokenKind::Eof) {
            let (key, key_tok) = self.parse_field_key()?;
            let value = self.parse_value()?;

            match key.as_str() {
                "capabilities" => {
                    self.assign_name_array(&mut agent.capabilities, value, &key_tok, "capabilities")
                }
                "max_concurrent_tasks" => match value {
                    Value::Num(n) if n.fract() == 0.0 => {
                        agent.max_concurrent_tasks = Some(n as u32)
                    }
                    other => self.field_error(
                        &key_tok,
                        format!("expected an integer, found {}", other.describe()),
                    ),
                },
                "load_threshold" => match value {
                    Value::Num(n) => agent.load_threshold = Some(n),
                    other => self.field_error(
                        &key_tok,
                        format!("expected a number, found {}", other.describe()),
                    ),
                },
                "sla" => match value {
                    Value::Object(fields) => agent.sla = Some(self.build_sla(fields, &key_tok)),
                    other => self.field_error(
                        &key_tok,
                        format!("expected a nested object, found {}", other.describe()),
                    ),
                },
                "dependencies" => {
                    self.assign_name_array(&mut agent.dependencies, value, &key_tok, "dependencies")
                }
                unknown => self.field_error(
                    &key_tok,
                    format!("unknown field '{}' in agent declaration", unknown),
                ),
            }
        }
        self.expect(TokenKind::CloseBrace)?;

        Ok(agent)
    }

    fn parse_workflow(&mut self) -> Result<WorkflowDecl, SyntaxError> {
        let keyword = self.expect(TokenKind::Workflow)?;
        let name = self.expect(TokenKind::Identifier)?;
        let mut workflow = WorkflowDecl::new(name.text, keyword.line);

        self.expect(TokenKind::OpenBrace)?;
        while !self.check(TokenKind::CloseBrace) && !self.check(TokenKind::Eof) {
            let (key, key_tok) = self.parse_field_key()?;
            let value = self.parse_value()?;

            match key.as_str() {
                "agents" => self.assign_name_array(&mut workflow.agents, value, &key_tok, "agents"),
                "coordination_model" => match value {
                    Value::Str(s) => workflow.coordination_model = Some(s),
                    other => self.field_error(
                        &key_tok,
                        format!("expected a string, found {}", other.describe()),
                    ),
                },
                "learning_mode" => match value {
                    Value::Str(s) => workflow.learning_mode = Some(s),
                    other => self.field_error(
                        &key_tok,
                        format!("expected a string, found {}", other.describe()),
                    ),
                },
                "stages" => self.assign_name_array(&mut workflow.stages, value, &key_tok, "stages"),
                unknown => self.field_error(
                    &key_tok,
                    format!("unknown field '{}' in workflow declaration", unknown),
                ),
            }
        }
        self.expect(TokenKind::CloseBrace)?;

        Ok(workflow)
    }

    fn parse_task(&mut self) -> Result<TaskDecl, SyntaxError> {
        let keyword = self.expect(TokenKind::Task)?;
        let name = self.expect(TokenKind::Identifier)?;
        let mut task = TaskDecl::new(name.text, keyword.line);

        self.expect(TokenKind::OpenBrace)?;
        while !self.check(TokenKind::CloseBrace) && !self.check(TokenKind::Eof) {
            match self.peek_kind() {
                TokenKind::Route => {
                    let verb_tok = self.advance();
                    self.expect(TokenKind::To)?;
                    let agent = self.expect(TokenKind::Identifier)?;
                    task.steps.push(Step {
                        verb: StepVerb::Route,
                        agent: agent.text,
                        line: verb_tok.line,
                    });
                }
                TokenKind::Validate | TokenKind::Process => {
                    let verb_tok = self.advance();
                    let verb = if verb_tok.kind == TokenKind::Validate {
                        StepVerb::Validate
                    } else {
                        StepVerb::Process
                    };
                    self.expect(TokenKind::With)?;
                    let agent = self.expect(TokenKind::Identifier)?;
                    task.steps.push(Step {
                        verb,
                        agent: agent.text,
                        line: verb_tok.line,
                    });
                }
                TokenKind::Identifier => {
                    let (key, key_tok) = self.parse_field_key()?;
                    let value = self.parse_value()?;

                    match key.as_str() {
                        "input" => match value {
                            Value::Str(s) | Value::Ident(s) => task.input = Some(s),
                            other => self.field_error(
                                &key_tok,
                                format!(
                                    "expected a string or identifier, found {}",
                                    other.describe()
                                ),
                            ),
                        },
                        "priority" => match value {
                            Value::Str(s) | Value::Ident(s) => task.priority = Some(s),
                            other => self.field_error(
                                &key_tok,
                                format!(
                                    "expected a string or identifier, found {}",
                                    other.describe()
                                ),
                            ),
                        },
                        "deadline" => match value {
                            Value::Str(s) => task.deadline = Some(s),
                            other => self.field_error(
                                &key_tok,
                                format!("expected a string, found {}", other.describe()),
                            ),
                        },
                        unknown => self.field_error(
                            &key_tok,
                            format!("unknown field '{}' in task declaration", unknown),
                        ),
                    }
                }
                _ => {
                    let tok = self.peek().clone();
                    return Err(SyntaxError::new(
                        tok.line,
                        tok.col,
                        format!("unexpected '{}' in task body", tok.text),
                    ));
                }
            }
        }
        self.expect(TokenKind::CloseBrace)?;

        Ok(task)
    }

    fn parse_gather(&mut self) -> Result<CompletionHandler, SyntaxError> {
        let keyword = self.expect(TokenKind::Gather)?;
        let binding = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::From)?;

        let sources_value = self.parse_value()?;
        let sources = match sources_value.clone().into_name_array() {
            Some(names) => names,
            None => {
                return Err(SyntaxError::new(
                    keyword.line,
                    keyword.col,
                    format!(
                        "gather sources must be an array of agent names, found {}",
                        sources_value.describe()
                    ),
                ))
            }
        };

        self.expect(TokenKind::On)?;
        self.expect(TokenKind::Completion)?;
        self.expect(TokenKind::OpenBrace)?;

        let mut actions = Vec::new();
        while !self.check(TokenKind::CloseBrace) && !self.check(TokenKind::Eof) {
            actions.push(self.parse_action_call()?);
        }
        self.expect(TokenKind::CloseBrace)?;

        Ok(CompletionHandler {
            binding: binding.text,
            line: keyword.line,
            sources,
            actions,
        })
    }

    /// `name(arg, arg, ...)` with identifier, string, or number arguments
    fn parse_action_call(&mut self) -> Result<ActionCall, SyntaxError> {
        let name = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::OpenParen)?;

        let mut args = Vec::new();
        while !self.check(TokenKind::CloseParen) && !self.check(TokenKind::Eof) {
            let tok = self.peek().clone();
            match tok.kind {
                TokenKind::Identifier | TokenKind::StringLiteral | TokenKind::NumberLiteral => {
                    args.push(tok.text);
                    self.advance();
                }
                _ => {
                    return Err(SyntaxError::new(
                        tok.line,
                        tok.col,
                        format!("unexpected '{}' in action arguments", tok.text),
                    ))
                }
            }
            if self.check(TokenKind::Comma) {
                self.advance();
            }
        }
        self.expect(TokenKind::CloseParen)?;

        Ok(ActionCall {
            name: name.text,
            args,
        })
    }

    // ── Values ───────────────────────────────────────────────────────

    /// `key :` — returns the key text and its token for error locations
    fn parse_field_key(&mut self) -> Result<(String, Token), SyntaxError> {
        let key = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::Colon)?;
        Ok((key.text.clone(), key))
    }

    fn parse_value(&mut self) -> Result<Value, SyntaxError> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::StringLiteral => {
                self.advance();
                Ok(Value::Str(tok.text))
            }
            TokenKind::NumberLiteral => {
                self.advance();
                // The lexer only emits well-formed decimal numbers
                let n = tok.text.parse::<f64>().map_err(|_| {
                    SyntaxError::new(tok.line, tok.col, format!("malformed number '{}'", tok.text))
                })?;
                Ok(Value::Num(n))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Value::Ident(tok.text))
            }
            TokenKind::OpenBracket => {
                self.advance();
                let mut items = Vec::new();
                while !self.check(TokenKind::CloseBracket) && !self.check(TokenKind::Eof) {
                    items.push(self.parse_value()?);
                    if self.check(TokenKind::Comma) {
                        self.advance();
                    }
                }
                self.expect(TokenKind::CloseBracket)?;
                Ok(Value::Array(items))
            }
            TokenKind::OpenBrace => {
                self.advance();
                let mut fields = Vec::new();
                while !self.check(TokenKind::CloseBrace) && !self.check(TokenKind::Eof) {
                    let (key, _) = self.parse_field_key()?;
                    let value = self.parse_value()?;
                    fields.push((key, value));
                }
                self.expect(TokenKind::CloseBrace)?;
                Ok(Value::Object(fields))
            }
            _ => Err(SyntaxError::new(
                tok.line,
                tok.col,
                format!(
                    "expected a value (string, number, array, or object), found '{}'",
                    tok.text
                ),
            )),
        }
    }

    fn build_sla(&mut self, fields: Vec<(String, Value)>, key_tok: &Token) -> ServiceLevel {
        let mut sla = ServiceLevel::default();
        for (key, value) in fields {
            match (key.as_str(), value) {
                ("response_time", Value::Str(s)) => sla.response_time = Some(s),
                ("availability", Value::Str(s)) => sla.availability = Some(s),
                ("throughput", Value::Str(s)) => sla.throughput = Some(s),
                (other, value) => self.field_error(
                    key_tok,
                    format!(
                        "unsupported sla entry '{}: {}' (expected response_time, availability, \
                         or throughput as strings)",
                        other,
                        value.describe()
                    ),
                ),
            }
        }
        sla
    }

    /// Apply an array-of-names value to a declaration field, recording a
    /// field-level error (without aborting the block) on mismatch.
    fn assign_name_array(
        &mut self,
        target: &mut Vec<String>,
        value: Value,
        key_tok: &Token,
        field: &str,
    ) {
        let described = value.describe();
        match value.into_name_array() {
            Some(names) => *target = names,
            None => self.field_error(
                key_tok,
                format!(
                    "'{}' must be an array of strings or identifiers, found {}",
                    field, described
                ),
            ),
        }
    }

    fn field_error(&mut self, key_tok: &Token, message: String) {
        self.errors
            .push(SyntaxError::new(key_tok.line, key_tok.col, message));
    }

    // ── Token helpers ────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let tok = self.peek().clone();
            let found = if tok.kind == TokenKind::Eof {
                "end of input".to_string()
            } else {
                format!("'{}'", tok.text)
            };
            Err(SyntaxError::new(
                tok.line,
                tok.col,
                format!("expected {}, found {}", kind, found),
            ))
        }
    }
}
