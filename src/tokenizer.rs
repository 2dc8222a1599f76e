//! Splits formula text into operator/operand token streams.
//!
//! There is no syntax tree: the additive level splits on `+`/`-`, and each
//! additive operand is split again on `*`/`/`. Parentheses only ever appear
//! inside function-call operands such as `SUM(A1..B2)`.

use std::fmt;

use santiago::lexer::LexerRules;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Op {
    fn from_glyph(glyph: &str) -> Option<Self> {
        match glyph {
            "+" => Some(Self::Add),
            "-" => Some(Self::Subtract),
            "*" => Some(Self::Multiply),
            "/" => Some(Self::Divide),
            _ => None,
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }

    pub fn is_additive(&self) -> bool {
        matches!(self, Self::Add | Self::Subtract)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Operator(Op),
    Operand(String),
}

pub struct Tokenizer {
    lexer: LexerRules,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            lexer: santiago::lexer_rules!(
                "DEFAULT" | "+" = string "+";
                "DEFAULT" | "-" = string "-";
                "DEFAULT" | "*" = string "*";
                "DEFAULT" | "/" = string "/";
                "DEFAULT" | "TEXT" = pattern r"[^+\-*/\s]+";
                "DEFAULT" | "WS" = pattern r"\s" => |lexer| lexer.skip();
            ),
        }
    }

    /// Splits on `+` and `-`, dropping whitespace. Input must not carry the
    /// leading `=`. Blank input yields no tokens.
    pub fn split_additive(&self, text: &str) -> Result<Vec<Token>> {
        self.split(text, true)
    }

    /// Splits one additive operand on `*` and `/`.
    pub fn split_multiplicative(&self, operand: &str) -> Result<Vec<Token>> {
        self.split(operand, false)
    }

    fn split(&self, text: &str, additive: bool) -> Result<Vec<Token>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let lexemes = santiago::lexer::lex(&self.lexer, text)?;

        let mut tokens = Vec::new();
        let mut operand = String::new();
        for lexeme in lexemes.iter() {
            match Op::from_glyph(&lexeme.kind) {
                Some(op) if op.is_additive() == additive => {
                    if !operand.is_empty() {
                        tokens.push(Token::Operand(std::mem::take(&mut operand)));
                    }
                    tokens.push(Token::Operator(op));
                }
                _ => operand.push_str(&lexeme.raw),
            }
        }

        // A dangling operator leaves nothing to apply it to.
        if operand.is_empty() {
            return Err(Error::MalformedFormula(text.trim().to_string()));
        }
        tokens.push(Token::Operand(operand));
        Ok(tokens)
    }
}
