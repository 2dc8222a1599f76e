//! Formula evaluation against a grid.

use std::collections::BTreeSet;

use log::debug;

use crate::config::{DivisionByZero, EmptyExtremum, EngineConfig, NonNumeric};
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::grid::GridAccessor;
use crate::tokenizer::{Op, Token, Tokenizer};

/// Result of one successful evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    /// Every coordinate read, including all cells of aggregated ranges.
    pub dependencies: BTreeSet<Coordinate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sum,
    Aver,
    StdDev,
    Max,
    Min,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SUM" => Some(Self::Sum),
            "AVER" => Some(Self::Aver),
            "STDDEV" => Some(Self::StdDev),
            "MAX" => Some(Self::Max),
            "MIN" => Some(Self::Min),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sum => "SUM",
            Self::Aver => "AVER",
            Self::StdDev => "STDDEV",
            Self::Max => "MAX",
            Self::Min => "MIN",
        }
    }

    /// Applies the aggregate to the values gathered from a range. `None` when
    /// MAX or MIN saw no values.
    fn apply(&self, values: &[f64]) -> Option<f64> {
        let count = values.len() as f64;
        let sum: f64 = values.iter().sum();
        let result = match self {
            Self::Sum => sum,
            Self::Aver if values.is_empty() => 0.0,
            Self::Aver => sum / count,
            Self::StdDev if values.is_empty() => 0.0,
            Self::StdDev => {
                let mean = sum / count;
                let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count;
                variance.sqrt()
            }
            Self::Max if values.is_empty() => return None,
            Self::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Min if values.is_empty() => return None,
            Self::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        };
        Some(result)
    }

    fn empty_extremum(&self) -> f64 {
        match self {
            Self::Min => f64::INFINITY,
            _ => f64::NEG_INFINITY,
        }
    }
}

pub struct Evaluator {
    tokenizer: Tokenizer,
    config: EngineConfig,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluates `formula` (with or without its leading `=`) for the cell at
    /// `target`. Nothing is written to the grid.
    pub fn evaluate<G: GridAccessor + ?Sized>(
        &self,
        formula: &str,
        target: Coordinate,
        grid: &G,
    ) -> Result<Evaluation> {
        let body = formula.strip_prefix('=').unwrap_or(formula);
        let mut dependencies = BTreeSet::new();

        let mut value = 0.0;
        let mut op = Op::Add;
        for token in self.tokenizer.split_additive(body)? {
            match token {
                Token::Operator(next) => op = next,
                Token::Operand(term) => {
                    let term = self.evaluate_term(&term, grid, &mut dependencies)?;
                    match op {
                        Op::Subtract => value -= term,
                        _ => value += term,
                    }
                }
            }
        }

        debug!(
            "{target}: {formula} = {value} (reads {} cells)",
            dependencies.len()
        );
        Ok(Evaluation {
            value,
            dependencies,
        })
    }

    fn evaluate_term<G: GridAccessor + ?Sized>(
        &self,
        term: &str,
        grid: &G,
        dependencies: &mut BTreeSet<Coordinate>,
    ) -> Result<f64> {
        let mut tokens = self.tokenizer.split_multiplicative(term)?.into_iter();
        let mut value = match tokens.next() {
            Some(Token::Operand(first)) => self.resolve_operand(&first, grid, dependencies)?,
            _ => return Err(Error::MalformedFormula(term.to_string())),
        };

        let mut op = Op::Multiply;
        for token in tokens {
            match token {
                Token::Operator(next) => op = next,
                Token::Operand(operand) => {
                    let operand = self.resolve_operand(&operand, grid, dependencies)?;
                    value = match op {
                        Op::Divide => value / self.divisor(operand)?,
                        _ => value * operand,
                    };
                }
            }
        }
        Ok(value)
    }

    fn divisor(&self, value: f64) -> Result<f64> {
        if value != 0.0 {
            return Ok(value);
        }
        match self.config.division_by_zero {
            DivisionByZero::SubstituteOne => Ok(1.0),
            DivisionByZero::Error => Err(Error::DivisionByZero),
        }
    }

    /// Resolves a single operand: a cell reference, then an aggregate call,
    /// then a numeric literal.
    fn resolve_operand<G: GridAccessor + ?Sized>(
        &self,
        operand: &str,
        grid: &G,
        dependencies: &mut BTreeSet<Coordinate>,
    ) -> Result<f64> {
        if let Some(coord) = grid.resolve_label(operand) {
            dependencies.insert(coord);
            return Ok(grid.get_cell(coord).map(|v| v.as_f64()).unwrap_or_default());
        }

        if let Some((function, range)) = parse_call(operand) {
            let (start, end) = range
                .split_once("..")
                .ok_or_else(|| Error::InvalidReference(range.to_string()))?;
            let resolve = |label: &str| {
                grid.resolve_label(label)
                    .ok_or_else(|| Error::InvalidReference(label.to_string()))
            };
            let (start, end) = (resolve(start)?, resolve(end)?);
            return self.aggregate(function, start, end, grid, dependencies);
        }

        parse_number(operand).ok_or_else(|| Error::InvalidToken(operand.to_string()))
    }

    fn aggregate<G: GridAccessor + ?Sized>(
        &self,
        function: Function,
        start: Coordinate,
        end: Coordinate,
        grid: &G,
        dependencies: &mut BTreeSet<Coordinate>,
    ) -> Result<f64> {
        let mut values = Vec::new();
        for coord in grid.cells_in_range(start, end) {
            dependencies.insert(coord);
            match grid.get_cell(coord).and_then(|v| v.as_num()) {
                Some(value) => values.push(value),
                None if self.config.non_numeric == NonNumeric::CountAsZero => values.push(0.0),
                None => {}
            }
        }

        match function.apply(&values) {
            Some(value) => Ok(value),
            None => match self.config.empty_extremum {
                EmptyExtremum::Infinity => Ok(function.empty_extremum()),
                EmptyExtremum::Error => Err(Error::EmptyRange(format!(
                    "{}({start}..{end})",
                    function.name()
                ))),
            },
        }
    }
}

/// Splits `NAME(args)` into a known aggregate and its argument text.
fn parse_call(operand: &str) -> Option<(Function, &str)> {
    let open = operand.find('(')?;
    let args = operand[open + 1..].strip_suffix(')')?;
    let function = Function::from_name(&operand[..open])?;
    Some((function, args))
}

/// Digits with at most one decimal point.
fn parse_number(operand: &str) -> Option<f64> {
    let mut seen_point = false;
    for c in operand.chars() {
        match c {
            '0'..='9' => {}
            '.' if !seen_point => seen_point = true,
            _ => return None,
        }
    }
    if !operand.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    operand.parse().ok()
}
