//! Spreadsheet formula engine.
//!
//! Cells hold literals or `=`-prefixed formulas over `+ - * /`, cell references
//! and the aggregates `SUM`, `AVER`, `STDDEV`, `MAX` and `MIN` over `A1..B2`
//! ranges. Every formula cell remembers the cells its last evaluation read;
//! changing any of them recalculates it and, transitively, its own dependents.
//!
//! ```
//! use spreadcalc::{CellValue, SpreadSheet};
//!
//! let mut sheet = SpreadSheet::with_size(3, 3);
//! sheet.set_cell("A1", "10").unwrap();
//! sheet.set_cell("B1", "5").unwrap();
//! sheet.set_cell("C1", "=A1+B1").unwrap();
//! assert_eq!(sheet.get_cell("C1"), Some(&CellValue::Real(15.0)));
//!
//! sheet.set_cell("A1", "20").unwrap();
//! assert_eq!(sheet.get_cell("C1"), Some(&CellValue::Real(25.0)));
//! ```

mod config;
mod coord;
mod error;
mod eval;
mod grid;
pub mod recalc;
mod sheet;
mod tokenizer;
mod value;

pub use crate::config::{DivisionByZero, EmptyExtremum, EngineConfig, NonNumeric};
pub use crate::coord::Coordinate;
pub use crate::error::{Error, Result};
pub use crate::eval::{Evaluation, Evaluator, Function};
pub use crate::grid::{Cell, FormulaRecord, Grid, GridAccessor, GridAccessorMut};
pub use crate::recalc::RecalcReport;
pub use crate::sheet::SpreadSheet;
pub use crate::tokenizer::{Op, Token, Tokenizer};
pub use crate::value::CellValue;
