use log::debug;

use crate::config::EngineConfig;
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::eval::Evaluator;
use crate::grid::{FormulaRecord, Grid, GridAccessor, GridAccessorMut};
use crate::recalc::{self, RecalcReport};
use crate::value::CellValue;

const DEFAULT_ROWS: usize = 10;
const DEFAULT_COLS: usize = 10;

/// A single sheet: a grid plus the engine that keeps its formulas current.
pub struct SpreadSheet {
    grid: Grid,
    evaluator: Evaluator,
}

impl Default for SpreadSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl SpreadSheet {
    pub fn new() -> Self {
        Self::with_size(DEFAULT_ROWS, DEFAULT_COLS)
    }

    pub fn with_size(rows: usize, cols: usize) -> Self {
        Self::with_config(rows, cols, EngineConfig::default())
    }

    pub fn with_config(rows: usize, cols: usize, config: EngineConfig) -> Self {
        Self {
            grid: Grid::new(rows, cols),
            evaluator: Evaluator::with_config(config),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn row_count(&self) -> usize {
        self.grid.row_count()
    }

    pub fn col_count(&self) -> usize {
        self.grid.col_count()
    }

    pub fn grow(&mut self, rows: usize, cols: usize) {
        self.grid.grow(rows, cols);
    }

    pub fn get_cell(&self, cell: &str) -> Option<&CellValue> {
        self.value_at(self.grid.resolve_label(cell)?)
    }

    pub fn value_at(&self, coord: Coordinate) -> Option<&CellValue> {
        self.grid.get_cell(coord)
    }

    /// Numeric content of a cell, if it holds a number.
    pub fn get_number(&self, cell: &str) -> Option<f64> {
        self.get_cell(cell)?.as_num()
    }

    pub fn formula(&self, cell: &str) -> Option<&FormulaRecord> {
        self.grid.formula(self.grid.resolve_label(cell)?)
    }

    pub fn set_cell(&mut self, cell: &str, input: &str) -> Result<RecalcReport> {
        let coord = self
            .grid
            .resolve_label(cell)
            .ok_or_else(|| Error::InvalidReference(cell.to_string()))?;
        self.set_cell_at(coord, input)
    }

    /// Stores `input` at `coord` and recalculates its dependents.
    ///
    /// `=`-prefixed input is evaluated first. If that fails the cell keeps its
    /// previous value, the formula is kept as inert text and the error is
    /// returned; nothing is recalculated.
    pub fn set_cell_at(&mut self, coord: Coordinate, input: &str) -> Result<RecalcReport> {
        if !self.grid.contains(coord) {
            return Err(Error::OutOfRange(coord));
        }

        if input.starts_with('=') {
            match self.evaluator.evaluate(input, coord, &self.grid) {
                Ok(evaluation) => {
                    debug!("{coord} <- {input} = {}", evaluation.value);
                    let record = FormulaRecord::new(input, evaluation.dependencies);
                    self.grid
                        .commit_formula(coord, CellValue::Real(evaluation.value), record)?;
                }
                Err(err) => {
                    debug!("{coord} <- {input} rejected: {err}");
                    self.grid.mark_inert(coord, input, err.clone())?;
                    return Err(err);
                }
            }
        } else {
            debug!("{coord} <- {input:?}");
            self.grid.set_value(coord, CellValue::from_input(input))?;
        }

        Ok(recalc::on_mutation(&self.evaluator, &mut self.grid, coord))
    }

    pub fn recalculate_all(&mut self) -> RecalcReport {
        recalc::recalculate_all(&self.evaluator, &mut self.grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DivisionByZero;

    #[test]
    fn sheet_works() {
        let mut sheet = SpreadSheet::new();

        sheet.set_cell("A2", "=1 + 2").unwrap();
        let res = sheet.get_number("A2").unwrap();
        assert_eq!(res, 3.0);
    }

    #[test]
    fn sheet_unset_cell_defaults_to_zero() {
        let mut sheet = SpreadSheet::new();

        sheet.set_cell("A3", "=1 + B4").unwrap();
        assert_eq!(sheet.get_number("A3"), Some(1.0));

        sheet.set_cell("B4", "2").unwrap();
        assert_eq!(sheet.get_number("A3"), Some(3.0));
    }

    #[test]
    fn sheet_literals_are_classified() {
        let mut sheet = SpreadSheet::new();

        sheet.set_cell("A1", "12").unwrap();
        sheet.set_cell("A2", "1.5").unwrap();
        sheet.set_cell("A3", "total").unwrap();
        sheet.set_cell("A4", "").unwrap();

        assert_eq!(sheet.get_cell("A1"), Some(&CellValue::Integer(12)));
        assert_eq!(sheet.get_cell("A2"), Some(&CellValue::Real(1.5)));
        assert_eq!(sheet.get_cell("A3"), Some(&CellValue::from("total")));
        assert_eq!(sheet.get_cell("A4"), Some(&CellValue::Empty));
        assert!(sheet.formula("A1").is_none());
    }

    #[test]
    fn sheet_leading_sign_works() {
        let mut sheet = SpreadSheet::new();

        sheet.set_cell("A3", "=+2").unwrap();
        assert_eq!(sheet.get_number("A3"), Some(2.0));
        sheet.set_cell("A3", "=-2").unwrap();
        assert_eq!(sheet.get_number("A3"), Some(-2.0));
        sheet.set_cell("A3", "=-2 + 2").unwrap();
        assert_eq!(sheet.get_number("A3"), Some(0.0));
    }

    #[test]
    fn sheet_failed_formula_keeps_previous_value() {
        let mut sheet = SpreadSheet::new();

        sheet.set_cell("A1", "7").unwrap();
        let err = sheet.set_cell("A1", "=A2+");
        assert_eq!(err, Err(Error::MalformedFormula("A2+".to_string())));

        assert_eq!(sheet.get_cell("A1"), Some(&CellValue::Integer(7)));
        let record = sheet.formula("A1").unwrap();
        assert_eq!(record.text, "=A2+");
        assert!(record.is_inert());
        assert!(record.dependencies.is_empty());
    }

    #[test]
    fn sheet_rejected_formula_stays_inert() {
        let mut sheet = SpreadSheet::with_size(2, 2);

        sheet.set_cell("A1", "1").unwrap();
        sheet.set_cell("B1", "=A1").unwrap();
        assert_eq!(
            sheet.set_cell("B1", "=C3"),
            Err(Error::InvalidToken("C3".to_string()))
        );

        // The rejected text would evaluate now, but nothing it reads changes B1.
        sheet.grow(3, 3);
        sheet.set_cell("C3", "9").unwrap();
        let report = sheet.set_cell("A1", "2").unwrap();

        assert!(report.is_empty());
        assert_eq!(sheet.get_number("B1"), Some(1.0));
        let record = sheet.formula("B1").unwrap();
        assert_eq!(record.text, "=C3");
        assert!(record.is_inert());
    }

    #[test]
    fn sheet_rejected_formula_does_not_report_on_later_edits() {
        let mut sheet = SpreadSheet::with_size(2, 2);

        sheet.set_cell("B1", "=A1").unwrap();
        assert!(sheet.set_cell("B1", "=C1+").is_err());

        assert_eq!(sheet.set_cell("A1", "5"), Ok(vec![]));
        assert!(sheet.recalculate_all().is_empty());
        assert_eq!(sheet.get_number("B1"), Some(0.0));
    }

    #[test]
    fn sheet_entering_a_valid_formula_revives_an_inert_cell() {
        let mut sheet = SpreadSheet::with_size(2, 2);

        assert!(sheet.set_cell("B1", "=A1*").is_err());
        sheet.set_cell("B1", "=A1*2").unwrap();
        sheet.set_cell("A1", "4").unwrap();

        assert_eq!(sheet.get_number("B1"), Some(8.0));
        assert!(!sheet.formula("B1").unwrap().is_inert());
    }

    #[test]
    fn sheet_uses_its_configuration() {
        let config = EngineConfig::default().with_division_by_zero(DivisionByZero::Error);
        let sheet = SpreadSheet::with_config(2, 2, config);

        assert_eq!(sheet.evaluator().config(), &config);
        assert_eq!(SpreadSheet::new().evaluator().config(), &EngineConfig::default());
    }

    #[test]
    fn sheet_overwriting_formula_with_literal_stops_tracking() {
        let mut sheet = SpreadSheet::new();

        sheet.set_cell("B1", "=A1*2").unwrap();
        sheet.set_cell("B1", "3").unwrap();
        sheet.set_cell("A1", "10").unwrap();

        assert_eq!(sheet.get_cell("B1"), Some(&CellValue::Integer(3)));
        assert!(sheet.formula("B1").is_none());
    }

    #[test]
    fn sheet_circular_dependency_terminates() {
        let mut sheet = SpreadSheet::new();

        sheet.set_cell("A3", "=A1").unwrap();
        sheet.set_cell("A1", "=A3 + 1").unwrap();

        assert!(sheet.get_number("A3").unwrap().is_finite());
        assert!(sheet.get_number("A1").unwrap().is_finite());
    }

    #[test]
    fn sheet_unknown_cells_are_rejected() {
        let mut sheet = SpreadSheet::with_size(2, 2);

        assert_eq!(
            sheet.set_cell("C1", "1"),
            Err(Error::InvalidReference("C1".to_string()))
        );
        assert_eq!(
            sheet.set_cell_at(Coordinate::new(2, 0), "1"),
            Err(Error::OutOfRange(Coordinate::new(2, 0)))
        );

        sheet.grow(3, 3);
        sheet.set_cell("C3", "1").unwrap();
        assert_eq!(sheet.get_number("C3"), Some(1.0));
    }
}
