//! Cell storage and the accessor contract the formula engine works through.

use std::collections::BTreeSet;

use crate::coord::Coordinate;
use crate::error::Error;
use crate::value::CellValue;

/// The formula owned by a formula-bearing cell.
///
/// `dependencies` holds exactly the coordinates read by the last successful
/// evaluation. It is only ever replaced wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaRecord {
    pub text: String,
    pub dependencies: BTreeSet<Coordinate>,
    /// Set when the entered text failed to evaluate. The cell then keeps its
    /// previous value and dependency set, and is left out of recalculation.
    pub error: Option<Error>,
}

impl FormulaRecord {
    pub fn new(text: impl Into<String>, dependencies: BTreeSet<Coordinate>) -> Self {
        Self {
            text: text.into(),
            dependencies,
            error: None,
        }
    }

    pub fn is_inert(&self) -> bool {
        self.error.is_some()
    }

    pub fn depends_on(&self, coord: &Coordinate) -> bool {
        self.dependencies.contains(coord)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub formula: Option<FormulaRecord>,
}

/// Read access to a grid, as required by the evaluator.
pub trait GridAccessor {
    fn get_cell(&self, coord: Coordinate) -> Option<&CellValue>;

    fn formula(&self, coord: Coordinate) -> Option<&FormulaRecord>;

    fn row_count(&self) -> usize;

    fn col_count(&self) -> usize;

    fn contains(&self, coord: Coordinate) -> bool {
        coord.row < self.row_count() && coord.col < self.col_count()
    }

    fn label_of(&self, coord: Coordinate) -> String {
        coord.label()
    }

    /// Inverse of [`GridAccessor::label_of`]. `None` if the label is malformed
    /// or names a cell outside the current extents.
    fn resolve_label(&self, label: &str) -> Option<Coordinate> {
        Coordinate::parse_label(label).filter(|coord| self.contains(*coord))
    }

    /// Every coordinate of the rectangle spanned by `a` and `b`, row-major.
    /// Corner order does not matter.
    fn cells_in_range(&self, a: Coordinate, b: Coordinate) -> Vec<Coordinate> {
        let (start, end) = a.normalize(b);
        (start.row..=end.row)
            .flat_map(|row| (start.col..=end.col).map(move |col| Coordinate::new(row, col)))
            .collect()
    }

    /// Coordinates of all formula cells, row-major.
    fn formula_cells(&self) -> Vec<Coordinate> {
        let mut cells = Vec::new();
        for row in 0..self.row_count() {
            for col in 0..self.col_count() {
                let coord = Coordinate::new(row, col);
                if self.formula(coord).is_some() {
                    cells.push(coord);
                }
            }
        }
        cells
    }
}

/// Write access used by the sheet and the recalculation engine.
pub trait GridAccessorMut: GridAccessor {
    /// Stores a literal value, dropping any formula the cell had.
    fn set_value(&mut self, coord: Coordinate, value: CellValue) -> Result<(), Error>;

    /// Stores a successful evaluation together with its formula record.
    fn commit_formula(
        &mut self,
        coord: Coordinate,
        value: CellValue,
        record: FormulaRecord,
    ) -> Result<(), Error>;

    /// Records `text` as a rejected formula. The cell's value and its previous
    /// dependency set are left alone; the record is never re-evaluated.
    fn mark_inert(&mut self, coord: Coordinate, text: &str, error: Error) -> Result<(), Error>;
}

/// Rectangular, growable cell store.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    cols: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: vec![vec![Cell::default(); cols]; rows],
            cols,
        }
    }

    /// Enlarges the grid to at least `rows × cols`. Never shrinks.
    pub fn grow(&mut self, rows: usize, cols: usize) {
        if cols > self.cols {
            for row in self.rows.iter_mut() {
                row.resize_with(cols, Cell::default);
            }
            self.cols = cols;
        }
        if rows > self.rows.len() {
            let width = self.cols;
            self.rows.resize_with(rows, || vec![Cell::default(); width]);
        }
    }

    pub fn cell(&self, coord: Coordinate) -> Option<&Cell> {
        self.rows.get(coord.row)?.get(coord.col)
    }

    fn cell_mut(&mut self, coord: Coordinate) -> Result<&mut Cell, Error> {
        self.rows
            .get_mut(coord.row)
            .and_then(|row| row.get_mut(coord.col))
            .ok_or(Error::OutOfRange(coord))
    }
}

impl GridAccessor for Grid {
    fn get_cell(&self, coord: Coordinate) -> Option<&CellValue> {
        self.cell(coord).map(|cell| &cell.value)
    }

    fn formula(&self, coord: Coordinate) -> Option<&FormulaRecord> {
        self.cell(coord)?.formula.as_ref()
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn col_count(&self) -> usize {
        self.cols
    }
}

impl GridAccessorMut for Grid {
    fn set_value(&mut self, coord: Coordinate, value: CellValue) -> Result<(), Error> {
        let cell = self.cell_mut(coord)?;
        cell.value = value;
        cell.formula = None;
        Ok(())
    }

    fn commit_formula(
        &mut self,
        coord: Coordinate,
        value: CellValue,
        record: FormulaRecord,
    ) -> Result<(), Error> {
        let cell = self.cell_mut(coord)?;
        cell.value = value;
        cell.formula = Some(record);
        Ok(())
    }

    fn mark_inert(&mut self, coord: Coordinate, text: &str, error: Error) -> Result<(), Error> {
        let cell = self.cell_mut(coord)?;
        let dependencies = cell
            .formula
            .take()
            .map(|record| record.dependencies)
            .unwrap_or_default();
        cell.formula = Some(FormulaRecord {
            text: text.to_string(),
            dependencies,
            error: Some(error),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(row: usize, col: usize) -> Coordinate {
        Coordinate::new(row, col)
    }

    #[test]
    fn new_grid_is_empty() {
        let grid = Grid::new(3, 4);
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.col_count(), 4);
        assert_eq!(grid.get_cell(c(2, 3)), Some(&CellValue::Empty));
        assert_eq!(grid.get_cell(c(3, 0)), None);
        assert!(grid.formula_cells().is_empty());
    }

    #[test]
    fn grow_never_shrinks() {
        let mut grid = Grid::new(2, 2);
        grid.set_value(c(1, 1), CellValue::Integer(5)).unwrap();

        grid.grow(4, 3);
        assert_eq!(grid.row_count(), 4);
        assert_eq!(grid.col_count(), 3);
        assert_eq!(grid.get_cell(c(3, 2)), Some(&CellValue::Empty));
        assert_eq!(grid.get_cell(c(1, 1)), Some(&CellValue::Integer(5)));

        grid.grow(1, 1);
        assert_eq!(grid.row_count(), 4);
        assert_eq!(grid.col_count(), 3);
    }

    #[test]
    fn resolve_label_respects_extents() {
        let mut grid = Grid::new(2, 2);
        assert_eq!(grid.resolve_label("B2"), Some(c(1, 1)));
        assert_eq!(grid.resolve_label("C1"), None);
        assert_eq!(grid.resolve_label("A3"), None);

        grid.grow(3, 3);
        assert_eq!(grid.resolve_label("C3"), Some(c(2, 2)));
        assert_eq!(grid.label_of(c(2, 2)), "C3");
    }

    #[test]
    fn cells_in_range_is_rectangular_and_normalized() {
        let grid = Grid::new(5, 5);
        let expected = vec![c(0, 0), c(0, 1), c(1, 0), c(1, 1)];
        assert_eq!(grid.cells_in_range(c(0, 0), c(1, 1)), expected);
        assert_eq!(grid.cells_in_range(c(1, 1), c(0, 0)), expected);
        assert_eq!(grid.cells_in_range(c(1, 0), c(0, 1)), expected);
        assert_eq!(grid.cells_in_range(c(2, 2), c(2, 2)), vec![c(2, 2)]);
    }

    #[test]
    fn set_value_clears_formula() {
        let mut grid = Grid::new(2, 2);
        let record = FormulaRecord::new("=A2", BTreeSet::from([c(1, 0)]));
        grid.commit_formula(c(0, 0), CellValue::Real(1.0), record).unwrap();
        assert_eq!(grid.formula_cells(), vec![c(0, 0)]);

        grid.set_value(c(0, 0), CellValue::Integer(2)).unwrap();
        assert_eq!(grid.formula(c(0, 0)), None);
        assert!(grid.formula_cells().is_empty());
    }

    #[test]
    fn mark_inert_keeps_value_and_dependencies() {
        let mut grid = Grid::new(2, 2);
        let record = FormulaRecord::new("=A2", BTreeSet::from([c(1, 0)]));
        grid.commit_formula(c(0, 0), CellValue::Real(1.0), record).unwrap();

        let err = Error::MalformedFormula("A2+".to_string());
        grid.mark_inert(c(0, 0), "=A2+", err.clone()).unwrap();

        let record = grid.formula(c(0, 0)).unwrap();
        assert_eq!(record.text, "=A2+");
        assert_eq!(record.error, Some(err));
        assert!(record.is_inert());
        assert!(record.depends_on(&c(1, 0)));
        assert_eq!(grid.get_cell(c(0, 0)), Some(&CellValue::Real(1.0)));
    }

    #[test]
    fn writes_outside_the_grid_fail() {
        let mut grid = Grid::new(1, 1);
        assert_eq!(
            grid.set_value(c(1, 0), CellValue::Empty),
            Err(Error::OutOfRange(c(1, 0)))
        );
    }
}
