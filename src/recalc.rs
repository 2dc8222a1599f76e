//! Dependency-driven recalculation.
//!
//! Formula cells remember which coordinates their last evaluation read. When a
//! coordinate changes, every formula cell that read it is re-evaluated, and
//! the change ripples on from there. Each propagation wave re-evaluates every
//! affected cell exactly once, inputs before the cells that read them.

use std::collections::{BTreeMap, BTreeSet};

use log::{trace, warn};

use crate::coord::Coordinate;
use crate::error::Error;
use crate::eval::Evaluator;
use crate::grid::{FormulaRecord, GridAccessor, GridAccessorMut};
use crate::value::CellValue;

/// Failures hit while recalculating, one per cell.
pub type RecalcReport = Vec<(Coordinate, Error)>;

/// Maps each coordinate to the live formula cells that read it, row-major.
/// Inert records are left out: a rejected formula is never re-run.
type DependentsIndex = BTreeMap<Coordinate, Vec<Coordinate>>;

fn dependents_index<G: GridAccessor + ?Sized>(grid: &G) -> DependentsIndex {
    let mut index = DependentsIndex::new();
    for cell in live_formula_cells(grid) {
        if let Some(record) = grid.formula(cell) {
            for input in &record.dependencies {
                index.entry(*input).or_default().push(cell);
            }
        }
    }
    index
}

fn live_formula_cells<G: GridAccessor + ?Sized>(grid: &G) -> Vec<Coordinate> {
    grid.formula_cells()
        .into_iter()
        .filter(|cell| grid.formula(*cell).is_some_and(|record| !record.is_inert()))
        .collect()
}

/// Live formula cells whose dependency set contains `coord`, row-major.
pub fn dependents_of<G: GridAccessor + ?Sized>(grid: &G, coord: Coordinate) -> Vec<Coordinate> {
    dependents_index(grid).remove(&coord).unwrap_or_default()
}

/// Every formula cell reachable from `coord` through dependency sets, not
/// counting `coord` itself.
pub fn transitive_dependents<G: GridAccessor + ?Sized>(
    grid: &G,
    coord: Coordinate,
) -> BTreeSet<Coordinate> {
    let index = dependents_index(grid);
    let mut affected = BTreeSet::new();
    let mut pending = vec![coord];
    while let Some(next) = pending.pop() {
        for dependent in index.get(&next).into_iter().flatten() {
            if *dependent != coord && affected.insert(*dependent) {
                pending.push(*dependent);
            }
        }
    }
    affected
}

/// Recalculates everything that depends, directly or transitively, on `coord`.
pub fn on_mutation<G: GridAccessorMut + ?Sized>(
    evaluator: &Evaluator,
    grid: &mut G,
    coord: Coordinate,
) -> RecalcReport {
    let affected = transitive_dependents(&*grid, coord);
    trace!("{coord} changed, {} dependents to recalculate", affected.len());
    recalculate_in_order(evaluator, grid, affected)
}

/// Re-evaluates every live formula cell once, inputs first.
pub fn recalculate_all<G: GridAccessorMut + ?Sized>(
    evaluator: &Evaluator,
    grid: &mut G,
) -> RecalcReport {
    let cells = live_formula_cells(&*grid).into_iter().collect();
    recalculate_in_order(evaluator, grid, cells)
}

/// Evaluates `cells` in topological order of their dependencies among
/// themselves, ties broken row-major. When only cycles are left, the first
/// remaining cell is evaluated with whatever its inputs currently hold. Every
/// cell is evaluated once, so cyclic formulas terminate.
fn recalculate_in_order<G: GridAccessorMut + ?Sized>(
    evaluator: &Evaluator,
    grid: &mut G,
    cells: BTreeSet<Coordinate>,
) -> RecalcReport {
    let index = dependents_index(&*grid);

    // Number of not yet recalculated inputs per cell. Self references don't count.
    let mut waiting: BTreeMap<Coordinate, usize> = cells
        .iter()
        .map(|cell| {
            let inputs = grid.formula(*cell).map_or(0, |record| {
                record
                    .dependencies
                    .iter()
                    .filter(|input| *input != cell && cells.contains(*input))
                    .count()
            });
            (*cell, inputs)
        })
        .collect();
    let mut ready: BTreeSet<Coordinate> = waiting
        .iter()
        .filter(|(_, inputs)| **inputs == 0)
        .map(|(cell, _)| *cell)
        .collect();

    let mut report = RecalcReport::new();
    while let Some(cell) = ready.pop_first().or_else(|| waiting.keys().next().copied()) {
        if waiting.remove(&cell).is_none() {
            continue;
        }
        if let Err(err) = recalculate(evaluator, grid, cell) {
            warn!("Error recalculating {cell}: {err}");
            report.push((cell, err));
        }
        for dependent in index.get(&cell).into_iter().flatten() {
            if let Some(inputs) = waiting.get_mut(dependent) {
                *inputs = inputs.saturating_sub(1);
                if *inputs == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }
    report
}

/// Re-runs the stored formula of `coord` and commits the outcome. On failure
/// nothing is written: the cell keeps its value, text and dependency set, and
/// is retried on the next change to its inputs.
fn recalculate<G: GridAccessorMut + ?Sized>(
    evaluator: &Evaluator,
    grid: &mut G,
    coord: Coordinate,
) -> Result<(), Error> {
    let Some(text) = grid
        .formula(coord)
        .filter(|record| !record.is_inert())
        .map(|record| record.text.clone())
    else {
        return Ok(());
    };

    let evaluation = evaluator.evaluate(&text, coord, &*grid)?;
    let record = FormulaRecord::new(text, evaluation.dependencies);
    grid.commit_formula(coord, CellValue::Real(evaluation.value), record)
}
