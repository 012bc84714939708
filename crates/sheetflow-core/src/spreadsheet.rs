//! The spreadsheet orchestrator.
//!
//! Owns the cell store and the dependency graph and is the only way to
//! change either. Every edit either commits in full (new contents, new
//! edges, every affected value recomputed) or fails and leaves both
//! structures untouched.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use sheetflow_formula::{DependencyGraph, Formula};
use tracing::{debug, trace, warn};

use crate::cell::{Cell, CellContents, CellValue};
use crate::error::{Result, SpreadsheetError};
use crate::name::is_cell_name;
use crate::recalc::recalc_order;

/// Extra predicate a normalized cell name must satisfy
pub type NameValidator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Maps a cell name to its canonical form
pub type NameNormalizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Version tag used when none is given
pub const DEFAULT_VERSION: &str = "default";

/// A store of named cells that recalculates dependents on every edit.
///
/// Not synchronized: wrap it in a mutex to share one instance between
/// threads. Separate instances share nothing.
pub struct Spreadsheet {
    /// Only non-empty cells are stored
    cells: HashMap<String, Cell>,
    /// `(s, t)` means the formula in `t` references `s`
    graph: DependencyGraph,
    is_valid: NameValidator,
    normalize: NameNormalizer,
    version: String,
    changed: bool,
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Spreadsheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spreadsheet")
            .field("cells", &self.cells)
            .field("graph", &self.graph)
            .field("version", &self.version)
            .field("changed", &self.changed)
            .finish_non_exhaustive()
    }
}

impl Spreadsheet {
    /// An empty spreadsheet accepting every well-formed name as-is, version "default"
    pub fn new() -> Self {
        Self::with_hooks(|_| true, |name| name.to_string(), DEFAULT_VERSION)
    }

    /// An empty spreadsheet with a custom validator, normalizer and version tag
    pub fn with_hooks<V, N>(is_valid: V, normalize: N, version: impl Into<String>) -> Self
    where
        V: Fn(&str) -> bool + Send + Sync + 'static,
        N: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            cells: HashMap::new(),
            graph: DependencyGraph::new(),
            is_valid: Arc::new(is_valid),
            normalize: Arc::new(normalize),
            version: version.into(),
            changed: false,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// True if the spreadsheet was modified since it was created, loaded or saved
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub(crate) fn mark_saved(&mut self) {
        self.changed = false;
    }

    /// Contents of a cell; empty text if the cell is empty
    pub fn cell_contents(&self, name: &str) -> Result<CellContents> {
        let name = self.normalize_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.contents().clone())
            .unwrap_or_default())
    }

    /// Value of a cell; empty text if the cell is empty
    pub fn cell_value(&self, name: &str) -> Result<CellValue> {
        let name = self.normalize_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.value().clone())
            .unwrap_or_default())
    }

    /// Names of all non-empty cells, sorted
    pub fn nonempty_cell_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.cells.keys().cloned().collect();
        names.sort();
        names
    }

    /// Stored cells in name order, keyed by the names they were stored under
    pub(crate) fn stored_cells(&self) -> Vec<&Cell> {
        let mut cells: Vec<&Cell> = self.cells.values().collect();
        cells.sort_by(|a, b| a.name().cmp(b.name()));
        cells
    }

    /// Cells whose formulas reference `name` directly, sorted
    pub fn direct_dependents(&self, name: &str) -> Result<Vec<String>> {
        let name = self.normalize_name(name)?;
        let mut dependents = self.graph.dependents(&name);
        dependents.sort();
        Ok(dependents)
    }

    /// Set a cell from user input and recalculate everything that depends on it.
    ///
    /// Input that parses as a number becomes a number, input starting with
    /// `=` is parsed as a formula, anything else is text. Empty text clears
    /// the cell. Returns the edited cell followed by every cell that
    /// (transitively) depends on it, each after the cells it depends on.
    pub fn set_contents_of_cell(&mut self, name: &str, content: &str) -> Result<Vec<String>> {
        self.set_contents_checked(name, Some(content))
    }

    /// Like [`set_contents_of_cell`](Self::set_contents_of_cell) for callers
    /// whose contents may be missing, which is reported as `NullContent`.
    pub fn set_contents_checked(&mut self, name: &str, content: Option<&str>) -> Result<Vec<String>> {
        let content = content.ok_or_else(|| SpreadsheetError::NullContent(name.to_string()))?;
        let name = self.normalize_name(name)?;
        let contents = self.parse_contents(content)?;

        let order = self.plan_edit(&name, &contents)?;
        self.commit_edit(&name, contents);

        for cell in &order {
            self.recompute(cell);
        }

        self.changed = true;
        debug!(cell = %name, affected = order.len(), "cell updated");
        Ok(order)
    }

    /// Normalize `name` and check it against the cell grammar and the validator
    fn normalize_name(&self, name: &str) -> Result<String> {
        let normalized = (self.normalize)(name);
        if self.is_valid_name(&normalized) {
            Ok(normalized)
        } else {
            Err(SpreadsheetError::InvalidName(name.to_string()))
        }
    }

    fn is_valid_name(&self, name: &str) -> bool {
        is_cell_name(name) && (self.is_valid)(name)
    }

    fn parse_contents(&self, content: &str) -> Result<CellContents> {
        if let Some(number) = parse_number(content) {
            return Ok(CellContents::Number(number));
        }

        if let Some(expression) = content.strip_prefix('=') {
            let formula = Formula::with_hooks(
                expression,
                |var| (self.normalize)(var),
                |var| self.is_valid_name(var),
            )?;
            return Ok(CellContents::Formula(formula));
        }

        Ok(CellContents::Text(content.to_string()))
    }

    /// Compute the recalculation order as if `name` already held `contents`.
    ///
    /// The candidate edges are overlaid on the graph during the traversal,
    /// so a circular edit is rejected before anything is mutated.
    fn plan_edit(&self, name: &str, contents: &CellContents) -> Result<Vec<String>> {
        let old_dependees = self.graph.dependees(name);
        let new_dependees = contents.variables();

        let candidate_dependents = |cell: &str| {
            let mut dependents = self.graph.dependents(cell);
            if old_dependees.iter().any(|d| d == cell) {
                dependents.retain(|d| d != name);
            }
            if new_dependees.iter().any(|d| d == cell) && !dependents.iter().any(|d| d == name) {
                dependents.push(name.to_string());
            }
            dependents
        };

        recalc_order(name, candidate_dependents).map_err(|cycle| {
            warn!(cell = %name, through = %cycle.cell, "rejected circular edit");
            SpreadsheetError::CircularDependency(name.to_string())
        })
    }

    /// Install `contents` in the store and its edges in the graph
    fn commit_edit(&mut self, name: &str, contents: CellContents) {
        self.graph.replace_dependees(name, contents.variables());

        if contents.is_empty() {
            self.cells.remove(name);
            return;
        }

        match self.cells.get_mut(name) {
            Some(cell) => cell.set_contents(contents),
            None => {
                self.cells
                    .insert(name.to_string(), Cell::new(name, contents));
            }
        }
    }

    /// Recompute the value of one cell from its contents
    fn recompute(&mut self, name: &str) {
        let value = match self.cells.get(name).map(Cell::contents) {
            // Cleared cells have no value to store
            None => return,
            Some(CellContents::Number(n)) => CellValue::Number(*n),
            Some(CellContents::Text(s)) => CellValue::Text(s.clone()),
            Some(CellContents::Formula(formula)) => {
                match formula.evaluate(|var| self.numeric_value(var)) {
                    Ok(n) => CellValue::Number(n),
                    Err(e) => CellValue::Error(e),
                }
            }
        };

        trace!(cell = %name, value = %value.as_text(), "recomputed");
        if let Some(cell) = self.cells.get_mut(name) {
            cell.set_value(value);
        }
    }

    /// Current value of `name` if it is a number
    fn numeric_value(&self, name: &str) -> Option<f64> {
        self.cells.get(name).and_then(|cell| cell.value().as_number())
    }
}

/// Parse cell input as a finite double
fn parse_number(content: &str) -> Option<f64> {
    content
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}
