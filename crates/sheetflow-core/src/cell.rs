use serde::{Deserialize, Serialize};
use sheetflow_formula::{Formula, FormulaError};

/// What the user put in a cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellContents {
    Number(f64),
    Text(String),
    Formula(Formula),
}

impl Default for CellContents {
    fn default() -> Self {
        CellContents::Text(String::new())
    }
}

impl CellContents {
    /// Empty text, the contents of every cell not in the store
    pub fn is_empty(&self) -> bool {
        matches!(self, CellContents::Text(s) if s.is_empty())
    }

    pub fn as_formula(&self) -> Option<&Formula> {
        match self {
            CellContents::Formula(f) => Some(f),
            _ => None,
        }
    }

    /// Variables referenced by a formula; empty for numbers and text
    pub fn variables(&self) -> Vec<String> {
        self.as_formula().map(Formula::variables).unwrap_or_default()
    }

    /// Text that, fed back through cell input, yields these contents again
    pub fn to_input_string(&self) -> String {
        match self {
            CellContents::Number(n) => n.to_string(),
            CellContents::Text(s) => s.clone(),
            CellContents::Formula(f) => format!("={}", f),
        }
    }
}

/// The computed value of a cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    Number(f64),
    Text(String),
    Error(FormulaError),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Text(String::new())
    }
}

impl CellValue {
    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// Get the display string
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Error(e) => e.code().to_string(),
        }
    }
}

/// A named cell with its contents and last computed value
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    name: String,
    contents: CellContents,
    value: CellValue,
}

impl Cell {
    /// A cell whose value has not been computed yet
    pub fn new(name: impl Into<String>, contents: CellContents) -> Self {
        Self {
            name: name.into(),
            contents,
            value: CellValue::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &CellContents {
        &self.contents
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }

    pub fn set_contents(&mut self, contents: CellContents) {
        self.contents = contents;
    }

    pub fn set_value(&mut self, value: CellValue) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty_text() {
        assert!(CellContents::default().is_empty());
        assert_eq!(CellValue::default(), CellValue::Text(String::new()));
        assert!(!CellContents::Text(" ".into()).is_empty());
        assert!(!CellContents::Number(0.0).is_empty());
    }

    #[test]
    fn test_input_string() {
        assert_eq!(CellContents::Number(2.5).to_input_string(), "2.5");
        assert_eq!(CellContents::Number(3.0).to_input_string(), "3");
        assert_eq!(CellContents::Text("hi".into()).to_input_string(), "hi");
        let f = Formula::new("a1 + 2.0").unwrap();
        assert_eq!(CellContents::Formula(f).to_input_string(), "=a1+2");
    }

    #[test]
    fn test_value_text() {
        assert_eq!(CellValue::Number(42.0).as_text(), "42");
        assert_eq!(CellValue::Error(FormulaError::DivisionByZero).as_text(), "#DIV/0!");
        assert_eq!(CellValue::Text("x".into()).as_number(), None);
    }

    #[test]
    fn test_cell_accessors() {
        let mut cell = Cell::new("A1", CellContents::Number(1.0));
        assert_eq!(cell.name(), "A1");
        cell.set_value(CellValue::Number(1.0));
        assert_eq!(cell.value().as_number(), Some(1.0));
        assert!(cell.contents().variables().is_empty());
    }
}
