pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod lexer;

pub use dependency::DependencyGraph;
pub use error::{FormulaError, FormulaFormatError};
pub use evaluator::Evaluator;
pub use formula::Formula;
pub use lexer::{is_variable, Lexer, Operator, Token};
