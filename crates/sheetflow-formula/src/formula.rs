//! Validated, canonical infix formulas.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{FormulaError, FormulaFormatError};
use crate::evaluator::Evaluator;
use crate::lexer::{is_variable, Lexer, Token};

/// An immutable arithmetic expression over numbers, variables, parentheses
/// and `+ - * /`.
///
/// Tokens are stored in canonical form: numbers as their shortest round-trip
/// text, variables as returned by the normalizer. Two formulas are equal when
/// their canonical token sequences are identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Formula {
    tokens: Vec<Token>,
}

impl Formula {
    /// Parse with the identity normalizer and a validator that accepts every variable.
    pub fn new(text: &str) -> Result<Self, FormulaFormatError> {
        Self::with_hooks(text, |name| name.to_string(), |_| true)
    }

    /// Parse `text`, canonicalizing each variable through `normalize` and
    /// requiring the result to be a well-formed variable accepted by `is_valid`.
    pub fn with_hooks<N, V>(text: &str, normalize: N, is_valid: V) -> Result<Self, FormulaFormatError>
    where
        N: Fn(&str) -> String,
        V: Fn(&str) -> bool,
    {
        let raw = Lexer::new(text).tokenize()?;
        if raw.is_empty() {
            return Err(FormulaFormatError::Empty);
        }

        let mut tokens = Vec::with_capacity(raw.len());
        let mut open = 0usize;
        let mut close = 0usize;

        for (index, token) in raw.into_iter().enumerate() {
            let position = index + 1;

            if let Some(prev) = tokens.last() {
                check_follows(prev, &token, position)?;
            }

            match token {
                Token::LeftParen => open += 1,
                Token::RightParen => {
                    close += 1;
                    if close > open {
                        return Err(FormulaFormatError::UnmatchedClose { position });
                    }
                }
                _ => {}
            }

            let token = match token {
                Token::Variable(name) => {
                    let normalized = normalize(&name);
                    if !is_variable(&normalized) || !is_valid(&normalized) {
                        return Err(FormulaFormatError::InvalidVariable {
                            variable: name,
                            normalized,
                            position,
                        });
                    }
                    Token::Variable(normalized)
                }
                other => other,
            };
            tokens.push(token);
        }

        if open != close {
            return Err(FormulaFormatError::UnbalancedParens { open, close });
        }
        if !matches!(tokens.first(), Some(t) if t.is_operand() || *t == Token::LeftParen) {
            return Err(FormulaFormatError::InvalidStart);
        }
        if !matches!(tokens.last(), Some(t) if t.is_operand() || *t == Token::RightParen) {
            return Err(FormulaFormatError::InvalidEnd);
        }

        Ok(Self { tokens })
    }

    /// Evaluate using `lookup` for variable values.
    ///
    /// `lookup` receives the canonical variable name and returns `None` when the
    /// variable has no numeric value. Never panics: undefined variables and
    /// division by zero come back as a [`FormulaError`].
    pub fn evaluate<L>(&self, lookup: L) -> Result<f64, FormulaError>
    where
        L: Fn(&str) -> Option<f64>,
    {
        Evaluator::new(lookup).evaluate(&self.tokens)
    }

    /// Distinct canonical variable names, in first-occurrence order.
    pub fn variables(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tokens
            .iter()
            .filter_map(|token| match token {
                Token::Variable(name) if seen.insert(name.as_str()) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Adjacency rules between consecutive tokens
fn check_follows(prev: &Token, next: &Token, position: usize) -> Result<(), FormulaFormatError> {
    let allowed = match prev {
        // After '(' or an operator: a number, a variable or '('
        Token::LeftParen | Token::Operator(_) => next.is_operand() || *next == Token::LeftParen,
        // After an operand or ')': an operator or ')'
        Token::Number(_) | Token::Variable(_) | Token::RightParen => {
            matches!(next, Token::Operator(_) | Token::RightParen)
        }
    };

    if allowed {
        Ok(())
    } else {
        Err(FormulaFormatError::UnexpectedToken {
            token: next.to_string(),
            position,
        })
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

impl FromStr for Formula {
    type Err = FormulaFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper(name: &str) -> String {
        name.to_uppercase()
    }

    #[test]
    fn test_precedence() {
        let f = Formula::new("2+6*3").unwrap();
        assert_eq!(f.evaluate(|_| Some(0.0)), Ok(20.0));

        let f = Formula::new("(2+6)*3").unwrap();
        assert_eq!(f.evaluate(|_| Some(0.0)), Ok(24.0));
    }

    #[test]
    fn test_division_by_zero() {
        let f = Formula::new("5/0").unwrap();
        assert_eq!(f.evaluate(|_| Some(0.0)), Err(FormulaError::DivisionByZero));
    }

    #[test]
    fn test_canonical_equality() {
        assert_eq!(Formula::new("2.0 + x").unwrap(), Formula::new("2.000+x").unwrap());
        assert_ne!(Formula::new("x+y").unwrap(), Formula::new("y+x").unwrap());
        assert_eq!(Formula::new("1e2").unwrap().to_string(), "100");
    }

    #[test]
    fn test_normalizer_applied() {
        let a = Formula::with_hooks("x1 + y1", upper, |_| true).unwrap();
        let b = Formula::with_hooks("X1+Y1", upper, |_| true).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "X1+Y1");
        assert_eq!(a.variables(), vec!["X1".to_string(), "Y1".to_string()]);
    }

    #[test]
    fn test_variables_distinct() {
        let f = Formula::new("a1 * a1 + b2 / a1").unwrap();
        assert_eq!(f.variables(), vec!["a1".to_string(), "b2".to_string()]);
        assert!(Formula::new("1+2").unwrap().variables().is_empty());
    }

    #[test]
    fn test_empty_is_error() {
        assert_eq!(Formula::new(""), Err(FormulaFormatError::Empty));
        assert_eq!(Formula::new("   "), Err(FormulaFormatError::Empty));
    }

    #[test]
    fn test_unbalanced_parens() {
        assert_eq!(
            Formula::new("((1+2)"),
            Err(FormulaFormatError::UnbalancedParens { open: 2, close: 1 })
        );
        assert_eq!(
            Formula::new("(1+2))"),
            Err(FormulaFormatError::UnmatchedClose { position: 6 })
        );
    }

    #[test]
    fn test_start_and_end_rules() {
        assert!(matches!(
            Formula::new("+1"),
            Err(FormulaFormatError::InvalidStart)
        ));
        assert!(matches!(
            Formula::new("1+"),
            Err(FormulaFormatError::InvalidEnd)
        ));
        assert!(matches!(
            Formula::new(")"),
            Err(FormulaFormatError::UnmatchedClose { position: 1 })
        ));
    }

    #[test]
    fn test_following_rules() {
        for text in ["1 2", "x (1)", "(1)(2)", "(1) x", "1 + * 2", "( )", "(+1)", "1 + )"] {
            assert!(
                matches!(
                    Formula::new(text),
                    Err(FormulaFormatError::UnexpectedToken { .. })
                ),
                "{} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_invalid_token() {
        assert!(matches!(
            Formula::new("2 & 3"),
            Err(FormulaFormatError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_normalizer_must_keep_variable_shape() {
        let err = Formula::with_hooks("x", |_| "1x".to_string(), |_| true).unwrap_err();
        assert_eq!(
            err,
            FormulaFormatError::InvalidVariable {
                variable: "x".to_string(),
                normalized: "1x".to_string(),
                position: 1
            }
        );
    }

    #[test]
    fn test_validator_rejects() {
        let result = Formula::with_hooks("x + y", |s| s.to_string(), |s| s != "y");
        assert!(matches!(
            result,
            Err(FormulaFormatError::InvalidVariable { position: 3, .. })
        ));
    }

    #[test]
    fn test_round_trip_through_display() {
        let original = Formula::with_hooks("(a + 2.50) * b3 / 4e1", upper, |_| true).unwrap();
        let reparsed: Formula = original.to_string().parse().unwrap();
        assert_eq!(original, reparsed);
    }

    #[test]
    fn test_hash_consistent_with_eq() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(Formula::new("1.0+x").unwrap());
        assert!(set.contains(&Formula::new("1 + x").unwrap()));
    }
}
