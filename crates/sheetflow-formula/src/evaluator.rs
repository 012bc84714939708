use crate::error::FormulaError;
use crate::lexer::{Operator, Token};

/// Entries on the operator stack
#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    Paren,
    Op(Operator),
}

/// Two-stack infix evaluator over a validated token sequence
pub struct Evaluator<F>
where
    F: Fn(&str) -> Option<f64>,
{
    lookup: F,
}

impl<F> Evaluator<F>
where
    F: Fn(&str) -> Option<f64>,
{
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// Evaluate tokens that already passed formula validation.
    pub fn evaluate(&self, tokens: &[Token]) -> Result<f64, FormulaError> {
        let mut stacks = Stacks::default();

        for token in tokens {
            match token {
                Token::LeftParen => stacks.ops.push(Pending::Paren),
                Token::RightParen => {
                    stacks.resolve_additive();
                    if stacks.ops.last() == Some(&Pending::Paren) {
                        stacks.ops.pop();
                    }
                    stacks.resolve_multiplicative()?;
                }
                Token::Operator(op) if op.is_additive() => {
                    stacks.resolve_additive();
                    stacks.ops.push(Pending::Op(*op));
                }
                Token::Operator(op) => stacks.ops.push(Pending::Op(*op)),
                Token::Number(n) => stacks.push_operand(*n)?,
                Token::Variable(name) => {
                    let value = (self.lookup)(name)
                        .ok_or_else(|| FormulaError::UndefinedVariable(name.clone()))?;
                    stacks.push_operand(value)?;
                }
            }
        }

        // Either one value remains, or two values and a pending + or -
        stacks.resolve_additive();
        Ok(stacks.values.pop().unwrap_or_default())
    }
}

#[derive(Default)]
struct Stacks {
    values: Vec<f64>,
    ops: Vec<Pending>,
}

impl Stacks {
    fn pop_pair(&mut self) -> (f64, f64) {
        let right = self.values.pop().unwrap_or_default();
        let left = self.values.pop().unwrap_or_default();
        (left, right)
    }

    /// Apply a pending `+` or `-` on top of the operator stack, if any
    fn resolve_additive(&mut self) {
        if let Some(&Pending::Op(op)) = self.ops.last() {
            if op.is_additive() {
                self.ops.pop();
                let (left, right) = self.pop_pair();
                self.values.push(match op {
                    Operator::Add => left + right,
                    _ => left - right,
                });
            }
        }
    }

    /// Apply a pending `*` or `/` on top of the operator stack, if any
    fn resolve_multiplicative(&mut self) -> Result<(), FormulaError> {
        if let Some(&Pending::Op(op)) = self.ops.last() {
            if op.is_multiplicative() {
                self.ops.pop();
                let (left, right) = self.pop_pair();
                let result = apply_multiplicative(op, left, right)?;
                self.values.push(result);
            }
        }
        Ok(())
    }

    /// Combine an incoming operand with a pending `*` or `/`, or push it
    fn push_operand(&mut self, value: f64) -> Result<(), FormulaError> {
        self.values.push(value);
        self.resolve_multiplicative()
    }
}

fn apply_multiplicative(op: Operator, left: f64, right: f64) -> Result<f64, FormulaError> {
    match op {
        Operator::Div if right == 0.0 => Err(FormulaError::DivisionByZero),
        Operator::Div => Ok(left / right),
        _ => Ok(left * right),
    }
}
