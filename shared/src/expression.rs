//! Arithmetic expressions for typed ideal-weight formulas
//!
//! Users may type the ideal-weight formula from a reference table, e.g.
//! `(71,2 + 80) / 2`. The grammar is deliberately tiny: numeric literals
//! (either decimal separator, see [`crate::locale`]), `+ - * /`, unary minus
//! and parentheses. Evaluation runs tokenize → shunting-yard → RPN.

use crate::locale::parse_decimal;
use thiserror::Error;

/// Expression errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedCharacter(char, usize),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("mismatched parenthesis")]
    MismatchedParenthesis,

    #[error("operator is missing an operand")]
    MissingOperand,

    #[error("operands without an operator between them")]
    MissingOperator,

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Neg,
}

impl Operator {
    fn precedence(&self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::Div => 2,
            Operator::Neg => 3,
        }
    }

    fn is_right_associative(&self) -> bool {
        matches!(self, Operator::Neg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Op(Operator),
    LeftParen,
    RightParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        // A sign is unary at the start, after an operator or after '('
        let expects_operand = matches!(tokens.last(), None | Some(Token::Op(_)) | Some(Token::LeftParen));

        match c {
            c if c.is_whitespace() => {}
            '0'..='9' | '.' | ',' => {
                let mut literal = String::from(c);
                while let Some(&(_, next)) = chars.peek() {
                    if next.is_ascii_digit() || next == '.' || next == ',' {
                        literal.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = parse_decimal(&literal).map_err(|_| ExpressionError::InvalidNumber(literal))?;
                tokens.push(Token::Number(value));
            }
            '+' if expects_operand => {}
            '-' if expects_operand => tokens.push(Token::Op(Operator::Neg)),
            '+' => tokens.push(Token::Op(Operator::Add)),
            '-' => tokens.push(Token::Op(Operator::Sub)),
            '*' | 'x' | '×' => tokens.push(Token::Op(Operator::Mul)),
            '/' | '÷' => tokens.push(Token::Op(Operator::Div)),
            '(' => tokens.push(Token::LeftParen),
            ')' => tokens.push(Token::RightParen),
            other => return Err(ExpressionError::UnexpectedCharacter(other, pos)),
        }
    }

    Ok(tokens)
}

fn to_rpn(tokens: Vec<Token>) -> Result<Vec<Token>, ExpressionError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Number(_) => output.push(token),
            Token::Op(op) => {
                while let Some(&Token::Op(top)) = stack.last() {
                    let pops = top.precedence() > op.precedence()
                        || (top.precedence() == op.precedence() && !op.is_right_associative());
                    if !pops {
                        break;
                    }
                    output.push(Token::Op(top));
                    stack.pop();
                }
                stack.push(token);
            }
            Token::LeftParen => stack.push(token),
            Token::RightParen => loop {
                match stack.pop() {
                    Some(Token::LeftParen) => break,
                    Some(t) => output.push(t),
                    None => return Err(ExpressionError::MismatchedParenthesis),
                }
            },
        }
    }

    while let Some(token) = stack.pop() {
        if token == Token::LeftParen {
            return Err(ExpressionError::MismatchedParenthesis);
        }
        output.push(token);
    }

    Ok(output)
}

fn evaluate_rpn(rpn: &[Token]) -> Result<f64, ExpressionError> {
    let mut values: Vec<f64> = Vec::new();

    for token in rpn {
        match *token {
            Token::Number(v) => values.push(v),
            Token::Op(Operator::Neg) => {
                let v = values.pop().ok_or(ExpressionError::MissingOperand)?;
                values.push(-v);
            }
            Token::Op(op) => {
                let rhs = values.pop().ok_or(ExpressionError::MissingOperand)?;
                let lhs = values.pop().ok_or(ExpressionError::MissingOperand)?;
                let result = match op {
                    Operator::Add => lhs + rhs,
                    Operator::Sub => lhs - rhs,
                    Operator::Mul => lhs * rhs,
                    Operator::Div if rhs == 0.0 => return Err(ExpressionError::DivisionByZero),
                    Operator::Div => lhs / rhs,
                    Operator::Neg => unreachable!("unary minus handled above"),
                };
                values.push(result);
            }
            Token::LeftParen | Token::RightParen => return Err(ExpressionError::MismatchedParenthesis),
        }
    }

    match values.as_slice() {
        [] => Err(ExpressionError::Empty),
        [v] if v.is_finite() => Ok(*v),
        [_] => Err(ExpressionError::NonFinite),
        _ => Err(ExpressionError::MissingOperator),
    }
}

/// Evaluate an arithmetic expression
pub fn evaluate(input: &str) -> Result<f64, ExpressionError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }
    let rpn = to_rpn(tokens)?;
    evaluate_rpn(&rpn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("71.2", 71.2)]
    #[case("(71.2 + 80) / 2", 75.6)]
    #[case("(71,2 + 80) / 2", 75.6)]
    #[case("2 + 3 * 4", 14.0)]
    #[case("(2 + 3) * 4", 20.0)]
    #[case("10 - 4 - 3", 3.0)]
    #[case("100 / 10 / 2", 5.0)]
    #[case("-5 + 10", 5.0)]
    #[case("2 * -3", -6.0)]
    #[case("--4", 4.0)]
    #[case("-(2 + 3) * 2", -10.0)]
    #[case("+7", 7.0)]
    #[case("1.234,5 / 10", 123.45)]
    #[case("50 x 2", 100.0)]
    fn test_evaluate(#[case] input: &str, #[case] expected: f64) {
        let value = evaluate(input).unwrap();
        assert!((value - expected).abs() < 1e-9, "{} = {}", input, value);
    }

    #[rstest]
    #[case("", ExpressionError::Empty)]
    #[case("   ", ExpressionError::Empty)]
    #[case("()", ExpressionError::Empty)]
    #[case("2 +", ExpressionError::MissingOperand)]
    #[case("* 2", ExpressionError::MissingOperand)]
    #[case("(2 + 3", ExpressionError::MismatchedParenthesis)]
    #[case("2 + 3)", ExpressionError::MismatchedParenthesis)]
    #[case("(2)(3)", ExpressionError::MissingOperator)]
    #[case("4 / 0", ExpressionError::DivisionByZero)]
    #[case("4 / (2 - 2)", ExpressionError::DivisionByZero)]
    #[case("alert(1)", ExpressionError::UnexpectedCharacter('a', 0))]
    #[case("2 ^ 3", ExpressionError::UnexpectedCharacter('^', 2))]
    #[case("1,2,3", ExpressionError::InvalidNumber("1,2,3".to_string()))]
    fn test_evaluate_rejects(#[case] input: &str, #[case] expected: ExpressionError) {
        assert_eq!(evaluate(input), Err(expected));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: (x + y) / z matches direct arithmetic
        #[test]
        fn prop_bone_frame_formula(x in 1u32..200, y in 1u32..200, z in 1u32..10) {
            let input = format!("({} + {}) / {}", x, y, z);
            let expected = (x as f64 + y as f64) / z as f64;
            prop_assert!((evaluate(&input).unwrap() - expected).abs() < 1e-9);
        }
    }
}
