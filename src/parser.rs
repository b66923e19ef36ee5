//! Decoding of single program lines into [`Instruction`]s.
use thiserror::Error;

use crate::ops::{Instruction, Line, Opcode};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unexpected token '{0}'")]
    UnknownInstruction(String),
    #[error("{0} requires a parameter")]
    MissingOperand(Opcode),
    #[error("Invalid parameter for {0}: '{1}'")]
    InvalidOperand(Opcode, String),
}

/// How numeric operands are parsed.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OperandParsing {
    /// Leading digits are used, anything after them is ignored,
    /// and a token without digits reads as 0.
    #[default]
    Permissive,
    /// The whole token must be a number that fits the operand.
    Strict,
}

/// Decode one line of program text.
///
/// Comments start at the first token beginning with `#`. Lines that are
/// empty after removing the comment decode to [`Instruction::Nop`].
pub fn decode(line: &str, parsing: OperandParsing) -> Result<Instruction, DecodeError> {
    let mut tokens = line.split_ascii_whitespace().take_while(|token| !token.starts_with('#'));

    let Some(keyword) = tokens.next() else {
        return Ok(Instruction::Nop);
    };
    let op = Opcode::by_keyword(keyword)
        .ok_or_else(|| DecodeError::UnknownInstruction(keyword.to_string()))?;

    Ok(match op {
        // Extra tokens after an operand-less instruction are ignored.
        Opcode::Pop => Instruction::Pop,
        Opcode::Add => Instruction::Add,
        Opcode::Print => Instruction::Print,
        Opcode::Dup => Instruction::Dup,
        Opcode::Swap => Instruction::Swap,
        Opcode::Roll => Instruction::Roll,
        Opcode::Push => {
            let operand = operand(op, tokens.next())?;
            Instruction::Push(match parsing {
                // Wraps like a C `long` to `int` conversion.
                OperandParsing::Permissive => parse_leading_int(operand) as i32,
                OperandParsing::Strict => operand.parse().map_err(|_| invalid(op, operand))?,
            })
        }
        Opcode::IfEq => {
            let operand = operand(op, tokens.next())?;
            Instruction::IfEq(parse_line(operand, parsing).ok_or_else(|| invalid(op, operand))?)
        }
        Opcode::Jump => {
            let operand = operand(op, tokens.next())?;
            Instruction::Jump(parse_line(operand, parsing).ok_or_else(|| invalid(op, operand))?)
        }
    })
}

fn operand(op: Opcode, token: Option<&str>) -> Result<&str, DecodeError> {
    token.ok_or(DecodeError::MissingOperand(op))
}

fn invalid(op: Opcode, token: &str) -> DecodeError {
    DecodeError::InvalidOperand(op, token.to_string())
}

fn parse_line(token: &str, parsing: OperandParsing) -> Option<Line> {
    match parsing {
        // Negative targets can never be fetched, so they end the program
        // just like any other target past the last line.
        OperandParsing::Permissive => Some(Line::try_from(parse_leading_int(token)).unwrap_or(Line::MAX)),
        OperandParsing::Strict => token.parse().ok(),
    }
}

/// Parses a base-10 integer prefix of `token` the way `strtol` does:
/// an optional sign followed by digits, saturating at the `i64` bounds.
/// Returns 0 when there are no digits.
pub fn parse_leading_int(token: &str) -> i64 {
    let (negative, digits) = match token.as_bytes() {
        [b'-', rest @ ..] => (true, rest),
        [b'+', rest @ ..] => (false, rest),
        rest => (false, rest),
    };

    let mut value: i64 = 0;
    for digit in digits.iter().take_while(|c| c.is_ascii_digit()) {
        let digit = (digit - b'0') as i64;
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}
