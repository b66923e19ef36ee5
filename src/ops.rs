use std::fmt;

/// A line number in a program. Lines are numbered from 1.
pub type Line = usize;

/// A decoded stacklang instruction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
    /// A blank or comment-only line.
    Nop,
    Push(i32),
    Pop,
    Add,
    /// Jump to the given line if the top of the stack is non-zero.
    IfEq(Line),
    Jump(Line),
    Print,
    Dup,
    Swap,
    Roll,
}

/// The instruction keyword without its operand.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Opcode {
    Push,
    Pop,
    Add,
    IfEq,
    Jump,
    Print,
    Dup,
    Swap,
    Roll,
}

impl Opcode {
    pub const ALL: [Opcode; 9] = [
        Opcode::Push,
        Opcode::Pop,
        Opcode::Add,
        Opcode::IfEq,
        Opcode::Jump,
        Opcode::Print,
        Opcode::Dup,
        Opcode::Swap,
        Opcode::Roll,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            Opcode::Push => "push",
            Opcode::Pop => "pop",
            Opcode::Add => "add",
            Opcode::IfEq => "ifeq",
            Opcode::Jump => "jump",
            Opcode::Print => "print",
            Opcode::Dup => "dup",
            Opcode::Swap => "swap",
            Opcode::Roll => "roll",
        }
    }

    /// Looks up an opcode by its keyword. Matching is case-sensitive.
    pub fn by_keyword(keyword: &str) -> Option<Opcode> {
        Self::ALL.iter().copied().find(|op| op.keyword() == keyword)
    }

    /// Position of this opcode in [`Opcode::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl Instruction {
    /// Returns the opcode, or `None` for [`Instruction::Nop`].
    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            Instruction::Nop => None,
            Instruction::Push(_) => Some(Opcode::Push),
            Instruction::Pop => Some(Opcode::Pop),
            Instruction::Add => Some(Opcode::Add),
            Instruction::IfEq(_) => Some(Opcode::IfEq),
            Instruction::Jump(_) => Some(Opcode::Jump),
            Instruction::Print => Some(Opcode::Print),
            Instruction::Dup => Some(Opcode::Dup),
            Instruction::Swap => Some(Opcode::Swap),
            Instruction::Roll => Some(Opcode::Roll),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Nop => f.write_str("nop"),
            Instruction::Push(value) => write!(f, "push {value}"),
            Instruction::IfEq(line) => write!(f, "ifeq {line}"),
            Instruction::Jump(line) => write!(f, "jump {line}"),
            other => match other.opcode() {
                Some(op) => f.write_str(op.keyword()),
                None => Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_round_trip() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::by_keyword(op.keyword()), Some(op));
            assert_eq!(Opcode::ALL[op.index()], op);
        }
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(Opcode::by_keyword("PUSH"), None);
        assert_eq!(Opcode::by_keyword("Print"), None);
        assert_eq!(Opcode::by_keyword(""), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Instruction::Push(-3).to_string(), "push -3");
        assert_eq!(Instruction::IfEq(7).to_string(), "ifeq 7");
        assert_eq!(Instruction::Roll.to_string(), "roll");
        assert_eq!(Instruction::Nop.to_string(), "nop");
    }
}
