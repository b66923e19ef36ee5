//! The value stack of the interpreter.
use thiserror::Error;

/// An error that can occur while manipulating the stack.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationError {
    #[error("Stack underflow: {required} element(s) required, stack has {stack_len}")]
    StackUnderflow { stack_len: usize, required: usize },
    #[error("Stack overflow: the stack is limited to {max_stack_size} elements")]
    StackOverflow { max_stack_size: usize },
}

/// A stack of 32-bit integers. Index 0 is the bottom.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stack {
    values: Vec<i32>,
    max_size: Option<usize>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty stack holding at most `max_size` values.
    pub fn with_max_size(max_size: usize) -> Self {
        Stack { values: Vec::new(), max_size: Some(max_size) }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The values from bottom to top.
    pub fn as_slice(&self) -> &[i32] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<i32> {
        self.values
    }

    fn require(&self, required: usize) -> Result<(), OperationError> {
        if self.values.len() < required {
            return Err(OperationError::StackUnderflow { stack_len: self.values.len(), required });
        }
        Ok(())
    }

    pub fn push(&mut self, value: i32) -> Result<(), OperationError> {
        if let Some(max_stack_size) = self.max_size {
            if self.values.len() >= max_stack_size {
                return Err(OperationError::StackOverflow { max_stack_size });
            }
        }

        self.values.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<i32, OperationError> {
        self.values.pop().ok_or(OperationError::StackUnderflow { stack_len: 0, required: 1 })
    }

    pub fn peek(&self) -> Result<i32, OperationError> {
        self.values
            .last()
            .copied()
            .ok_or(OperationError::StackUnderflow { stack_len: 0, required: 1 })
    }

    pub fn dup(&mut self) -> Result<(), OperationError> {
        let top = self.peek()?;
        self.push(top)
    }

    pub fn swap(&mut self) -> Result<(), OperationError> {
        self.require(2)?;
        let len = self.values.len();
        self.values.swap(len - 2, len - 1);
        Ok(())
    }

    /// Pops `a` and then `b`, pushes `a + b` with wraparound.
    pub fn add(&mut self) -> Result<(), OperationError> {
        // Checked up front so a failed add leaves the stack untouched.
        self.require(2)?;
        let a = self.pop()?;
        let b = self.pop()?;
        self.push(a.wrapping_add(b))
    }

    /// Moves the top value to the bottom, shifting everything else up by one.
    pub fn roll(&mut self) {
        if self.values.len() > 1 {
            self.values.rotate_right(1);
        }
    }
}

impl From<Vec<i32>> for Stack {
    fn from(values: Vec<i32>) -> Self {
        Stack { values, max_size: None }
    }
}
