//! Functions for executing stacklang programs.
use std::io::{self, Write};

use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    config::RunConfig,
    ops::{Instruction, Line, Opcode},
    parser::{self, DecodeError, OperandParsing},
    source::ProgramSource,
    stack::{OperationError, Stack},
};


/// An implementation of [`Tracer`] that does not track anything.
///
/// This is the best choice if you do not need to observe the program
/// while it is executed.
#[derive(Default, Debug, Clone, Copy)]
pub struct NoStats {}

impl Tracer for NoStats {
    #[inline(always)]
    fn instruction(&mut self, _line: Line, _instruction: Instruction, _: &Result<Effect, OperationError>) {}
}

/// A trait for observing every instruction the VM executes.
pub trait Tracer {
    fn instruction(&mut self, line: Line, instruction: Instruction, result: &Result<Effect, OperationError>);
}

/// Counts how many times each instruction has been executed.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct OpCounter {
    counts: [u64; Opcode::ALL.len()],
    nops: u64,
}

impl OpCounter {
    pub fn count(&self, op: Opcode) -> u64 {
        self.counts[op.index()]
    }

    /// Number of blank or comment-only lines passed through.
    pub fn nops(&self) -> u64 {
        self.nops
    }

    /// Executed opcodes with their counts, skipping those never run.
    pub fn iter(&self) -> impl Iterator<Item = (Opcode, u64)> + '_ {
        Opcode::ALL.iter().map(|&op| (op, self.count(op))).filter(|&(_, count)| count > 0)
    }
}

impl Tracer for OpCounter {
    fn instruction(&mut self, _line: Line, instruction: Instruction, _: &Result<Effect, OperationError>) {
        match instruction.opcode() {
            Some(op) => self.counts[op.index()] += 1,
            None => self.nops += 1,
        }
    }
}

/// The internal state of the VM.
#[derive(Clone, Debug)]
struct State<TTracer: Tracer> {
    stack: Stack,
    /// The line to execute next.
    pc: Line,
    instructions_run: u64,
    tracer: TTracer,
}

/// What the engine has to do after an instruction was applied to the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    SetProgramCounter(Line),
    Print(i32),
}

impl<TTracer: Tracer> State<TTracer> {
    fn new(stack: Stack, tracer: TTracer) -> Self {
        State { stack, pc: 1, instructions_run: 0, tracer }
    }

    fn apply(&mut self, instruction: Instruction) -> Result<Effect, OperationError> {
        match instruction {
            Instruction::Nop => {}
            Instruction::Push(value) => self.stack.push(value)?,
            Instruction::Pop => {
                self.stack.pop()?;
            }
            Instruction::Add => self.stack.add()?,
            Instruction::Dup => self.stack.dup()?,
            Instruction::Swap => self.stack.swap()?,
            Instruction::Roll => self.stack.roll(),
            Instruction::Print => return Ok(Effect::Print(self.stack.peek()?)),
            Instruction::IfEq(target) => {
                if self.stack.peek()? != 0 {
                    return Ok(Effect::SetProgramCounter(target));
                }
            }
            Instruction::Jump(target) => return Ok(Effect::SetProgramCounter(target)),
        }

        Ok(Effect::None)
    }
}

/// Options for the stacklang virtual machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VMOptions {
    /// The maximum size of the stack, `None` for no limit.
    max_stack_size: Option<usize>,
    /// The maximum number of lines to execute, if this is reached
    /// before the program ends, the program will stop with an error.
    ///
    /// Set to [`u64::MAX`] to disable this limit.
    max_op_count: u64,
    operand_parsing: OperandParsing,
    /// Write every fetched line to the output before executing it.
    echo: bool,
}

impl VMOptions {
    /// Create a new set of VM options.
    pub fn new(max_stack_size: Option<usize>, max_op_count: u64) -> Self {
        Self { max_stack_size, max_op_count, ..Self::default() }
    }

    pub fn with_operand_parsing(self, operand_parsing: OperandParsing) -> Self {
        Self { operand_parsing, ..self }
    }

    pub fn with_echo(self, echo: bool) -> Self {
        Self { echo, ..self }
    }
}

impl Default for VMOptions {
    fn default() -> Self {
        Self {
            max_stack_size: None,
            max_op_count: u64::MAX,
            operand_parsing: OperandParsing::Permissive,
            echo: false,
        }
    }
}

impl From<&RunConfig> for VMOptions {
    fn from(config: &RunConfig) -> Self {
        VMOptions::new(config.max_stack_size, config.op_limit.unwrap_or(u64::MAX))
            .with_operand_parsing(config.operand_parsing)
            .with_echo(config.echo)
    }
}

/// An error that happened while running a stacklang program.
#[derive(Debug, Error)]
pub enum RunError {
    /// A line could not be decoded into an instruction.
    #[error("Line {line}: {error}")]
    DecodeFailed {
        /// The 1-based line number.
        line: Line,
        error: DecodeError,
    },
    /// A specific instruction failed.
    #[error("Line {line}: {instruction} failed: {error}")]
    InstructionFailed {
        /// The instruction which failed.
        instruction: Instruction,
        /// The 1-based line number of the instruction.
        line: Line,
        /// The number of lines which have been run before this one.
        instruction_counter: u64,
        /// The specific error within the instruction.
        error: OperationError,
    },
    /// The program executed more lines than the limit specified within [`VMOptions`].
    #[error("The program ran for too long ({instruction_counter} lines had been run).")]
    RunTooLong {
        instruction_counter: u64,
    },
    /// Writing printed values or echoed lines failed.
    #[error("Failed to write program output: {0}")]
    OutputFailed(#[from] io::Error),
}

impl RunError {
    /// The line the error occurred on, if it is tied to one.
    pub fn line(&self) -> Option<Line> {
        match self {
            RunError::DecodeFailed { line, .. } | RunError::InstructionFailed { line, .. } => Some(*line),
            RunError::RunTooLong { .. } | RunError::OutputFailed(_) => None,
        }
    }
}

/// The succesful result of running a stacklang program.
#[derive(Debug, Clone)]
pub struct RunResult<T: Tracer> {
    /// The resulting stack after the program has finished, bottom first.
    pub stack: Vec<i32>,
    /// The number of lines which have been run, including blank ones.
    pub instruction_counter: u64,
    /// The line that was requested when the program ended.
    pub program_counter: Line,
    pub tracer: T,
}

impl<T: Tracer> From<State<T>> for RunResult<T> {
    fn from(s: State<T>) -> Self {
        RunResult {
            stack: s.stack.into_vec(),
            instruction_counter: s.instructions_run,
            program_counter: s.pc,
            tracer: s.tracer,
        }
    }
}

/// Run a stacklang program, writing printed values to `out`.
///
/// # Example
/// ```
/// use stacklang::source::Program;
/// use stacklang::vm::{run, VMOptions};
///
/// let program = Program::parse("push 3\npush 4\nadd\nprint\n");
/// let mut out = Vec::new();
/// let result = run(&program, VMOptions::default(), &mut out).unwrap();
/// assert_eq!(out, b"7\n");
/// assert_eq!(result.stack, vec![7]);
/// ```
pub fn run<S: ProgramSource + ?Sized>(
    source: &S,
    options: VMOptions,
    out: &mut impl Write,
) -> Result<RunResult<NoStats>, RunError> {
    run_with_stats(source, options, out, NoStats::default())
}

/// Run a stacklang program and report every executed instruction to `tracer`.
/// If you do not need that, use the [`run`] function instead.
pub fn run_with_stats<S: ProgramSource + ?Sized, T: Tracer>(
    source: &S,
    options: VMOptions,
    out: &mut impl Write,
    tracer: T,
) -> Result<RunResult<T>, RunError> {
    let stack = options.max_stack_size.map(Stack::with_max_size).unwrap_or_default();
    let mut s = State::new(stack, tracer);
    run_state(&mut s, source, &options, out)?;
    Ok(s.into())
}

fn run_state<S: ProgramSource + ?Sized, T: Tracer>(
    s: &mut State<T>,
    source: &S,
    options: &VMOptions,
    out: &mut impl Write,
) -> Result<(), RunError> {
    while let Some(text) = source.line_text(s.pc) {
        if s.instructions_run >= options.max_op_count {
            return Err(RunError::RunTooLong { instruction_counter: s.instructions_run });
        }

        let line = s.pc;
        trace!(line, text, "fetch");
        if options.echo {
            writeln!(out, "\t{line}: '{text}'")?;
        }

        let instruction = parser::decode(text, options.operand_parsing)
            .map_err(|error| RunError::DecodeFailed { line, error })?;

        let result = s.apply(instruction);
        s.tracer.instruction(line, instruction, &result);

        let effect = result.map_err(|error| RunError::InstructionFailed {
            instruction,
            line,
            instruction_counter: s.instructions_run,
            error,
        })?;
        s.instructions_run += 1;

        s.pc = match effect {
            Effect::None => line.saturating_add(1),
            Effect::Print(value) => {
                writeln!(out, "{value}")?;
                line.saturating_add(1)
            }
            Effect::SetProgramCounter(target) => {
                debug!(from = line, to = target, stack_len = s.stack.len(), "branching");
                target
            }
        };
    }

    if options.echo {
        writeln!(out, "Reached end of file.")?;
    }
    debug!(line = s.pc, instructions = s.instructions_run, "reached end of program");
    Ok(())
}
