//! # stacklang
//! An interpreter for a tiny line-oriented stack language.
//!
//! A program has one instruction per line. There is a single stack of 32-bit
//! integers and jumps address lines by their 1-based number:
//!
//! | instruction | effect |
//! |---|---|
//! | `push <n>` | push `n` |
//! | `pop` | remove the top value |
//! | `add` | pop two values, push their (wrapping) sum |
//! | `ifeq <line>` | jump to `line` if the top value is not zero |
//! | `jump <line>` | jump to `line` |
//! | `print` | print the top value |
//! | `dup` | push a copy of the top value |
//! | `swap` | exchange the two top values |
//! | `roll` | move the top value to the bottom of the stack |
//!
//! Everything after a `#` is a comment and blank lines do nothing. Lines are
//! decoded only when they are reached, so a malformed line that is never
//! executed is not an error. Running past the last line ends the program.
pub mod config;
pub mod ops;
pub mod parser;
pub mod source;
pub mod stack;
pub mod vm;
