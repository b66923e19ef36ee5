use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

fn program_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn stacklang(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stacklang"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("STACKLANG_MAX_STACK_SIZE")
        .env_remove("STACKLANG_OP_LIMIT")
        .env_remove("STACKLANG_STRICT_OPERANDS")
        .env_remove("STACKLANG_ECHO")
        .output()
        .unwrap()
}

fn run_program(text: &str) -> Output {
    let file = program_file(text);
    stacklang(&[file.path().to_str().unwrap()])
}

#[test]
fn test_no_arguments() {
    let output = stacklang(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_too_many_arguments() {
    let output = stacklang(&["a.sl", "b.sl"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_help() {
    let output = stacklang(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.sl");
    let output = stacklang(&[path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("File could not be read"), "{stderr}");
}

#[test]
fn test_add_and_print() {
    let output = run_program("push 3\npush 4\nadd\nprint\n");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "7\n");
}

#[test]
fn test_empty_program() {
    let output = run_program("");
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_stack_underflow() {
    let output = run_program("pop\n");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = stderr.lines().find(|line| line.contains("Line 1")).unwrap_or_default();
    assert!(line.contains("Stack underflow"), "{stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_output_before_failure_is_flushed() {
    let output = run_program("push 5\nprint\nbogus\n");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "5\n");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Line 3: Unexpected token 'bogus'"));
}
