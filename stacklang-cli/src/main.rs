use anyhow::Context;
use clap::Parser;
use stacklang::config::RunConfig;
use stacklang::parser::OperandParsing;
use stacklang::source::Program;
use stacklang::vm::{OpCounter, VMOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

/// Run a stacklang program.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// File containing a stacklang program.
    #[arg()]
    file: PathBuf,
    /// Maximum stack size.
    #[arg(long, short = 'm')]
    max_stack_size: Option<usize>,
    /// A limit for the number of executed lines.
    /// If the limit is reached, the program will be stopped with an error.
    #[arg(long, short = 'l')]
    op_limit: Option<u64>,
    /// Reject operands that are not well-formed numbers instead of reading them as 0.
    #[arg(long)]
    strict: bool,
    /// Print every line before it is executed.
    #[arg(long, short = 'e')]
    echo: bool,
    /// Print statistics after running the program.
    #[arg(long, short = 's')]
    stats: bool,
    /// Log interpreter events to stderr. `RUST_LOG` takes precedence.
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Initialize logging to stderr, `RUST_LOG` overrides the default filter.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "warn,stacklang=debug,stacklang_cli=debug" } else { "warn" })
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Command-line flags win over `STACKLANG_*` environment variables.
fn vm_options(args: &Args, env: RunConfig) -> VMOptions {
    let config = RunConfig {
        max_stack_size: args.max_stack_size.or(env.max_stack_size),
        op_limit: args.op_limit.or(env.op_limit),
        operand_parsing: if args.strict { OperandParsing::Strict } else { env.operand_parsing },
        echo: args.echo || env.echo,
    };
    VMOptions::from(&config)
}

fn execute(args: &Args, env: RunConfig, out: &mut impl Write) -> anyhow::Result<()> {
    let program = Program::from_file(&args.file)
        .with_context(|| format!("File could not be read: '{}'", args.file.display()))?;
    debug!(file = %args.file.display(), lines = program.len(), "loaded program");

    let start_time = std::time::Instant::now();
    let result = stacklang::vm::run_with_stats(&program, vm_options(args, env), out, OpCounter::default())?;
    let elapsed = start_time.elapsed();

    if args.stats {
        print_stats(result.instruction_counter, &result.tracer, elapsed);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            // Usage errors exit with 1, `--help` and `--version` with 0.
            return if err.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };
    init_logging(args.verbose);

    let result = RunConfig::from_env().map_err(anyhow::Error::from).and_then(|env| {
        let mut out = BufWriter::new(std::io::stdout().lock());
        let result = execute(&args, env, &mut out);
        // Values printed before a failure are still shown.
        let flushed = out.flush().context("Failed to write program output");
        result.and(flushed)
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_stats(instruction_counter: u64, counter: &OpCounter, elapsed: Duration) {
    let instructions_per_second = instruction_counter as f64 / elapsed.as_secs_f64();
    eprintln!("Execution time: {:?}", elapsed);
    eprintln!(
        "Lines executed: {} ({}/s)",
        instruction_counter,
        match instructions_per_second {
            n if n >= 1_000_000.0 => format!("{:.1}M", n / 1_000_000.0),
            n if n >= 1_000.0 => format!("{:.1}k", n / 1_000.0),
            n => format!("{:.1}", n),
        }
    );
    for (op, count) in counter.iter() {
        eprintln!("  {:<6} {}", op.keyword(), count);
    }
    if counter.nops() > 0 {
        eprintln!("  {:<6} {}", "(nop)", counter.nops());
    }
}
