use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use stacklang::{parser::{decode, OperandParsing}, source::Program, vm::VMOptions};

fn run(program: &Program) {
    let options = VMOptions::new(None, 10_000_000_000);
    black_box(stacklang::vm::run(program, options, &mut std::io::sink()).unwrap());
}

fn straight_line_program(len: usize) -> String {
    let mut text = String::from("push 0\n");
    for i in 0..len {
        text.push_str(&format!("push {i}   # value\nadd\n"));
    }
    text.push_str("print\n");
    text
}

fn criterion_benchmark(c: &mut Criterion) {
    let programs: Vec<(String, Program)> = vec![
        (format!("countdown"), Program::parse(include_str!("programs/countdown.sl"))),
        (format!("rotate"), Program::parse(include_str!("programs/rotate.sl"))),
        (format!("straight-line-10k"), Program::parse(&straight_line_program(10_000))),
    ];

    let mut group = c.benchmark_group("full_program");
    for (name, program) in programs.iter() {
        group.bench_function(BenchmarkId::from_parameter(name), |bencher: &mut criterion::Bencher<'_>| {
            bencher.iter(|| run(black_box(program)));
        });
    }
    group.finish();

    let lines = ["push 12345", "  ifeq 17   # loop", "roll", "", "# comment only", "push 12abc"];
    c.bench_function("decode", |bencher| {
        bencher.iter(|| {
            for line in lines.iter() {
                let _ = black_box(decode(black_box(line), OperandParsing::Permissive));
            }
        });
    });
}

criterion_group!(name = benches; config = Criterion::default(); targets = criterion_benchmark);
criterion_main!(benches);
