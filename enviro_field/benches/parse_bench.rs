//! Query parsing and step throughput benchmarks

use criterion::{Criterion, criterion_group, criterion_main};
use enviro_field::parser::{parse_control_line, parse_query_line};
use enviro_field::turtle::{ParamSpec, TurtleField, TurtleState, decode_field};
use enviro_field::{EchoField, FieldSession, TurtleSpec, run};
use enviro_ipc::PipeChannel;
use std::fmt::Write as _;
use std::hint::black_box;
use std::io::{Cursor, sink};

/// Benchmark single-line parsers
fn bench_line_parsers(c: &mut Criterion) {
    c.bench_function("parse_query_wrapped", |b| {
        b.iter(|| black_box(parse_query_line(black_box("1234E(A(0.5,1,2))(B(3,4.25))")).unwrap()));
    });

    c.bench_function("parse_control", |b| {
        b.iter(|| black_box(parse_control_line(black_box("Control: 3 120"))));
    });

    let spec = ParamSpec::from_format("P: %f %f %f");
    c.bench_function("decode_turtle_position", |b| {
        let mut state = TurtleState::default();
        b.iter(|| {
            decode_field(TurtleField::Position, spec, black_box("P: 1.5 -2 3e2"), &mut state).unwrap();
            black_box(state.position);
        });
    });
}

/// Benchmark a full echo step over in-memory pipes
fn bench_echo_step(c: &mut Criterion) {
    let mut input = String::new();
    for i in 0..1000 {
        writeln!(input, "{i}E(A({i},0.5))(B)").unwrap();
    }
    input.push_str("Control: 3 1\nControl: 4\n");
    let bytes = input.into_bytes();

    c.bench_function("echo_step_1000_queries", |b| {
        b.iter(|| {
            let channel = PipeChannel::new(Cursor::new(bytes.clone()), sink());
            let mut session = FieldSession::new(Box::new(channel), TurtleSpec::default());
            black_box(run(&mut session, &mut EchoField::default()).unwrap());
        });
    });
}

criterion_group!(benches, bench_line_parsers, bench_echo_step);
criterion_main!(benches);
