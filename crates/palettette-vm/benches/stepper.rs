//! Step-loop throughput.
//!
//! Measures the cost of the fetch-decode-execute cycle on:
//! - A blank canvas of no-ops (pure dispatch + advance)
//! - A counting loop mixing lookahead arithmetic and branching

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use palettette_vm::opcode::selector;
use palettette_vm::{CalcOp, Grid, Instruction, Interpreter, OpcodeKind, Pixel};

const STEPS: u64 = 10_000;

fn op(kind: OpcodeKind, g: u8, b: u8) -> Pixel {
    Instruction::new(kind, g, b).to_pixel()
}

fn blank_canvas(size: usize) -> Grid {
    Grid::new(size, size, vec![Pixel::new(255, 255, 255); size * size])
        .expect("non-empty canvas")
}

/// Counts register 1 up to 255, turning off the row once it matches
/// register 2.
fn arithmetic_row() -> Grid {
    let cells = vec![
        op(OpcodeKind::Calculate, CalcOp::Add.encode(1), 1),
        Pixel::new(1, 0, 0),
        op(OpcodeKind::Calculate, CalcOp::Mul.encode(2), 3),
        Pixel::new(0, 3, 0),
        op(OpcodeKind::SetVar, selector::BLUE, 2),
        Pixel::new(0, 0, 255),
        op(OpcodeKind::Branch, 1, 2),
        Pixel::new(255, 255, 255),
    ];
    Grid::new(cells.len(), 1, cells).expect("row grid")
}

fn run_steps(vm: &mut Interpreter, steps: u64) {
    vm.run();
    for _ in 0..steps {
        if vm.step().is_err() || !vm.is_running() {
            break;
        }
    }
}

fn bench_stepper(c: &mut Criterion) {
    let mut group = c.benchmark_group("stepper");
    group.throughput(Throughput::Elements(STEPS));

    for size in [8usize, 64, 256] {
        let mut vm = Interpreter::new(blank_canvas(size), "");
        group.bench_with_input(BenchmarkId::new("nop_canvas", size), &size, |b, _| {
            b.iter(|| run_steps(black_box(&mut vm), STEPS))
        });
    }

    let mut vm = Interpreter::new(arithmetic_row(), "");
    group.bench_function("arithmetic_loop", |b| {
        b.iter(|| run_steps(black_box(&mut vm), STEPS))
    });

    group.finish();
}

criterion_group!(benches, bench_stepper);
criterion_main!(benches);
