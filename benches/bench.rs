use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::num::ParseIntError;
use wrapexcept::{catch, catch_as, throw, throw_exception};

fn parse_error() -> ParseIntError {
    "x".parse::<u32>().unwrap_err()
}

fn bench_throw(c: &mut Criterion) {
    fn rust() {
        fn imp(n: u32) {
            let n = black_box(n);
            if n == 0 {
                std::panic::resume_unwind(Box::new(parse_error()));
            } else {
                imp(n - 1);
            }
        }
        let _ = black_box(std::panic::catch_unwind(|| imp(5)));
    }

    fn result() {
        fn imp(n: u32) -> Result<(), ParseIntError> {
            let n = black_box(n);
            if n == 0 { Err(parse_error()) } else { imp(n - 1) }
        }
        let _ = black_box(imp(5));
    }

    fn plain() {
        fn imp(n: u32) {
            let n = black_box(n);
            if n == 0 {
                throw_exception(parse_error());
            } else {
                imp(n - 1);
            }
        }
        let _ = black_box(catch(|| imp(5)));
    }

    fn located() {
        fn imp(n: u32) {
            let n = black_box(n);
            if n == 0 {
                throw!(parse_error());
            } else {
                imp(n - 1);
            }
        }
        let _ = black_box(catch(|| imp(5)));
    }

    let mut group = c.benchmark_group("throw");
    group.bench_function("Rust panic", |b| b.iter(rust));
    group.bench_function("Result", |b| b.iter(result));
    group.bench_function("throw_exception", |b| b.iter(plain));
    group.bench_function("throw!", |b| b.iter(located));
    group.finish();
}

fn bench_rethrow(c: &mut Criterion) {
    fn copy() {
        fn imp(n: u32) {
            let n = black_box(n);
            if n == 0 {
                throw!(parse_error());
            } else {
                match catch(|| imp(n - 1)) {
                    Ok(()) => {}
                    Err(caught) => caught.rethrow(),
                }
            }
        }
        let _ = black_box(catch_as::<(), ParseIntError>(|| imp(5)));
    }

    fn resume() {
        fn imp(n: u32) {
            let n = black_box(n);
            if n == 0 {
                throw!(parse_error());
            } else {
                match catch(|| imp(n - 1)) {
                    Ok(()) => {}
                    Err(caught) => caught.resume(),
                }
            }
        }
        let _ = black_box(catch_as::<(), ParseIntError>(|| imp(5)));
    }

    let mut group = c.benchmark_group("rethrow");
    group.bench_function("rethrow", |b| b.iter(copy));
    group.bench_function("resume", |b| b.iter(resume));
    group.finish();
}

criterion_group!(benches, bench_throw, bench_rethrow);
criterion_main!(benches);
