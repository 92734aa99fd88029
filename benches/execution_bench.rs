use criterion::{black_box, criterion_group, criterion_main, Criterion};
use monkey::{parse, Environment, Evaluator, Lexer};

const FIBONACCI: &str = r#"
    let fib = fn(n) {
        if (n < 2) { return n; }
        fib(n - 1) + fib(n - 2)
    };
    fib(15)
"#;

const COLLECTIONS: &str = r#"
    let build = fn(n, acc) {
        if (n == 0) { return acc; }
        build(n - 1, append(acc, {"n": n, "sq": n * n}))
    };
    let items = build(100, []);
    [len(items), items[::-1][0]["sq"], items[10:20:3]]
"#;

fn lexer_benchmark(c: &mut Criterion) {
    c.bench_function("tokenize fibonacci", |b| {
        b.iter(|| Lexer::new(black_box(FIBONACCI)).scan_tokens())
    });
}

fn parser_benchmark(c: &mut Criterion) {
    c.bench_function("parse collections program", |b| {
        b.iter(|| parse(black_box(COLLECTIONS)))
    });
}

fn evaluator_benchmark(c: &mut Criterion) {
    let evaluator = Evaluator::new();

    let (fib, _) = parse(FIBONACCI);
    c.bench_function("evaluate fib(15)", |b| {
        b.iter(|| evaluator.eval(black_box(&fib), &Environment::new()))
    });

    let (collections, _) = parse(COLLECTIONS);
    c.bench_function("evaluate collections program", |b| {
        b.iter(|| evaluator.eval(black_box(&collections), &Environment::new()))
    });
}

criterion_group!(benches, lexer_benchmark, parser_benchmark, evaluator_benchmark);
criterion_main!(benches);
