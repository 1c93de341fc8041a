use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tickplan::{Axis, EvalError, EvalValue, Evaluator, TickEngineConfig, place_ticks,
    place_ticks_with};

fn bench_linear_decade(c: &mut Criterion) {
    let axis = Axis::linear(0.0, 10.0).expect("valid axis");

    c.bench_function("linear_decade_ticks", |b| {
        b.iter(|| {
            let set = place_ticks(black_box(&axis));
            black_box(set);
        })
    });
}

fn bench_log_eleven_decades(c: &mut Criterion) {
    let axis = Axis::log(1.0, 1e11, 10.0).expect("valid axis");

    c.bench_function("log_eleven_decade_ticks", |b| {
        b.iter(|| {
            let set = place_ticks(black_box(&axis));
            black_box(set);
        })
    });
}

struct PolyEvaluator;

impl Evaluator for PolyEvaluator {
    fn evaluate(
        &self,
        _expression: &str,
        _arg_index: usize,
        value: f64,
        _unit: f64,
    ) -> Result<EvalValue, EvalError> {
        Ok(EvalValue::Number(value * value - 3.0 * value))
    }

    fn render_label(&self, _format: &str, value: f64, _unit: f64) -> Result<String, EvalError> {
        Ok(format!("{:.2}", value * value - 3.0 * value))
    }
}

fn bench_custom_format(c: &mut Criterion) {
    let axis = Axis::linear(0.0, 10.0)
        .expect("valid axis")
        .with_format("\"%f\" % (x**2 - 3*x)");
    let config = TickEngineConfig::default();

    c.bench_function("custom_format_ticks", |b| {
        b.iter(|| {
            let set = place_ticks_with(black_box(&axis), &PolyEvaluator, &config);
            black_box(set);
        })
    });
}

criterion_group!(
    benches,
    bench_linear_decade,
    bench_log_eleven_decades,
    bench_custom_format
);
criterion_main!(benches);
