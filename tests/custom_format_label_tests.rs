//! Custom label formats driven through a host evaluator.
//!
//! The axis variable is a unix timestamp; the evaluator exposes calendar
//! fields through `chrono`, the way a plotting host would bind its own
//! expression language.

use chrono::{DateTime, Datelike};
use tickplan::{Axis, EvalError, EvalValue, Evaluator, TickEngineConfig, place_ticks_with};

const JUL_2020: f64 = 1_593_561_600.0;
const JAN_2021: f64 = 1_609_459_200.0;
const JUL_2021: f64 = 1_625_097_600.0;
const JAN_2022: f64 = 1_640_995_200.0;
const JUL_2022: f64 = 1_656_633_600.0;

struct CalendarEvaluator;

impl CalendarEvaluator {
    fn date_at(value: f64) -> Result<DateTime<chrono::Utc>, EvalError> {
        DateTime::from_timestamp(value as i64, 0)
            .map(|d| d.to_utc())
            .ok_or_else(|| EvalError::new("timestamp out of range"))
    }
}

impl Evaluator for CalendarEvaluator {
    fn evaluate(
        &self,
        expression: &str,
        _arg_index: usize,
        value: f64,
        _unit: f64,
    ) -> Result<EvalValue, EvalError> {
        let date = Self::date_at(value)?;
        match expression {
            "month(x)" => Ok(EvalValue::Number(f64::from(date.month()))),
            "year(x)" => Ok(EvalValue::Number(f64::from(date.year()))),
            "monthname(x)" => Ok(EvalValue::Text(date.format("%b").to_string())),
            other => Err(EvalError::new(format!("unknown expression '{other}'"))),
        }
    }

    fn render_label(&self, _format: &str, value: f64, _unit: f64) -> Result<String, EvalError> {
        let date = Self::date_at(value)?;
        Ok(format!("{}/{}", date.month(), date.year()))
    }
}

fn two_year_axis(format: &str) -> Axis {
    Axis::linear(JUL_2020, JUL_2022)
        .expect("valid axis")
        .with_format(format)
}

#[test]
fn year_boundaries_become_major_ticks() {
    let axis = two_year_axis("\"%d/%d\" % (month(x), year(x))");
    let set = place_ticks_with(&axis, &CalendarEvaluator, &TickEngineConfig::default());

    // Months change 24 times over this range and are vetoed as noise;
    // years change twice and win as the discrete scheme.
    assert_eq!(set.major.len(), 2);
    assert_eq!(set.major[0].label, "1/2021");
    assert_eq!(set.major[1].label, "1/2022");

    let span = JUL_2022 - JUL_2020;
    let expected_first = (JAN_2021 - JUL_2020) / span;
    let expected_second = (JAN_2022 - JUL_2020) / span;
    assert!((set.major[0].fraction - expected_first).abs() <= 1e-6);
    assert!((set.major[1].fraction - expected_second).abs() <= 1e-6);
}

#[test]
fn textual_arguments_tick_on_text_changes() {
    // Half a year; the month name is textual and changes six times, the
    // last change landing exactly on the axis end.
    let axis = Axis::linear(JUL_2020, JAN_2021)
        .and_then(|a| a.with_geometry(14.0, 2.0, 0.7))
        .expect("valid axis")
        .with_format("\"%s\" % (monthname(x))");
    let set = place_ticks_with(&axis, &CalendarEvaluator, &TickEngineConfig::default());

    assert_eq!(set.major.len(), 6);
    for pair in set.major.windows(2) {
        assert!(pair[1].fraction > pair[0].fraction);
    }
}

#[test]
fn arguments_fold_into_one_merged_scheme() {
    struct HalfYearEvaluator;
    impl Evaluator for HalfYearEvaluator {
        fn evaluate(
            &self,
            expression: &str,
            _arg_index: usize,
            value: f64,
            _unit: f64,
        ) -> Result<EvalValue, EvalError> {
            let date = CalendarEvaluator::date_at(value)?;
            match expression {
                "year(x)" => Ok(EvalValue::Number(f64::from(date.year()))),
                "half(x)" => Ok(EvalValue::Number(if date.month() <= 6 { 1.0 } else { 2.0 })),
                other => Err(EvalError::new(format!("unknown expression '{other}'"))),
            }
        }

        fn render_label(&self, _format: &str, value: f64, _unit: f64) -> Result<String, EvalError> {
            let date = CalendarEvaluator::date_at(value)?;
            let half = if date.month() <= 6 { 1 } else { 2 };
            Ok(format!("{}-H{}", date.year(), half))
        }
    }

    let axis = two_year_axis("\"%d-H%d\" % (year(x), half(x))");
    let set = place_ticks_with(&axis, &HalfYearEvaluator, &TickEngineConfig::default());

    // Years change twice and claim their boundaries first; the half-year
    // argument overlays them at each January and adds the July boundaries.
    let labels: Vec<&str> = set.major.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["2021-H1", "2021-H2", "2022-H1", "2022-H2"]);

    let span = JUL_2022 - JUL_2020;
    let expected = [
        (JAN_2021 - JUL_2020) / span,
        (JUL_2021 - JUL_2020) / span,
        (JAN_2022 - JUL_2020) / span,
        1.0,
    ];
    for (tick, expected) in set.major.iter().zip(expected) {
        assert!((tick.fraction - expected).abs() <= 1e-6);
    }
}

#[test]
fn vetoed_only_format_falls_back_to_uniform() {
    let axis = two_year_axis("\"%d\" % (month(x))");
    let set = place_ticks_with(&axis, &CalendarEvaluator, &TickEngineConfig::default());

    // The lone argument is vetoed, so no scheme exists and the uniform
    // fallback takes over, still labelling through the evaluator.
    assert_eq!(set.major.len(), 6);
    assert!(set.minor.is_empty());
    assert_eq!(set.major[0].label, "7/2020");
    assert_eq!(set.major[5].label, "7/2022");
}

#[test]
fn continuous_expression_arguments_are_refined() {
    struct Doubler;
    impl Evaluator for Doubler {
        fn evaluate(
            &self,
            _expression: &str,
            _arg_index: usize,
            value: f64,
            _unit: f64,
        ) -> Result<EvalValue, EvalError> {
            Ok(EvalValue::Number(value * 2.0))
        }

        fn render_label(&self, _format: &str, value: f64, _unit: f64) -> Result<String, EvalError> {
            Ok(format!("{:.0}", value * 2.0))
        }
    }

    let axis = Axis::linear(0.0, 10.0)
        .expect("valid axis")
        .with_format("\"%d\" % (x * 2)");
    let set = place_ticks_with(&axis, &Doubler, &TickEngineConfig::default());

    // The doubled argument spans 0..20; divisions of 4 in argument space
    // land every 2 axis units.
    let labels: Vec<&str> = set.major.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["0", "4", "8", "12", "16", "20"]);
    for (tick, expected) in set.major.iter().zip([0.0, 0.2, 0.4, 0.6, 0.8, 1.0]) {
        assert!((tick.fraction - expected).abs() <= 1e-6);
    }
}

#[test]
fn evaluation_gaps_poison_samples_not_the_axis() {
    struct PartialSqrt;
    impl Evaluator for PartialSqrt {
        fn evaluate(
            &self,
            _expression: &str,
            _arg_index: usize,
            value: f64,
            _unit: f64,
        ) -> Result<EvalValue, EvalError> {
            if value < 2.0 {
                return Err(EvalError::new("domain error"));
            }
            Ok(EvalValue::Number((value - 2.0).sqrt()))
        }

        fn render_label(&self, _format: &str, value: f64, _unit: f64) -> Result<String, EvalError> {
            if value < 2.0 {
                return Err(EvalError::new("domain error"));
            }
            Ok(format!("{:.3}", (value - 2.0).sqrt()))
        }
    }

    let axis = Axis::linear(0.0, 10.0)
        .expect("valid axis")
        .with_format("\"%f\" % (sqrt(x - 2))");
    let set = place_ticks_with(&axis, &PartialSqrt, &TickEngineConfig::default());

    // The expression is undefined on the first fifth of the axis; the
    // engine still ticks the defined part rather than giving up.
    assert!(!set.major.is_empty());
    for tick in &set.major {
        assert!(tick.fraction >= 0.0 && tick.fraction <= 1.0);
    }
}
