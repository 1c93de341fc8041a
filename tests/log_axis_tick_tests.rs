use tickplan::{Axis, place_ticks};

fn major_labels(set: &tickplan::TickSet) -> Vec<&str> {
    set.major.iter().map(|t| t.label.as_str()).collect()
}

#[test]
fn three_decades_tick_every_decade() {
    let axis = Axis::log(1.0, 1000.0, 10.0)
        .and_then(|a| a.with_geometry(30.0, 2.5, 0.4))
        .expect("valid axis");
    let set = place_ticks(&axis);

    assert_eq!(major_labels(&set), vec!["1", "10", "100", "1000"]);
    for (tick, expected) in set.major.iter().zip([0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0]) {
        assert!((tick.fraction - expected).abs() <= 1e-9);
    }
}

#[test]
fn mantissa_minors_fill_roomy_decades() {
    let axis = Axis::log(1.0, 1000.0, 10.0)
        .and_then(|a| a.with_geometry(30.0, 2.5, 0.4))
        .expect("valid axis");
    let set = place_ticks(&axis);

    // 2..=9 within each of the three decades.
    assert_eq!(set.minor.len(), 24);
    let expected = 200.0f64;
    let fraction = axis.fraction_of_value(expected);
    assert!(
        set.minor.iter().any(|t| (t.fraction - fraction).abs() <= 1e-9),
        "expected a minor tick at {expected}"
    );
    assert!(set.minor.iter().all(|t| t.label.is_empty()));
}

#[test]
fn cramped_decades_get_no_mantissa_minors() {
    let axis = Axis::log(1.0, 1000.0, 10.0)
        .and_then(|a| a.with_geometry(10.0, 2.5, 0.4))
        .expect("valid axis");
    let set = place_ticks(&axis);

    assert_eq!(major_labels(&set), vec!["1", "10", "100", "1000"]);
    // At 10 units of axis length the mantissa positions bunch up below the
    // minor separation, so the scheme carries no minors at all.
    assert!(set.minor.is_empty());
}

#[test]
fn wide_range_skips_decades_and_keeps_the_rest_as_minors() {
    let axis = Axis::log(1.0, 1e11, 10.0).expect("valid axis");
    let set = place_ticks(&axis);

    assert_eq!(major_labels(&set), vec!["1", "10^5", "10^10"]);
    assert_eq!(set.minor.len(), 9);
    // Minors sit on the remaining powers of ten, never between them.
    for tick in &set.minor {
        let exponent = 11.0 * tick.fraction;
        assert!(
            (exponent - exponent.round()).abs() <= 1e-6,
            "minor at fraction {} is not a decade",
            tick.fraction
        );
    }
}

#[test]
fn log_labels_use_exact_powers() {
    let axis = Axis::log(1.0, 1e8, 10.0).expect("valid axis");
    let set = place_ticks(&axis);

    // Every label is a clean power of ten; no 999.9996-style noise.
    for label in major_labels(&set) {
        assert!(
            label
                .chars()
                .all(|c| c.is_ascii_digit() || c == '^' || c == '.'),
            "unexpected label {label}"
        );
    }
    assert_eq!(set.major.first().map(|t| t.label.as_str()), Some("1"));
}

#[test]
fn huge_bases_tick_on_whole_powers_without_minors() {
    // Sub-tick partitions and mantissa runs both scale with the base, so a
    // huge base carries neither and the call stays cheap; whole powers of
    // the base still become majors.
    let axis = Axis::log(1.0, 1e9, 1e8).expect("valid axis");
    let set = place_ticks(&axis);

    assert_eq!(set.major.len(), 2);
    assert!(set.major[0].fraction.abs() <= 1e-9);
    assert!((set.major[1].fraction - 8.0 / 9.0).abs() <= 1e-9);
    assert!(set.minor.is_empty());
}

#[test]
fn binary_base_ticks_on_powers_of_two() {
    let axis = Axis::log(1.0, 1024.0, 2.0).expect("valid axis");
    let set = place_ticks(&axis);

    assert!(!set.major.is_empty());
    for tick in &set.major {
        let value = axis.value_at_fraction(tick.fraction);
        let exponent = value.log2();
        assert!(
            (exponent - exponent.round()).abs() <= 1e-6,
            "major at {value} is not a power of two"
        );
    }
    assert_eq!(set.major.first().map(|t| t.label.as_str()), Some("1"));
}
