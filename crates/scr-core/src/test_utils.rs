/// Default tolerance for floating-point comparisons
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Assert that two floating-point numbers are approximately equal
pub fn assert_approx_eq(actual: f64, expected: f64, tolerance: f64) {
  assert!(
    (actual - expected).abs() < tolerance,
    "Values not approximately equal:\n  actual:   {}\n  expected: {}\n  diff:     {}\n  tolerance: {}",
    actual,
    expected,
    (actual - expected).abs(),
    tolerance
  );
}

/// Assert that an optional cell value matches, treating `None` as "no data"
pub fn assert_value_eq(actual: Option<f64>, expected: Option<f64>) {
  match (actual, expected) {
    (Some(a), Some(e)) => assert_approx_eq(a, e, DEFAULT_TOLERANCE),
    (None, None) => {}
    _ => panic!("Value mismatch:\n  actual:   {:?}\n  expected: {:?}", actual, expected),
  }
}
