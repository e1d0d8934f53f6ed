//! Raw cell text to typed numbers.
//!
//! `"₹1,234.5"` → `1234.5` currency, `"(12)"` → `-12`, `"25.8%"` → `25.8`
//! percent. Placeholders (`-`, `—`, `N/A`, ...) are "no data", not failures.

use crate::error::CleanError;
use scr_core::Unit;

/// Tokens Screener and friends use for an empty cell
const PLACEHOLDERS: [&str; 7] = ["", "-", "—", "–", "--", "N/A", "NA"];

/// Longest first so `Rs.` is stripped whole
const CURRENCY_MARKS: [&str; 7] = ["Rs.", "INR", "Rs", "₹", "$", "€", "£"];

/// Result of cleaning one cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cleaned {
  /// Parsed value; set even when out of range so callers can report it
  pub value: Option<f64>,
  pub unit: Unit,
  pub failure: Option<CleanError>,
}

impl Cleaned {
  fn empty(unit: Unit) -> Self {
    Self { value: None, unit, failure: None }
  }

  fn unparsable(raw: &str, unit: Unit) -> Self {
    Self { value: None, unit, failure: Some(CleanError::Unparsable(raw.to_string())) }
  }

  /// Value that is safe to publish: `None` whenever cleaning failed
  pub fn accepted(&self) -> Option<f64> {
    match self.failure {
      Some(_) => None,
      None => self.value,
    }
  }
}

/// Parse `raw` as a number expected to carry `expected` semantics.
///
/// A trailing `%` makes the unit `percent` whatever was expected; a currency
/// mark turns an expected `none` into `currency`.
pub fn clean(raw: &str, expected: Unit) -> Cleaned {
  let text = raw.replace('\u{a0}', " ");
  let text = text.trim();

  if is_placeholder(text) {
    return Cleaned::empty(expected);
  }

  let mut body = text;
  let mut negative = false;
  let mut saw_currency = false;

  if let Some(inner) = body.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
    negative = true;
    body = inner.trim();
  }

  body = strip_currency(body, &mut saw_currency);

  if let Some(rest) = body.strip_prefix('-').or_else(|| body.strip_prefix('−')) {
    negative = !negative;
    body = rest.trim_start();
  } else if let Some(rest) = body.strip_prefix('+') {
    body = rest.trim_start();
  }

  body = strip_currency(body, &mut saw_currency);

  let mut percent = false;
  if let Some(rest) = body.strip_suffix('%') {
    percent = true;
    body = rest.trim_end();
  }

  let digits: String = body.chars().filter(|c| *c != ',').collect();
  if !is_plain_decimal(&digits) {
    return Cleaned::unparsable(raw, expected);
  }

  let parsed = match digits.parse::<f64>() {
    Ok(v) => v,
    Err(_) => return Cleaned::unparsable(raw, expected),
  };
  let value = if negative { -parsed } else { parsed };

  let unit = if percent {
    Unit::Percent
  } else if saw_currency && expected == Unit::None {
    Unit::Currency
  } else {
    expected
  };

  check_bounds(value, unit)
}

/// `true` for the tokens that mean "no data"
pub fn is_placeholder(text: &str) -> bool {
  let text = text.trim();
  PLACEHOLDERS.iter().any(|p| text.eq_ignore_ascii_case(p))
}

fn strip_currency<'a>(mut body: &'a str, saw: &mut bool) -> &'a str {
  loop {
    let before = body;
    for mark in CURRENCY_MARKS {
      if let Some(rest) = body.strip_prefix(mark) {
        body = rest.trim_start();
        *saw = true;
      }
      if let Some(rest) = body.strip_suffix(mark) {
        body = rest.trim_end();
        *saw = true;
      }
    }
    if body == before {
      return body;
    }
  }
}

/// Digits with at most one decimal point. Rejects `inf`, `NaN` and exponents,
/// which `f64::from_str` would accept.
fn is_plain_decimal(s: &str) -> bool {
  let mut dots = 0;
  let mut digits = 0;
  for c in s.chars() {
    match c {
      '0'..='9' => digits += 1,
      '.' => dots += 1,
      _ => return false,
    }
  }
  digits > 0 && dots <= 1
}

fn check_bounds(value: f64, unit: Unit) -> Cleaned {
  let (min, max) = unit.bounds();
  let failure = if !value.is_finite() || value < min || value > max {
    Some(CleanError::OutOfRange { value, unit, min, max })
  } else {
    None
  };
  Cleaned { value: Some(value), unit, failure }
}
