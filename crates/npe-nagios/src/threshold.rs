use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

const THRESHOLD_DELIMITER: char = ':';

/// A comparison predicate for one side of a threshold range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alert {
    LessThan(f64),
    GreaterThan(f64),
    LessEqualThan(f64),
    GreaterEqualThan(f64),
    Always,
    Never,
}

impl Alert {
    /// Whether the given value trips this predicate.
    pub fn eval(self, value: f64) -> bool {
        match self {
            Alert::LessThan(cmp) => value < cmp,
            Alert::GreaterThan(cmp) => value > cmp,
            Alert::LessEqualThan(cmp) => value <= cmp,
            Alert::GreaterEqualThan(cmp) => value >= cmp,
            Alert::Always => true,
            Alert::Never => false,
        }
    }
}

/// A boundary definition for performance metrics, in the Nagios range
/// notation (`10`, `10:`, `~:10`, `10:20`, `@10:20`).
///
/// The literal bounds are preserved at parse time so the rendered form
/// matches the input; equality is defined over the literals and the
/// inside/outside mode, not the derived predicates.
#[derive(Debug, Clone)]
pub struct Threshold {
    left_limit: String,
    right_limit: String,
    left_alert: Alert,
    right_alert: Alert,
    cmp_and: bool,
}

impl Threshold {
    /// Alerts on any metric outside of the given boundaries.
    pub fn outside(lower: f64, upper: f64) -> Self {
        Self {
            left_limit: lower.to_string(),
            right_limit: upper.to_string(),
            left_alert: Alert::LessThan(lower),
            right_alert: Alert::GreaterThan(upper),
            cmp_and: false,
        }
    }

    /// Alerts on any metric inside of the given boundaries.
    pub fn inside(lower: f64, upper: f64) -> Self {
        Self {
            left_limit: format!("@{lower}"),
            right_limit: upper.to_string(),
            left_alert: Alert::GreaterEqualThan(lower),
            right_alert: Alert::LessEqualThan(upper),
            cmp_and: true,
        }
    }

    /// Alerts on any metric greater than the given boundary.
    pub fn above(max_value: f64) -> Self {
        Self {
            left_limit: "~".to_string(),
            right_limit: max_value.to_string(),
            left_alert: Alert::Never,
            right_alert: Alert::GreaterThan(max_value),
            cmp_and: false,
        }
    }

    /// Alerts on any metric less than the given boundary.
    pub fn below(min_value: f64) -> Self {
        Self {
            left_limit: min_value.to_string(),
            right_limit: String::new(),
            left_alert: Alert::LessThan(min_value),
            right_alert: Alert::Never,
            cmp_and: false,
        }
    }

    /// Alerts on any metric less than zero or greater than the given
    /// boundary. This is the semantic of a bare `N` range literal.
    pub fn upper(max_value: f64) -> Self {
        Self {
            left_limit: String::new(),
            right_limit: max_value.to_string(),
            left_alert: Alert::LessThan(0.0),
            right_alert: Alert::GreaterThan(max_value),
            cmp_and: false,
        }
    }

    /// Compares the given value against the internal boundaries.
    pub fn alert(&self, value: f64) -> bool {
        if self.cmp_and {
            self.left_alert.eval(value) && self.right_alert.eval(value)
        } else {
            self.left_alert.eval(value) || self.right_alert.eval(value)
        }
    }
}

fn parse_left_alert(s: &str) -> Result<(Alert, bool), ParseError> {
    if s.is_empty() {
        return Ok((Alert::LessThan(0.0), false));
    }

    if s == "~" {
        return Ok((Alert::Never, false));
    }

    if s == "@" {
        return Err(ParseError::MissingLowerLimit);
    }

    if let Some(raw) = s.strip_prefix('@') {
        let limit: f64 = raw
            .parse()
            .map_err(|_| ParseError::InvalidLimit(raw.to_string()))?;
        return Ok((Alert::GreaterEqualThan(limit), true));
    }

    let limit: f64 = s
        .parse()
        .map_err(|_| ParseError::InvalidLimit(s.to_string()))?;

    Ok((Alert::LessThan(limit), false))
}

fn parse_right_alert(s: &str, eql: bool) -> Result<Alert, ParseError> {
    if s.is_empty() || s == "~" {
        return Ok(Alert::Never);
    }

    let limit: f64 = s
        .parse()
        .map_err(|_| ParseError::InvalidLimit(s.to_string()))?;

    if eql {
        Ok(Alert::LessEqualThan(limit))
    } else {
        Ok(Alert::GreaterThan(limit))
    }
}

impl FromStr for Threshold {
    type Err = ParseError;

    /// Parses the given value for alert boundaries.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fragments: Vec<&str> = s.split(THRESHOLD_DELIMITER).collect();

        let (left, right) = match fragments.as_slice() {
            [right] => ("", *right),
            [left, right] => (*left, *right),
            _ => return Err(ParseError::MalformedThreshold),
        };

        let (left_alert, eql) = parse_left_alert(left)?;
        let right_alert = parse_right_alert(right, eql)?;

        Ok(Self {
            left_limit: left.to_string(),
            right_limit: right.to_string(),
            left_alert,
            right_alert,
            cmp_and: eql,
        })
    }
}

impl fmt::Display for Threshold {
    /// Renders the threshold in a Nagios compatible format, preserving the
    /// original literal bounds.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.left_limit.is_empty() {
            return f.write_str(&self.right_limit);
        }

        write!(f, "{}:{}", self.left_limit, self.right_limit)
    }
}

impl PartialEq for Threshold {
    fn eq(&self, other: &Self) -> bool {
        self.left_limit == other.left_limit
            && self.right_limit == other.right_limit
            && self.cmp_and == other.cmp_and
    }
}
