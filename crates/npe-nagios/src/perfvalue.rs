use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// A performance metric value with an optional unit of measurement.
///
/// The plugin interface uses the literal `U` to indicate that a value could
/// not be determined; such values carry `undef`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerfValue {
    pub value: f64,
    pub undef: bool,
    pub unit: String,
}

impl PerfValue {
    /// Creates a numeric performance value without any unit of measurement.
    pub fn float(value: f64) -> Self {
        Self::unit(value, "")
    }

    /// Creates a numeric performance value using percent as the unit.
    pub fn percent(value: f64) -> Self {
        Self::unit(value, "%")
    }

    /// Creates a numeric performance value with the provided unit.
    pub fn unit(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            undef: false,
            unit: unit.into(),
        }
    }

    /// Creates an undefined performance value.
    pub fn undefined() -> Self {
        Self {
            undef: true,
            ..Self::default()
        }
    }
}

impl FromStr for PerfValue {
    type Err = ParseError;

    /// Parses the given string for a performance metric value.
    ///
    /// A leading run of digits and periods forms the numeric part, the
    /// remainder is taken as the unit. `U`, `u` and the empty string yield
    /// an undefined value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "U" || s == "u" {
            return Ok(PerfValue::undefined());
        }

        let digits = s
            .bytes()
            .take_while(|b| b.is_ascii_digit() || *b == b'.')
            .count();

        let mut result = PerfValue::default();
        if digits > 0 {
            result.value = s[..digits]
                .parse()
                .map_err(|_| ParseError::InvalidValue(s[..digits].to_string()))?;
        }
        if digits < s.len() {
            result.unit = s[digits..].to_string();
        }

        Ok(result)
    }
}

impl fmt::Display for PerfValue {
    /// Renders the value according to its internal representation. An
    /// undefined value simply yields `U`, otherwise the numeric value and
    /// optional unit of measurement are concatenated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.undef {
            return f.write_str("U");
        }

        write!(f, "{}{}", self.value, self.unit)
    }
}
