use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::perfvalue::PerfValue;
use crate::threshold::Threshold;

pub const PERFDATA_OUTPUT_DELIMITER: char = '|';
const PERFDATA_LABEL_DELIMITER: char = '=';
const PERFDATA_VALUE_DELIMITER: char = ';';

/// A single performance data metric and its context (thresholds, limits).
///
/// Absent fields are `None`; a `None` limit is distinct from a zero-valued
/// one, both for equality and for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerfData {
    label: String,
    value: Option<PerfValue>,
    warn: Option<Threshold>,
    crit: Option<Threshold>,
    min: Option<i64>,
    max: Option<i64>,
}

impl PerfData {
    /// Creates a new instance with the semantic of the value being undefined.
    pub fn undefined(label: impl Into<String>) -> Self {
        Self::value(label, PerfValue::undefined())
    }

    /// Creates a new instance with the given performance metric.
    pub fn value(label: impl Into<String>, value: PerfValue) -> Self {
        Self {
            label: label.into(),
            value: Some(value),
            ..Self::default()
        }
    }

    /// Creates a new instance with the given performance metric and
    /// thresholds.
    pub fn thresholds(
        label: impl Into<String>,
        value: PerfValue,
        warn: Option<Threshold>,
        crit: Option<Threshold>,
    ) -> Self {
        Self {
            label: label.into(),
            value: Some(value),
            warn,
            crit,
            ..Self::default()
        }
    }

    /// Creates a new instance with the given performance metric and limits.
    pub fn scoped(label: impl Into<String>, value: PerfValue, min: i64, max: i64) -> Self {
        Self {
            label: label.into(),
            value: Some(value),
            min: Some(min),
            max: Some(max),
            ..Self::default()
        }
    }

    /// Creates a new instance with the given performance metric, thresholds,
    /// and limits.
    pub fn full(
        label: impl Into<String>,
        value: PerfValue,
        warn: Option<Threshold>,
        crit: Option<Threshold>,
        min: i64,
        max: i64,
    ) -> Self {
        Self {
            label: label.into(),
            value: Some(value),
            warn,
            crit,
            min: Some(min),
            max: Some(max),
        }
    }

    /// The performance data label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The performance data label, quoted if it contains any spaces.
    pub fn quoted_label(&self) -> String {
        if self.label.contains(' ') {
            format!("'{}'", self.label)
        } else {
            self.label.clone()
        }
    }

    /// The lower performance data limit, or zero if absent.
    pub fn min(&self) -> i64 {
        self.min.unwrap_or_default()
    }

    /// The upper performance data limit, or zero if absent.
    ///
    /// A stored limit of zero combined with a percent unit reports 100;
    /// the rendered string form preserves the literal zero.
    pub fn max(&self) -> i64 {
        match self.max {
            Some(0) if self.value.as_ref().is_some_and(|v| v.unit == "%") => 100,
            Some(max) => max,
            None => 0,
        }
    }

    /// The current performance data value, or `U` if no such information is
    /// available.
    pub fn value_text(&self) -> String {
        match &self.value {
            Some(value) => value.to_string(),
            None => "U".to_string(),
        }
    }

    /// The numeric form of the value, or zero if absent.
    pub fn float(&self) -> f64 {
        self.value.as_ref().map(|v| v.value).unwrap_or_default()
    }

    /// The warning threshold in its literal form, or the empty string.
    pub fn warning(&self) -> String {
        self.warn.as_ref().map(Threshold::to_string).unwrap_or_default()
    }

    /// The critical threshold in its literal form, or the empty string.
    pub fn critical(&self) -> String {
        self.crit.as_ref().map(Threshold::to_string).unwrap_or_default()
    }

    /// Compares the value against the warning threshold. If either of those
    /// is unavailable (or the value is undefined), no alert is raised.
    pub fn warning_alert(&self) -> bool {
        match (&self.warn, &self.value) {
            (Some(warn), Some(value)) if !value.undef => warn.alert(value.value),
            _ => false,
        }
    }

    /// Compares the value against the critical threshold. If either of those
    /// is unavailable (or the value is undefined), no alert is raised.
    pub fn critical_alert(&self) -> bool {
        match (&self.crit, &self.value) {
            (Some(crit), Some(value)) if !value.undef => crit.alert(value.value),
            _ => false,
        }
    }
}

/// Parses the given string for whitespace-separated performance metrics in
/// the Nagios perfdata format. Whitespace inside a single-quoted label does
/// not split tokens.
pub fn parse_perfdata_output(s: &str) -> Result<Vec<PerfData>, ParseError> {
    tokenize(s).into_iter().map(PerfData::from_str).collect()
}

fn tokenize(s: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut start = None;
    let mut quoted = false;

    for (i, c) in s.char_indices() {
        if c == '\'' {
            quoted = !quoted;
        }

        if c.is_whitespace() && !quoted {
            if let Some(from) = start.take() {
                result.push(&s[from..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }

    if let Some(from) = start {
        result.push(&s[from..]);
    }

    result
}

fn parse_values(result: &mut PerfData, s: &str) -> Result<(), ParseError> {
    let mut fragments = s.split(PERFDATA_VALUE_DELIMITER);

    if let Some(value) = fragments.next() {
        result.value = Some(value.parse()?);
    }

    if let Some(warn) = fragments.next().filter(|f| !f.is_empty()) {
        result.warn = Some(warn.parse()?);
    }

    if let Some(crit) = fragments.next().filter(|f| !f.is_empty()) {
        result.crit = Some(crit.parse()?);
    }

    if let Some(min) = fragments.next().filter(|f| !f.is_empty()) {
        result.min = Some(
            min.parse()
                .map_err(|_| ParseError::InvalidRange(min.to_string()))?,
        );
    }

    if let Some(max) = fragments.next().filter(|f| !f.is_empty()) {
        result.max = Some(
            max.parse()
                .map_err(|_| ParseError::InvalidRange(max.to_string()))?,
        );
    }

    // any further fields are silently ignored
    Ok(())
}

impl FromStr for PerfData {
    type Err = ParseError;

    /// Parses the given string for a single performance metric in the
    /// Nagios perfdata format (`label=value[unit];warn;crit;min;max`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fragments: Vec<&str> = s.split(PERFDATA_LABEL_DELIMITER).collect();

        let label = fragments
            .first()
            .map(|l| l.trim_matches('\''))
            .unwrap_or_default();

        if label.is_empty() {
            return Err(ParseError::EmptyLabel);
        }

        if fragments.len() > 2 {
            return Err(ParseError::TooManyLabels(fragments.len() - 1));
        }

        let mut result = PerfData::undefined(label);
        if let Some(values) = fragments.get(1) {
            parse_values(&mut result, values)?;
        }

        Ok(result)
    }
}

impl fmt::Display for PerfData {
    /// Formats the internal data using the Nagios performance data notation,
    /// trimming trailing empty fields.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut params = vec![
            self.value_text(),
            self.warning(),
            self.critical(),
            self.min.map(|m| m.to_string()).unwrap_or_default(),
            self.max.map(|m| m.to_string()).unwrap_or_default(),
        ];

        while params.last().is_some_and(|p| p.is_empty()) {
            params.pop();
        }

        write!(
            f,
            "{}{}{}",
            self.quoted_label(),
            PERFDATA_LABEL_DELIMITER,
            params.join(&PERFDATA_VALUE_DELIMITER.to_string())
        )
    }
}
