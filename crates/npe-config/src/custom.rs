use std::fmt;
use std::time::Duration;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A sequence of strings which can also be declared using a single-item
/// scalar notation, or as null for an empty sequence. Scalar numbers and
/// booleans are coerced to their string form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LazyArray(pub Vec<String>);

impl LazyArray {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl From<Vec<String>> for LazyArray {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl fmt::Display for LazyArray {
    /// A newline-delimited string of the instance items.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("\n"))
    }
}

impl Serialize for LazyArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// A single scalar coerced to its string form, for sequence elements.
struct Scalar(String);

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScalarVisitor;

        impl<'de> Visitor<'de> for ScalarVisitor {
            type Value = Scalar;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a scalar value")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

impl<'de> Deserialize<'de> for LazyArray {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LazyArrayVisitor;

        impl<'de> Visitor<'de> for LazyArrayVisitor {
            type Value = LazyArray;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string, a sequence of strings, or null")
            }

            fn visit_unit<E: de::Error>(self) -> Result<LazyArray, E> {
                Ok(LazyArray::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<LazyArray, E> {
                Ok(LazyArray::default())
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<LazyArray, E> {
                Ok(LazyArray(vec![v.to_string()]))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<LazyArray, E> {
                Ok(LazyArray(vec![v.to_string()]))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<LazyArray, E> {
                Ok(LazyArray(vec![v.to_string()]))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<LazyArray, E> {
                Ok(LazyArray(vec![v.to_string()]))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<LazyArray, E> {
                Ok(LazyArray(vec![v.to_string()]))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<LazyArray, A::Error> {
                let mut values = Vec::new();
                while let Some(Scalar(value)) = seq.next_element()? {
                    values.push(value);
                }

                Ok(LazyArray(values))
            }
        }

        deserializer.deserialize_any(LazyArrayVisitor)
    }
}

/// A duration which can optionally be declared without any time scale,
/// defaulting to seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumberDuration(pub Duration);

impl NumberDuration {
    pub fn as_duration(self) -> Duration {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0.as_secs_f64()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Duration> for NumberDuration {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl fmt::Display for NumberDuration {
    /// Renders the duration in whole seconds.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}s", self.0.as_secs_f64())
    }
}

impl Serialize for NumberDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Suffix to nanoseconds multiplier (longer suffixes first, so `ms` is
/// matched before `m` and `s`).
const DURATION_UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("us", 1_000.0),
    ("ms", 1_000_000.0),
    ("s", 1_000_000_000.0),
    ("m", 60_000_000_000.0),
    ("h", 3_600_000_000_000.0),
];

/// Parses duration literals like `60s`, `1m`, `1.5h` or `1m30s`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let mut rest = s.trim();
    if rest.is_empty() {
        return Err(format!("empty duration literal '{s}'"));
    }

    let mut nanos = 0.0_f64;
    while !rest.is_empty() {
        let digits = rest
            .bytes()
            .take_while(|b| b.is_ascii_digit() || *b == b'.')
            .count();
        let value: f64 = rest[..digits]
            .parse()
            .map_err(|_| format!("invalid duration literal '{s}'"))?;

        rest = &rest[digits..];
        let (suffix, multiplier) = DURATION_UNITS
            .iter()
            .find(|(suffix, _)| rest.starts_with(suffix))
            .ok_or_else(|| format!("unknown unit in duration literal '{s}'"))?;

        nanos += value * multiplier;
        rest = &rest[suffix.len()..];
    }

    Ok(Duration::from_nanos(nanos as u64))
}

impl<'de> Deserialize<'de> for NumberDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NumberDurationVisitor;

        impl<'de> Visitor<'de> for NumberDurationVisitor {
            type Value = NumberDuration;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number of seconds or a duration literal")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<NumberDuration, E> {
                if v < 0 {
                    return Err(E::custom("duration must not be negative"));
                }

                Ok(NumberDuration(Duration::from_secs(v as u64)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<NumberDuration, E> {
                Ok(NumberDuration(Duration::from_secs(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<NumberDuration, E> {
                parse_duration(v).map(NumberDuration).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(NumberDurationVisitor)
    }
}

/// A string which can be declared as a native boolean or number; the
/// declared form is preserved so the value can later be fed through the
/// template engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoolString(pub String);

impl BoolString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BoolString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for BoolString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BoolString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BoolStringVisitor;

        impl<'de> Visitor<'de> for BoolStringVisitor {
            type Value = BoolString;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a boolean or a string")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<BoolString, E> {
                Ok(BoolString(v.to_string()))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<BoolString, E> {
                Ok(BoolString(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<BoolString, E> {
                Ok(BoolString(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<BoolString, E> {
                Ok(BoolString(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<BoolString, E> {
                Ok(BoolString(v.to_string()))
            }
        }

        deserializer.deserialize_any(BoolStringVisitor)
    }
}
