use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::custom::{BoolString, LazyArray, NumberDuration};

/// The configuration document: a mapping from module name to module.
///
/// Unknown fields anywhere in the document are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modules: BTreeMap<String, Module>,
}

/// A reusable monitoring execution plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Module {
    /// Path or name of the plugin executable. Validated as non-empty when
    /// the command line is built, not at load time.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub command: String,

    /// Per-module execution cap; zero means no cap beyond the one supplied
    /// by the scrape transport.
    #[serde(default, skip_serializing_if = "NumberDuration::is_zero")]
    pub timeout: NumberDuration,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: BTreeMap<String, Argument>,

    /// Default variables, overrideable per request.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, LazyArray>,

    /// Environment passed to the plugin; values may contain `${…}`
    /// expansions against the process environment.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

/// The condition and representation of a commandline argument to a module
/// command. Boolean fields are declared as [`BoolString`] so they can carry
/// templates; they are rendered per probe.
///
/// An argument may also be declared as a bare scalar, shorthand for a
/// single-element `value`.
#[derive(Debug, Clone, Serialize)]
pub struct Argument {
    /// Condition template (`set_if`); when unset, the argument applies
    /// whenever its rendered value list is non-empty.
    #[serde(rename = "set_if", skip_serializing_if = "BoolString::is_empty")]
    pub condition: BoolString,

    #[serde(skip_serializing_if = "LazyArray::is_empty")]
    pub value: LazyArray,

    /// Sort weight; smaller sorts first, ties resolve by argument name.
    #[serde(skip_serializing_if = "is_zero")]
    pub order: i64,

    /// Flag name; defaults to the key the argument is declared under.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,

    /// Reserved for future validation; parsed but not enforced.
    #[serde(skip_serializing_if = "is_false_string")]
    pub required: BoolString,

    #[serde(skip_serializing_if = "is_true_string")]
    pub repeat_key: BoolString,

    #[serde(skip_serializing_if = "is_false_string")]
    pub skip_key: BoolString,

    /// Joins key and value; a space emits two tokens, anything else emits a
    /// single `key<sep>value` token.
    #[serde(skip_serializing_if = "is_space")]
    pub separator: String,
}

fn is_zero(order: &i64) -> bool {
    *order == 0
}

fn is_false_string(value: &BoolString) -> bool {
    value.as_str() == "false"
}

fn is_true_string(value: &BoolString) -> bool {
    value.as_str() == "true"
}

fn is_space(separator: &str) -> bool {
    separator == " "
}

impl Default for Argument {
    fn default() -> Self {
        Self {
            condition: BoolString::default(),
            value: LazyArray::default(),
            order: 0,
            key: String::new(),
            required: BoolString::new("false"),
            repeat_key: BoolString::new("true"),
            skip_key: BoolString::new("false"),
            separator: " ".to_string(),
        }
    }
}

impl Argument {
    /// Shorthand for an argument carrying only a single templated value.
    pub fn scalar(value: impl Into<String>) -> Self {
        Self {
            value: LazyArray(vec![value.into()]),
            ..Self::default()
        }
    }
}

/// The long-form mapping notation of [`Argument`]. Field defaults mirror
/// `Argument::default`, so omitted fields and scalar shorthand agree.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawArgument {
    #[serde(rename = "set_if", default)]
    condition: BoolString,
    #[serde(default)]
    value: LazyArray,
    #[serde(default)]
    order: i64,
    #[serde(default)]
    key: String,
    #[serde(default = "default_false")]
    required: BoolString,
    #[serde(default = "default_true")]
    repeat_key: BoolString,
    #[serde(default = "default_false")]
    skip_key: BoolString,
    #[serde(default = "default_separator")]
    separator: String,
}

fn default_false() -> BoolString {
    BoolString::new("false")
}

fn default_true() -> BoolString {
    BoolString::new("true")
}

fn default_separator() -> String {
    " ".to_string()
}

impl From<RawArgument> for Argument {
    fn from(raw: RawArgument) -> Self {
        Self {
            condition: raw.condition,
            value: raw.value,
            order: raw.order,
            key: raw.key,
            required: raw.required,
            repeat_key: raw.repeat_key,
            skip_key: raw.skip_key,
            separator: raw.separator,
        }
    }
}

impl<'de> Deserialize<'de> for Argument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ArgumentVisitor;

        impl<'de> Visitor<'de> for ArgumentVisitor {
            type Value = Argument;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an argument mapping or a scalar value")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Argument, E> {
                Ok(Argument::scalar(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Argument, E> {
                Ok(Argument::scalar(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Argument, E> {
                Ok(Argument::scalar(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Argument, E> {
                Ok(Argument::scalar(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Argument, E> {
                Ok(Argument::scalar(v.to_string()))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Argument, A::Error> {
                RawArgument::deserialize(de::value::MapAccessDeserializer::new(map))
                    .map(Argument::from)
            }
        }

        deserializer.deserialize_any(ArgumentVisitor)
    }
}
