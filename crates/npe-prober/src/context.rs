use std::collections::BTreeMap;

use serde::Serialize;

use npe_config::Module;
use npe_nagios::compact;

/// The template execution context of one probe: the module variables and
/// environment, after request overrides and process-environment expansion.
///
/// Serialised as `{ vars, env }` for template lookups like
/// `{{ vars.target | first }}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderContext {
    pub vars: BTreeMap<String, Vec<String>>,
    pub env: BTreeMap<String, String>,
}

impl RenderContext {
    pub fn new(vars: BTreeMap<String, Vec<String>>, env: BTreeMap<String, String>) -> Self {
        Self { vars, env }
    }

    /// Seeds the context from the module's declared variables and
    /// environment.
    pub fn from_module(module: &Module) -> Self {
        let vars = module
            .variables
            .iter()
            .map(|(k, v)| (k.clone(), v.iter().cloned().collect()))
            .collect();
        let env = module
            .environment
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self { vars, env }
    }

    /// Replaces variables with values from the provider, falling back to the
    /// declared defaults on a miss. Empty values are compacted away; a
    /// variable left without any value is removed entirely.
    pub fn visit_variables(mut self, provider: impl Fn(&str) -> Option<Vec<String>>) -> Self {
        let mut result = BTreeMap::new();
        for (key, fallback) in self.vars {
            let values = match provider(&key) {
                Some(values) if !values.is_empty() => values,
                _ => fallback,
            };

            let values = compact(&values);
            if !values.is_empty() {
                result.insert(key, values);
            }
        }

        self.vars = result;

        self
    }

    /// Replaces environment entries with values from the provider, falling
    /// back to `${…}` expansion of the declared value on a miss. Entries
    /// left empty are removed.
    pub fn visit_environment(mut self, provider: impl Fn(&str) -> Option<String>) -> Self {
        let mut result = BTreeMap::new();
        for (key, fallback) in self.env {
            let value = match provider(&key) {
                Some(value) if !value.is_empty() => value,
                _ => expand(&fallback, &provider),
            };

            if !value.is_empty() {
                result.insert(key, value);
            }
        }

        self.env = result;

        self
    }

    /// The environment as key/value pairs for process execution.
    pub fn env_pairs(&self) -> Vec<(String, String)> {
        self.env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Replaces `${name}` references in `s` with values from the provider;
/// unknown references expand to the empty string.
fn expand(s: &str, provider: &impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        match rest[start + 2..].find('}') {
            Some(end) => {
                let name = &rest[start + 2..start + 2 + end];
                if let Some(value) = provider(name) {
                    result.push_str(&value);
                }
                rest = &rest[start + 2 + end + 1..];
            }
            None => {
                // unterminated reference, keep verbatim
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    result.push_str(rest);

    result
}
