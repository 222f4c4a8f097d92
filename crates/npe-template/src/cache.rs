use std::sync::RwLock;

use minijinja::Environment;
use serde::Serialize;

use crate::error::TemplateError;
use crate::filters;

/// Presence of this token marks a string as a template; anything else is
/// passed through verbatim without touching the cache.
pub const TEMPLATE_TOKEN: &str = "{{";

/// A process-wide, thread-safe memoisation of compiled templates.
///
/// Templates are keyed by their raw body, not by the caller-supplied
/// identifier; two configuration fields with the same body share one
/// compiled instance. The lock is held across compilation and rendering,
/// so a concurrent [`flush`](TemplateCache::flush) cannot invalidate a
/// template while it is being executed.
pub struct TemplateCache {
    env: RwLock<Environment<'static>>,
}

impl TemplateCache {
    /// Creates a cache backed by the module rendering environment
    /// ([`filters::environment`]).
    pub fn new() -> Self {
        Self {
            env: RwLock::new(filters::environment()),
        }
    }

    /// Drops all compiled templates. Called on configuration reload.
    pub fn flush(&self) {
        self.env.write().unwrap().clear_templates();
    }

    /// Renders the template `body` against `ctx`. `name` identifies the
    /// configuration field for error messages only.
    ///
    /// A body without the template token is returned unchanged.
    pub fn render_string<S: Serialize>(
        &self,
        name: &str,
        body: &str,
        ctx: &S,
    ) -> Result<String, TemplateError> {
        if body.is_empty() || !body.contains(TEMPLATE_TOKEN) {
            return Ok(body.to_string());
        }

        {
            let env = self.env.read().unwrap();
            if let Ok(tmpl) = env.get_template(body) {
                return tmpl.render(ctx).map_err(|source| TemplateError::Render {
                    name: name.to_string(),
                    source,
                });
            }
        }

        let mut env = self.env.write().unwrap();
        if env.get_template(body).is_err() {
            env.add_template_owned(body.to_string(), body.to_string())
                .map_err(|source| TemplateError::Compile {
                    name: name.to_string(),
                    source,
                })?;
        }

        let tmpl = env
            .get_template(body)
            .map_err(|source| TemplateError::Compile {
                name: name.to_string(),
                source,
            })?;

        tmpl.render(ctx).map_err(|source| TemplateError::Render {
            name: name.to_string(),
            source,
        })
    }

    /// Renders the template `body` and parses the result as a boolean.
    ///
    /// An empty render yields `false`; otherwise only the canonical truth
    /// literals (`1`, `t`, `true`, `0`, `f`, `false` and their upper-case
    /// variants) are accepted.
    pub fn render_bool<S: Serialize>(
        &self,
        name: &str,
        body: &str,
        ctx: &S,
    ) -> Result<bool, TemplateError> {
        let value = self.render_string(name, body, ctx)?;
        if value.is_empty() {
            return Ok(false);
        }

        parse_truth(&value).ok_or_else(|| TemplateError::Truth {
            name: name.to_string(),
            value,
        })
    }
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_truth(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "True" | "TRUE" => Some(true),
        "0" | "f" | "F" | "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}
