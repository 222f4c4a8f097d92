use std::collections::BTreeMap;
use std::sync::Arc;

use npe_config::{Argument, Module};
use npe_nagios::Plugin;
use npe_template::TemplateCache;

use crate::context::RenderContext;
use crate::error::ProbeError;

/// The rendered version of a configured [`Argument`]: every template
/// resolved against the probe context, booleans materialised, defaults
/// applied.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct RenderedArgument {
    pub condition: bool,
    pub value: Vec<String>,
    pub order: i64,
    pub key: String,
    #[allow(dead_code)] // reserved; parsed but not enforced
    pub required: bool,
    pub repeat_key: bool,
    pub skip_key: bool,
    pub separator: String,
}

/// Turns a module definition and a render context into an executable
/// [`Plugin`].
pub struct PluginBuilder {
    cache: Arc<TemplateCache>,
}

impl PluginBuilder {
    pub fn new(cache: Arc<TemplateCache>) -> Self {
        Self { cache }
    }

    /// Materialises the module's command line against the given context.
    pub fn build(&self, name: &str, module: &Module, ctx: &RenderContext) -> Result<Plugin, ProbeError> {
        let args = self.render_module_arguments(&module.arguments, ctx)?;

        if module.command.is_empty() {
            return Err(ProbeError::MissingCommand(name.to_string()));
        }

        Ok(Plugin::new(module.command.clone(), args, ctx.env_pairs()))
    }

    fn render_module_arguments(
        &self,
        args: &BTreeMap<String, Argument>,
        ctx: &RenderContext,
    ) -> Result<Vec<String>, ProbeError> {
        let mut argv = Vec::with_capacity(args.len());

        for (key, arg) in args {
            let mut item = self.render_argument(arg, ctx)?;
            if item.key.is_empty() {
                item.key = key.clone();
            }

            argv.push(item);
        }

        Ok(render_arguments(argv))
    }

    fn render_argument(
        &self,
        arg: &Argument,
        ctx: &RenderContext,
    ) -> Result<RenderedArgument, ProbeError> {
        let mut result = RenderedArgument {
            order: arg.order,
            key: arg.key.clone(),
            separator: arg.separator.clone(),
            ..RenderedArgument::default()
        };

        for value in arg.value.iter() {
            let rendered = self.cache.render_string("value", value, ctx)?;
            result.value.extend(
                rendered
                    .split('\n')
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string),
            );
        }

        if !arg.condition.is_empty() {
            // a template error in the condition gates the argument off
            // instead of failing the probe
            result.condition = self
                .cache
                .render_bool("set_if", arg.condition.as_str(), ctx)
                .unwrap_or(false);
            if !result.condition {
                return Ok(result);
            }
        } else {
            result.condition = !result.value.is_empty();
        }

        result.required = self
            .cache
            .render_bool("required", arg.required.as_str(), ctx)?;
        result.repeat_key = self
            .cache
            .render_bool("repeat_key", arg.repeat_key.as_str(), ctx)?;
        result.skip_key = self
            .cache
            .render_bool("skip_key", arg.skip_key.as_str(), ctx)?;

        Ok(result)
    }
}

/// Flattens the rendered arguments into an argv list.
///
/// Arguments are stably sorted by `order`; the input arrives in argument
/// name order, so equal orders resolve deterministically by name.
pub(crate) fn render_arguments(mut argv: Vec<RenderedArgument>) -> Vec<String> {
    let mut result = Vec::with_capacity(argv.len());

    argv.sort_by_key(|arg| arg.order);

    for arg in argv {
        if !arg.condition || arg.key.is_empty() {
            continue;
        }

        if arg.value.is_empty() && !arg.skip_key {
            result.push(arg.key);
            continue;
        }

        let mut first = true;
        for val in arg.value {
            if arg.skip_key || (!first && !arg.repeat_key) {
                if val.is_empty() {
                    continue;
                }

                result.push(val);
            } else if val.is_empty() {
                result.push(arg.key.clone());
            } else if arg.separator == " " {
                result.push(arg.key.clone());
                result.push(val);
            } else {
                result.push(format!("{}{}{}", arg.key, arg.separator, val));
            }

            first = false;
        }
    }

    result
}
