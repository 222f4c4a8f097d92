/// Errors produced while compiling or rendering configuration templates.
///
/// The `name` is the caller-supplied identifier of the field being rendered;
/// it only serves error reporting, templates themselves are memoised by
/// their body.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("compiling {name} template: {source}")]
    Compile {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("rendering {name} template: {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// A boolean template rendered to something other than the canonical
    /// truth literals.
    #[error("{name} template produced non-boolean value {value:?}")]
    Truth { name: String, value: String },
}
