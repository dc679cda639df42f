mod config;
pub use config::{ConfigStore, GlobalConfig, DEFAULT_TEMPLATE_DIR, TEMPLATE_EXT};

mod placeholder;
pub use placeholder::{resolve, resolve_script, FileSource, INPUT_VAR};

mod assemble;
pub use assemble::{assemble, expand, merge, module_script, MAIN_SECTION};

mod strategy;
pub use strategy::{file_stem, script_stem, Strategy};

mod error;
pub use error::{AggregatedErrors, Errors};

pub use syntax::ast::{ModuleTemplate, Params, PostProcessStep, Section, Task};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Multiwfnpath not specified in config file")]
    MissingExecPath,
    #[error("Invalid core count in config file: '{0}'")]
    InvalidCores(String),
    #[error("Cannot open module config file for '{module}': {path}")]
    TemplateNotFound {
        module: String,
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Module config file for '{module}' is not valid text: {path}")]
    TemplateUnreadable {
        module: String,
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Module config [{0}] not loaded")]
    TemplateNotLoaded(String),
    #[error("Section [{0}] not found in module config")]
    SectionNotFound(String),
}
