use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use syntax::ast::ModuleTemplate;
use util::HashMap;

use crate::Error;

/// Path to the external program.
const EXEC_KEY: &str = "Multiwfnpath";
/// Directory holding `<module>.conf` files.
const TEMPLATE_DIR_KEY: &str = "confpath";
/// Default number of cores passed to the program.
const CORES_KEY: &str = "cores";

/// Extension of module template files.
pub const TEMPLATE_EXT: &str = "conf";
/// Template directory used when `confpath` isn't set.
pub const DEFAULT_TEMPLATE_DIR: &str = "~/.bane/multiwfn";

/// Settings read from `banewfn.rc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalConfig {
    pub exec_path: PathBuf,
    pub template_dir: PathBuf,
    /// `None` lets the program pick its own core count.
    pub default_cores: Option<u32>,
}

impl GlobalConfig {
    /// Parse the text of a `banewfn.rc` file.
    ///
    /// Blank lines, `#` lines and unknown keys are skipped.
    /// Fails if `Multiwfnpath` is missing or `cores` isn't a number.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut exec_path = None;
        let mut template_dir = None;
        let mut default_cores = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = syntax::split_assignment(line) {
                match key {
                    EXEC_KEY => exec_path = non_empty_path(value),
                    TEMPLATE_DIR_KEY => template_dir = non_empty_path(value),
                    CORES_KEY => {
                        let cores: u32 = value
                            .parse()
                            .map_err(|_| Error::InvalidCores(value.to_owned()))?;
                        default_cores = (cores > 0).then_some(cores);
                    }
                    _ => log::debug!("ignoring unknown config key '{key}'"),
                }
            }
        }

        Ok(Self {
            exec_path: exec_path.ok_or(Error::MissingExecPath)?,
            template_dir: template_dir.unwrap_or_else(default_template_dir),
            default_cores,
        })
    }
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(shellexpand::tilde(value).as_ref()))
    }
}

/// `~/.bane/multiwfn`, or a relative `.bane/multiwfn` if there's no home dir.
fn default_template_dir() -> PathBuf {
    let relative = DEFAULT_TEMPLATE_DIR.trim_start_matches("~/");
    match dirs::home_dir() {
        Some(home) => home.join(relative),
        None => PathBuf::from(relative),
    }
}

/// Global settings plus every module template loaded so far.
#[derive(Debug)]
pub struct ConfigStore {
    config: GlobalConfig,
    templates: HashMap<String, ModuleTemplate>,
}

impl ConfigStore {
    pub fn new(config: GlobalConfig) -> Self {
        Self {
            config,
            templates: HashMap::with_capacity_and_hasher(8, Default::default()),
        }
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// `<template_dir>/<name>.conf`
    pub fn template_path(&self, name: &str) -> PathBuf {
        template_path(&self.config.template_dir, name)
    }

    /// Load the template for module `name`, reading its file only the first time.
    pub fn load_template(&mut self, name: &str) -> Result<&ModuleTemplate, Error> {
        use std::collections::hash_map::Entry;
        let dir = &self.config.template_dir;
        match self.templates.entry(name.to_owned()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let path = template_path(dir, name);
                let template = read_template(&path, name)?;
                Ok(entry.insert(template))
            }
        }
    }

    /// Get an already-loaded template.
    pub fn template(&self, name: &str) -> Option<&ModuleTemplate> {
        self.templates.get(name)
    }

    /// Put a template in the cache without reading any file.
    pub fn insert_template(&mut self, name: &str, template: ModuleTemplate) {
        self.templates.insert(name.to_owned(), template);
    }
}

fn template_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{TEMPLATE_EXT}"))
}

fn read_template(path: &Path, module: &str) -> Result<ModuleTemplate, Error> {
    let text = std::fs::read_to_string(path).map_err(|source| {
        let module = module.to_owned();
        let path = path.display().to_string();
        if source.kind() == ErrorKind::InvalidData {
            Error::TemplateUnreadable {
                module,
                path,
                source,
            }
        } else {
            Error::TemplateNotFound {
                module,
                path,
                source,
            }
        }
    })?;
    log::info!("Loading module configuration: {}", path.display());
    Ok(syntax::parse_template(&text))
}
