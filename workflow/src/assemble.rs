use syntax::ast::{ModuleTemplate, Params, Task};
use syntax::scan_reference;

use crate::{ConfigStore, Error};

/// Section whose commands run for every module task.
pub const MAIN_SECTION: &str = "main";

/// Replace `$name` and `${name}` with values from `params`.
/// Unknown names, including the empty name after a lone `$`, become empty.
pub fn expand(cmd: &str, params: &Params) -> String {
    let mut out = String::with_capacity(cmd.len());
    let mut rest = cmd;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let len = match scan_reference(rest) {
            Some((reference, len)) => {
                if let Some(value) = params.get(reference.name()) {
                    out.push_str(value);
                }
                len
            }
            None => 1,
        };
        rest = &rest[len..];
    }

    out.push_str(rest);
    out
}

/// Section defaults with every non-empty override applied on top.
pub fn merge(defaults: &Params, overrides: &Params) -> Params {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        if !value.is_empty() {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// The commands of one template section, expanded with merged parameters.
pub fn assemble(
    template: &ModuleTemplate,
    section: &str,
    overrides: &Params,
) -> Result<Vec<String>, Error> {
    let section_def = template
        .section(section)
        .ok_or_else(|| Error::SectionNotFound(section.to_owned()))?;
    let params = merge(&section_def.defaults, overrides);
    Ok(section_def
        .commands
        .iter()
        .map(|cmd| expand(cmd, &params))
        .collect())
}

/// Like [assemble], but a missing section only logs a warning.
fn assemble_or_warn(template: &ModuleTemplate, section: &str, overrides: &Params) -> Vec<String> {
    assemble(template, section, overrides).unwrap_or_else(|e| {
        log::warn!("{e}");
        Vec::new()
    })
}

/// Full stdin text for a module task: `main`, each post-process section in order,
/// then the quit sequence if `include_quit` is set. Every line ends with `\n`.
pub fn module_script(template: &ModuleTemplate, task: &Task, include_quit: bool) -> String {
    let mut lines = assemble_or_warn(template, MAIN_SECTION, &task.params);
    for step in &task.post_process {
        lines.extend(assemble_or_warn(template, &step.section, &step.params));
    }
    if include_quit {
        lines.extend(template.quit.iter().cloned());
    }

    let mut text = String::new();
    for line in lines {
        text.push_str(&line);
        text.push('\n');
    }
    text
}

impl ConfigStore {
    /// Script text for `task` from its already-loaded template.
    /// A template that was never loaded yields an empty script and a warning.
    pub fn module_script(&self, task: &Task, include_quit: bool) -> String {
        match self.template(&task.module) {
            Some(template) => module_script(template, task, include_quit),
            None => {
                log::warn!("{}", Error::TemplateNotLoaded(task.module.clone()));
                String::new()
            }
        }
    }
}
