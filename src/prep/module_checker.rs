use anyhow::Result;

use syntax::ast::Task;
use util::HashSet;
use workflow::ConfigStore;

/// Loads the template of every module a script uses, so a missing
/// `<module>.conf` is reported before any task runs.
#[derive(Default)]
pub struct ModuleChecker {
    checked: HashSet<String>,
}

impl ModuleChecker {
    /// Load the template for `task`'s module if this is the first time we've seen it.
    /// Adds the module name to `modules_to_print` only the first time.
    pub fn check(
        &mut self,
        task: &Task,
        store: &mut ConfigStore,
        modules_to_print: &mut Vec<String>,
    ) -> Result<()> {
        if task.is_bare() || self.checked.contains(&task.module) {
            return Ok(());
        }
        store.load_template(&task.module)?;
        self.checked.insert(task.module.clone());
        modules_to_print.push(task.module.clone());
        Ok(())
    }

    /// Check all tasks; returns module names in order of first use.
    pub fn check_all(tasks: &[Task], store: &mut ConfigStore) -> Result<Vec<String>> {
        let mut checker = Self::default();
        let mut modules = Vec::with_capacity(tasks.len());
        for task in tasks {
            checker.check(task, store, &mut modules)?;
        }
        Ok(modules)
    }
}
