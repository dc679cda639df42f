/// All the information needed to actually execute a task.
mod task_runner;
pub use task_runner::{ProgramInput, ShellScript, TaskRunner};
use task_runner::TaskRunnerBuilder;

/// Utility for generating `%command` script files.
mod task_script_builder;
use task_script_builder::TaskScriptBuilder;

/// Load the templates of all modules used by a script.
mod module_checker;
pub use module_checker::ModuleChecker;

use syntax::ast::Task;
use workflow::ConfigStore;

use crate::fs::Fs;

/// Build one `TaskRunner` per task, in script order.
/// Every module used by `tasks` must already be loaded into `store`.
pub fn prepare_tasks(
    tasks: &[Task],
    store: &ConfigStore,
    fs: &Fs,
    wfn_base: &str,
    screen: bool,
) -> Vec<TaskRunner> {
    let mut builder = TaskRunnerBuilder::new(store, fs, wfn_base, screen);
    tasks.iter().map(|task| builder.build(task)).collect()
}
