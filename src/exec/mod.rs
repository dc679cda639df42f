/// Runs the prepared tasks
mod workflow_runner;
pub use workflow_runner::WorkflowRunner;

/// Start subprocesses
mod run_cmd;
pub use run_cmd::{Invocation, Launcher, SystemLauncher};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No commands were generated for {0}")]
    NoCommands(String),
    #[error("Multiwfn failed while running {0}")]
    ProgramFailed(String),
    #[error("Command script {0} failed")]
    ScriptFailed(String),
    #[error("Cannot attach to stdin of {0}")]
    NoChildStdin(String),
    #[error("{0} task(s) failed")]
    TasksFailed(usize),
}
