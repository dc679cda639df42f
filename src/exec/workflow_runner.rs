use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use workflow::Errors;

use crate::fs::{file_name, Fs};
use crate::prep::{ProgramInput, ShellScript, TaskRunner};
use crate::ui::Ui;

use super::{Error, Invocation, Launcher};

/// `WorkflowRunner` is the struct that actually runs a workflow.
///
/// Tasks run strictly in script order. A failed task is recorded and the
/// remaining tasks still run; a task's `%command` script only runs if its
/// program step succeeded. In dry-run mode command files are written and
/// kept, but nothing is launched.
pub struct WorkflowRunner<L: Launcher> {
    launcher: L,
    /// how to start the program
    invocation: Invocation,
    /// Filesystem interface
    fs: Fs,
    /// User interface
    ui: Ui,
    dry_run: bool,
}

impl<L: Launcher> WorkflowRunner<L> {
    /// Create a new `WorkflowRunner`.
    pub fn new(launcher: L, invocation: Invocation, fs: Fs, ui: Ui, dry_run: bool) -> Self {
        Self {
            launcher,
            invocation,
            fs,
            ui,
            dry_run,
        }
    }

    #[cfg(test)]
    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn run(&mut self, tasks: &[TaskRunner]) -> Result<()> {
        debug_assert!(!tasks.is_empty());

        let mut errors = Errors::default();
        for task in tasks {
            self.ui.start_timer();
            self.ui.task_header(&task.label, &format!("({} mode)", task.strategy));

            match self.run_task(task) {
                Ok(()) => self.ui.task_done(&task.label),
                Err(e) => {
                    eprintln!("{} {}", "FAILED".red(), task.label);
                    errors.add_context(e, format!("while running {}", task.label));
                }
            }
            self.ui.print_elapsed("Task execution");
        }

        if let Err(e) = errors.print_recap("running workflow") {
            return Err(Error::TasksFailed(e.1).into());
        }
        eprintln!("\n{}", "All done.".green());
        Ok(())
    }

    fn run_task(&mut self, task: &TaskRunner) -> Result<()> {
        match &task.program {
            Some(ProgramInput::File {
                command_file,
                text,
                out_file,
            }) => {
                if text.is_empty() {
                    return Err(Error::NoCommands(task.label.clone()).into());
                }
                self.fs
                    .write_file(command_file, text)
                    .context("while writing command file")?;

                if self.dry_run {
                    self.ui.notice(&format!(
                        "Dry run: wrote {}, skipping execution.",
                        file_name(command_file)
                    ));
                } else {
                    self.run_file(task, command_file, out_file.as_deref())?;
                }
            }
            Some(ProgramInput::Interactive { lines }) => {
                if lines.is_empty() {
                    return Err(Error::NoCommands(task.label.clone()).into());
                }
                if self.dry_run {
                    self.ui.notice("Dry run: skipping interactive task.");
                } else {
                    eprintln!("Executing: {} (interactive)", self.invocation);
                    if !self.launcher.run_interactive(&self.invocation, lines)? {
                        return Err(Error::ProgramFailed(task.label.clone()).into());
                    }
                }
            }
            None => {}
        }

        if let Some(script) = &task.script {
            self.run_script(script)?;
        }
        Ok(())
    }

    fn run_file(
        &mut self,
        task: &TaskRunner,
        command_file: &Path,
        out_file: Option<&Path>,
    ) -> Result<()> {
        let stdin = self.fs.open_file(command_file)?;
        let stdout = out_file.map(|path| self.fs.create_file(path)).transpose()?;

        match out_file {
            Some(out) => eprintln!(
                "Executing: {} < {} > {}",
                self.invocation,
                file_name(command_file),
                file_name(out)
            ),
            None => eprintln!("Executing: {} < {}", self.invocation, file_name(command_file)),
        }

        let result = self.launcher.run_file(&self.invocation, stdin, stdout);
        self.clean_up(command_file);
        if !result? {
            return Err(Error::ProgramFailed(task.label.clone()).into());
        }
        Ok(())
    }

    fn run_script(&mut self, script: &ShellScript) -> Result<()> {
        if self.dry_run {
            self.ui.notice("Dry run: would execute the following commands:");
            for cmd in &script.commands {
                eprintln!("  {cmd}");
            }
            return Ok(());
        }

        self.fs
            .write_file(&script.path, &script.text)
            .context("while writing command script")?;
        eprintln!("Running script: {}", file_name(&script.path));

        let result = self.launcher.run_script(&script.path, self.fs.work_dir());
        self.clean_up(&script.path);
        if !result? {
            return Err(Error::ScriptFailed(file_name(&script.path).into_owned()).into());
        }
        Ok(())
    }

    /// Remove a generated file after its run; failing to do so doesn't fail the task.
    fn clean_up(&self, path: &Path) {
        if let Err(e) = self.fs.delete_file(path) {
            log::warn!("could not remove {}: {e:#}", file_name(path));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs::File;
    use std::io::Read;
    use std::path::PathBuf;
    use tempfile::tempdir;
    use workflow::Strategy;

    /// Records every launch instead of starting processes.
    #[derive(Default)]
    struct RecordingLauncher {
        calls: Vec<String>,
        fail_program: bool,
        /// removed before returning, so cleanup has nothing to delete.
        remove_file: Option<PathBuf>,
    }

    impl Launcher for RecordingLauncher {
        fn run_file(
            &mut self,
            _: &Invocation,
            mut stdin: File,
            stdout: Option<File>,
        ) -> Result<bool> {
            let mut text = String::new();
            stdin.read_to_string(&mut text)?;
            self.calls.push(format!("file:{}:{}", text.trim_end(), stdout.is_some()));
            if let Some(path) = &self.remove_file {
                std::fs::remove_file(path)?;
            }
            Ok(!self.fail_program)
        }

        fn run_interactive(&mut self, _: &Invocation, lines: &[String]) -> Result<bool> {
            self.calls.push(format!("interactive:{}", lines.join(",")));
            Ok(!self.fail_program)
        }

        fn run_script(&mut self, script: &Path, _: &Path) -> Result<bool> {
            assert!(script.exists());
            self.calls.push("script".to_owned());
            Ok(true)
        }
    }

    fn runner(
        dir: &Path,
        launcher: RecordingLauncher,
        dry_run: bool,
    ) -> WorkflowRunner<RecordingLauncher> {
        let invocation = Invocation {
            exec: PathBuf::from("Multiwfn"),
            wfn: "water.fchk".to_owned(),
            cores: None,
            work_dir: dir.to_path_buf(),
        };
        WorkflowRunner::new(launcher, invocation, Fs::new(dir), Ui::new(false), dry_run)
    }

    fn file_task(dir: &Path, commands: Vec<String>) -> TaskRunner {
        TaskRunner {
            label: "sp".to_owned(),
            strategy: Strategy::File,
            program: Some(ProgramInput::File {
                command_file: dir.join("sp_water.txt"),
                text: "compute water\nq\n".to_owned(),
                out_file: Some(dir.join("sp_water.out")),
            }),
            script: (!commands.is_empty()).then(|| ShellScript {
                path: dir.join("sp_commands.sh"),
                text: format!("#!/bin/bash\n{}\n", commands.join("\n")),
                commands,
            }),
        }
    }

    fn wait_task() -> TaskRunner {
        TaskRunner {
            label: "plot".to_owned(),
            strategy: Strategy::Interactive,
            program: Some(ProgramInput::Interactive {
                lines: vec!["0".to_owned(), String::new()],
            }),
            script: None,
        }
    }

    #[test]
    fn test_dry_run_with_wait_launches_nothing() -> Result<()> {
        let dir = tempdir()?;
        let mut runner = runner(dir.path(), RecordingLauncher::default(), true);
        runner.run(&[wait_task(), file_task(dir.path(), vec!["echo hi".to_owned()])])?;

        assert!(runner.launcher().calls.is_empty());
        // dry run keeps the command file, but never writes the script:
        let command_file = dir.path().join("sp_water.txt");
        assert_eq!("compute water\nq\n", std::fs::read_to_string(command_file)?);
        assert!(!dir.path().join("sp_commands.sh").exists());
        Ok(())
    }

    #[test]
    fn test_run_in_order_and_clean_up() -> Result<()> {
        let dir = tempdir()?;
        let mut runner = runner(dir.path(), RecordingLauncher::default(), false);
        runner.run(&[file_task(dir.path(), vec!["echo hi".to_owned()]), wait_task()])?;

        assert_eq!(
            vec!["file:compute water\nq:true", "script", "interactive:0,"],
            runner.launcher().calls
        );
        assert!(!dir.path().join("sp_water.txt").exists());
        assert!(!dir.path().join("sp_commands.sh").exists());
        assert!(dir.path().join("sp_water.out").exists());
        Ok(())
    }

    #[test]
    fn test_failure_skips_follow_up_and_continues() -> Result<()> {
        let dir = tempdir()?;
        let launcher = RecordingLauncher {
            fail_program: true,
            ..Default::default()
        };
        let mut runner = runner(dir.path(), launcher, false);
        let err = runner
            .run(&[file_task(dir.path(), vec!["echo hi".to_owned()]), wait_task()])
            .unwrap_err();

        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::TasksFailed(2))));
        assert_eq!(
            vec!["file:compute water\nq:true", "interactive:0,"],
            runner.launcher().calls
        );
        Ok(())
    }

    #[test]
    fn test_empty_command_text_fails() -> Result<()> {
        let dir = tempdir()?;
        let mut task = file_task(dir.path(), Vec::new());
        if let Some(ProgramInput::File { text, .. }) = &mut task.program {
            text.clear();
        }
        let mut runner = runner(dir.path(), RecordingLauncher::default(), false);
        assert!(runner.run(&[task]).is_err());
        assert!(runner.launcher().calls.is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_interactive_input_fails() -> Result<()> {
        let dir = tempdir()?;
        let mut task = wait_task();
        task.program = Some(ProgramInput::Interactive { lines: Vec::new() });
        let mut runner = runner(dir.path(), RecordingLauncher::default(), false);

        let err = runner.run_task(&task).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NoCommands(_))));
        assert!(runner.launcher().calls.is_empty());
        Ok(())
    }

    #[test]
    fn test_cleanup_failure_keeps_program_failure() -> Result<()> {
        let dir = tempdir()?;
        let task = file_task(dir.path(), Vec::new());
        let launcher = RecordingLauncher {
            fail_program: true,
            remove_file: Some(dir.path().join("sp_water.txt")),
            ..Default::default()
        };
        let mut runner = runner(dir.path(), launcher, false);

        let err = runner.run_task(&task).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::ProgramFailed(_))));
        Ok(())
    }

    #[test]
    fn test_cleanup_failure_does_not_fail_task() -> Result<()> {
        let dir = tempdir()?;
        let task = file_task(dir.path(), Vec::new());
        let launcher = RecordingLauncher {
            remove_file: Some(dir.path().join("sp_water.txt")),
            ..Default::default()
        };
        let mut runner = runner(dir.path(), launcher, false);
        runner.run_task(&task)?;
        assert_eq!(1, runner.launcher().calls.len());
        Ok(())
    }
}
