use std::path::PathBuf;

use syntax::ast::Task;
use workflow::{file_stem, script_stem, ConfigStore, Strategy};

use crate::fs::Fs;

use super::TaskScriptBuilder;

/// What gets handed to the program for a module task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramInput {
    /// Command file that becomes the program's stdin.
    File {
        command_file: PathBuf,
        text: String,
        /// Where stdout goes; `None` in screen mode.
        out_file: Option<PathBuf>,
    },
    /// Lines typed into stdin before the console is handed over.
    Interactive { lines: Vec<String> },
}

/// A `%command` block written out as a script file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellScript {
    pub path: PathBuf,
    pub text: String,
    /// The original lines, for dry-run listings.
    pub commands: Vec<String>,
}

/// Contains all information required to run a single task.
#[derive(Debug)]
pub struct TaskRunner {
    /// String that identifies this task (used for logging):
    pub label: String,
    pub strategy: Strategy,
    /// `None` for a bare command block.
    pub program: Option<ProgramInput>,
    /// Commands run after the program step (or alone, for a bare block).
    pub script: Option<ShellScript>,
}

/// Turns parsed tasks into `TaskRunner`s.
pub struct TaskRunnerBuilder<'a> {
    store: &'a ConfigStore,
    fs: &'a Fs,
    /// wavefunction file name without dir or extension
    wfn_base: &'a str,
    /// send program output to the terminal
    screen: bool,
    strbuf: String,
}

impl<'a> TaskRunnerBuilder<'a> {
    pub fn new(store: &'a ConfigStore, fs: &'a Fs, wfn_base: &'a str, screen: bool) -> Self {
        Self {
            store,
            fs,
            wfn_base,
            screen,
            strbuf: String::with_capacity(256),
        }
    }

    pub fn build(&mut self, task: &Task) -> TaskRunner {
        let strategy = Strategy::for_task(task);
        let program = match strategy {
            Strategy::Shell => None,
            Strategy::Interactive => Some(ProgramInput::Interactive {
                lines: self
                    .store
                    .module_script(task, false)
                    .lines()
                    .map(str::to_owned)
                    .collect(),
            }),
            Strategy::File => {
                let stem = file_stem(task, self.wfn_base);
                Some(ProgramInput::File {
                    command_file: self.fs.command_file(&stem),
                    text: self.store.module_script(task, true),
                    out_file: (!self.screen).then(|| self.fs.out_file(&stem)),
                })
            }
        };

        TaskRunner {
            label: label(task),
            strategy,
            program,
            script: self.build_script(task),
        }
    }

    fn build_script(&mut self, task: &Task) -> Option<ShellScript> {
        if task.commands.is_empty() {
            return None;
        }
        let mut builder = TaskScriptBuilder::new(&mut self.strbuf);
        builder.write_prefix();
        builder.write_commands(&task.commands);
        Some(ShellScript {
            path: self.fs.script_file(&script_stem(task)),
            text: self.strbuf.clone(),
            commands: task.commands.clone(),
        })
    }
}

fn label(task: &Task) -> String {
    let name: &str = if task.is_bare() {
        "%command block"
    } else {
        &task.module
    };
    if task.block_index > 0 {
        format!("{name} #{}", task.block_index + 1)
    } else {
        name.to_owned()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::Path;
    use syntax::{parse_script, parse_template, ParseOptions};
    use workflow::GlobalConfig;

    fn store() -> ConfigStore {
        let mut store = ConfigStore::new(GlobalConfig {
            exec_path: PathBuf::from("mwfn"),
            template_dir: PathBuf::from("."),
            default_cores: None,
        });
        store.insert_template("sp", parse_template("[main]\n1\n\n2\n[quit]\nq\n"));
        store
    }

    #[test]
    fn test_build() {
        let store = store();
        let fs = Fs::new(Path::new("/work"));
        let script = parse_script(
            "[sp]\nend\n[sp]\n%command\necho done\nwait\n%command\nls\nend\n",
            &ParseOptions::default(),
        );
        let mut builder = TaskRunnerBuilder::new(&store, &fs, "water", false);
        let runners: Vec<_> = script.tasks.iter().map(|t| builder.build(t)).collect();
        assert_eq!(3, runners.len());

        assert_eq!("sp", runners[0].label);
        assert_eq!(
            Some(ProgramInput::File {
                command_file: PathBuf::from("/work/sp_water.txt"),
                text: "1\n2\nq\n".to_owned(),
                out_file: Some(PathBuf::from("/work/sp_water.out")),
            }),
            runners[0].program
        );
        assert!(runners[0].script.is_none());

        assert_eq!("sp #2", runners[1].label);
        assert_eq!(Strategy::Interactive, runners[1].strategy);
        assert_eq!(
            Some(ProgramInput::Interactive {
                lines: vec!["1".to_owned(), "2".to_owned()],
            }),
            runners[1].program
        );
        let follow_up = runners[1].script.as_ref().unwrap();
        assert!(follow_up.path.starts_with("/work"));
        assert!(follow_up.text.ends_with("echo done\n"));

        assert_eq!(Strategy::Shell, runners[2].strategy);
        assert!(runners[2].program.is_none());
        assert_eq!(vec!["ls"], runners[2].script.as_ref().unwrap().commands);
    }

    #[test]
    fn test_screen_mode_has_no_out_file() {
        let store = store();
        let fs = Fs::new(Path::new("/work"));
        let task = Task::new("sp".to_owned(), 0);
        let runner = TaskRunnerBuilder::new(&store, &fs, "water", true).build(&task);
        assert!(matches!(
            runner.program,
            Some(ProgramInput::File { out_file: None, .. })
        ));
    }
}
