use syntax::ast::Task;

/// How a task is handed to the external program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Bare command block, run as a shell script.
    Shell,
    /// Lines are typed into the program's stdin, then the console is handed over.
    Interactive,
    /// Lines are written to a command file that becomes the program's stdin.
    File,
}

impl Strategy {
    pub fn for_task(task: &Task) -> Self {
        if task.is_bare() {
            Self::Shell
        } else if task.wait {
            Self::Interactive
        } else {
            Self::File
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Shell => "shell",
            Self::Interactive => "interactive",
            Self::File => "file",
        };
        f.write_str(name)
    }
}

/// `<module>_<wfn_base>`, plus `_<n>` for the n-th repeat of the module.
pub fn file_stem(task: &Task, wfn_base: &str) -> String {
    with_index(format!("{}_{}", task.module, wfn_base), task.block_index)
}

/// `<module>_commands` or `commands` for a bare block, plus `_<n>` for repeats.
pub fn script_stem(task: &Task) -> String {
    let stem = if task.is_bare() {
        String::from("commands")
    } else {
        format!("{}_commands", task.module)
    };
    with_index(stem, task.block_index)
}

fn with_index(mut stem: String, index: usize) -> String {
    if index > 0 {
        stem.push('_');
        stem.push_str(&index.to_string());
    }
    stem
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_for_task() {
        let mut task = Task::new("sp".to_owned(), 0);
        assert_eq!(Strategy::File, Strategy::for_task(&task));

        task.wait = true;
        assert_eq!(Strategy::Interactive, Strategy::for_task(&task));

        let mut bare = Task::new(String::new(), 0);
        bare.wait = true;
        bare.commands.push("ls".to_owned());
        assert_eq!(Strategy::Shell, Strategy::for_task(&bare));
    }

    #[test]
    fn test_stems() {
        let first = Task::new("cube".to_owned(), 0);
        let second = Task::new("cube".to_owned(), 2);
        assert_eq!("cube_water", file_stem(&first, "water"));
        assert_eq!("cube_water_2", file_stem(&second, "water"));
        assert_eq!("cube_commands", script_stem(&first));
        assert_eq!("cube_commands_2", script_stem(&second));

        let bare = Task::new(String::new(), 1);
        assert_eq!("commands_1", script_stem(&bare));
    }
}
