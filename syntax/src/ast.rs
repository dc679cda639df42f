use util::HashMap;

/// Parameter names mapped to values, as written in a template or a script.
pub type Params = HashMap<String, String>;

/// One named section of a module template.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Section {
    /// Lines to send to the program, in order, before placeholder expansion.
    pub commands: Vec<String>,
    /// Values used for `$name` references the task doesn't override.
    pub defaults: Params,
}

/// Everything defined in one `<module>.conf` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleTemplate {
    pub sections: HashMap<String, Section>,
    /// Lines that make the program exit; sent last in file mode.
    pub quit: Vec<String>,
}

impl ModuleTemplate {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }
}

/// A `%process` line: section name plus its `key value` pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PostProcessStep {
    pub section: String,
    pub params: Params,
}

/// One `[module]` block (or bare `%command` block) from a workflow script.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Task {
    /// Empty for a bare command block.
    pub module: String,
    /// Overrides for the `main` section.
    pub params: Params,
    pub post_process: Vec<PostProcessStep>,
    /// Raw shell lines from a `%command` block.
    pub commands: Vec<String>,
    /// Block was closed with `wait` (interactive mode).
    pub wait: bool,
    /// How many blocks with the same module name came before this one.
    pub block_index: usize,
}

impl Task {
    pub fn new(module: String, block_index: usize) -> Self {
        Self {
            module,
            block_index,
            ..Default::default()
        }
    }

    /// True for a `%command` block with no module header.
    pub fn is_bare(&self) -> bool {
        self.module.is_empty()
    }

    /// Only tasks with a module or some commands end up in the task list.
    pub fn is_persistable(&self) -> bool {
        !self.module.is_empty() || !self.commands.is_empty()
    }
}

/// A single `key=value` line from the top of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `wfn=<file>`
    Wfn(String),
    /// `core=<n>`
    Cores(u32),
    /// any other `key=value`
    Var(String, String),
}

/// Settings declared at the top of a script, before the first block.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Directives {
    pub wfn: Option<String>,
    pub cores: Option<u32>,
    pub vars: Params,
}

impl Directives {
    pub fn apply(&mut self, directive: Directive) {
        match directive {
            Directive::Wfn(file) => self.wfn = Some(file),
            Directive::Cores(n) => self.cores = Some(n),
            Directive::Var(k, v) => {
                self.vars.insert(k, v);
            }
        }
    }
}
