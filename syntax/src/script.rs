use util::HashMap;

use crate::ast::{Directive, Directives, Params, PostProcessStep, Task};
use crate::line::{section_name, split_directive, strip_comment};

pub const PROCESS_KEYWORD: &str = "%process";
pub const COMMAND_KEYWORD: &str = "%command";
pub const END_KEYWORD: &str = "end";
pub const WAIT_KEYWORD: &str = "wait";

const WFN_KEY: &str = "wfn";
const CORES_KEY: &str = "core";
/// Keys that can never be directives.
const RESERVED_KEYS: [&str; 2] = [END_KEYWORD, WAIT_KEYWORD];

/// Recoverable problems found while parsing a workflow script.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    #[error("line {line}: %process without module definition; ignoring")]
    ProcessOutsideModule { line: usize },
    #[error("line {line}: '{key}=' must come before the first module block; ignoring")]
    DirectiveAfterBlock { line: usize, key: String },
    #[error("line {line}: core count '{value}' is not a number; ignoring")]
    InvalidCores { line: usize, value: String },
    #[error("line {line}: '{text}' is outside of any module block; ignoring")]
    OutsideBlock { line: usize, text: String },
}

/// Where a `[module]` header may appear on its line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPlacement {
    /// Leading whitespace before `[` is allowed.
    #[default]
    Anywhere,
    /// `[` must be the first character of the line.
    ColumnZero,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ParseOptions {
    pub headers: HeaderPlacement,
}

/// What the lines inside an open block mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `name value` overrides for the `main` section.
    Params,
    /// `section key value key value ...` post-processing steps.
    PostProcess,
    /// raw shell lines.
    Command,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Block {
    /// No task open.
    #[default]
    Neutral,
    Open { task: Task, mode: Mode },
}

/// What a single line produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emit {
    Nothing,
    /// A block was closed and its task should be kept.
    Task(Task),
    Directive(Directive),
    Warning(Warning),
}

/// One non-empty line of a script, before and after comment stripping.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    /// 1-based line number.
    pub number: usize,
    pub raw: &'a str,
    /// Comment-stripped and trimmed text.
    pub text: &'a str,
}

/// Parser state carried from one line to the next.
#[derive(Debug, Default, Clone)]
pub struct ParserState {
    pub block: Block,
    /// Number of blocks seen so far for each module name.
    counters: HashMap<String, usize>,
    /// Once any block is opened, directives are no longer accepted.
    seen_block: bool,
}

/// Advance the parser by one line.
pub fn transition(
    mut state: ParserState,
    line: &Line,
    options: &ParseOptions,
) -> (ParserState, Emit) {
    let emit = state.apply(line, options);
    (state, emit)
}

/// Result of parsing a whole workflow script.
#[derive(Debug, Default, Clone)]
pub struct Script {
    pub tasks: Vec<Task>,
    pub directives: Directives,
    pub warnings: Vec<Warning>,
}

impl Script {
    fn record(&mut self, emit: Emit) {
        match emit {
            Emit::Nothing => {}
            Emit::Task(task) => self.tasks.push(task),
            Emit::Directive(directive) => self.directives.apply(directive),
            Emit::Warning(warning) => {
                log::warn!("{warning}");
                self.warnings.push(warning);
            }
        }
    }
}

/// Parse the contents of a `.inp` workflow script.
pub fn parse_script(text: &str, options: &ParseOptions) -> Script {
    let mut script = Script::default();
    let mut state = ParserState::default();

    for (idx, raw) in text.lines().enumerate() {
        let stripped = strip_comment(raw);
        if stripped.is_empty() {
            continue;
        }
        let line = Line {
            number: idx + 1,
            raw,
            text: &stripped,
        };
        let (next, emit) = transition(state, &line, options);
        state = next;
        script.record(emit);
    }

    // a block left open at end of file still counts:
    script.record(state.flush());
    script
}

impl ParserState {
    fn apply(&mut self, line: &Line, options: &ParseOptions) -> Emit {
        if matches!(self.block, Block::Neutral) {
            if let Some((key, value)) = split_directive(line.text) {
                if !RESERVED_KEYS.contains(&key) {
                    return self.directive(key, value, line.number);
                }
            }
        }

        if let Some(name) = header_name(line, options.headers) {
            let emit = self.flush();
            self.open(name, Mode::Params);
            return emit;
        }

        match line.text {
            PROCESS_KEYWORD => {
                if let Block::Open { mode, .. } = &mut self.block {
                    *mode = Mode::PostProcess;
                    Emit::Nothing
                } else {
                    Emit::Warning(Warning::ProcessOutsideModule { line: line.number })
                }
            }
            COMMAND_KEYWORD => {
                if let Block::Open { mode, .. } = &mut self.block {
                    *mode = Mode::Command;
                } else {
                    self.open("", Mode::Command);
                }
                Emit::Nothing
            }
            END_KEYWORD => self.flush(),
            WAIT_KEYWORD => {
                if let Block::Open { task, .. } = &mut self.block {
                    task.wait = true;
                }
                self.flush()
            }
            _ => self.dispatch(line),
        }
    }

    fn directive(&self, key: &str, value: &str, line: usize) -> Emit {
        if self.seen_block {
            return Emit::Warning(Warning::DirectiveAfterBlock {
                line,
                key: key.to_owned(),
            });
        }
        match key {
            WFN_KEY => Emit::Directive(Directive::Wfn(value.to_owned())),
            CORES_KEY => match value.parse() {
                Ok(n) => Emit::Directive(Directive::Cores(n)),
                Err(_) => Emit::Warning(Warning::InvalidCores {
                    line,
                    value: value.to_owned(),
                }),
            },
            _ => Emit::Directive(Directive::Var(key.to_owned(), value.to_owned())),
        }
    }

    fn open(&mut self, name: &str, mode: Mode) {
        let count = self.counters.entry(name.to_owned()).or_insert(0);
        let task = Task::new(name.to_owned(), *count);
        *count += 1;
        self.seen_block = true;
        self.block = Block::Open { task, mode };
    }

    /// Close the open block, if any, and hand back its task if it's worth keeping.
    fn flush(&mut self) -> Emit {
        match std::mem::take(&mut self.block) {
            Block::Open { task, .. } if task.is_persistable() => Emit::Task(task),
            _ => Emit::Nothing,
        }
    }

    fn dispatch(&mut self, line: &Line) -> Emit {
        let (task, mode) = match &mut self.block {
            Block::Open { task, mode } => (task, *mode),
            Block::Neutral => {
                return Emit::Warning(Warning::OutsideBlock {
                    line: line.number,
                    text: line.text.to_owned(),
                })
            }
        };

        let mut tokens = line.text.split_whitespace();
        match mode {
            Mode::Params => {
                // only the first two tokens count; anything after the value is dropped.
                if let (Some(key), Some(value)) = (tokens.next(), tokens.next()) {
                    task.params.insert(key.to_owned(), value.to_owned());
                }
            }
            Mode::PostProcess => {
                if let Some(section) = tokens.next() {
                    let mut params = Params::default();
                    while let (Some(key), Some(value)) = (tokens.next(), tokens.next()) {
                        params.insert(key.to_owned(), value.to_owned());
                    }
                    task.post_process.push(PostProcessStep {
                        section: section.to_owned(),
                        params,
                    });
                }
            }
            Mode::Command => task.commands.push(line.text.to_owned()),
        }
        Emit::Nothing
    }
}

fn header_name<'a>(line: &Line<'a>, placement: HeaderPlacement) -> Option<&'a str> {
    if placement == HeaderPlacement::ColumnZero && !line.raw.starts_with('[') {
        return None;
    }
    section_name(line.text)
}
