use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use util::Timer;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No more console input while waiting for {0}")]
    EndOfInput(String),
}

/// All interactions with the text UI should go through this struct.
pub struct Ui {
    /// -v setting, displays extra text info to user
    pub verbose: bool,
    /// keeps track of time for each phase
    timer: Timer,
    /// buffer to hold strings internally when getting input
    strbuf: RefCell<String>,
}

impl Ui {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            timer: Timer::now(),
            strbuf: RefCell::new(String::with_capacity(64)),
        }
    }

    /// Ask for a file path until the user enters one that exists.
    pub fn prompt_path(&self, what: &str) -> Result<String> {
        let stdin = io::stdin();
        let mut strbuf = self.strbuf.borrow_mut();
        loop {
            eprint!("Please enter {what} path: ");
            io::stderr().flush()?;

            strbuf.clear();
            if stdin.lock().read_line(&mut strbuf)? == 0 {
                return Err(Error::EndOfInput(what.to_owned()).into());
            }

            let path = trim_quotes(&strbuf);
            if !path.is_empty() && Path::new(path).is_file() {
                return Ok(path.to_owned());
            }
            eprintln!("{}: Cannot access file '{path}'", "Error".red());
            eprintln!("Please re-enter a valid file path.");
        }
    }

    /// Announce the start of a task.
    pub fn task_header(&self, label: &str, detail: &str) {
        eprintln!("\n{} {label} {}", ">>>".green(), detail.dimmed());
    }

    pub fn task_done(&self, label: &str) {
        eprintln!("{} {label}.", "Completed".green());
    }

    pub fn notice(&self, msg: &str) {
        eprintln!("{}", msg.magenta());
    }

    pub fn start_timer(&mut self) {
        if self.verbose {
            self.timer.reset();
        }
    }

    pub fn print_elapsed(&self, phase: &str) {
        if self.verbose {
            self.timer.print_elapsed(phase);
        }
    }

    pub fn verbose_msg(&self, msg: &str) {
        if self.verbose {
            eprintln!("{}", msg);
        }
    }

    pub fn verbose_progress(&self, msg: &str) {
        if self.verbose {
            eprint!("{}... ", msg.magenta());
        }
    }

    pub fn verbose_progress_debug<T: std::fmt::Debug>(&self, msg: &str, arg: T) {
        if self.verbose {
            eprint!("{} {:?}... ", msg.magenta(), arg);
        }
    }

    pub fn done(&self) {
        if self.verbose {
            eprintln!("{}.", "done".green());
        }
    }
}

/// Trim whitespace and one pair of matching surrounding quotes, as left by
/// dragging a file into a terminal.
fn trim_quotes(s: &str) -> &str {
    let s = s.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
            return inner.trim();
        }
    }
    s
}
