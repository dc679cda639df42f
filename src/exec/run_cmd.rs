use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use super::Error;

/// How to start the external program for one run.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub exec: PathBuf,
    pub wfn: String,
    /// `-np` is only passed when set.
    pub cores: Option<u32>,
    pub work_dir: PathBuf,
}

impl Invocation {
    /// `<exec> <wfn> [-np <cores>]`, run in the working dir.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.exec);
        cmd.arg(&self.wfn).current_dir(&self.work_dir);
        if let Some(cores) = self.cores {
            cmd.arg("-np").arg(cores.to_string());
        }
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.exec.display(), self.wfn)?;
        if let Some(cores) = self.cores {
            write!(f, " -np {cores}")?;
        }
        Ok(())
    }
}

/// Starts processes and waits for them; each method returns whether the process succeeded.
pub trait Launcher {
    /// Run the program with `stdin` as input; output goes to `stdout`, or the terminal if `None`.
    fn run_file(&mut self, inv: &Invocation, stdin: File, stdout: Option<File>) -> Result<bool>;

    /// Type `lines` into the program's stdin, then forward the console to it.
    fn run_interactive(&mut self, inv: &Invocation, lines: &[String]) -> Result<bool>;

    /// Run a shell (or batch) script.
    fn run_script(&mut self, script: &Path, work_dir: &Path) -> Result<bool>;
}

/// How often a running interactive session checks whether the program has exited.
const CONSOLE_POLL: Duration = Duration::from_millis(50);

/// Read lines from `reader` on a background thread.
/// The channel disconnects at end of input.
pub fn console_lines<R: BufRead + Send + 'static>(reader: R) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    log::debug!("stopped reading console input: {e}");
                    return;
                }
            }
        }
    });
    rx
}

/// Launches real subprocesses with `std::process::Command`.
///
/// Console input for interactive sessions comes from one reader shared by
/// every session, and is only handed to a program while it's running.
#[derive(Debug, Default)]
pub struct SystemLauncher {
    console: Option<Receiver<String>>,
}

impl SystemLauncher {
    /// Use `console` instead of the terminal for interactive input.
    pub fn with_console(console: Receiver<String>) -> Self {
        Self {
            console: Some(console),
        }
    }

    fn console(&mut self) -> &Receiver<String> {
        self.console
            .get_or_insert_with(|| console_lines(BufReader::new(io::stdin())))
    }
}

impl Launcher for SystemLauncher {
    fn run_file(&mut self, inv: &Invocation, stdin: File, stdout: Option<File>) -> Result<bool> {
        let mut cmd = inv.command();
        cmd.stdin(stdin);
        if let Some(stdout) = stdout {
            cmd.stdout(stdout);
        }
        wait(&mut cmd)
    }

    fn run_interactive(&mut self, inv: &Invocation, lines: &[String]) -> Result<bool> {
        let mut cmd = inv.command();
        let mut child = cmd
            .stdin(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to execute {inv}"))?;
        let mut child_in = child.stdin.take();
        let Some(pipe) = child_in.as_mut() else {
            return Err(Error::NoChildStdin(inv.to_string()).into());
        };
        if let Err(e) = write_lines(lines, pipe) {
            log::debug!("program stopped reading input: {e}");
            child_in = None;
        }

        let console = self.console();
        let status = loop {
            if let Some(status) = child.try_wait().context("failed to wait on child process")? {
                break status;
            }
            match console.recv_timeout(CONSOLE_POLL) {
                Ok(line) => {
                    if let Some(pipe) = child_in.as_mut() {
                        if let Err(e) = write_lines(&[line], pipe) {
                            log::debug!("program stopped reading input: {e}");
                            child_in = None;
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    // no more console input; the program sees end of file.
                    drop(child_in.take());
                    break child.wait().context("failed to wait on child process")?;
                }
            }
        };
        log::debug!("{inv} finished with {status}");
        Ok(status.success())
    }

    fn run_script(&mut self, script: &Path, work_dir: &Path) -> Result<bool> {
        let mut cmd = script_command(script);
        cmd.current_dir(work_dir);
        wait(&mut cmd)
    }
}

#[cfg(not(windows))]
fn script_command(script: &Path) -> Command {
    let mut cmd = Command::new("bash");
    cmd.arg(script);
    cmd
}

#[cfg(windows)]
fn script_command(script: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(script);
    cmd
}

fn wait(cmd: &mut Command) -> Result<bool> {
    let status = cmd.status().with_context(|| {
        format!(
            "failed to execute child process {:?} {:?}",
            cmd.get_program(),
            cmd.get_args().collect::<Vec<_>>(),
        )
    })?;
    log::debug!("{:?} finished with {status}", cmd.get_program());
    Ok(status.success())
}

/// Each line followed by a newline; empty lines are sent as bare newlines.
fn write_lines<W: Write>(lines: &[String], input: &mut W) -> io::Result<()> {
    for line in lines {
        input.write_all(line.as_bytes())?;
        input.write_all(b"\n")?;
    }
    input.flush()
}
