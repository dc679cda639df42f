use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use syntax::{ParseOptions, Script};
use workflow::{ConfigStore, GlobalConfig};

use crate::exec::{Invocation, SystemLauncher, WorkflowRunner};
use crate::fs::Fs;
use crate::prep::{prepare_tasks, ModuleChecker};
use crate::settings::Settings;
use crate::ui::Ui;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No modules or command blocks found in input file")]
    NoTasks,
    #[error("No wavefunction file specified")]
    NoWavefunction,
}

/// This struct actually runs the command-line app.
pub struct App {
    /// Interpreted command line settings
    settings: Settings,
    /// Filesystem interface
    fs: Fs,
    /// User interface
    ui: Ui,
}

impl App {
    /// Create a new `App`.
    pub fn new(settings: Settings) -> Self {
        let fs = Fs::new(&settings.work_dir);
        let ui = Ui::new(settings.verbose > 0);
        Self { settings, fs, ui }
    }

    /// Run the app: read config and script, then prepare and run every task.
    pub fn run(mut self) -> Result<()> {
        self.fs.ensure_work_dir_exists(self.settings.verbose > 0)?;

        let mut strbuf = String::with_capacity(0); // will be resized later.
        let config = self.load_config(&mut strbuf)?;

        let input = match &self.settings.input {
            Some(input) => input.clone(),
            None => PathBuf::from(self.ui.prompt_path("input file")?),
        };
        let mut script = self.parse_script(&input, &mut strbuf)?;

        let wfn = self.wavefunction(&script)?;
        let wfn_base = util::base_name(&wfn).to_owned();
        let cores = pick_cores(self.settings.cores, script.directives.cores, config.default_cores);
        log::info!("wavefunction {wfn} (base name '{wfn_base}'), cores {cores:?}");

        workflow::resolve_script(&mut script, &wfn_base, &self.fs);
        if script.tasks.is_empty() {
            return Err(Error::NoTasks.into());
        }

        let mut store = ConfigStore::new(config);
        self.ui.verbose_progress("Loading module configs");
        let modules = ModuleChecker::check_all(&script.tasks, &mut store)
            .context("while loading module configs")?;
        self.ui.done();
        eprintln!("\nRequired modules: {}", modules.join(" "));

        if self.settings.dry_run {
            eprintln!("\n{}", "** DRY-RUN MODE: Only generating command files **".magenta());
        }
        if self.settings.screen {
            eprintln!("\n{}", "** SCREEN MODE: Output to screen instead of files **".magenta());
        }

        let tasks = prepare_tasks(
            &script.tasks,
            &store,
            &self.fs,
            &wfn_base,
            self.settings.screen,
        );

        let invocation = Invocation {
            exec: store.config().exec_path.clone(),
            wfn: program_path(&wfn),
            cores,
            work_dir: self.fs.work_dir().to_path_buf(),
        };
        let mut runner = WorkflowRunner::new(
            SystemLauncher::default(),
            invocation,
            self.fs,
            self.ui,
            self.settings.dry_run,
        );
        runner.run(&tasks).context("while running workflow")?;

        Ok(())
    }

    fn load_config(&self, strbuf: &mut String) -> Result<GlobalConfig> {
        let path = &self.settings.config;
        self.ui.verbose_progress_debug("Reading config file", path);
        self.fs
            .read_to_buf(path, strbuf)
            .with_context(|| format!("while reading config file {:?}", path))?;
        let config = GlobalConfig::parse(strbuf)
            .with_context(|| format!("while parsing config file {:?}", path))?;
        self.ui.done();
        Ok(config)
    }

    fn parse_script(&mut self, input: &Path, strbuf: &mut String) -> Result<Script> {
        self.ui.verbose_progress_debug("Reading input file", input);
        self.fs
            .read_to_buf(input, strbuf)
            .with_context(|| format!("while reading input file {:?}", input))?;
        self.ui.done();

        self.ui.verbose_progress("Parsing input file");
        self.ui.start_timer();
        let options = ParseOptions {
            headers: self.settings.headers,
        };
        let script = syntax::parse_script(strbuf, &options);
        self.ui.done();
        self.ui.print_elapsed("Parsing input file");

        if !script.warnings.is_empty() {
            eprintln!(
                "{} {} line(s) in {:?} were ignored",
                "Warning:".yellow(),
                script.warnings.len(),
                input
            );
        }
        self.ui.verbose_msg(&format!(
            "Found {} task(s) and {} custom variable(s).",
            script.tasks.len(),
            script.directives.vars.len()
        ));
        Ok(script)
    }

    /// Command line first, then the script's `wfn=`, then ask.
    fn wavefunction(&self, script: &Script) -> Result<String> {
        if let Some(wfn) = &self.settings.wfn {
            self.ui.verbose_msg(&format!("Using wavefunction file from command line: {wfn}"));
            return Ok(wfn.clone());
        }
        if let Some(wfn) = &script.directives.wfn {
            eprintln!("Using wavefunction file from input: {wfn}");
            return Ok(wfn.clone());
        }
        self.ui
            .prompt_path("wavefunction file (.fchk/.wfn or other supported file)")
            .context(Error::NoWavefunction)
    }
}

/// Command line, then the script's `core=`, then the config file.
/// A zero at any level falls through to the next.
fn pick_cores(cli: Option<u32>, script: Option<u32>, config: Option<u32>) -> Option<u32> {
    let positive = |n: &u32| *n > 0;
    cli.filter(positive)
        .or(script.filter(positive))
        .or(config.filter(positive))
}

/// The program runs in the working dir, so a wavefunction file that exists
/// relative to the current dir is passed as an absolute path.
fn program_path(wfn: &str) -> String {
    let path = Path::new(wfn);
    if path.is_relative() && path.exists() {
        if let Ok(abs) = std::path::absolute(path) {
            return abs.to_string_lossy().into_owned();
        }
    }
    wfn.to_owned()
}
