use std::path::{Path, PathBuf};

use anyhow::Result;
use syntax::HeaderPlacement;

use crate::args::Args;

/// Name of the global config file.
pub const CONFIG_FILE: &str = "banewfn.rc";
/// Last place we look for the config file, relative to the home dir.
const HOME_CONFIG_DIR: &str = ".bane/multiwfn";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Config file \"{0}\" does not exist")]
    ConfigNotFound(String),
    #[error(
        "Could not find banewfn.rc in any of the search locations:\n  {}",
        .0.join("\n  ")
    )]
    NoConfigFound(Vec<String>),
}

/// Settings are like Args, except all the logic has
/// been applied so e.g. defaults are added in.
#[derive(Debug)]
pub struct Settings {
    /// Workflow script; `None` means ask the user.
    pub input: Option<PathBuf>,
    /// Wavefunction file from the command line.
    pub wfn: Option<String>,
    /// Core count from the command line.
    pub cores: Option<u32>,
    pub config: PathBuf,
    pub work_dir: PathBuf,
    pub dry_run: bool,
    pub screen: bool,
    pub headers: HeaderPlacement,
    pub verbose: u8,
}

impl TryFrom<Args> for Settings {
    type Error = anyhow::Error;
    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let config = match args.config {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.is_file() {
                    return Err(Error::ConfigNotFound(path.display().to_string()).into());
                }
                path
            }
            None => find_config()?,
        };
        log::info!("Using config file {:?}", config);

        let headers = if args.strict_headers {
            HeaderPlacement::ColumnZero
        } else {
            HeaderPlacement::Anywhere
        };

        Ok(Self {
            input: args.input.map(PathBuf::from),
            // -w wins over the positional arg:
            wfn: args.wfn.or(args.wfn_positional),
            cores: args.cores,
            config,
            work_dir: PathBuf::from(&args.directory),
            dry_run: args.dry_run,
            screen: args.screen,
            headers,
            verbose: args.verbose,
        })
    }
}

/// Places to look for `banewfn.rc`, in order.
fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(3);
    candidates.push(PathBuf::from(CONFIG_FILE));
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::parent)
    {
        candidates.push(exe_dir.join(CONFIG_FILE));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(HOME_CONFIG_DIR).join(CONFIG_FILE));
    }
    candidates
}

fn find_config() -> Result<PathBuf, Error> {
    let candidates = config_candidates();
    match candidates.iter().find(|path| path.is_file()) {
        Some(found) => Ok(found.clone()),
        None => Err(Error::NoConfigFound(
            candidates.iter().map(|p| p.display().to_string()).collect(),
        )),
    }
}
