use clap::Parser;

const CMD_NAME: &str = "banewfn";
const DEFAULT_DIRECTORY: &str = ".";

/// Stores our command-line args format.
#[derive(Parser, Debug, Default)]
#[command(name = CMD_NAME, version, about = None, long_about = None)]
pub struct Args {
    /// Workflow script (.inp); asked for on the console if missing
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Wavefunction file (.fchk, .wfn, ...)
    #[arg(value_name = "WFN")]
    pub wfn_positional: Option<String>,

    /// Wavefunction file; takes precedence over the positional WFN
    #[arg(short, long, value_name = "FILE")]
    pub wfn: Option<String>,

    /// Number of cores to run Multiwfn with
    #[arg(short, long, value_name = "N")]
    pub cores: Option<u32>,

    /// Dry run; write command files but don't run anything
    #[arg(short, long = "dryrun", visible_alias = "dry-run")]
    pub dry_run: bool,

    /// Show Multiwfn output on screen instead of writing .out files
    #[arg(short, long)]
    pub screen: bool,

    /// Global config file (default: search for banewfn.rc)
    #[arg(long, value_name = "FILE")]
    #[arg(env = "BANEWFN_CONFIG")]
    pub config: Option<String>,

    /// Directory for generated files and Multiwfn runs
    #[arg(short = 'C', long, value_name = "DIR", default_value = DEFAULT_DIRECTORY)]
    pub directory: String,

    /// Require module headers to start in the first column
    #[arg(long)]
    pub strict_headers: bool,

    /// Print additional debugging info (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
