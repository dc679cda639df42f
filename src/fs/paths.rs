use std::path::{Path, PathBuf};

use super::Fs;

/// Command files fed to Multiwfn's stdin.
const COMMAND_EXT: &str = "txt";
/// Captured Multiwfn output.
const OUT_EXT: &str = "out";
/// Shell scripts for `%command` blocks.
#[cfg(not(windows))]
const SCRIPT_EXT: &str = "sh";
#[cfg(windows)]
const SCRIPT_EXT: &str = "bat";

/// Utility fns for making the paths of generated files.
/// All of them live directly in the working directory.
impl Fs {
    /// $WORK_DIR/<stem>.txt
    pub fn command_file(&self, stem: &str) -> PathBuf {
        self.with_ext(stem, COMMAND_EXT)
    }

    /// $WORK_DIR/<stem>.out
    pub fn out_file(&self, stem: &str) -> PathBuf {
        self.with_ext(stem, OUT_EXT)
    }

    /// $WORK_DIR/<stem>.sh (or .bat on Windows)
    pub fn script_file(&self, stem: &str) -> PathBuf {
        self.with_ext(stem, SCRIPT_EXT)
    }

    fn with_ext(&self, stem: &str, ext: &str) -> PathBuf {
        // not `set_extension`: the stem may already contain dots.
        self.work_dir.join(format!("{stem}.{ext}"))
    }
}

/// Just the file name, for messages.
pub fn file_name(path: &Path) -> std::borrow::Cow<'_, str> {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy())
}
