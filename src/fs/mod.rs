use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use util::PathEncodingError;
use workflow::FileSource;

/// Defines fns for creating the paths of generated files
mod paths;
pub use paths::file_name;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Specified working directory \"{0}\" is not a directory")]
    NotDirectory(String),
    #[error("Can't perform IO operation: \"{0}\" is outside the working directory")]
    NotWhitelisted(String),
}

/// All file operations in the crate should go through this struct.
///
/// All writes and deletes check that the path in question is a child of the
/// working directory, otherwise they will not be performed. Shell commands in
/// the workflow script can break this rule; it is up to the user to make sure
/// they don't have unintended consequences.
#[derive(Debug)]
pub struct Fs {
    /// The directory we are allowed to modify
    work_dir: PathBuf,
}

impl Fs {
    /// Create a new `Fs` rooted at the given working directory.
    pub fn new(work_dir: &Path) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Check whether the working dir exists, and create it if not.
    pub fn ensure_work_dir_exists(&mut self, verbose: bool) -> Result<()> {
        if !self.work_dir.exists() {
            eprintln!(
                "Working directory {:?} doesn't exist. Creating.",
                self.work_dir
            );
            fs::create_dir_all(&self.work_dir).context("creating working directory")?;
        } else if !self.work_dir.is_dir() {
            return Err(Error::NotDirectory(
                self.work_dir
                    .to_str()
                    .ok_or(PathEncodingError)?
                    .to_string(),
            )
            .into());
        } else if verbose {
            eprintln!("Using working directory {:?}", self.work_dir);
        }

        self.work_dir = self.work_dir.canonicalize()?;
        Ok(())
    }

    /// Create a file, and return a writable `File` handle.
    pub fn create_file<T: AsRef<Path>>(&self, path: T) -> Result<fs::File> {
        let path = path.as_ref();
        self.check_whitelist(path)?;
        let f = fs::File::create(path).with_context(|| format!("creating file {:?}", path))?;
        Ok(f)
    }

    /// Open a file for reading.
    pub fn open_file<T: AsRef<Path>>(&self, path: T) -> Result<fs::File> {
        let path = path.as_ref();
        let f = fs::File::open(path).with_context(|| format!("opening file {:?}", path))?;
        Ok(f)
    }

    /// Write entire str to a file.
    pub fn write_file<T: AsRef<Path>>(&self, path: T, text: &str) -> Result<()> {
        let path = path.as_ref();
        self.check_whitelist(path)?;
        fs::write(path, text).with_context(|| format!("writing file {:?}", path))?;
        Ok(())
    }

    /// Delete a file.
    pub fn delete_file<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let path = path.as_ref();
        self.check_whitelist(path)?;
        fs::remove_file(path).with_context(|| format!("deleting file {:?}", path))?;
        Ok(())
    }

    /// Read entire file into a String.
    pub fn read_to_buf<T: AsRef<Path>>(&self, path: T, strbuf: &mut String) -> Result<()> {
        use std::io::Read;
        let path = path.as_ref();
        strbuf.clear();
        strbuf.reserve(fs::metadata(path)?.len() as usize);
        let mut f = fs::File::open(path)?;
        f.read_to_string(strbuf)?;
        Ok(())
    }

    fn is_whitelisted<T: AsRef<Path>>(&self, path: T) -> bool {
        path.as_ref().starts_with(&self.work_dir)
    }

    fn check_whitelist(&self, path: &Path) -> Result<()> {
        if self.is_whitelisted(path) {
            Ok(())
        } else {
            Err(Error::NotWhitelisted(path.to_str().ok_or(PathEncodingError)?.to_owned()).into())
        }
    }
}

/// `${file}` placeholders are looked up relative to the working directory.
impl FileSource for Fs {
    fn exists(&self, name: &str) -> bool {
        self.work_dir.join(name).is_file()
    }

    fn read_to_string(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.work_dir.join(name))
    }
}
