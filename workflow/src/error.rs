use colored::Colorize;

/// For re-throwing after we've printed a list of errors to the user.
#[derive(Debug, thiserror::Error)]
#[error("{0} failed due to {1} errors")]
pub struct AggregatedErrors(pub String, pub usize);

/// Collects failures that shouldn't stop the run (one per failed task),
/// so they can be reported together at the end.
pub struct Errors {
    errors: Vec<anyhow::Error>,
}

impl Default for Errors {
    fn default() -> Self {
        Self {
            // ideally we won't have any:
            errors: Vec::with_capacity(0),
        }
    }
}

impl Errors {
    pub fn add_context(&mut self, e: anyhow::Error, msg: String) {
        log::trace!("{msg}: {e:?}");
        self.errors.push(e.context(msg));
    }

    pub fn add(&mut self, e: anyhow::Error) {
        log::trace!("error: {e:?}");
        self.errors.push(e);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Print the full list of errors to stderr, and fail w/ an aggregated error
    /// if there were one or more.
    pub fn print_recap(&self, label: &str) -> Result<(), AggregatedErrors> {
        if self.errors.is_empty() {
            return Ok(());
        }
        eprintln!("\n{} {}:\n", "Encountered errors while".red(), label.red());
        for e in &self.errors {
            eprint!("{}: {e}", "ERROR".red());
            for cause in e.chain().skip(1) {
                eprint!("\nCaused by:\n\t{cause}");
            }
            eprintln!();
        }
        Err(AggregatedErrors(label.to_owned(), self.errors.len()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_recap() {
        let mut errors = Errors::default();
        assert!(errors.print_recap("running tasks").is_ok());

        errors.add(anyhow::anyhow!("first"));
        errors.add_context(anyhow::anyhow!("exit code 2"), "module sp".to_owned());
        assert_eq!(2, errors.len());

        let err = errors.print_recap("running tasks").unwrap_err();
        assert_eq!("running tasks failed due to 2 errors", err.to_string());
    }
}
