use util::HashMap;

use crate::ast::{ModuleTemplate, Section};
use crate::line::{section_name, split_assignment, strip_comment};

/// Name of the section holding the exit sequence.
pub const QUIT_SECTION: &str = "quit";
/// Marker that switches a section from commands to default values.
pub const DEFAULTS_MARKER: &str = "-default-";
/// Exit sequence used when a template doesn't declare `[quit]`.
pub const DEFAULT_QUIT: &str = "q";

/// Where we are in the template file.
enum Region {
    /// Before the first header; lines are ignored.
    Preamble,
    /// Inside `[name]`; `defaults` is set once `-default-` is seen.
    Section { name: String, defaults: bool },
    /// Inside `[quit]`.
    Quit,
}

/// Parse the contents of a `<module>.conf` file.
///
/// Parsing never fails: lines that don't fit anywhere are skipped.
pub fn parse_template(text: &str) -> ModuleTemplate {
    let mut sections: HashMap<String, Section> = HashMap::default();
    let mut quit = Vec::new();
    let mut quit_declared = false;
    let mut region = Region::Preamble;

    for raw in text.lines() {
        let line = strip_comment(raw);
        if line.is_empty() {
            continue;
        }

        if let Some(name) = section_name(&line) {
            if name == QUIT_SECTION {
                quit_declared = true;
                region = Region::Quit;
            } else {
                // re-declaring a section starts it over:
                sections.insert(name.to_owned(), Section::default());
                region = Region::Section {
                    name: name.to_owned(),
                    defaults: false,
                };
            }
            continue;
        }

        match &mut region {
            Region::Preamble => {}
            Region::Quit => {
                if line != DEFAULTS_MARKER {
                    quit.push(line);
                }
            }
            Region::Section { defaults, .. } if line == DEFAULTS_MARKER => *defaults = true,
            Region::Section {
                name,
                defaults: true,
            } => {
                if let Some((key, value)) = split_assignment(&line) {
                    let section = sections.entry(name.clone()).or_default();
                    section.defaults.insert(key.to_owned(), unquote(value).to_owned());
                }
            }
            Region::Section {
                name,
                defaults: false,
            } => {
                sections.entry(name.clone()).or_default().commands.push(line);
            }
        }
    }

    if !quit_declared {
        log::debug!("no [quit] section; using default quit command '{DEFAULT_QUIT}'");
        quit.push(DEFAULT_QUIT.to_owned());
    }

    ModuleTemplate { sections, quit }
}

/// Strip one pair of surrounding double quotes, if present.
fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
