//! Line-level lexing shared by the template and workflow parsers.

pub mod prelude {
    pub use combine::parser::char::char;
    pub use combine::parser::range::recognize;
    pub use combine::*;
}

use prelude::*;

/// Remove a trailing `#` comment and surrounding whitespace from a line.
///
/// A `#` inside single or double quotes is ordinary text, and `\#` outside
/// quotes is a literal `#`. Quote characters are kept in the output.
pub fn strip_comment(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_single = false;
    let mut in_double = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if !in_single && !in_double && chars.peek() == Some(&'#') => {
                chars.next();
                out.push('#');
            }
            '\'' if !in_double => {
                in_single = !in_single;
                out.push(c);
            }
            '"' if !in_single => {
                in_double = !in_double;
                out.push(c);
            }
            '#' if !in_single && !in_double => break,
            _ => out.push(c),
        }
    }

    let trimmed = out.trim();
    if trimmed.len() == out.len() {
        out
    } else {
        trimmed.to_owned()
    }
}

/// If `line` is a `[name]` header, return the trimmed name.
pub fn section_name(line: &str) -> Option<&str> {
    line.strip_prefix('[')?.strip_suffix(']').map(str::trim)
}

/// Split a `key=value` directive whose key is made of ASCII letters,
/// digits and underscores. Whitespace around `=` is allowed.
pub fn split_directive(line: &str) -> Option<(&str, &str)> {
    use combine::EasyParser;
    directive()
        .easy_parse(line)
        .ok()
        .map(|((key, value), _)| (key, value.trim()))
}

/// Split a `key = value` line at the first `=`, trimming both halves.
pub fn split_assignment(line: &str) -> Option<(&str, &str)> {
    use combine::EasyParser;
    let ((key, value), _) = assignment().easy_parse(line).ok()?;
    let key = key.trim();
    if key.is_empty() {
        None
    } else {
        Some((key, value.trim()))
    }
}

/// A `$name` or `${name}` reference found in a value or command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference<'a> {
    /// `$name`; the name is the longest run of ASCII alphanumerics and `_`, possibly empty.
    Bare(&'a str),
    /// `${name}`; the name is whatever sits between the braces.
    Braced(&'a str),
}

impl<'a> Reference<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Self::Bare(name) | Self::Braced(name) => name,
        }
    }
}

/// Recognize the reference at the start of `text`, which should begin with `$`.
/// Returns the reference and the number of bytes it spans (including the `$`).
/// A `${` with no closing brace is read as a bare reference.
pub fn scan_reference(text: &str) -> Option<(Reference<'_>, usize)> {
    use combine::EasyParser;
    reference()
        .easy_parse(text)
        .ok()
        .map(|(found, rest)| (found, text.len() - rest.len()))
}

p! {
    name_char() -> char, {
        satisfy(|c: char| c.is_ascii_alphanumeric() || c == '_')
    }
}

p! {
    line_internal_whitespace() -> (), {
        skip_many1(satisfy(|c: char| c.is_whitespace() && c != '\n'))
    }
}

wrapper! {
    lex_inline(parser), {
        optional(line_internal_whitespace())
            .with(parser)
            .skip(optional(line_internal_whitespace()))
    }
}

p! {
    rest_of_line() -> &'a str, {
        recognize(skip_many(any()))
    }
}

p! {
    directive() -> (&'a str, &'a str), {
        recognize(skip_many1(name_char()))
            .skip(lex_inline(char('=')))
            .and(rest_of_line())
            .skip(eof())
    }
}

p! {
    assignment() -> (&'a str, &'a str), {
        recognize(skip_many1(none_of("=".chars())))
            .skip(char('='))
            .and(rest_of_line())
    }
}

p! {
    braced_name() -> &'a str, {
        char('{')
            .with(recognize(skip_many(none_of("}".chars()))))
            .skip(char('}'))
    }
}

p! {
    reference() -> Reference<'a>, {
        char('$').with(
            attempt(braced_name().map(Reference::Braced))
                .or(recognize(skip_many(name_char())).map(Reference::Bare))
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_strip_comment() {
        assert_eq!("param value", strip_comment("  param value   # trailing note"));
        assert_eq!("", strip_comment("# whole line"));
        assert_eq!("echo \"a # b\"", strip_comment("echo \"a # b\" # real comment"));
        assert_eq!("echo 'x#y'", strip_comment("echo 'x#y'"));
        assert_eq!("color #ff0000", strip_comment("color \\#ff0000 # red"));
        // backslash not followed by '#' is kept:
        assert_eq!("a\\b", strip_comment("a\\b"));
        // inside quotes the escape is not interpreted:
        assert_eq!("\"\\#\"", strip_comment("\"\\#\""));
    }

    #[test]
    fn test_section_name() {
        assert_eq!(Some("main"), section_name("[main]"));
        assert_eq!(Some("my mod"), section_name("[ my mod ]"));
        assert_eq!(Some(""), section_name("[]"));
        assert_eq!(None, section_name("["));
        assert_eq!(None, section_name("[main] extra"));
    }

    #[test]
    fn test_split_directive() {
        assert_eq!(Some(("wfn", "water.fchk")), split_directive("wfn=water.fchk"));
        assert_eq!(Some(("core", "8")), split_directive("core = 8"));
        assert_eq!(Some(("MY_VAR1", "a=b")), split_directive("MY_VAR1=a=b"));
        assert_eq!(Some(("empty", "")), split_directive("empty="));
        assert_eq!(None, split_directive("param value"));
        assert_eq!(None, split_directive("my-var=1"));
        assert_eq!(None, split_directive("=1"));
    }

    #[test]
    fn test_split_assignment() {
        assert_eq!(Some(("grid", "\"2\"")), split_assignment("grid = \"2\""));
        assert_eq!(Some(("expr", "a == b")), split_assignment("expr=a == b"));
        assert_eq!(None, split_assignment("no equals sign"));
        assert_eq!(None, split_assignment(" = value"));
    }

    #[test]
    fn test_scan_reference() {
        assert_eq!(Some((Reference::Bare("input"), 6)), scan_reference("$input.out"));
        assert_eq!(Some((Reference::Braced("file.txt"), 11)), scan_reference("${file.txt}rest"));
        assert_eq!(Some((Reference::Bare("a_1"), 4)), scan_reference("$a_1-b"));
        // unclosed brace falls back to a (here empty) bare reference:
        assert_eq!(Some((Reference::Bare(""), 1)), scan_reference("${abc"));
        assert_eq!(Some((Reference::Bare(""), 1)), scan_reference("$ 5"));
        assert_eq!(None, scan_reference("no dollar"));
    }
}
