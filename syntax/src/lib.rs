#[macro_use]
mod macros;
mod line;
pub use line::{
    scan_reference, section_name, split_assignment, split_directive, strip_comment, Reference,
};
pub mod ast;
mod template;
pub use template::{parse_template, DEFAULTS_MARKER, DEFAULT_QUIT, QUIT_SECTION};
mod script;
pub use script::{
    parse_script, transition, Block, Emit, HeaderPlacement, Line, Mode, ParseOptions, ParserState,
    Script, Warning,
};
